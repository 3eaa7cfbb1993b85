//! Pronouncing dictionary capability.
//!
//! [`DictionaryLookup`] is the seam to the external pronouncing dictionary.
//! [`CmuDictionary`] reads the CMU Pronouncing Dictionary text format:
//!
//! ```text
//! ;;; comment lines start with three semicolons
//! saturday  S AE1 T ER0 D IY2
//! either  IY1 DH ER0
//! either(2)  AY1 DH ER0
//! ```
//!
//! [`PhonemeSource`] turns raw entries into a [`PhonemeSequence`].

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use super::PhonemeSequence;

/// Marks the start of an inline comment in a raw entry.
const ENTRY_COMMENT: char = '#';

/// Errors raised while loading a dictionary file.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("Failed to read dictionary {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only lookup into a pronouncing dictionary.
///
/// Implementations return the raw primary entry for `word` (already lowercased
/// by the caller), e.g. `"S AE1 T ER0 D IY2"`, or `None` when the word is
/// unknown.
pub trait DictionaryLookup: Send + Sync {
    fn lookup(&self, word: &str) -> Option<&str>;
}

/// In-memory CMU Pronouncing Dictionary.
#[derive(Debug, Default, Clone)]
pub struct CmuDictionary {
    entries: HashMap<String, String>,
}

impl CmuDictionary {
    /// An empty dictionary; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse dictionary text.
    pub fn parse(text: &str) -> Self {
        let mut dict = Self::default();
        for line in text.lines() {
            dict.insert_line(line);
        }
        dict
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut dict = Self::default();
        for line in reader.lines() {
            dict.insert_line(&line?);
        }
        Ok(dict)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DictionaryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dict = Self::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            DictionaryError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!("Loaded {} dictionary entries from {:?}", dict.len(), path);
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with(";;;") {
            return;
        }
        let Some((headword, pronunciation)) = line.split_once(char::is_whitespace) else {
            return;
        };
        // `word(2)` lines are alternate pronunciations; the first entry wins.
        if headword.ends_with(')') && headword.contains('(') {
            return;
        }
        let pronunciation = pronunciation.trim();
        if pronunciation.is_empty() {
            return;
        }
        self.entries
            .entry(headword.to_lowercase())
            .or_insert_with(|| pronunciation.to_string());
    }
}

impl DictionaryLookup for CmuDictionary {
    fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }
}

/// Produces phoneme sequences for words from an injected dictionary.
#[derive(Clone)]
pub struct PhonemeSource {
    dictionary: Arc<dyn DictionaryLookup>,
}

impl PhonemeSource {
    pub fn new(dictionary: Arc<dyn DictionaryLookup>) -> Self {
        Self { dictionary }
    }

    /// Case-insensitive lookup of the primary pronunciation of `word`.
    ///
    /// Words ending in "day" or "days" get their final `IY` vowel rewritten to
    /// `EY0`, so "Saturday" ends in /deɪ/ rather than the reduced /di/.
    pub fn lookup(&self, word: &str) -> Option<PhonemeSequence> {
        let lower = word.to_lowercase();
        let raw = self.dictionary.lookup(&lower)?;
        let primary = raw.split(ENTRY_COMMENT).next().unwrap_or_default();
        let mut phonemes = PhonemeSequence::parse(primary);
        if phonemes.is_empty() {
            return None;
        }

        if lower.ends_with("day") || lower.ends_with("days") {
            rewrite_day_suffix(&mut phonemes);
        }

        debug!(word = %lower, phonemes = %phonemes, "Dictionary hit");
        Some(phonemes)
    }
}

fn rewrite_day_suffix(phonemes: &mut PhonemeSequence) {
    let last_vowel = phonemes
        .as_mut_slice()
        .iter_mut()
        .rev()
        .find(|p| super::is_vowel_phoneme(p));
    if let Some(vowel) = last_vowel {
        if matches!(vowel.as_str(), "IY0" | "IY1" | "IY2") {
            *vowel = "EY0".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
;;; sample entries
cat  K AE1 T
either  IY1 DH ER0
either(2)  AY1 DH ER0
saturday  S AE1 T ER0 D IY2
mondays  M AH1 N D IY0 Z
holiday  HH AA1 L AH0 D EY2
tomato  T AH0 M EY1 T OW2 # old-style
";

    fn source() -> PhonemeSource {
        PhonemeSource::new(Arc::new(CmuDictionary::parse(SAMPLE)))
    }

    #[test]
    fn test_parse_skips_comments_and_alternates() {
        let dict = CmuDictionary::parse(SAMPLE);
        assert_eq!(dict.len(), 6);
        assert_eq!(dict.lookup("either"), Some("IY1 DH ER0"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let seq = source().lookup("CaT").unwrap();
        assert_eq!(seq.as_slice(), ["K", "AE1", "T"]);
    }

    #[test]
    fn test_inline_comment_is_stripped() {
        let seq = source().lookup("tomato").unwrap();
        assert_eq!(seq.to_string(), "T AH0 M EY1 T OW2");
    }

    #[test]
    fn test_unknown_word() {
        assert!(source().lookup("blorptastic").is_none());
    }

    #[test]
    fn test_day_suffix_rewrites_final_vowel() {
        let seq = source().lookup("Saturday").unwrap();
        assert_eq!(seq.to_string(), "S AE1 T ER0 D EY0");

        let seq = source().lookup("mondays").unwrap();
        assert_eq!(seq.to_string(), "M AH1 N D EY0 Z");
    }

    #[test]
    fn test_day_suffix_leaves_other_vowels() {
        let seq = source().lookup("holiday").unwrap();
        assert_eq!(seq.to_string(), "HH AA1 L AH0 D EY2");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmudict.dict");
        std::fs::write(&path, SAMPLE).unwrap();
        let dict = CmuDictionary::from_path(&path).unwrap();
        assert_eq!(dict.lookup("cat"), Some("K AE1 T"));

        assert!(CmuDictionary::from_path(dir.path().join("missing")).is_err());
    }
}
