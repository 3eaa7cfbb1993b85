//! Orthographic syllable splitting.
//!
//! The dictionary path uses the syllable count of the word's phoneme sequence
//! and spreads the splits over the written vowels in proportion to their
//! index. It does not model phoneme timing, so words with uneven syllable
//! weight can be split where a phonologist would not; that behaviour is
//! intentional and kept stable.
//!
//! Both paths place a split after a chosen vowel letter the same way:
//!
//! | consonants after the vowel | split point                          |
//! |----------------------------|--------------------------------------|
//! | 0                          | directly after the vowel             |
//! | 1                          | before the consonant (it moves right)|
//! | C > 1                      | after `C / 2` consonants             |

use std::ops::Range;

use tracing::debug;

use super::{PhonemeSequence, is_vowel_letter};

/// Which algorithm produced a [`Syllabification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyllabificationMethod {
    /// Syllable count taken from the pronouncing dictionary.
    Dictionary,
    /// One syllable per written vowel letter.
    VowelHeuristic,
}

/// A word split into contiguous, non-overlapping syllable ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllabification {
    word: String,
    ranges: Vec<Range<usize>>,
    method: SyllabificationMethod,
}

impl Syllabification {
    fn whole(word: &str, method: SyllabificationMethod) -> Self {
        Self {
            word: word.to_string(),
            ranges: vec![0..word.len()],
            method,
        }
    }

    fn from_splits(word: &str, splits: &[usize], method: SyllabificationMethod) -> Self {
        let mut ranges = Vec::with_capacity(splits.len() + 1);
        let mut start = 0;
        for &split in splits {
            ranges.push(start..split);
            start = split;
        }
        ranges.push(start..word.len());
        Self {
            word: word.to_string(),
            ranges,
            method,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn method(&self) -> SyllabificationMethod {
        self.method
    }

    /// Byte ranges `[start, end)` into [`Self::word`].
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn syllables(&self) -> Vec<&str> {
        self.ranges.iter().map(|r| &self.word[r.clone()]).collect()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.ranges
            .iter()
            .map(|r| self.word[r.clone()].to_string())
            .collect()
    }
}

/// Split `word` using its dictionary phonemes when available.
///
/// Falls back to [`syllabify_heuristic`] when `phonemes` is `None` or when
/// the word has fewer written vowels than phonetic syllables.
pub fn syllabify(word: &str, phonemes: Option<&PhonemeSequence>) -> Syllabification {
    let Some(phonemes) = phonemes else {
        debug!(word, "Word not in dictionary, using vowel heuristic");
        return syllabify_heuristic(word);
    };

    if !word.is_ascii() {
        return Syllabification::whole(word, SyllabificationMethod::Dictionary);
    }

    let syllable_count = phonemes.syllable_count();
    if syllable_count <= 1 {
        return Syllabification::whole(word, SyllabificationMethod::Dictionary);
    }

    let bytes = word.as_bytes();
    let vowels = vowel_positions(bytes);
    if vowels.len() < syllable_count {
        debug!(
            word,
            vowels = vowels.len(),
            syllable_count,
            "Not enough vowel letters, using vowel heuristic"
        );
        return syllabify_heuristic(word);
    }

    let splits: Vec<usize> = (1..syllable_count)
        .map(|i| {
            let vowel_index = i * vowels.len() / syllable_count - 1;
            split_after_vowel(bytes, vowels[vowel_index])
        })
        .collect();

    let result = Syllabification::from_splits(word, &splits, SyllabificationMethod::Dictionary);
    debug!(word, syllables = ?result.syllables(), syllable_count, "Dictionary syllabification");
    result
}

/// Split `word` between every pair of consecutive vowel letters.
pub fn syllabify_heuristic(word: &str) -> Syllabification {
    if !word.is_ascii() {
        return Syllabification::whole(word, SyllabificationMethod::VowelHeuristic);
    }

    let bytes = word.as_bytes();
    let vowels = vowel_positions(bytes);
    if vowels.len() <= 1 {
        return Syllabification::whole(word, SyllabificationMethod::VowelHeuristic);
    }

    let splits: Vec<usize> = vowels[..vowels.len() - 1]
        .iter()
        .map(|&v| split_after_vowel(bytes, v))
        .collect();

    Syllabification::from_splits(word, &splits, SyllabificationMethod::VowelHeuristic)
}

fn vowel_positions(bytes: &[u8]) -> Vec<usize> {
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| is_vowel_letter(**b))
        .map(|(i, _)| i)
        .collect()
}

fn split_after_vowel(bytes: &[u8], vowel: usize) -> usize {
    let consonant_start = vowel + 1;
    let consonant_end = bytes[consonant_start..]
        .iter()
        .position(|b| is_vowel_letter(*b))
        .map_or(bytes.len(), |offset| consonant_start + offset);
    let consonants = consonant_end - consonant_start;

    if consonants > 1 {
        consonant_start + consonants / 2
    } else {
        consonant_start
    }
}
