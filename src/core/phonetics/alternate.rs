//! Alternate syllabification shown next to the dictionary result.
//!
//! This is a second, independent opinion. It never feeds back into the
//! dictionary path and the two are allowed to disagree.

use std::ops::Range;

/// Best-effort syllabifier used for display comparison only.
pub trait AlternateSyllabifier: Send + Sync {
    /// Split `word` into syllables that concatenate back to `word`.
    fn syllabify(&self, word: &str) -> Vec<String>;
}

/// Consonant pairs that are never split across syllables.
const DIGRAPHS: &[&[u8; 2]] = &[b"ch", b"sh", b"th", b"ph", b"wh", b"ck", b"gh"];

/// Vowel-group heuristic:
///
/// - adjacent vowel letters form one nucleus ("team" is one syllable);
/// - `y` is a consonant at the start of a word;
/// - a lone final `e` is silent ("cake"), except in a consonant + `le` ending
///   ("ta-ble");
/// - one consonant between nuclei starts the next syllable, two or more are
///   split after the first, and digraphs stay together.
#[derive(Debug, Clone, Copy, Default)]
pub struct VowelGroupSyllabifier;

impl VowelGroupSyllabifier {
    pub fn new() -> Self {
        Self
    }

    fn nuclei(bytes: &[u8]) -> Vec<Range<usize>> {
        let is_vowel = |i: usize| match bytes[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => true,
            b'y' => i > 0,
            _ => false,
        };

        let mut nuclei: Vec<Range<usize>> = Vec::new();
        for i in 0..bytes.len() {
            if !is_vowel(i) {
                continue;
            }
            match nuclei.last_mut() {
                Some(last) if last.end == i => last.end = i + 1,
                _ => nuclei.push(i..i + 1),
            }
        }
        nuclei
    }

    fn is_consonant_le(bytes: &[u8]) -> bool {
        let n = bytes.len();
        n >= 3 && bytes.ends_with(b"le") && !b"aeiouy".contains(&bytes[n - 3])
    }
}

impl AlternateSyllabifier for VowelGroupSyllabifier {
    fn syllabify(&self, word: &str) -> Vec<String> {
        if word.is_empty() || !word.is_ascii() {
            return vec![word.to_string()];
        }
        let lower = word.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        let mut nuclei = Self::nuclei(bytes);

        let consonant_le = Self::is_consonant_le(bytes);
        if nuclei.len() > 1 && !consonant_le {
            if let Some(last) = nuclei.last() {
                if last.start == bytes.len() - 1 && bytes[last.start] == b'e' {
                    nuclei.pop();
                }
            }
        }
        if nuclei.len() <= 1 {
            return vec![word.to_string()];
        }

        let mut splits = Vec::with_capacity(nuclei.len() - 1);
        for (i, pair) in nuclei.windows(2).enumerate() {
            let (start, end) = (pair[0].end, pair[1].start);
            let consonants = end - start;
            let is_final_gap = i == nuclei.len() - 2;

            let split = if consonant_le && is_final_gap {
                // "ta|ble", "lit|tle": the consonant before "le" starts the syllable.
                end - 2
            } else if consonants <= 1 {
                start
            } else if consonants == 2 && DIGRAPHS.contains(&&[bytes[start], bytes[start + 1]]) {
                start
            } else {
                let mut split = start + 1;
                if split < end && DIGRAPHS.contains(&&[bytes[split - 1], bytes[split]]) {
                    split += 1;
                }
                split
            };
            splits.push(split);
        }

        let mut syllables = Vec::with_capacity(splits.len() + 1);
        let mut start = 0;
        for split in splits {
            if split > start {
                syllables.push(word[start..split].to_string());
                start = split;
            }
        }
        syllables.push(word[start..].to_string());
        syllables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(word: &str) -> Vec<String> {
        VowelGroupSyllabifier::new().syllabify(word)
    }

    #[test]
    fn test_vowel_teams_are_one_nucleus() {
        assert_eq!(split("team"), ["team"]);
        assert_eq!(split("rainbow"), ["rain", "bow"]);
    }

    #[test]
    fn test_silent_e() {
        assert_eq!(split("cake"), ["cake"]);
        assert_eq!(split("cupcake"), ["cup", "cake"]);
    }

    #[test]
    fn test_consonant_le() {
        assert_eq!(split("table"), ["ta", "ble"]);
        assert_eq!(split("little"), ["lit", "tle"]);
        assert_eq!(split("candle"), ["can", "dle"]);
    }

    #[test]
    fn test_digraphs_stay_together() {
        assert_eq!(split("mother"), ["mo", "ther"]);
        assert_eq!(split("peaches"), ["pea", "ches"]);
    }

    #[test]
    fn test_initial_y_is_consonant() {
        assert_eq!(split("yellow"), ["yel", "low"]);
    }

    #[test]
    fn test_lossless_and_case_preserving() {
        for word in ["Fantastic", "Saturday", "strengths", "a", "rhythm", "queue"] {
            assert_eq!(split(word).concat(), word);
        }
        assert_eq!(split("Fantastic"), ["Fan", "tas", "tic"]);
    }
}
