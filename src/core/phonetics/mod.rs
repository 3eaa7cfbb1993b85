//! Phonetic analysis of single English words.
//!
//! Everything in this module is pure and request-scoped: a word goes in,
//! syllables, per-syllable phoneme groups and IPA come out. The only shared
//! state is the pronouncing dictionary, which is loaded once and never
//! mutated.
//!
//! # Modules
//! - `dictionary`: dictionary capability and the [`PhonemeSource`] built on it
//! - `syllabifier`: dictionary-guided and heuristic syllable splitting
//! - `aligner`: partitioning of a phoneme sequence into syllable groups
//! - `ipa`: ARPAbet to IPA transcoding
//! - `alternate`: independent syllabifier used for display comparison

pub mod aligner;
pub mod alternate;
pub mod dictionary;
pub mod ipa;
pub mod syllabifier;

pub use aligner::align;
pub use alternate::{AlternateSyllabifier, VowelGroupSyllabifier};
pub use dictionary::{CmuDictionary, DictionaryError, DictionaryLookup, PhonemeSource};
pub use ipa::{phoneme_to_ipa, sequence_to_ipa, word_ipa};
pub use syllabifier::{Syllabification, SyllabificationMethod, syllabify, syllabify_heuristic};

use std::fmt;

/// Letters treated as vowels when splitting the written word.
pub(crate) const VOWEL_LETTERS: &[u8] = b"aeiouy";

pub(crate) fn is_vowel_letter(byte: u8) -> bool {
    VOWEL_LETTERS.contains(&byte.to_ascii_lowercase())
}

/// Returns true when an ARPAbet symbol carries a stress digit, i.e. it is a
/// vowel and therefore a syllable nucleus.
pub fn is_vowel_phoneme(phoneme: &str) -> bool {
    phoneme
        .as_bytes()
        .last()
        .is_some_and(|b| b.is_ascii_digit())
}

/// Ordered ARPAbet phonemes for one word.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhonemeSequence(Vec<String>);

impl PhonemeSequence {
    pub fn new(phonemes: Vec<String>) -> Self {
        Self(phonemes)
    }

    /// Parse a whitespace separated ARPAbet string such as `"K AE1 T"`.
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of stress-bearing phonemes.
    pub fn syllable_count(&self) -> usize {
        self.0.iter().filter(|p| is_vowel_phoneme(p)).count()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [String] {
        &mut self.0
    }
}

impl fmt::Display for PhonemeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl From<Vec<String>> for PhonemeSequence {
    fn from(phonemes: Vec<String>) -> Self {
        Self(phonemes)
    }
}
