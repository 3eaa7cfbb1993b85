//! ARPAbet to IPA transcoding.
//!
//! Symbols are looked up by their exact spelling first so that stress
//! specific renderings win (`AH0` is the schwa, `AH1` is /ʌ/), then by the
//! bare symbol with the stress digit stripped. Unknown symbols render as the
//! empty string.

use phf::phf_map;

/// Entries whose unstressed form differs from the stressed one.
static STRESSED_VARIANTS: phf::Map<&'static str, &'static str> = phf_map! {
    "AH0" => "ə",
    "ER0" => "ɚ",
};

static ARPABET_TO_IPA: phf::Map<&'static str, &'static str> = phf_map! {
    // Vowels
    "AA" => "ɑ",
    "AE" => "æ",
    "AH" => "ʌ",
    "AO" => "ɔ",
    "AW" => "aʊ",
    "AY" => "aɪ",
    "EH" => "ɛ",
    "ER" => "ɝ",
    "EY" => "eɪ",
    "IH" => "ɪ",
    "IY" => "i",
    "OW" => "oʊ",
    "OY" => "ɔɪ",
    "UH" => "ʊ",
    "UW" => "u",
    // Consonants
    "B" => "b",
    "CH" => "tʃ",
    "D" => "d",
    "DH" => "ð",
    "F" => "f",
    "G" => "ɡ",
    "HH" => "h",
    "JH" => "dʒ",
    "K" => "k",
    "L" => "l",
    "M" => "m",
    "N" => "n",
    "NG" => "ŋ",
    "P" => "p",
    "R" => "ɹ",
    "S" => "s",
    "SH" => "ʃ",
    "T" => "t",
    "TH" => "θ",
    "V" => "v",
    "W" => "w",
    "Y" => "j",
    "Z" => "z",
    "ZH" => "ʒ",
};

/// IPA for a single ARPAbet phoneme, or `""` when the symbol is unknown.
pub fn phoneme_to_ipa(phoneme: &str) -> &'static str {
    if let Some(ipa) = STRESSED_VARIANTS.get(phoneme).copied() {
        return ipa;
    }
    let base = phoneme.trim_end_matches(['0', '1', '2']);
    ARPABET_TO_IPA.get(base).copied().unwrap_or("")
}

/// Concatenated IPA for a run of phonemes, without separators.
pub fn sequence_to_ipa<S: AsRef<str>>(phonemes: &[S]) -> String {
    phonemes
        .iter()
        .map(|p| phoneme_to_ipa(p.as_ref()))
        .collect()
}

/// Whole-word transcription wrapped in slashes.
///
/// Words without phonemes come back as the literal word, e.g. `/zorbo/`;
/// that form is a placeholder, not a transcription.
pub fn word_ipa<S: AsRef<str>>(word: &str, phonemes: Option<&[S]>) -> String {
    match phonemes {
        Some(phonemes) => format!("/{}/", sequence_to_ipa(phonemes)),
        None => format!("/{word}/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_variants() {
        assert_eq!(phoneme_to_ipa("AH0"), "ə");
        assert_eq!(phoneme_to_ipa("AH1"), "ʌ");
        assert_eq!(phoneme_to_ipa("AH2"), "ʌ");
        assert_eq!(phoneme_to_ipa("AH"), "ʌ");
        assert_eq!(phoneme_to_ipa("ER0"), "ɚ");
        assert_eq!(phoneme_to_ipa("ER1"), "ɝ");
    }

    #[test]
    fn test_stress_digit_stripped() {
        assert_eq!(phoneme_to_ipa("AE1"), "æ");
        assert_eq!(phoneme_to_ipa("EY0"), "eɪ");
        assert_eq!(phoneme_to_ipa("IY2"), "i");
    }

    #[test]
    fn test_unknown_is_empty() {
        assert_eq!(phoneme_to_ipa("QX"), "");
        assert_eq!(phoneme_to_ipa(""), "");
    }

    #[test]
    fn test_sequence() {
        let phonemes = ["F", "AE0", "N", "T", "AE1", "S", "T", "IH0", "K"];
        assert_eq!(sequence_to_ipa(&phonemes), "fæntæstɪk");
        assert_eq!(word_ipa("fantastic", Some(&phonemes[..])), "/fæntæstɪk/");
    }

    #[test]
    fn test_word_fallback() {
        assert_eq!(word_ipa::<&str>("zorbo", None), "/zorbo/");
    }
}
