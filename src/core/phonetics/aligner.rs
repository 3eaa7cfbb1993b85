use tracing::debug;

use super::{PhonemeSequence, is_vowel_phoneme};

/// Partition `phonemes` into `syllable_count` contiguous groups.
///
/// A group closes right after each vowel phoneme except the last one, so
/// onsets attach to the following vowel and the coda stays with the final
/// syllable. When the number of vowel phonemes differs from
/// `syllable_count`, every group is returned empty instead.
pub fn align(phonemes: &PhonemeSequence, syllable_count: usize) -> Vec<Vec<String>> {
    if syllable_count == 0 {
        return Vec::new();
    }

    let vowels = phonemes.syllable_count();
    if vowels != syllable_count {
        debug!(
            vowels,
            syllable_count, "Phoneme/syllable mismatch, returning empty groups"
        );
        return vec![Vec::new(); syllable_count];
    }

    let mut groups = Vec::with_capacity(syllable_count);
    let mut current = Vec::new();
    let mut seen = 0;
    for phoneme in phonemes.as_slice() {
        current.push(phoneme.clone());
        if is_vowel_phoneme(phoneme) {
            seen += 1;
            if seen < syllable_count {
                groups.push(std::mem::take(&mut current));
            }
        }
    }
    groups.push(current);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_fantastic() {
        let seq = PhonemeSequence::parse("F AE0 N T AE1 S T IH0 K");
        let groups = align(&seq, 3);
        assert_eq!(
            groups,
            vec![
                vec!["F", "AE0"],
                vec!["N", "T", "AE1"],
                vec!["S", "T", "IH0", "K"],
            ]
        );
    }

    #[test]
    fn test_align_flattens_back() {
        let seq = PhonemeSequence::parse("EH1 L AH0 F AH0 N T");
        let groups = align(&seq, 3);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.concat(), seq.as_slice());
    }

    #[test]
    fn test_align_single_syllable() {
        let seq = PhonemeSequence::parse("S T R EH1 NG K TH");
        assert_eq!(align(&seq, 1), vec![seq.as_slice().to_vec()]);
    }

    #[test]
    fn test_align_mismatch_degrades() {
        let seq = PhonemeSequence::parse("R IH1 DH AH0 M");
        let groups = align(&seq, 1);
        assert_eq!(groups, vec![Vec::<String>::new()]);

        let groups = align(&seq, 4);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_align_zero_syllables() {
        assert!(align(&PhonemeSequence::parse("HH M"), 0).is_empty());
    }
}
