//! SSML markup for syllable and whole-word clips.

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Slow, phoneme-pinned rendering of one syllable.
///
/// An empty `ipa` (no aligned phonemes) falls back to the plain syllable text.
pub fn syllable_ssml(syllable: &str, ipa: &str) -> String {
    if ipa.is_empty() {
        format!(r#"<speak><prosody rate="slow">{}</prosody></speak>"#, escape(syllable))
    } else {
        format!(
            r#"<speak><prosody rate="slow"><phoneme alphabet="ipa" ph="{}">{}</phoneme></prosody></speak>"#,
            escape(ipa),
            escape(syllable)
        )
    }
}

/// Whole-word rendering. `ipa` may carry the surrounding slashes.
///
/// When the transcription is just the word itself (dictionary miss) the
/// provider's own pronunciation is used.
pub fn word_ssml(word: &str, ipa: &str) -> String {
    let bare = ipa.trim_matches('/');
    if bare.is_empty() || bare == word {
        format!("<speak>{}</speak>", escape(word))
    } else {
        format!(
            r#"<speak><phoneme alphabet="ipa" ph="{}">{}</phoneme></speak>"#,
            escape(bare),
            escape(word)
        )
    }
}
