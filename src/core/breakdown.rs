//! Word breakdown: syllables, IPA and per-syllable audio.
//!
//! [`BreakdownOrchestrator`] wires the phonetic pipeline to two
//! [`ContentAddressedCache`] instances. The audio cache holds synthesized
//! clips keyed by their SSML; the breakdown cache holds whole serialized
//! responses keyed by the lowercased word. Both namespaces are derived from
//! the voice and audio configuration, so changing either starts fresh
//! entries.

use std::path::PathBuf;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::cache::{CacheError, CacheNamespace, ContentAddressedCache};
use super::phonetics::{
    AlternateSyllabifier, PhonemeSource, align, sequence_to_ipa, syllabify, word_ipa,
};
use super::tts::{AudioConfig, SpeechSynthesis, SynthesisError, VoiceConfig, syllable_ssml, word_ssml};

pub const BREAKDOWN_CACHE_VERSION: &str = "v1";
pub const TTS_CACHE_VERSION: &str = "v1";

/// Errors from [`BreakdownOrchestrator::compute_breakdown`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum BreakdownError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Speech synthesis unavailable: {0}")]
    SynthesisUnavailable(#[from] SynthesisError),
    #[error("Cache I/O error at {path:?}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
    /// A cached breakdown that no longer deserializes. Entries are never
    /// rewritten in place; deleting the file makes the next request recompute.
    #[error("Corrupt cache entry at {path:?}: {message} (delete the file to recompute)")]
    CorruptCacheEntry { path: PathBuf, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Breakdown computation aborted: {0}")]
    Aborted(String),
}

impl BreakdownError {
    /// True when synthesis failed for lack of valid credentials.
    pub fn is_credentials(&self) -> bool {
        matches!(self, BreakdownError::SynthesisUnavailable(e) if e.is_credentials())
    }
}

fn from_cache_error<E: Into<BreakdownError>>(err: CacheError<E>) -> BreakdownError {
    match err {
        CacheError::Io { path, source } => BreakdownError::CacheIo { path, source },
        CacheError::Key(message) => BreakdownError::Serialization(message),
        CacheError::Aborted(message) => BreakdownError::Aborted(message),
        CacheError::Compute(e) => e.into(),
    }
}

impl From<CacheError<SynthesisError>> for BreakdownError {
    fn from(err: CacheError<SynthesisError>) -> Self {
        from_cache_error(err)
    }
}

impl From<CacheError<BreakdownError>> for BreakdownError {
    fn from(err: CacheError<BreakdownError>) -> Self {
        from_cache_error(err)
    }
}

/// A validated input word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    display: String,
    normalized: String,
}

impl Word {
    /// Trim and validate a caller-supplied word. Only ASCII letters are
    /// accepted.
    pub fn parse(input: &str) -> Result<Self, BreakdownError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(BreakdownError::InvalidInput(
                "Word cannot be empty".to_string(),
            ));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(BreakdownError::InvalidInput(
                "Word must contain only letters".to_string(),
            ));
        }
        Ok(Self {
            display: trimmed.to_string(),
            normalized: trimmed.to_ascii_lowercase(),
        })
    }

    /// The word as the caller spelled it, trimmed.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Lowercase form used for lookup and cache keys.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Audio for one syllable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllableAudio {
    pub syllable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipa: Option<String>,
    pub audio_base64: String,
}

/// Full breakdown of one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub word: String,
    pub ipa: String,
    pub syllables: Vec<String>,
    pub syllables_alternate: Vec<String>,
    pub syllable_audios: Vec<SyllableAudio>,
    pub whole_word_audio: String,
}

impl Breakdown {
    /// Restore the caller's capitalization on a breakdown computed from the
    /// lowercase word.
    pub fn recased(mut self, display: &str) -> Self {
        self.syllables = recase(&self.syllables, display);
        self.syllables_alternate = recase(&self.syllables_alternate, display);
        let audio_syllables: Vec<String> = self
            .syllable_audios
            .iter()
            .map(|a| a.syllable.clone())
            .collect();
        for (audio, syllable) in self
            .syllable_audios
            .iter_mut()
            .zip(recase(&audio_syllables, display))
        {
            audio.syllable = syllable;
        }
        self.word = display.to_string();
        self
    }
}

/// Re-slice `display` along the lengths of `parts`. Parts that do not
/// spell `display` are returned unchanged.
fn recase(parts: &[String], display: &str) -> Vec<String> {
    if !parts.concat().eq_ignore_ascii_case(display) {
        return parts.to_vec();
    }
    let mut offset = 0;
    parts
        .iter()
        .map(|part| {
            let end = offset + part.len();
            let piece = display.get(offset..end).unwrap_or(part).to_string();
            offset = end;
            piece
        })
        .collect()
}

/// Cache and synthesis settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct BreakdownOptions {
    pub cache_dir: PathBuf,
    pub audio_memory_entries: usize,
    pub breakdown_memory_entries: usize,
    pub voice: VoiceConfig,
    pub audio: AudioConfig,
}

impl Default for BreakdownOptions {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".phonics-cache"),
            audio_memory_entries: 128,
            breakdown_memory_entries: 256,
            voice: VoiceConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisParams<'a> {
    voice: &'a VoiceConfig,
    audio_config: &'a AudioConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioDescriptor<'a> {
    ssml: &'a str,
    voice: &'a VoiceConfig,
    audio_config: &'a AudioConfig,
}

#[derive(Serialize)]
struct BreakdownDescriptor<'a> {
    word: &'a str,
}

struct Pipeline {
    phonemes: PhonemeSource,
    alternate: Arc<dyn AlternateSyllabifier>,
    synthesizer: Arc<dyn SpeechSynthesis>,
    voice: VoiceConfig,
    audio: AudioConfig,
    audio_cache: ContentAddressedCache<SynthesisError>,
}

impl Pipeline {
    async fn build(&self, word: &str) -> Result<Breakdown, BreakdownError> {
        let phonemes = self.phonemes.lookup(word);
        let syllabification = syllabify(word, phonemes.as_ref());
        let syllables = syllabification.to_strings();
        let syllables_alternate = self.alternate.syllabify(word);
        let ipa = word_ipa(word, phonemes.as_ref().map(|p| p.as_slice()));
        let groups = match &phonemes {
            Some(p) => align(p, syllables.len()),
            None => vec![Vec::new(); syllables.len()],
        };

        info!(
            word,
            method = ?syllabification.method(),
            syllables = ?syllables,
            alternate = ?syllables_alternate,
            ipa = %ipa,
            "Computing breakdown"
        );

        let mut syllable_audios = Vec::with_capacity(syllables.len());
        for (syllable, group) in syllables.iter().zip(&groups) {
            let syllable_ipa = sequence_to_ipa(group);
            let audio = self.synthesize(syllable_ssml(syllable, &syllable_ipa)).await?;
            syllable_audios.push(SyllableAudio {
                syllable: syllable.clone(),
                ipa: (!group.is_empty()).then(|| format!("/{syllable_ipa}/")),
                audio_base64: BASE64.encode(&audio),
            });
        }

        let whole_word = self.synthesize(word_ssml(word, &ipa)).await?;

        Ok(Breakdown {
            word: word.to_string(),
            ipa,
            syllables,
            syllables_alternate,
            syllable_audios,
            whole_word_audio: BASE64.encode(&whole_word),
        })
    }

    async fn synthesize(&self, ssml: String) -> Result<Bytes, BreakdownError> {
        let key = self.audio_cache.key_for(&AudioDescriptor {
            ssml: &ssml,
            voice: &self.voice,
            audio_config: &self.audio,
        })?;

        debug!(ssml = %ssml, key = %key, "Synthesizing clip");
        let synthesizer = Arc::clone(&self.synthesizer);
        let voice = self.voice.clone();
        let audio = self.audio.clone();
        let lookup = self
            .audio_cache
            .get_or_compute_key(key, move || async move {
                synthesizer.synthesize(&ssml, &voice, &audio).await
            })
            .await?;

        if lookup.hit() {
            debug!(outcome = ?lookup.outcome, "TTS cache hit");
        }
        Ok(lookup.payload)
    }
}

/// Produces [`Breakdown`]s, reusing cached clips and responses.
///
/// Cloning is cheap; clones share both caches.
#[derive(Clone)]
pub struct BreakdownOrchestrator {
    pipeline: Arc<Pipeline>,
    breakdown_cache: ContentAddressedCache<BreakdownError>,
}

impl BreakdownOrchestrator {
    pub fn new(
        phonemes: PhonemeSource,
        alternate: Arc<dyn AlternateSyllabifier>,
        synthesizer: Arc<dyn SpeechSynthesis>,
        options: BreakdownOptions,
    ) -> Result<Self, BreakdownError> {
        let params = SynthesisParams {
            voice: &options.voice,
            audio_config: &options.audio,
        };
        let namespace_error = |e: serde_json::Error| BreakdownError::Serialization(e.to_string());

        let audio_namespace = CacheNamespace::new(
            "tts",
            TTS_CACHE_VERSION,
            &params,
            options.audio.audio_encoding.extension(),
        )
        .map_err(namespace_error)?;
        let breakdown_namespace =
            CacheNamespace::new("breakdown", BREAKDOWN_CACHE_VERSION, &params, "json")
                .map_err(namespace_error)?;

        let audio_cache = ContentAddressedCache::new(
            &options.cache_dir,
            audio_namespace,
            options.audio_memory_entries,
        );
        let breakdown_cache = ContentAddressedCache::new(
            &options.cache_dir,
            breakdown_namespace,
            options.breakdown_memory_entries,
        );

        Ok(Self {
            pipeline: Arc::new(Pipeline {
                phonemes,
                alternate,
                synthesizer,
                voice: options.voice,
                audio: options.audio,
                audio_cache,
            }),
            breakdown_cache,
        })
    }

    /// Break down `input`, returning it with the caller's capitalization.
    pub async fn compute_breakdown(&self, input: &str) -> Result<Breakdown, BreakdownError> {
        let word = Word::parse(input)?;
        let key = self.breakdown_cache.key_for(&BreakdownDescriptor {
            word: word.normalized(),
        })?;

        let pipeline = Arc::clone(&self.pipeline);
        let normalized = word.normalized().to_string();
        let lookup = self
            .breakdown_cache
            .get_or_compute_key(key, move || async move {
                let breakdown = pipeline.build(&normalized).await?;
                serde_json::to_vec(&breakdown)
                    .map(Bytes::from)
                    .map_err(|e| BreakdownError::Serialization(e.to_string()))
            })
            .await?;

        if lookup.hit() {
            info!(word = word.display(), outcome = ?lookup.outcome, "Breakdown cache hit");
        }

        let breakdown: Breakdown = serde_json::from_slice(&lookup.payload).map_err(|e| {
            let path = self.breakdown_cache.path_for(&lookup.key);
            self.breakdown_cache.evict_memory(&lookup.key);
            error!(
                word = word.display(),
                path = ?path,
                "Cached breakdown is corrupt; delete the file to recompute: {e}"
            );
            BreakdownError::CorruptCacheEntry {
                path,
                message: e.to_string(),
            }
        })?;
        Ok(breakdown.recased(word.display()))
    }

    pub fn audio_cache(&self) -> &ContentAddressedCache<SynthesisError> {
        &self.pipeline.audio_cache
    }

    pub fn breakdown_cache(&self) -> &ContentAddressedCache<BreakdownError> {
        &self.breakdown_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_validation() {
        let word = Word::parse("  Saturday ").unwrap();
        assert_eq!(word.display(), "Saturday");
        assert_eq!(word.normalized(), "saturday");

        assert!(matches!(Word::parse("   "), Err(BreakdownError::InvalidInput(_))));
        assert!(matches!(Word::parse("don't"), Err(BreakdownError::InvalidInput(_))));
        assert!(matches!(Word::parse("two words"), Err(BreakdownError::InvalidInput(_))));
        assert!(matches!(Word::parse("café"), Err(BreakdownError::InvalidInput(_))));
    }

    #[test]
    fn test_recase() {
        let parts = vec!["sa".to_string(), "tur".to_string(), "day".to_string()];
        assert_eq!(recase(&parts, "Saturday"), ["Sa", "tur", "day"]);
        assert_eq!(recase(&parts, "SATURDAY"), ["SA", "TUR", "DAY"]);
        assert_eq!(recase(&parts, "Monday"), ["sa", "tur", "day"]);
    }

    #[test]
    fn test_breakdown_wire_shape() {
        let breakdown = Breakdown {
            word: "cat".into(),
            ipa: "/kæt/".into(),
            syllables: vec!["cat".into()],
            syllables_alternate: vec!["cat".into()],
            syllable_audios: vec![SyllableAudio {
                syllable: "cat".into(),
                ipa: None,
                audio_base64: "AAAA".into(),
            }],
            whole_word_audio: "AAAA".into(),
        };
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["syllablesAlternate"][0], "cat");
        assert_eq!(json["wholeWordAudio"], "AAAA");
        assert_eq!(json["syllableAudios"][0]["audioBase64"], "AAAA");
        assert!(json["syllableAudios"][0].get("ipa").is_none());
    }

    #[test]
    fn test_credentials_classification() {
        let err = BreakdownError::from(CacheError::Compute(SynthesisError::Credentials(
            "missing".into(),
        )));
        assert!(err.is_credentials());
        assert!(!BreakdownError::InvalidInput("x".into()).is_credentials());
    }
}
