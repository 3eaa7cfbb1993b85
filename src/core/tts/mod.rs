//! Speech synthesis capability.
//!
//! The breakdown pipeline only sees [`SpeechSynthesis`]; the Google Cloud
//! REST client in [`google`] is the shipped implementation.

pub mod google;
pub mod ssml;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use google::{GOOGLE_TTS_URL, GoogleCredentials, GoogleTTS, GoogleTTSConfig};
pub use ssml::{syllable_ssml, word_ssml};

/// Errors returned by a synthesis provider.
///
/// `Clone` so one failure can be delivered to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    #[error("Speech synthesis credentials not configured: {0}")]
    Credentials(String),
    #[error("Speech synthesis provider error {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("Provider returned no audio")]
    EmptyAudio,
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SynthesisError {
    /// True when the failure is caused by missing or rejected credentials.
    pub fn is_credentials(&self) -> bool {
        matches!(self, SynthesisError::Credentials(_))
    }
}

/// Output encodings supported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Linear16,
    OggOpus,
}

impl AudioEncoding {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Linear16 => "LINEAR16",
            Self::OggOpus => "OGG_OPUS",
        }
    }

    /// File extension used for cached clips.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Linear16 => "wav",
            Self::OggOpus => "ogg",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "MP3" => Self::Mp3,
            "LINEAR16" | "PCM" | "WAV" => Self::Linear16,
            "OGG_OPUS" | "OPUS" | "OGG" => Self::OggOpus,
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Voice selection, serialized in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub language_code: String,
    pub name: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            name: "en-US-Studio-O".to_string(),
        }
    }
}

/// Audio output parameters, serialized in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: AudioEncoding,
    pub speaking_rate: f64,
    pub pitch: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            audio_encoding: AudioEncoding::Mp3,
            speaking_rate: 1.0,
            pitch: 0.0,
        }
    }
}

/// Turns SSML into encoded audio.
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    async fn synthesize(
        &self,
        ssml: &str,
        voice: &VoiceConfig,
        audio: &AudioConfig,
    ) -> Result<Bytes, SynthesisError>;
}
