//! Configuration module for the phonics gateway
//!
//! Server configuration comes from .env files, environment variables and an
//! optional YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use phonics_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//!
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

use crate::core::breakdown::BreakdownOptions;
use crate::core::tts::{
    AudioConfig, AudioEncoding, GOOGLE_TTS_URL, GoogleCredentials, GoogleTTSConfig, VoiceConfig,
};

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port)
/// - Cache location and memory tier sizes
/// - Pronouncing dictionary location
/// - Google TTS credentials, voice and audio settings
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Cache settings
    /// Root directory for cached clips and breakdowns
    pub cache_dir: PathBuf,
    /// Memory-tier capacity of the audio cache (0 disables it)
    pub tts_memory_cache_entries: usize,
    /// Memory-tier capacity of the breakdown cache (0 disables it)
    pub breakdown_memory_cache_entries: usize,

    /// CMU Pronouncing Dictionary file. Without it every word takes the
    /// heuristic path.
    pub dictionary_path: Option<PathBuf>,

    // Google TTS credentials
    pub google_api_key: Option<String>,
    /// Service account key JSON or a path to one. An empty string selects
    /// application default credentials.
    pub google_credentials: Option<String>,
    pub google_access_token: Option<String>,
    pub google_tts_endpoint: String,

    // Voice and audio settings
    pub tts_language_code: String,
    pub tts_voice_name: String,
    pub tts_audio_encoding: AudioEncoding,
    pub tts_speaking_rate: f64,
    pub tts_pitch: f64,
    pub tts_timeout_seconds: u64,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cache_dir: PathBuf::from(".phonics-cache"),
            tts_memory_cache_entries: 128,
            breakdown_memory_cache_entries: 256,
            dictionary_path: None,
            google_api_key: None,
            google_credentials: None,
            google_access_token: None,
            google_tts_endpoint: GOOGLE_TTS_URL.to_string(),
            tts_language_code: "en-US".to_string(),
            tts_voice_name: "en-US-Studio-O".to_string(),
            tts_audio_encoding: AudioEncoding::Mp3,
            tts_speaking_rate: 1.0,
            tts_pitch: 0.0,
            tts_timeout_seconds: 30,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Zeroize secret fields when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.google_api_key {
            key.zeroize();
        }
        if let Some(ref mut credentials) = self.google_credentials {
            credentials.zeroize();
        }
        if let Some(ref mut token) = self.google_access_token {
            token.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// The .env file is loaded in `main.rs` before this is called.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base.
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if the YAML file cannot be read or is malformed, an
    /// environment variable has an invalid format, or validation fails.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when any Google credential is configured
    pub fn has_google_credentials(&self) -> bool {
        self.google_api_key.is_some()
            || self.google_credentials.is_some()
            || self.google_access_token.is_some()
    }

    pub fn voice_config(&self) -> VoiceConfig {
        VoiceConfig {
            language_code: self.tts_language_code.clone(),
            name: self.tts_voice_name.clone(),
        }
    }

    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            audio_encoding: self.tts_audio_encoding,
            speaking_rate: self.tts_speaking_rate,
            pitch: self.tts_pitch,
        }
    }

    /// Provider settings. Precedence: API key, then service account, then a
    /// static access token.
    pub fn google_tts_config(&self) -> GoogleTTSConfig {
        let credentials = if let Some(key) = &self.google_api_key {
            Some(GoogleCredentials::ApiKey(key.clone()))
        } else if let Some(source) = &self.google_credentials {
            Some(GoogleCredentials::ServiceAccount(source.clone()))
        } else {
            self.google_access_token
                .as_ref()
                .map(|token| GoogleCredentials::AccessToken(token.clone()))
        };
        GoogleTTSConfig {
            endpoint: self.google_tts_endpoint.clone(),
            credentials,
            request_timeout: Duration::from_secs(self.tts_timeout_seconds),
        }
    }

    pub fn breakdown_options(&self) -> BreakdownOptions {
        BreakdownOptions {
            cache_dir: self.cache_dir.clone(),
            audio_memory_entries: self.tts_memory_cache_entries,
            breakdown_memory_entries: self.breakdown_memory_cache_entries,
            voice: self.voice_config(),
            audio: self.audio_config(),
        }
    }
}
