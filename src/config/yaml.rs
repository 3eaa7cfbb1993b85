use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional; anything missing keeps its environment or
/// default value.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///
/// cache:
///   dir: "/var/cache/phonics"
///   tts_memory_entries: 128
///   breakdown_memory_entries: 256
///
/// dictionary:
///   path: "/usr/share/cmudict/cmudict.dict"
///
/// providers:
///   # Service account key JSON or a path to one; "" uses application
///   # default credentials
///   google_credentials: "/etc/phonics/tts-service-account.json"
///
/// tts:
///   language_code: "en-US"
///   voice_name: "en-US-Studio-O"
///   audio_encoding: "MP3"
///   speaking_rate: 1.0
///   pitch: 0.0
///   timeout_seconds: 30
///
/// security:
///   cors_allowed_origins: "https://example.com"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub cache: Option<CacheYaml>,
    pub dictionary: Option<DictionaryYaml>,
    pub providers: Option<ProvidersYaml>,
    pub tts: Option<TtsYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Cache configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CacheYaml {
    pub dir: Option<String>,
    pub tts_memory_entries: Option<usize>,
    pub breakdown_memory_entries: Option<usize>,
}

/// Pronouncing dictionary from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DictionaryYaml {
    pub path: Option<String>,
}

/// Provider credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub google_api_key: Option<String>,
    pub google_credentials: Option<String>,
    /// OAuth access token, used when no API key is set
    pub google_access_token: Option<String>,
    pub google_tts_endpoint: Option<String>,
}

/// Voice and audio settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub language_code: Option<String>,
    pub voice_name: Option<String>,
    /// MP3, LINEAR16 or OGG_OPUS
    pub audio_encoding: Option<String>,
    pub speaking_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub timeout_seconds: Option<u64>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
