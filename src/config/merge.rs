use std::path::PathBuf;

use super::ServerConfig;
use super::env::load_from_env;
use super::yaml::YamlConfig;
use crate::core::tts::AudioEncoding;

/// Environment configuration with YAML values layered on top.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_from_env()?;
    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
    }

    if let Some(cache) = yaml.cache {
        if let Some(dir) = cache.dir {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(entries) = cache.tts_memory_entries {
            config.tts_memory_cache_entries = entries;
        }
        if let Some(entries) = cache.breakdown_memory_entries {
            config.breakdown_memory_cache_entries = entries;
        }
    }

    if let Some(path) = yaml.dictionary.and_then(|d| d.path) {
        config.dictionary_path = Some(PathBuf::from(path));
    }

    if let Some(providers) = yaml.providers {
        if let Some(key) = providers.google_api_key {
            config.google_api_key = Some(key);
        }
        if let Some(credentials) = providers.google_credentials {
            config.google_credentials = Some(credentials);
        }
        if let Some(token) = providers.google_access_token {
            config.google_access_token = Some(token);
        }
        if let Some(endpoint) = providers.google_tts_endpoint {
            config.google_tts_endpoint = endpoint;
        }
    }

    if let Some(tts) = yaml.tts {
        if let Some(code) = tts.language_code {
            config.tts_language_code = code;
        }
        if let Some(name) = tts.voice_name {
            config.tts_voice_name = name;
        }
        if let Some(encoding) = tts.audio_encoding {
            config.tts_audio_encoding = AudioEncoding::from_str_or_default(&encoding);
        }
        if let Some(rate) = tts.speaking_rate {
            config.tts_speaking_rate = rate;
        }
        if let Some(pitch) = tts.pitch {
            config.tts_pitch = pitch;
        }
        if let Some(timeout) = tts.timeout_seconds {
            config.tts_timeout_seconds = timeout;
        }
    }

    if let Some(security) = yaml.security {
        if let Some(origins) = security.cors_allowed_origins {
            config.cors_allowed_origins = Some(origins);
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}
