use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::ServerConfig;
use crate::core::tts::AudioEncoding;

/// Read a variable, treating empty values as unset.
fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when it is unset.
fn env_parse<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid value for {key} ({raw:?}): {e}").into()),
        None => Ok(default),
    }
}

/// Build a configuration from environment variables over defaults.
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_string("HOST") {
        config.host = host;
    }
    config.port = env_parse("PORT", config.port)?;

    if let Some(dir) = env_string("PHONICS_CACHE_DIR") {
        config.cache_dir = PathBuf::from(dir);
    }
    config.tts_memory_cache_entries =
        env_parse("PHONICS_TTS_MEM_CACHE_ENTRIES", config.tts_memory_cache_entries)?;
    config.breakdown_memory_cache_entries = env_parse(
        "PHONICS_BREAKDOWN_MEM_CACHE_ENTRIES",
        config.breakdown_memory_cache_entries,
    )?;
    config.dictionary_path = env_string("CMUDICT_PATH").map(PathBuf::from);

    config.google_api_key = env_string("GOOGLE_TTS_API_KEY");
    config.google_credentials = env_string("GOOGLE_CREDENTIALS_JSON")
        .or_else(|| env_string("GOOGLE_APPLICATION_CREDENTIALS"));
    config.google_access_token = env_string("GOOGLE_TTS_ACCESS_TOKEN");
    if let Some(endpoint) = env_string("GOOGLE_TTS_ENDPOINT") {
        config.google_tts_endpoint = endpoint;
    }

    if let Some(code) = env_string("TTS_LANGUAGE_CODE") {
        config.tts_language_code = code;
    }
    if let Some(name) = env_string("TTS_VOICE_NAME") {
        config.tts_voice_name = name;
    }
    if let Some(encoding) = env_string("TTS_AUDIO_ENCODING") {
        config.tts_audio_encoding = AudioEncoding::from_str_or_default(&encoding);
    }
    config.tts_speaking_rate = env_parse("TTS_SPEAKING_RATE", config.tts_speaking_rate)?;
    config.tts_pitch = env_parse("TTS_PITCH", config.tts_pitch)?;
    config.tts_timeout_seconds = env_parse("TTS_TIMEOUT_SECONDS", config.tts_timeout_seconds)?;

    config.cors_allowed_origins = env_string("CORS_ALLOWED_ORIGINS");
    config.rate_limit_requests_per_second = env_parse(
        "RATE_LIMIT_REQUESTS_PER_SECOND",
        config.rate_limit_requests_per_second,
    )?;
    config.rate_limit_burst_size = env_parse("RATE_LIMIT_BURST_SIZE", config.rate_limit_burst_size)?;

    Ok(config)
}
