use super::ServerConfig;

/// Check the merged configuration for values the provider or server would
/// reject at runtime.
pub(super) fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_speaking_rate(config.tts_speaking_rate)?;
    validate_pitch(config.tts_pitch)?;
    validate_rate_limit(
        config.rate_limit_requests_per_second,
        config.rate_limit_burst_size,
    )?;
    validate_timeout(config.tts_timeout_seconds)?;
    if config.tts_voice_name.trim().is_empty() {
        return Err("tts voice_name must not be empty".into());
    }
    if let Some(path) = &config.dictionary_path {
        if !path.is_file() {
            return Err(format!("Dictionary file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn validate_speaking_rate(rate: f64) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.25..=4.0).contains(&rate) {
        return Err(format!("tts speaking_rate must be between 0.25 and 4.0, got {rate}").into());
    }
    Ok(())
}

fn validate_pitch(pitch: f64) -> Result<(), Box<dyn std::error::Error>> {
    if !(-20.0..=20.0).contains(&pitch) {
        return Err(format!("tts pitch must be between -20.0 and 20.0, got {pitch}").into());
    }
    Ok(())
}

fn validate_rate_limit(rps: u32, burst: u32) -> Result<(), Box<dyn std::error::Error>> {
    if rps == 0 {
        return Err("rate_limit_requests_per_second must be greater than 0".into());
    }
    if burst == 0 {
        return Err("rate_limit_burst_size must be greater than 0".into());
    }
    Ok(())
}

fn validate_timeout(seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    if seconds == 0 {
        return Err("tts timeout_seconds must be greater than 0".into());
    }
    Ok(())
}
