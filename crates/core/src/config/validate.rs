use super::{types::Config, ConfigError};

/// Lowest accepted JPEG quality.
pub const MIN_QUALITY: i64 = 1;
/// Highest accepted JPEG quality.
pub const MAX_QUALITY: i64 = 100;

/// Validate configuration
/// Currently validates:
/// - JPEG quality is within 1..=100
/// - Batch limit is not negative
/// - Remote URL is set and the timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let pipeline = &config.pipeline;
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&pipeline.quality) {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.quality must be between {} and {}, got {}",
            MIN_QUALITY, MAX_QUALITY, pipeline.quality
        )));
    }

    if pipeline.batch_limit < 0 {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.batch_limit cannot be negative, got {}",
            pipeline.batch_limit
        )));
    }

    if config.remote.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "remote.url cannot be empty".to_string(),
        ));
    }

    if config.remote.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "remote.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
