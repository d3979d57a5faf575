use super::{AppConfig, ConfigError, IntegrationMode};

/// Validate the loaded configuration.
///
/// # Errors
///
/// Returns `ConfigError::Validation` on the first violated rule.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be non-zero".to_string(),
        ));
    }
    if config.server.timeout == 0 {
        return Err(ConfigError::Validation(
            "server.timeout must be non-zero".to_string(),
        ));
    }

    let upstream = &config.upstream;
    let parsed = url::Url::parse(&upstream.base_url).map_err(|e| {
        ConfigError::Validation(format!("upstream.base_url '{}': {e}", upstream.base_url))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "upstream.base_url '{}' must be http or https",
            upstream.base_url
        )));
    }
    if upstream.model.is_empty() {
        return Err(ConfigError::Validation(
            "upstream.model must not be empty".to_string(),
        ));
    }
    // The agent runtime holds its own credentials; only the completion path
    // authenticates from here.
    if upstream.integration == IntegrationMode::Completion && upstream.api_key.is_empty() {
        return Err(ConfigError::Validation(
            "upstream.api_key must not be empty for the completion integration".to_string(),
        ));
    }

    Ok(())
}
