// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as sane worker counts, valid URLs, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be nonzero".to_string(),
        });
    }

    if config.storage.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.path must not be empty".to_string(),
        });
    }

    if !config.provider.base_url.starts_with("http://")
        && !config.provider.base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "provider.base_url must be an http(s) URL, got `{}`",
                config.provider.base_url
            ),
        });
    }

    if config.provider.timeout_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "provider.timeout_secs must be at least 1, got {}",
                config.provider.timeout_secs
            ),
        });
    }

    if config.dispatch.workers < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.workers must be at least 1, got {}",
                config.dispatch.workers
            ),
        });
    }

    if config.dispatch.poll_interval_ms < 10 {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.poll_interval_ms must be at least 10, got {}",
                config.dispatch.poll_interval_ms
            ),
        });
    }

    if config.dispatch.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.max_attempts must be at least 1, got {}",
                config.dispatch.max_attempts
            ),
        });
    }

    if config.blacklist.ttl_days < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "blacklist.ttl_days must be at least 1, got {}",
                config.blacklist.ttl_days
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.log.level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HeraldConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_port_fails_validation() {
        let mut config = HeraldConfig::default();
        config.server.port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("server.port"))));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = HeraldConfig::default();
        config.provider.base_url = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = HeraldConfig::default();
        config.log.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log.level"))));
    }

    #[test]
    fn all_errors_are_collected_not_fail_fast() {
        let mut config = HeraldConfig::default();
        config.server.port = 0;
        config.dispatch.workers = 0;
        config.blacklist.ttl_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = HeraldConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 9090;
        config.provider.base_url = "http://localhost:8181/messaging".to_string();
        config.dispatch.workers = 16;
        config.log.level = "debug".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
