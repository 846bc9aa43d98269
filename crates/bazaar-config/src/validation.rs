// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths and positive limits.

use crate::diagnostic::ConfigError;
use crate::model::BazaarConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BazaarConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.change_buffer == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.change_buffer must be at least 1".to_string(),
        });
    }

    if config.chat.withdraw_window_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.withdraw_window_ms must be positive".to_string(),
        });
    }

    if config.chat.max_text_len == 0 {
        errors.push(ConfigError::Validation {
            message: "chat.max_text_len must be positive".to_string(),
        });
    }

    if config.notifications.fallback_title.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "notifications.fallback_title must not be empty".to_string(),
        });
    }

    if config.upload.media_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "upload.media_dir must not be empty".to_string(),
        });
    }

    if config.upload.max_upload_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "upload.max_upload_bytes must be positive".to_string(),
        });
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
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

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = BazaarConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = BazaarConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn zero_withdraw_window_fails_validation() {
        let mut config = BazaarConfig::default();
        config.chat.withdraw_window_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "withdraw_window_ms"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = BazaarConfig::default();
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "logging.level"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = BazaarConfig::default();
        config.upload.max_upload_bytes = 0;
        config.notifications.fallback_title = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn in_memory_storage_validates() {
        let config = BazaarConfig {
            storage: crate::model::StorageConfig::in_memory(),
            ..BazaarConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
