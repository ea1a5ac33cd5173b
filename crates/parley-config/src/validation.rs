// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as page size bounds, non-empty paths, and retry limits.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

/// Largest accepted page size for topic and post listings.
pub const MAX_PER_PAGE: u32 = 500;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.forum.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "forum.name must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.forum.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "forum.log_level `{}` is not one of {}",
                config.forum.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    for (key, value) in [
        ("forum.topics_per_page", config.forum.topics_per_page),
        ("forum.posts_per_page", config.forum.posts_per_page),
    ] {
        if value == 0 || value > MAX_PER_PAGE {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be between 1 and {MAX_PER_PAGE}, got {value}"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.notifications.queue_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "notifications.queue_name must not be empty".to_string(),
        });
    }

    if config.notifications.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "notifications.max_attempts must be at least 1, got {}",
                config.notifications.max_attempts
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

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ParleyConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ParleyConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = ParleyConfig::default();
        config.forum.posts_per_page = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "forum.posts_per_page"));
    }

    #[test]
    fn oversized_page_fails_validation() {
        let mut config = ParleyConfig::default();
        config.forum.topics_per_page = MAX_PER_PAGE + 1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "forum.topics_per_page"));
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut config = ParleyConfig::default();
        config.forum.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "forum.log_level"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ParleyConfig::default();
        config.storage.database_path = " ".to_string();
        config.notifications.queue_name = String::new();
        config.notifications.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
