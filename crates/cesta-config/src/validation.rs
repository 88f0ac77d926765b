// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as well-formed URLs, valid socket addresses, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::CestaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CestaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate base_url is not empty
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    }

    // Validate base_url has an http(s) scheme
    if !base_url.is_empty() && !has_http_scheme(base_url) {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.api.timeout_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "api.timeout_secs must be at least 1, got {}",
                config.api.timeout_secs
            ),
        });
    }

    if config.auth.token_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "auth.token_path must not be empty".to_string(),
        });
    }

    if config.ui.history_page_size < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "ui.history_page_size must be at least 1, got {}",
                config.ui.history_page_size
            ),
        });
    }

    let level = config.ui.log_level.trim();
    if !LOG_LEVELS.contains(&level) {
        errors.push(ConfigError::Validation {
            message: format!(
                "ui.log_level `{level}` is not one of trace, debug, info, warn, error"
            ),
        });
    }

    // Validate proxy.listen parses as a socket address
    let listen = config.proxy.listen.trim();
    if listen.is_empty() {
        errors.push(ConfigError::Validation {
            message: "proxy.listen must not be empty".to_string(),
        });
    } else if listen.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!("proxy.listen `{listen}` is not a valid socket address"),
        });
    }

    if !config.proxy.path_prefix.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "proxy.path_prefix `{}` must start with `/`",
                config.proxy.path_prefix
            ),
        });
    }

    // backend_url is optional, but if present it must be a usable origin
    if let Some(backend) = &config.proxy.backend_url {
        let backend = backend.trim();
        if backend.is_empty() {
            errors.push(ConfigError::Validation {
                message: "proxy.backend_url must not be empty when set".to_string(),
            });
        } else if !has_http_scheme(backend) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "proxy.backend_url `{backend}` must start with http:// or https://"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = CestaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_base_url_fails_validation() {
        let mut config = CestaConfig::default();
        config.api.base_url = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("base_url"))));
    }

    #[test]
    fn base_url_without_scheme_fails_validation() {
        let mut config = CestaConfig::default();
        config.api.base_url = "localhost:8000/api".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("http://"))));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = CestaConfig::default();
        config.api.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("timeout_secs"))));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = CestaConfig::default();
        config.ui.history_page_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("history_page_size"))));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = CestaConfig::default();
        config.ui.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn bad_listen_address_fails_validation() {
        let mut config = CestaConfig::default();
        config.proxy.listen = "not-an-address".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("proxy.listen"))));
    }

    #[test]
    fn path_prefix_without_slash_fails_validation() {
        let mut config = CestaConfig::default();
        config.proxy.path_prefix = "api".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("path_prefix"))));
    }

    #[test]
    fn backend_url_without_scheme_fails_validation() {
        let mut config = CestaConfig::default();
        config.proxy.backend_url = Some("backend.example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("backend_url"))));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = CestaConfig::default();
        config.api.base_url = "https://cesta.example.com/api".to_string();
        config.api.timeout_secs = 5;
        config.ui.history_page_size = 25;
        config.ui.log_level = "debug".to_string();
        config.proxy.listen = "0.0.0.0:9000".to_string();
        config.proxy.backend_url = Some("http://10.0.0.2:8000".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn multiple_errors_are_all_collected() {
        let mut config = CestaConfig::default();
        config.api.base_url = "".to_string();
        config.api.timeout_secs = 0;
        config.ui.history_page_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
