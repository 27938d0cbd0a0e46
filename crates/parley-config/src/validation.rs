// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as known provider names, JSON-encoded model lists,
//! and retry parameter sanity.

use crate::diagnostic::ConfigError;
use crate::model::{ParleyConfig, AUTO_PROVIDER};

/// Provider names the builtin registry registers, in registration order.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "azure", "anthropic", "gemini", "cloudflare"];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    check_provider_name(&config.chat.provider, "chat.provider", &mut errors);
    check_provider_name(
        &config.chat.image_provider,
        "chat.image_provider",
        &mut errors,
    );

    // A present-but-malformed model list should fail at startup, not at
    // the first /models request.
    let model_lists = [
        ("providers.openai.models", &config.providers.openai.models),
        ("providers.azure.models", &config.providers.azure.models),
        (
            "providers.anthropic.models",
            &config.providers.anthropic.models,
        ),
        ("providers.gemini.models", &config.providers.gemini.models),
        (
            "providers.cloudflare.models",
            &config.providers.cloudflare.models,
        ),
    ];
    for (key, raw) in model_lists {
        if let Some(json) = raw
            && serde_json::from_str::<Vec<String>>(json).is_err()
        {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be a JSON string array, got `{json}`"),
            });
        }
    }

    if let Some(ref url) = config.providers.azure.base_url
        && !url.starts_with("http://")
        && !url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "providers.azure.base_url `{url}` must start with http:// or https://"
            ),
        });
    }

    if config.providers.anthropic.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "providers.anthropic.max_tokens must be positive".to_string(),
        });
    }

    if config.stream.retry_backoff_factor == 0 {
        errors.push(ConfigError::Validation {
            message: "stream.retry_backoff_factor must be at least 1".to_string(),
        });
    }

    if config.stream.retry_max_delay_ms < config.stream.retry_base_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "stream.retry_max_delay_ms ({}) must not be below stream.retry_base_delay_ms ({})",
                config.stream.retry_max_delay_ms, config.stream.retry_base_delay_ms
            ),
        });
    }

    if config.http.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "http.timeout_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_provider_name(name: &str, key: &str, errors: &mut Vec<ConfigError>) {
    if name != AUTO_PROVIDER && !KNOWN_PROVIDERS.contains(&name) {
        errors.push(ConfigError::Validation {
            message: format!(
                "{key} `{name}` is not a known provider (expected auto or one of: {})",
                KNOWN_PROVIDERS.join(", ")
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ParleyConfig::default()).is_ok());
    }

    #[test]
    fn unknown_chat_provider_is_rejected() {
        let mut config = ParleyConfig::default();
        config.chat.provider = "openia".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("chat.provider")));
    }

    #[test]
    fn malformed_model_list_is_rejected() {
        let mut config = ParleyConfig::default();
        config.providers.gemini.models = Some("gemini-2.0-flash".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("providers.gemini.models")));
    }

    #[test]
    fn backoff_ceiling_below_base_is_rejected() {
        let mut config = ParleyConfig::default();
        config.stream.retry_base_delay_ms = 5_000;
        config.stream.retry_max_delay_ms = 1_000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ParleyConfig::default();
        config.agent.log_level = "loud".to_string();
        config.chat.provider = "nope".to_string();
        config.http.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn azure_base_url_must_be_http() {
        let mut config = ParleyConfig::default();
        config.providers.azure.base_url = Some("myresource.openai.azure.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("providers.azure.base_url")));
    }
}
