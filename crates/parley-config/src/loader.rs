// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./parley.toml` > `~/.config/parley/parley.toml`
//! > `/etc/parley/parley.toml` with environment variable overrides via the
//! `PARLEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ParleyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parley/parley.toml` (system-wide)
/// 3. `~/.config/parley/parley.toml` (user XDG config)
/// 4. `./parley.toml` (local directory)
/// 5. `PARLEY_*` environment variables
pub fn load_config() -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file("/etc/parley/parley.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("parley/parley.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("parley.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PARLEY_PROVIDERS_OPENAI_API_KEY` must
/// map to `providers.openai.api_key`, not `providers.openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. PARLEY_PROVIDERS_OPENAI_API_KEY -> "providers_openai_api_key".
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("providers_openai_", "providers.openai.", 1)
            .replacen("providers_azure_", "providers.azure.", 1)
            .replacen("providers_anthropic_", "providers.anthropic.", 1)
            .replacen("providers_gemini_", "providers.gemini.", 1)
            .replacen("providers_cloudflare_", "providers.cloudflare.", 1)
            .replacen("stream_", "stream.", 1)
            .replacen("http_", "http.", 1)
            .into();
        mapped
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "parley");
        assert_eq!(config.chat.provider, "auto");
    }

    #[test]
    fn provider_section_round_trips() {
        let config = load_config_from_str(
            r#"
            [providers.openai]
            api_key = "sk-test"
            model = "gpt-4o-mini"
            models = '["gpt-4o","gpt-4o-mini"]'
        "#,
        )
        .unwrap();
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.providers.openai.model, "gpt-4o-mini");
        assert!(config.providers.openai.models.is_some());
        // Untouched sections keep defaults.
        assert_eq!(
            config.providers.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn extra_params_table_parses_to_json_values() {
        let config = load_config_from_str(
            r#"
            [providers.openai.extra_params]
            temperature = 0.2
            max_tokens = 512
            user = "ops"
        "#,
        )
        .unwrap();
        let extra = &config.providers.openai.extra_params;
        assert_eq!(extra.get("max_tokens"), Some(&serde_json::json!(512)));
        assert_eq!(extra.get("user"), Some(&serde_json::json!("ops")));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [chat]
            provder = "openai"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_override_maps_section_first() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PARLEY_PROVIDERS_OPENAI_API_KEY", "sk-from-env");
            jail.set_env("PARLEY_CHAT_PROVIDER", "anthropic");
            let config: ParleyConfig = Figment::new()
                .merge(Serialized::defaults(ParleyConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(
                config.providers.openai.api_key.as_deref(),
                Some("sk-from-env")
            );
            assert_eq!(config.chat.provider, "anthropic");
            Ok(())
        });
    }
}
