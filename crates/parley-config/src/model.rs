// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Parley.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; a provider is considered enabled once its credentials are set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Chat routing settings (active provider, streaming mode).
    #[serde(default)]
    pub chat: ChatConfig,

    /// Per-backend provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Streaming delivery pacing and retry settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Outbound HTTP settings shared by all adapters.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "parley".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Active chat provider name, or the sentinel `auto` to pick the
    /// first enabled provider in registration order.
    #[serde(default = "default_provider_auto")]
    pub provider: String,

    /// Active image provider name, or `auto`.
    #[serde(default = "default_provider_auto")]
    pub image_provider: String,

    /// Whether adapters request streamed responses.
    #[serde(default = "default_true")]
    pub stream: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_provider_auto(),
            image_provider: default_provider_auto(),
            stream: default_true(),
        }
    }
}

/// Sentinel provider name meaning "first enabled wins".
pub const AUTO_PROVIDER: &str = "auto";

fn default_provider_auto() -> String {
    AUTO_PROVIDER.to_string()
}

fn default_true() -> bool {
    true
}

/// Per-backend provider sections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub cloudflare: CloudflareConfig,
}

/// Opaque passthrough parameters merged into outgoing payloads.
pub type ExtraParams = BTreeMap<String, serde_json::Value>;

/// OpenAI API configuration (also covers compatible re-hosts via
/// `base_url`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` disables the provider.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL, without a trailing slash.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Active chat model.
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Active image-generation model.
    #[serde(default = "default_openai_image_model")]
    pub image_model: String,

    /// Optional JSON-encoded model list, e.g. `["gpt-4o","o3"]`.
    #[serde(default)]
    pub models: Option<String>,

    /// Passthrough parameters merged into the payload last.
    #[serde(default)]
    pub extra_params: ExtraParams,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            image_model: default_openai_image_model(),
            models: None,
            extra_params: ExtraParams::new(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_image_model() -> String {
    "dall-e-3".to_string()
}

/// Azure OpenAI configuration. The model doubles as the deployment name
/// in the request path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AzureConfig {
    /// API key. `None` disables the provider.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Resource endpoint, e.g. `https://myresource.openai.azure.com`.
    /// `None` disables the provider.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Deployment (model) name.
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API version query parameter.
    #[serde(default = "default_azure_api_version")]
    pub api_version: String,

    /// Optional JSON-encoded model list.
    #[serde(default)]
    pub models: Option<String>,

    #[serde(default)]
    pub extra_params: ExtraParams,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_openai_model(),
            api_version: default_azure_api_version(),
            models: None,
            extra_params: ExtraParams::new(),
        }
    }
}

fn default_azure_api_version() -> String {
    "2024-06-01".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. `None` disables the provider.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL, without a trailing slash.
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Active model.
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    /// Maximum tokens to generate per response (protocol-required).
    #[serde(default = "default_anthropic_max_tokens")]
    pub max_tokens: u32,

    /// API version header value.
    #[serde(default = "default_anthropic_api_version")]
    pub api_version: String,

    /// Optional JSON-encoded model list.
    #[serde(default)]
    pub models: Option<String>,

    #[serde(default)]
    pub extra_params: ExtraParams,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_base_url(),
            model: default_anthropic_model(),
            max_tokens: default_anthropic_max_tokens(),
            api_version: default_anthropic_api_version(),
            models: None,
            extra_params: ExtraParams::new(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_anthropic_max_tokens() -> u32 {
    4096
}

fn default_anthropic_api_version() -> String {
    "2023-06-01".to_string()
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key, sent as a URL query parameter. `None` disables the
    /// provider.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL, without a trailing slash.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Active model.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Optional JSON-encoded model list.
    #[serde(default)]
    pub models: Option<String>,

    #[serde(default)]
    pub extra_params: ExtraParams,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            models: None,
            extra_params: ExtraParams::new(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Cloudflare Workers AI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CloudflareConfig {
    /// API token. `None` disables the provider.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Account identifier embedded in the request path. `None` disables
    /// the provider.
    #[serde(default)]
    pub account_id: Option<String>,

    /// API base URL, without a trailing slash.
    #[serde(default = "default_cloudflare_base_url")]
    pub base_url: String,

    /// Active model.
    #[serde(default = "default_cloudflare_model")]
    pub model: String,

    /// Optional JSON-encoded model list.
    #[serde(default)]
    pub models: Option<String>,

    #[serde(default)]
    pub extra_params: ExtraParams,
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            account_id: None,
            base_url: default_cloudflare_base_url(),
            model: default_cloudflare_model(),
            models: None,
            extra_params: ExtraParams::new(),
        }
    }
}

fn default_cloudflare_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_cloudflare_model() -> String {
    "@cf/meta/llama-3.1-8b-instruct".to_string()
}

/// Streaming delivery pacing and retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Minimum interval between message edits, in milliseconds. Zero
    /// flushes every differing delta.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Maximum delivery retry attempts for rate-limited flushes.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Linear backoff growth factor.
    #[serde(default = "default_retry_backoff_factor")]
    pub retry_backoff_factor: u64,

    /// Backoff delay ceiling, in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_backoff_factor: default_retry_backoff_factor(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    1500
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_backoff_factor() -> u64 {
    2
}

fn default_retry_max_delay_ms() -> u64 {
    10_000
}

/// Outbound HTTP configuration shared by all adapters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout, in seconds. Covers the full streamed body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    300
}

/// Per-user provider override, consulted by the selector ahead of the
/// global configuration. Persisting these is the storage collaborator's
/// concern; this crate only defines the shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserOverride {
    /// Chat provider chosen by the user, if any.
    #[serde(default)]
    pub chat_provider: Option<String>,

    /// Image provider chosen by the user, if any.
    #[serde(default)]
    pub image_provider: Option<String>,
}
