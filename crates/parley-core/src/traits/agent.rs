// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability contract every provider adapter implements.

use async_trait::async_trait;
use parley_config::ParleyConfig;
use tokio_util::sync::CancellationToken;

use crate::error::ParleyError;
use crate::traits::sink::DeltaSink;
use crate::types::{ChatRequest, ChatResponse, ImageOutput};

/// A chat-capable provider adapter.
///
/// Implementations are stateless apart from a pooled HTTP client; every
/// accessor takes the global configuration so the registry can be built
/// once at startup and live for the process lifetime while enablement is
/// evaluated per selection.
#[async_trait]
pub trait ChatAgent: Send + Sync + 'static {
    /// Stable identifier, unique within a registry by convention.
    fn name(&self) -> &str;

    /// Config key naming this agent's active model (for user-facing
    /// messages about which setting to change).
    fn model_key(&self) -> &str;

    /// Whether this agent's credentials and required settings are present.
    ///
    /// Always evaluated against the *global* configuration, even when
    /// selection was triggered by a per-user override: overrides choose
    /// which provider, not whether its credentials exist.
    fn enabled(&self, config: &ParleyConfig) -> bool;

    /// The currently configured model identifier.
    fn current_model(&self, config: &ParleyConfig) -> String;

    /// The configured model list, or a parse error when the JSON-encoded
    /// list in the configuration is malformed.
    fn model_list(&self, config: &ParleyConfig) -> Result<Vec<String>, ParleyError>;

    /// Translates the canonical request to the backend wire protocol,
    /// executes it, forwards each streamed delta to `sink`, and returns
    /// the accumulated response.
    ///
    /// The returned response text always equals the concatenation of the
    /// deltas forwarded to `sink`. Cancellation mid-stream yields
    /// [`ParleyError::Cancelled`], not a decode error.
    async fn request(
        &self,
        config: &ParleyConfig,
        request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError>;
}

/// An image-generation-capable provider adapter.
#[async_trait]
pub trait ImageAgent: Send + Sync + 'static {
    /// Stable identifier, unique within a registry by convention.
    fn name(&self) -> &str;

    /// Whether this agent's credentials are present in the global config.
    fn enabled(&self, config: &ParleyConfig) -> bool;

    /// Generates one image for the prompt.
    async fn generate(
        &self,
        config: &ParleyConfig,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageOutput, ParleyError>;
}

/// Parses a JSON-encoded model list from configuration.
///
/// With no list configured, the active model is the whole list. A present
/// but malformed list is an error, never silently ignored.
pub fn model_list_from_json(
    agent: &str,
    raw: Option<&str>,
    current_model: &str,
) -> Result<Vec<String>, ParleyError> {
    match raw {
        None => Ok(vec![current_model.to_string()]),
        Some(json) => serde_json::from_str::<Vec<String>>(json).map_err(|source| {
            ParleyError::InvalidModelList {
                agent: agent.to_string(),
                source,
            }
        }),
    }
}
