// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Azure OpenAI chat adapter for Parley.
//!
//! Azure hosts the Chat Completions wire format behind a different URL
//! scheme (deployment path plus `api-version` query) and `api-key` header
//! auth; everything on the wire itself -- payload shape, line framing,
//! `choices[0].delta.content` -- is the OpenAI family, so this crate
//! reuses `parley-openai`'s types and decoders.

use std::time::Duration;

use async_trait::async_trait;
use parley_config::ParleyConfig;
use parley_core::{
    model_list_from_json, ChatAgent, ChatRequest, ChatResponse, DeltaSink, ParleyError,
};
use parley_openai::{build_payload, decode_chat_stream, decode_completion};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const AGENT_NAME: &str = "azure";

/// Azure OpenAI chat agent. The configured model doubles as the
/// deployment name in the request path.
pub struct AzureAgent {
    client: reqwest::Client,
}

impl Default for AzureAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureAgent {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

/// Builds the deployment-scoped completions URL.
fn completions_url(base_url: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        base_url.trim_end_matches('/'),
        deployment,
        api_version
    )
}

#[async_trait]
impl ChatAgent for AzureAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn model_key(&self) -> &str {
        "providers.azure.model"
    }

    fn enabled(&self, config: &ParleyConfig) -> bool {
        let cfg = &config.providers.azure;
        cfg.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && cfg.base_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    fn current_model(&self, config: &ParleyConfig) -> String {
        config.providers.azure.model.clone()
    }

    fn model_list(&self, config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        model_list_from_json(
            AGENT_NAME,
            config.providers.azure.models.as_deref(),
            &config.providers.azure.model,
        )
    }

    async fn request(
        &self,
        config: &ParleyConfig,
        request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        let cfg = &config.providers.azure;
        let api_key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParleyError::Config("providers.azure.api_key is not set".into()))?;
        let base_url = cfg
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ParleyError::Config("providers.azure.base_url is not set".into()))?;

        let stream = config.chat.stream;
        let payload = build_payload(&cfg.model, request, stream, &cfg.extra_params)?;
        let url = completions_url(base_url, &cfg.model, &cfg.api_version);

        debug!(deployment = cfg.model, stream, "sending chat completion request");
        let send = self
            .client
            .post(&url)
            .header("api-key", api_key)
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .json(&payload)
            .send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ParleyError::Cancelled),
            response = send => response.map_err(|e| ParleyError::network(AGENT_NAME, e))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParleyError::api(AGENT_NAME, status.as_u16(), &body));
        }

        if stream {
            decode_chat_stream(AGENT_NAME, response, cancel, sink).await
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| ParleyError::network(AGENT_NAME, e))?;
            let text = decode_completion(AGENT_NAME, &body)?;
            sink.on_delta(&text).await?;
            Ok(ChatResponse::from_text(text))
        }
    }
}
