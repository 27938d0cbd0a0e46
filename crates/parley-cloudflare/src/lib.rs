// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloudflare Workers AI chat adapter for Parley.
//!
//! Workers AI runs behind an account-scoped `ai/run` endpoint with bearer
//! auth. The request side is a plain message array (system prompt as a
//! leading `system` message, text content only); responses arrive inside
//! a `result` envelope, streamed as line-framed JSON with deltas at
//! `result.response`. Line framing is shared with the Chat Completions
//! family, so the decoder comes from `parley-openai`.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parley_config::ParleyConfig;
use parley_core::{
    merge_extra_params, model_list_from_json, ChatAgent, ChatRequest, ChatResponse, DeltaSink,
    ParleyError,
};
use parley_openai::lines::{json_lines, DONE_SENTINEL};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{CfEnvelope, CfMessage, CfPayload};

const AGENT_NAME: &str = "cloudflare";

/// Cloudflare Workers AI chat agent.
pub struct CloudflareAgent {
    client: reqwest::Client,
}

impl Default for CloudflareAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudflareAgent {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

/// Builds the run payload: system text first, multimodal content
/// flattened to text (Workers AI chat models take plain strings).
fn build_payload(
    config: &ParleyConfig,
    request: &ChatRequest,
    stream: bool,
) -> Result<serde_json::Value, ParleyError> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    let system = request.system_text();
    if !system.is_empty() {
        messages.push(CfMessage {
            role: "system".to_string(),
            content: system,
        });
    }
    for message in request.history() {
        messages.push(CfMessage {
            role: message.role.to_string(),
            content: message.text(),
        });
    }
    let payload = CfPayload { messages, stream };
    let mut value = serde_json::to_value(payload)
        .map_err(|e| ParleyError::Internal(format!("payload serialization: {e}")))?;
    merge_extra_params(&mut value, &config.providers.cloudflare.extra_params);
    Ok(value)
}

#[async_trait]
impl ChatAgent for CloudflareAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn model_key(&self) -> &str {
        "providers.cloudflare.model"
    }

    fn enabled(&self, config: &ParleyConfig) -> bool {
        let cfg = &config.providers.cloudflare;
        cfg.api_token.as_deref().is_some_and(|t| !t.is_empty())
            && cfg.account_id.as_deref().is_some_and(|a| !a.is_empty())
    }

    fn current_model(&self, config: &ParleyConfig) -> String {
        config.providers.cloudflare.model.clone()
    }

    fn model_list(&self, config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        model_list_from_json(
            AGENT_NAME,
            config.providers.cloudflare.models.as_deref(),
            &config.providers.cloudflare.model,
        )
    }

    async fn request(
        &self,
        config: &ParleyConfig,
        request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        let cfg = &config.providers.cloudflare;
        let api_token = cfg
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ParleyError::Config("providers.cloudflare.api_token is not set".into())
            })?;
        let account_id = cfg
            .account_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                ParleyError::Config("providers.cloudflare.account_id is not set".into())
            })?;

        let stream = config.chat.stream;
        let payload = build_payload(config, request, stream)?;
        let url = format!(
            "{}/accounts/{}/ai/run/{}",
            cfg.base_url.trim_end_matches('/'),
            account_id,
            cfg.model
        );

        debug!(model = cfg.model, stream, "sending ai/run request");
        let send = self
            .client
            .post(&url)
            .bearer_auth(api_token)
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
            decode_line_stream(response, cancel, sink).await
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| ParleyError::network(AGENT_NAME, e))?;
            let text = decode_run_response(&body)?;
            sink.on_delta(&text).await?;
            Ok(ChatResponse::from_text(text))
        }
    }
}

/// Decodes the line-framed stream: each frame is a `result` envelope
/// whose `result.response` is the delta; frames without one are skipped.
async fn decode_line_stream(
    response: reqwest::Response,
    cancel: &CancellationToken,
    sink: &mut dyn DeltaSink,
) -> Result<ChatResponse, ParleyError> {
    let mut frames = json_lines(response);
    let mut accumulated = String::new();
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(ParleyError::Cancelled),
            next = frames.next() => next,
        };
        let Some(frame) = next else { break };
        let frame = frame.map_err(|e| ParleyError::network(AGENT_NAME, e))?;
        if frame == DONE_SENTINEL {
            break;
        }
        let envelope: CfEnvelope = serde_json::from_str(&frame)
            .map_err(|e| ParleyError::decode(AGENT_NAME, format!("malformed stream frame: {e}")))?;
        let Some(delta) = envelope.result.and_then(|r| r.response) else {
            continue;
        };
        accumulated.push_str(&delta);
        sink.on_delta(&delta).await?;
    }
    debug!(chars = accumulated.len(), "stream complete");
    Ok(ChatResponse::from_text(accumulated))
}

/// Decodes a non-streaming envelope. A `success: false` body is an
/// upstream-reported failure even under a 200 status.
fn decode_run_response(body: &str) -> Result<String, ParleyError> {
    let envelope: CfEnvelope = serde_json::from_str(body)
        .map_err(|e| ParleyError::decode(AGENT_NAME, format!("malformed response body: {e}")))?;
    if envelope.success == Some(false) {
        let messages: Vec<String> = envelope.errors.iter().map(|e| e.message.clone()).collect();
        return Err(ParleyError::decode(
            AGENT_NAME,
            format!("run failed: {}", messages.join("; ")),
        ));
    }
    envelope
        .result
        .and_then(|r| r.response)
        .ok_or_else(|| ParleyError::EmptyCompletion {
            agent: AGENT_NAME.to_string(),
        })
}
