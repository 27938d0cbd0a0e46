// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API chat adapter for Parley.
//!
//! The Messages API differs from the Chat Completions family in every
//! dimension this workspace abstracts: the system prompt is a dedicated
//! top-level `system` field (never a message), streaming frames are SSE
//! events with deltas at `delta.text` under `content_block_delta`, and
//! image parts are `source`-tagged blocks.

pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parley_config::ParleyConfig;
use parley_core::types::looks_like_url;
use parley_core::{
    merge_extra_params, model_list_from_json, ChatAgent, ChatRequest, ChatResponse, ContentPart,
    DeltaSink, MessageContent, ParleyError,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::sse::StreamEvent;
use crate::types::{
    ApiContent, ApiContentBlock, ApiMessage, ImageSource, MessageResponse, MessagesPayload,
};

const AGENT_NAME: &str = "anthropic";

/// Anthropic Messages API chat agent.
pub struct AnthropicAgent {
    client: reqwest::Client,
}

impl Default for AnthropicAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl AnthropicAgent {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

/// Builds the Messages API body: system text in the top-level field,
/// `system`-role messages removed from the array so the prompt is never
/// duplicated into both channels.
fn build_payload(
    config: &ParleyConfig,
    request: &ChatRequest,
    stream: bool,
) -> Result<serde_json::Value, ParleyError> {
    let cfg = &config.providers.anthropic;
    let system = request.system_text();
    let payload = MessagesPayload {
        model: cfg.model.clone(),
        messages: request
            .history()
            .map(|m| ApiMessage {
                role: m.role.to_string(),
                content: api_content(&m.content),
            })
            .collect(),
        system: (!system.is_empty()).then_some(system),
        max_tokens: cfg.max_tokens,
        stream,
    };
    let mut value = serde_json::to_value(payload)
        .map_err(|e| ParleyError::Internal(format!("payload serialization: {e}")))?;
    merge_extra_params(&mut value, &cfg.extra_params);
    Ok(value)
}

fn api_content(content: &MessageContent) -> ApiContent {
    match content {
        MessageContent::Text(text) => ApiContent::Text(text.clone()),
        MessageContent::Parts(parts) => ApiContent::Blocks(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => ApiContentBlock::Text { text: text.clone() },
                    ContentPart::Image { data } => ApiContentBlock::Image {
                        source: image_source(data),
                    },
                })
                .collect(),
        ),
    }
}

/// Chooses the image source encoding: URL reference for HTTP(S) URLs,
/// inline base64 otherwise. A data-URI prefix supplies the media type;
/// bare base64 defaults to JPEG.
fn image_source(data: &str) -> ImageSource {
    if looks_like_url(data) {
        return ImageSource::Url {
            url: data.to_string(),
        };
    }
    if let Some(rest) = data.strip_prefix("data:")
        && let Some((media_type, payload)) = rest.split_once(";base64,")
    {
        return ImageSource::Base64 {
            media_type: media_type.to_string(),
            data: payload.to_string(),
        };
    }
    ImageSource::Base64 {
        media_type: "image/jpeg".to_string(),
        data: data.to_string(),
    }
}

#[async_trait]
impl ChatAgent for AnthropicAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn model_key(&self) -> &str {
        "providers.anthropic.model"
    }

    fn enabled(&self, config: &ParleyConfig) -> bool {
        config
            .providers
            .anthropic
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }

    fn current_model(&self, config: &ParleyConfig) -> String {
        config.providers.anthropic.model.clone()
    }

    fn model_list(&self, config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        model_list_from_json(
            AGENT_NAME,
            config.providers.anthropic.models.as_deref(),
            &config.providers.anthropic.model,
        )
    }

    async fn request(
        &self,
        config: &ParleyConfig,
        request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        let cfg = &config.providers.anthropic;
        let api_key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParleyError::Config("providers.anthropic.api_key is not set".into()))?;

        let stream = config.chat.stream;
        let payload = build_payload(config, request, stream)?;
        let url = format!("{}/v1/messages", cfg.base_url.trim_end_matches('/'));

        debug!(model = cfg.model, stream, "sending messages request");
        let send = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &cfg.api_version)
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
            decode_event_stream(response, cancel, sink).await
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| ParleyError::network(AGENT_NAME, e))?;
            let text = decode_message(&body)?;
            sink.on_delta(&text).await?;
            Ok(ChatResponse::from_text(text))
        }
    }
}

/// Decodes the SSE event stream, forwarding each text delta to the sink
/// before reading the next event.
async fn decode_event_stream(
    response: reqwest::Response,
    cancel: &CancellationToken,
    sink: &mut dyn DeltaSink,
) -> Result<ChatResponse, ParleyError> {
    let mut events = sse::parse_sse_stream(AGENT_NAME, response);
    let mut accumulated = String::new();
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(ParleyError::Cancelled),
            next = events.next() => next,
        };
        let Some(event) = next else { break };
        match event? {
            StreamEvent::ContentBlockDelta(delta) => {
                if let Some(text) = delta.delta.text {
                    accumulated.push_str(&text);
                    sink.on_delta(&text).await?;
                }
            }
            StreamEvent::MessageStop => break,
            StreamEvent::Ping => {}
            StreamEvent::Error(err) => {
                return Err(ParleyError::decode(
                    AGENT_NAME,
                    format!(
                        "stream error event {}: {}",
                        err.error.error_type, err.error.message
                    ),
                ));
            }
        }
    }
    debug!(chars = accumulated.len(), "stream complete");
    Ok(ChatResponse::from_text(accumulated))
}

/// Decodes a non-streaming body: text blocks concatenated; an empty
/// content array means the backend produced no candidates.
fn decode_message(body: &str) -> Result<String, ParleyError> {
    let response: MessageResponse = serde_json::from_str(body)
        .map_err(|e| ParleyError::decode(AGENT_NAME, format!("malformed message body: {e}")))?;
    if response.content.is_empty() {
        return Err(ParleyError::EmptyCompletion {
            agent: AGENT_NAME.to_string(),
        });
    }
    Ok(response
        .content
        .iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join(""))
}
