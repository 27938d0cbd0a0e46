// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-style chat adapter for Parley.
//!
//! Speaks the Chat Completions wire format: line-framed JSON streaming
//! with deltas at `choices[0].delta.content`, the system prompt as a
//! leading `system` message, and multimodal content as `image_url` parts.
//! Compatible re-hosts are reachable via `providers.openai.base_url`; the
//! Azure adapter reuses this crate's wire types and decoders.

pub mod image;
pub mod lines;
pub mod types;

pub use image::OpenAiImageAgent;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parley_config::model::ExtraParams;
use parley_config::ParleyConfig;
use parley_core::types::looks_like_url;
use parley_core::{
    merge_extra_params, model_list_from_json, ChatAgent, ChatRequest, ChatResponse, ContentPart,
    DeltaSink, MessageContent, ParleyError,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::lines::{json_lines, DONE_SENTINEL};
use crate::types::{
    ChatChunk, ChatCompletion, ChatPayload, ImageUrl, WireContent, WireMessage, WirePart,
};

const AGENT_NAME: &str = "openai";

/// OpenAI-style chat agent.
pub struct OpenAiAgent {
    client: reqwest::Client,
}

impl Default for OpenAiAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiAgent {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

/// Maps canonical messages into the Chat Completions array, with the
/// accumulated system text as a single leading `system` message.
pub fn wire_messages(request: &ChatRequest) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    let system = request.system_text();
    if !system.is_empty() {
        messages.push(WireMessage {
            role: "system".to_string(),
            content: WireContent::Text(system),
        });
    }
    for message in request.history() {
        messages.push(WireMessage {
            role: message.role.to_string(),
            content: wire_content(&message.content),
        });
    }
    messages
}

fn wire_content(content: &MessageContent) -> WireContent {
    match content {
        MessageContent::Text(text) => WireContent::Text(text.clone()),
        MessageContent::Parts(parts) => WireContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => WirePart::Text { text: text.clone() },
                    ContentPart::Image { data } => WirePart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_reference(data),
                        },
                    },
                })
                .collect(),
        ),
    }
}

/// Chooses the `image_url` encoding for an image part: URLs and data URIs
/// pass through, bare base64 is wrapped in a data URI.
pub fn image_reference(data: &str) -> String {
    if looks_like_url(data) || data.starts_with("data:") {
        data.to_string()
    } else {
        format!("data:image/jpeg;base64,{data}")
    }
}

/// Builds the request body, merging passthrough parameters last so caller
/// overrides win over generated optional fields but never over protocol
/// keys.
pub fn build_payload(
    model: &str,
    request: &ChatRequest,
    stream: bool,
    extras: &ExtraParams,
) -> Result<serde_json::Value, ParleyError> {
    let payload = ChatPayload {
        model: model.to_string(),
        messages: wire_messages(request),
        stream,
    };
    let mut value = serde_json::to_value(payload)
        .map_err(|e| ParleyError::Internal(format!("payload serialization: {e}")))?;
    merge_extra_params(&mut value, extras);
    Ok(value)
}

/// Decodes a line-framed completion stream, forwarding each delta to the
/// sink before reading the next frame.
///
/// Frames that parse but carry no delta (role preludes, usage trailers)
/// are skipped; a frame that fails to parse aborts the whole request.
pub async fn decode_chat_stream(
    agent: &str,
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
        let frame = frame.map_err(|e| ParleyError::network(agent, e))?;
        if frame == DONE_SENTINEL {
            break;
        }
        let chunk: ChatChunk = serde_json::from_str(&frame)
            .map_err(|e| ParleyError::decode(agent, format!("malformed stream frame: {e}")))?;
        let Some(delta) = chunk.choices.first().and_then(|c| c.delta.content.clone()) else {
            continue;
        };
        accumulated.push_str(&delta);
        sink.on_delta(&delta).await?;
    }
    debug!(agent, chars = accumulated.len(), "stream complete");
    Ok(ChatResponse::from_text(accumulated))
}

/// Decodes a non-streaming completion body into the first candidate's
/// text.
pub fn decode_completion(agent: &str, body: &str) -> Result<String, ParleyError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| ParleyError::decode(agent, format!("malformed completion body: {e}")))?;
    let choice = completion
        .choices
        .first()
        .ok_or_else(|| ParleyError::EmptyCompletion {
            agent: agent.to_string(),
        })?;
    Ok(choice.message.content.clone().unwrap_or_default())
}

#[async_trait]
impl ChatAgent for OpenAiAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn model_key(&self) -> &str {
        "providers.openai.model"
    }

    fn enabled(&self, config: &ParleyConfig) -> bool {
        config
            .providers
            .openai
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }

    fn current_model(&self, config: &ParleyConfig) -> String {
        config.providers.openai.model.clone()
    }

    fn model_list(&self, config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        model_list_from_json(
            AGENT_NAME,
            config.providers.openai.models.as_deref(),
            &config.providers.openai.model,
        )
    }

    async fn request(
        &self,
        config: &ParleyConfig,
        request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        let cfg = &config.providers.openai;
        let api_key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParleyError::Config("providers.openai.api_key is not set".into()))?;
        let stream = config.chat.stream;
        let payload = build_payload(&cfg.model, request, stream, &cfg.extra_params)?;
        let url = format!("{}/chat/completions", cfg.base_url.trim_end_matches('/'));

        debug!(model = cfg.model, stream, "sending chat completion request");
        let send = self
            .client
            .post(&url)
            .bearer_auth(api_key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use parley_test_utils::RecordingSink;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_url: &str) -> ParleyConfig {
        let mut config = ParleyConfig::default();
        config.providers.openai.api_key = Some("sk-test".to_string());
        config.providers.openai.base_url = server_url.to_string();
        config
    }

    fn simple_request() -> ChatRequest {
        ChatRequest {
            system_prompt: "be terse".to_string(),
            messages: vec![parley_core::ChatMessage::user("hi")],
            extra_params: Default::default(),
        }
    }

    #[test]
    fn wire_messages_lead_with_system() {
        let messages = wire_messages(&simple_request());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(matches!(&messages[0].content, WireContent::Text(t) if t == "be terse"));
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn wire_messages_without_system_prompt() {
        let request = ChatRequest {
            system_prompt: String::new(),
            messages: vec![
                parley_core::ChatMessage::user("q"),
                parley_core::ChatMessage::assistant("a"),
            ],
            extra_params: Default::default(),
        };
        let messages = wire_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn image_parts_choose_encoding_by_shape() {
        assert_eq!(
            image_reference("https://example.com/cat.png"),
            "https://example.com/cat.png"
        );
        assert_eq!(
            image_reference("data:image/png;base64,iVBOR"),
            "data:image/png;base64,iVBOR"
        );
        assert_eq!(
            image_reference("iVBORw0KGgo="),
            "data:image/jpeg;base64,iVBORw0KGgo="
        );
    }

    #[test]
    fn payload_merges_extras_without_touching_protocol_keys() {
        let extras = ExtraParams::from([
            ("temperature".to_string(), json!(0.1)),
            ("model".to_string(), json!("shadowed")),
        ]);
        let payload = build_payload("gpt-4o", &simple_request(), true, &extras).unwrap();
        assert_eq!(payload["temperature"], json!(0.1));
        assert_eq!(payload["model"], json!("gpt-4o"));
        assert_eq!(payload["stream"], json!(true));
    }

    #[tokio::test]
    async fn streaming_request_accumulates_deltas() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo!\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let agent = OpenAiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let response = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap();

        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.text(), sink.concatenated());
        // The empty prelude delta is forwarded; metadata frames are not.
        assert_eq!(sink.deltas(), ["", "Hel", "lo!"]);
    }

    #[tokio::test]
    async fn malformed_stream_frame_is_a_decode_error() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"del\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let agent = OpenAiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let err = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::Decode { ref agent, .. } if agent == "openai"));
    }

    #[tokio::test]
    async fn non_2xx_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string("{\"error\":{\"message\":\"Rate limit reached\"}}"),
            )
            .mount(&server)
            .await;

        let agent = OpenAiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let err = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap_err();
        match err {
            ParleyError::Api {
                agent,
                status,
                body,
            } => {
                assert_eq!(agent, "openai");
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit reached"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_streaming_forwards_text_as_single_delta() {
        let server = MockServer::start().await;
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let agent = OpenAiAgent::new();
        let mut config = config_for(&server.uri());
        config.chat.stream = false;
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let response = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap();
        assert_eq!(response.text(), "Hello!");
        assert_eq!(sink.deltas(), ["Hello!"]);
    }

    #[tokio::test]
    async fn zero_choices_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let agent = OpenAiAgent::new();
        let mut config = config_for(&server.uri());
        config.chat.stream = false;
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let err = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::EmptyCompletion { .. }));
    }

    #[tokio::test]
    async fn cancelled_token_yields_cancelled_not_decode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n")
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let agent = OpenAiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut sink = RecordingSink::new();

        let err = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::Cancelled));
        assert!(sink.deltas().is_empty());
    }

    #[test]
    fn enabled_requires_non_empty_api_key() {
        let agent = OpenAiAgent::new();
        let mut config = ParleyConfig::default();
        assert!(!agent.enabled(&config));
        config.providers.openai.api_key = Some(String::new());
        assert!(!agent.enabled(&config));
        config.providers.openai.api_key = Some("sk-test".to_string());
        assert!(agent.enabled(&config));
    }

    #[test]
    fn model_list_reads_config_json() {
        let agent = OpenAiAgent::new();
        let mut config = ParleyConfig::default();
        config.providers.openai.models = Some(r#"["gpt-4o","o3"]"#.to_string());
        assert_eq!(agent.model_list(&config).unwrap(), vec!["gpt-4o", "o3"]);

        config.providers.openai.models = Some("oops".to_string());
        assert!(matches!(
            agent.model_list(&config),
            Err(ParleyError::InvalidModelList { .. })
        ));
    }
}
