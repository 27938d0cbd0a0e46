// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini generateContent chat adapter for Parley.
//!
//! Differences this adapter absorbs: roles are `user`/`model` (the
//! canonical `assistant` is remapped), the system prompt travels in the
//! `systemInstruction` channel, authentication is a `key` URL query
//! parameter, and streamed SSE frames may carry several text parts at
//! `candidates[0].content.parts[].text` which are concatenated per frame.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use parley_config::ParleyConfig;
use parley_core::types::looks_like_url;
use parley_core::{
    merge_extra_params, model_list_from_json, ChatAgent, ChatRequest, ChatResponse, ContentPart,
    DeltaSink, MessageContent, ParleyError, Role,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{Content, FileData, GeneratePayload, GenerateResponse, InlineData, Part};

const AGENT_NAME: &str = "gemini";

/// Gemini chat agent.
pub struct GeminiAgent {
    client: reqwest::Client,
}

impl Default for GeminiAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiAgent {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

/// Builds the generateContent body: `assistant` remapped to `model`,
/// system text folded into `systemInstruction`, never into `contents`.
fn build_payload(
    config: &ParleyConfig,
    request: &ChatRequest,
) -> Result<serde_json::Value, ParleyError> {
    let system = request.system_text();
    let payload = GeneratePayload {
        contents: request
            .history()
            .map(|m| Content {
                role: Some(wire_role(m.role).to_string()),
                parts: wire_parts(&m.content),
            })
            .collect(),
        system_instruction: (!system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(system)],
        }),
    };
    let mut value = serde_json::to_value(payload)
        .map_err(|e| ParleyError::Internal(format!("payload serialization: {e}")))?;
    merge_extra_params(&mut value, &config.providers.gemini.extra_params);
    Ok(value)
}

/// Gemini has no `assistant` role; model turns are role `model`.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

fn wire_parts(content: &MessageContent) -> Vec<Part> {
    match content {
        MessageContent::Text(text) => vec![Part::text(text.clone())],
        MessageContent::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => Part::text(text.clone()),
                ContentPart::Image { data } => image_part(data),
            })
            .collect(),
    }
}

/// URL-referenced images become `fileData`, everything else inline
/// base64. A data-URI prefix supplies the MIME type.
fn image_part(data: &str) -> Part {
    if looks_like_url(data) {
        return Part {
            file_data: Some(FileData {
                file_uri: data.to_string(),
            }),
            ..Part::default()
        };
    }
    let (mime_type, payload) = match data
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
    {
        Some((mime, payload)) => (mime.to_string(), payload.to_string()),
        None => ("image/jpeg".to_string(), data.to_string()),
    };
    Part {
        inline_data: Some(InlineData {
            mime_type,
            data: payload,
        }),
        ..Part::default()
    }
}

#[async_trait]
impl ChatAgent for GeminiAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn model_key(&self) -> &str {
        "providers.gemini.model"
    }

    fn enabled(&self, config: &ParleyConfig) -> bool {
        config
            .providers
            .gemini
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }

    fn current_model(&self, config: &ParleyConfig) -> String {
        config.providers.gemini.model.clone()
    }

    fn model_list(&self, config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        model_list_from_json(
            AGENT_NAME,
            config.providers.gemini.models.as_deref(),
            &config.providers.gemini.model,
        )
    }

    async fn request(
        &self,
        config: &ParleyConfig,
        request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        let cfg = &config.providers.gemini;
        let api_key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParleyError::Config("providers.gemini.api_key is not set".into()))?;

        let stream = config.chat.stream;
        let payload = build_payload(config, request)?;
        let base = cfg.base_url.trim_end_matches('/');
        // The key rides in the query string; the URL must stay out of logs.
        let url = if stream {
            format!("{base}/models/{}:streamGenerateContent?alt=sse", cfg.model)
        } else {
            format!("{base}/models/{}:generateContent", cfg.model)
        };

        debug!(model = cfg.model, stream, "sending generateContent request");
        let send = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .json(&payload)
            .send();
        // reqwest errors carry the URL, which here includes the key.
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ParleyError::Cancelled),
            response = send => {
                response.map_err(|e| ParleyError::network(AGENT_NAME, e.without_url()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParleyError::api(AGENT_NAME, status.as_u16(), &body));
        }

        if stream {
            decode_frame_stream(response, cancel, sink).await
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| ParleyError::network(AGENT_NAME, e.without_url()))?;
            let text = decode_generate_response(&body)?;
            sink.on_delta(&text).await?;
            Ok(ChatResponse::from_text(text))
        }
    }
}

/// Decodes the SSE frame stream. Each frame is a partial
/// `GenerateResponse`; its parts are concatenated into one delta and
/// forwarded before the next frame is read. Metadata-only frames are
/// skipped.
async fn decode_frame_stream(
    response: reqwest::Response,
    cancel: &CancellationToken,
    sink: &mut dyn DeltaSink,
) -> Result<ChatResponse, ParleyError> {
    let mut frames = response.bytes_stream().eventsource();
    let mut accumulated = String::new();
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(ParleyError::Cancelled),
            next = frames.next() => next,
        };
        let Some(frame) = next else { break };
        let frame = frame.map_err(|e| match e {
            // Transport errors carry the URL, which here includes the key.
            eventsource_stream::EventStreamError::Transport(e) => {
                ParleyError::network(AGENT_NAME, e.without_url())
            }
            other => ParleyError::decode(AGENT_NAME, format!("SSE stream error: {other}")),
        })?;
        let parsed: GenerateResponse = serde_json::from_str(&frame.data)
            .map_err(|e| ParleyError::decode(AGENT_NAME, format!("malformed stream frame: {e}")))?;
        if let Some(delta) = parsed.text() {
            accumulated.push_str(&delta);
            sink.on_delta(&delta).await?;
        }
    }
    debug!(chars = accumulated.len(), "stream complete");
    Ok(ChatResponse::from_text(accumulated))
}

/// Decodes a non-streaming body: first candidate's parts concatenated;
/// zero candidates is an empty completion.
fn decode_generate_response(body: &str) -> Result<String, ParleyError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ParleyError::decode(AGENT_NAME, format!("malformed response body: {e}")))?;
    if response.candidates.is_empty() {
        return Err(ParleyError::EmptyCompletion {
            agent: AGENT_NAME.to_string(),
        });
    }
    Ok(response.text().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ChatMessage;
    use parley_test_utils::RecordingSink;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_url: &str) -> ParleyConfig {
        let mut config = ParleyConfig::default();
        config.providers.gemini.api_key = Some("g-test".to_string());
        config.providers.gemini.base_url = server_url.to_string();
        config.providers.gemini.model = "gemini-2.0-flash".to_string();
        config
    }

    fn simple_request() -> ChatRequest {
        ChatRequest {
            system_prompt: "be terse".to_string(),
            messages: vec![ChatMessage::user("hi")],
            extra_params: Default::default(),
        }
    }

    #[test]
    fn assistant_role_is_remapped_to_model() {
        let request = ChatRequest {
            system_prompt: String::new(),
            messages: vec![ChatMessage::user("q"), ChatMessage::assistant("a")],
            extra_params: Default::default(),
        };
        let payload = build_payload(&ParleyConfig::default(), &request).unwrap();
        assert_eq!(payload["contents"][0]["role"], "user");
        assert_eq!(payload["contents"][1]["role"], "model");
    }

    #[test]
    fn system_folds_into_system_instruction_only() {
        let mut request = simple_request();
        request
            .messages
            .insert(0, ChatMessage::system("answer in French"));
        let payload = build_payload(&ParleyConfig::default(), &request).unwrap();
        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"],
            "be terse\nanswer in French"
        );
        assert_eq!(payload["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn image_parts_choose_file_or_inline_encoding() {
        let url_part = image_part("https://example.com/cat.png");
        assert_eq!(
            url_part.file_data.unwrap().file_uri,
            "https://example.com/cat.png"
        );

        let inline = image_part("data:image/png;base64,iVBOR").inline_data.unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBOR");

        let bare = image_part("iVBORw0KGgo=").inline_data.unwrap();
        assert_eq!(bare.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn streaming_concatenates_parts_within_a_frame() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hel\"},{\"text\":\"lo\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"!\"}]}}]}\n\n",
            "data: {\"usageMetadata\":{\"totalTokenCount\":7}}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(query_param("key", "g-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let agent = GeminiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let response = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap();
        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.text(), sink.concatenated());
        // Parts are joined per frame: two frames, two deltas.
        assert_eq!(sink.deltas(), ["Hello", "!"]);
    }

    #[tokio::test]
    async fn malformed_frame_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("data: {\"candidates\":[{\n\n"),
            )
            .mount(&server)
            .await;

        let agent = GeminiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let err = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::Decode { .. }));
    }

    #[tokio::test]
    async fn non_streaming_reads_first_candidate() {
        let server = MockServer::start().await;
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hel"}, {"text": "lo!"}]}
            }]
        });
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "g-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let agent = GeminiAgent::new();
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
    async fn zero_candidates_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let agent = GeminiAgent::new();
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
    async fn non_2xx_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let agent = GeminiAgent::new();
        let config = config_for(&server.uri());
        let cancel = CancellationToken::new();
        let mut sink = RecordingSink::new();

        let err = agent
            .request(&config, &simple_request(), &cancel, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ParleyError::Api { status: 400, ref agent, .. } if agent == "gemini"
        ));
    }
}
