// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Messages API streaming responses.
//!
//! Converts a reqwest response byte stream into typed [`StreamEvent`]
//! variants using the `eventsource-stream` crate for SSE protocol
//! compliance.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use parley_core::ParleyError;

use crate::types::{SseContentBlockDelta, SseError};

/// The SSE events the decode loop acts on.
///
/// Metadata events (`message_start`, `content_block_start`,
/// `content_block_stop`, `message_delta`) carry no extractable delta and
/// are skipped at the parse layer, as are unknown future event types.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Incremental update to a content block.
    ContentBlockDelta(SseContentBlockDelta),
    /// The message is complete.
    MessageStop,
    /// Keep-alive ping.
    Ping,
    /// API error reported mid-stream.
    Error(SseError),
}

/// Parses a reqwest streaming response into a stream of typed
/// [`StreamEvent`]s.
///
/// An event whose payload fails to parse is an error item; the caller
/// treats it as terminal for the whole request.
pub fn parse_sse_stream(
    agent: &'static str,
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, ParleyError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(move |result| async move {
        match result {
            Ok(event) => {
                let parsed = match event.event.as_str() {
                    "content_block_delta" => {
                        serde_json::from_str::<SseContentBlockDelta>(&event.data)
                            .map(StreamEvent::ContentBlockDelta)
                            .map_err(|e| {
                                ParleyError::decode(
                                    agent,
                                    format!("malformed content_block_delta: {e}"),
                                )
                            })
                    }
                    "message_stop" => Ok(StreamEvent::MessageStop),
                    "ping" => Ok(StreamEvent::Ping),
                    "error" => serde_json::from_str::<SseError>(&event.data)
                        .map(StreamEvent::Error)
                        .map_err(|e| {
                            ParleyError::decode(agent, format!("malformed error event: {e}"))
                        }),
                    // Metadata and unknown event types carry no delta.
                    _ => return None,
                };
                Some(parsed)
            }
            Err(e) => Some(Err(match e {
                eventsource_stream::EventStreamError::Transport(e) => {
                    ParleyError::network(agent, e)
                }
                other => ParleyError::decode(agent, format!("SSE stream error: {other}")),
            })),
        }
    });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serve raw SSE text through wiremock to get a real reqwest::Response.
    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(&server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn parse_content_block_delta() {
        let sse = "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n";
        let mut stream = parse_sse_stream("anthropic", mock_sse_response(sse).await);

        let event = stream.next().await.unwrap().unwrap();
        match event {
            StreamEvent::ContentBlockDelta(delta) => {
                assert_eq!(delta.delta.delta_type, "text_delta");
                assert_eq!(delta.delta.text.as_deref(), Some("Hello"));
            }
            other => panic!("expected ContentBlockDelta, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn metadata_events_are_skipped() {
        let sse = concat!(
            "event: message_start\ndata: {\"message\":{\"id\":\"msg_1\"}}\n\n",
            "event: content_block_start\ndata: {\"index\":0}\n\n",
            "event: message_delta\ndata: {\"delta\":{\"stop_reason\":\"end_turn\"}}\n\n",
            "event: message_stop\ndata: {}\n\n",
        );
        let mut stream = parse_sse_stream("anthropic", mock_sse_response(sse).await);

        let event = stream.next().await.unwrap().unwrap();
        assert!(matches!(event, StreamEvent::MessageStop));
    }

    #[tokio::test]
    async fn parse_ping_and_unknown_events() {
        let sse = concat!(
            "event: ping\ndata: {}\n\n",
            "event: future_event\ndata: {\"foo\":\"bar\"}\n\n",
            "event: message_stop\ndata: {}\n\n",
        );
        let mut stream = parse_sse_stream("anthropic", mock_sse_response(sse).await);

        assert!(matches!(
            stream.next().await.unwrap().unwrap(),
            StreamEvent::Ping
        ));
        assert!(matches!(
            stream.next().await.unwrap().unwrap(),
            StreamEvent::MessageStop
        ));
    }

    #[tokio::test]
    async fn parse_error_event() {
        let sse = "event: error\ndata: {\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n";
        let mut stream = parse_sse_stream("anthropic", mock_sse_response(sse).await);

        let event = stream.next().await.unwrap().unwrap();
        match event {
            StreamEvent::Error(err) => {
                assert_eq!(err.error.error_type, "overloaded_error");
                assert_eq!(err.error.message, "Overloaded");
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_delta_payload_is_an_error_item() {
        let sse = "event: content_block_delta\ndata: {\"index\":0,\"delta\":\n\n";
        let mut stream = parse_sse_stream("anthropic", mock_sse_response(sse).await);

        let item = stream.next().await.unwrap();
        assert!(matches!(item, Err(ParleyError::Decode { .. })));
    }
}
