// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat Completions request/response types for the OpenAI wire family.
//!
//! These types are public because the Azure adapter speaks the same wire
//! shape and reuses them.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A Chat Completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatPayload {
    /// Model identifier.
    pub model: String,

    /// Conversation messages, system first.
    pub messages: Vec<WireMessage>,

    /// Whether to stream the response.
    pub stream: bool,
}

/// A single message in the Chat Completions format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,

    /// Content -- either a plain string or an array of typed parts.
    pub content: WireContent,
}

/// Content within a message -- a simple string or multimodal parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

/// A typed content part within a multimodal message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WirePart {
    #[serde(rename = "text")]
    Text { text: String },
    /// Image reference: an HTTP(S) URL or a data URI.
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image reference wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

// --- Response types (non-streaming) ---

/// A full Chat Completions response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
}

/// One completion candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: CompletionMessage,
}

/// The assistant message of a candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// --- Response types (streaming) ---

/// One streamed Chat Completions frame.
///
/// Metadata-only frames (e.g. a trailing usage frame) carry no choices
/// or an empty delta and are skipped by the decoder.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// One candidate within a streamed frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// The incremental delta of a streamed frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

// --- Image generation types ---

/// An image-generation request body.
#[derive(Debug, Clone, Serialize)]
pub struct ImagePayload {
    pub model: String,
    pub prompt: String,
    pub n: u32,
}

/// An image-generation response.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    pub data: Vec<ImageDatum>,
}

/// One generated image, referenced by URL or inline base64.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageDatum {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_string_content_plainly() {
        let payload = ChatPayload {
            model: "gpt-4o".into(),
            messages: vec![WireMessage {
                role: "user".into(),
                content: WireContent::Text("hi".into()),
            }],
            stream: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn payload_serializes_parts_as_typed_array() {
        let payload = ChatPayload {
            model: "gpt-4o".into(),
            messages: vec![WireMessage {
                role: "user".into(),
                content: WireContent::Parts(vec![
                    WirePart::Text {
                        text: "what is this?".into(),
                    },
                    WirePart::ImageUrl {
                        image_url: ImageUrl {
                            url: "https://example.com/cat.png".into(),
                        },
                    },
                ]),
            }],
            stream: false,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "https://example.com/cat.png"
        );
    }

    #[test]
    fn chunk_without_content_deserializes() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());

        let usage_frame: ChatChunk =
            serde_json::from_str(r#"{"usage":{"total_tokens":9}}"#).unwrap();
        assert!(usage_frame.choices.is_empty());
    }
}
