// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API request/response types and SSE event payloads.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesPayload {
    /// Model identifier.
    pub model: String,

    /// Conversation messages; roles are "user" and "assistant" only, the
    /// system prompt travels in the dedicated top-level field.
    pub messages: Vec<ApiMessage>,

    /// System prompt (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate (protocol-required).
    pub max_tokens: u32,

    /// Whether to stream the response.
    pub stream: bool,
}

/// A single message in the Messages API format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,

    /// Content -- a plain string or an array of content blocks.
    pub content: ApiContent,
}

/// Content within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiContent {
    Text(String),
    Blocks(Vec<ApiContentBlock>),
}

/// A typed content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { source: ImageSource },
}

/// Source data for an image block, URL-referenced or inline base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
    Url { url: String },
}

// --- Response types (non-streaming) ---

/// A full response from the Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Content blocks; text blocks are concatenated into the result.
    pub content: Vec<ResponseBlock>,
}

/// One response content block. Kept flat so unfamiliar block types pass
/// through as non-text rather than failing the whole decode.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

// --- SSE event payloads ---

/// `content_block_delta` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SseContentBlockDelta {
    #[serde(default)]
    pub index: usize,
    pub delta: SseDelta,
}

/// The delta inside a `content_block_delta` event. Non-text delta kinds
/// carry no extractable text and are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct SseDelta {
    #[serde(rename = "type")]
    pub delta_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// `error` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SseError {
    pub error: SseErrorDetail,
}

/// The error detail of an `error` event.
#[derive(Debug, Clone, Deserialize)]
pub struct SseErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
