// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The canonical conversation model shared by every backend adapter.
//!
//! Adapters translate these types to and from their wire protocols; the
//! rest of the application never sees a backend-specific shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Conversation role understood by every adapter.
///
/// Adapters may remap roles on the wire (e.g. `assistant` -> `model`, or
/// relocating `system` into a side channel), but the canonical model only
/// ever uses these three.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Which capability a caller is selecting an agent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AgentKind {
    Chat,
    Image,
}

/// One element of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    /// `data` is either an HTTP(S) URL or base64-encoded bytes (optionally
    /// carrying a data-URI prefix). Which form arrives is a caller-level
    /// concern; adapters must accept both.
    Image { data: String },
}

/// Message content: plain text, or an ordered sequence of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// True when the content carries neither text nor parts.
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(t) => t.is_empty(),
            MessageContent::Parts(p) => p.is_empty(),
        }
    }

    /// Flattens all text content, ignoring image parts.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// A single message in the canonical conversation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Flattened text of the message content.
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// A canonical request routed to a chat agent.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// System prompt for the turn. Placed per the backend's convention
    /// (leading system message, top-level field, or instruction channel).
    pub system_prompt: String,

    /// Ordered conversation history, oldest first.
    pub messages: Vec<ChatMessage>,

    /// Opaque passthrough merged verbatim into the outgoing payload.
    /// Passthrough keys never shadow protocol-required keys.
    pub extra_params: BTreeMap<String, serde_json::Value>,
}

impl ChatRequest {
    /// The full system text for the turn: the request-level system prompt
    /// followed by any `system`-role messages, concatenated in encounter
    /// order with a newline separator. Adapters place the result in their
    /// backend's single system channel, never duplicating it.
    pub fn system_text(&self) -> String {
        let mut chunks = Vec::new();
        if !self.system_prompt.is_empty() {
            chunks.push(self.system_prompt.clone());
        }
        for message in &self.messages {
            if message.role == Role::System {
                let text = message.text();
                if !text.is_empty() {
                    chunks.push(text);
                }
            }
        }
        chunks.join("\n")
    }

    /// The conversation turns without `system`-role messages, in order.
    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

/// The accumulated result of a chat request.
///
/// Normally exactly one assistant message whose text equals the full
/// concatenation of every delta the adapter forwarded to its sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub messages: Vec<ChatMessage>,
}

impl ChatResponse {
    /// Wraps accumulated assistant text in a single-message response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(text)],
        }
    }

    /// Flattened text of the first assistant message, if any.
    pub fn text(&self) -> String {
        self.messages
            .iter()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.text())
            .unwrap_or_default()
    }
}

/// Identifier of a message on the chat surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The result of an image-generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutput {
    Url(String),
    Base64(String),
}

/// Decides the wire encoding for an image part: URL reference when the
/// data is an HTTP(S) URL, inline/base64 otherwise.
pub fn looks_like_url(data: &str) -> bool {
    data.starts_with("http://") || data.starts_with("https://")
}
