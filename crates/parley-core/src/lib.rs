// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Parley.
//!
//! Defines the canonical conversation model, the capability contract
//! every provider adapter implements, the delta-sink and chat-transport
//! abstractions, and the workspace error type. Adapter crates and the
//! delivery pipeline build on this crate; nothing here touches a wire
//! protocol.

pub mod error;
pub mod payload;
pub mod traits;
pub mod types;

pub use error::ParleyError;
pub use payload::{merge_extra_params, RESERVED_KEYS};
pub use types::{
    AgentKind, ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageOutput, MessageContent,
    MessageId, Role,
};

pub use traits::{model_list_from_json, ChatAgent, ChatTransport, DeltaSink, ImageAgent, NullSink};
