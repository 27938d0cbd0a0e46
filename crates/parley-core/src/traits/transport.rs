// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat-transport client abstraction the delivery pipeline writes to.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::MessageId;

/// Exactly the operations the delivery pipeline needs from the chat
/// surface, injected once per turn. Concrete clients (Telegram, Slack,
/// test fakes) live outside this workspace's scope.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Creates a new message and returns its identifier.
    async fn send(&self, text: &str) -> Result<MessageId, ParleyError>;

    /// Replaces the text of a previously sent message in place.
    async fn edit(&self, id: &MessageId, text: &str) -> Result<(), ParleyError>;

    /// Signals that a response is being composed. Best-effort.
    async fn typing(&self) -> Result<(), ParleyError>;
}
