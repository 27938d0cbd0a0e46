// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat transport for deterministic testing.
//!
//! `RecordingTransport` implements `ChatTransport`, capturing every
//! send/edit/typing call and optionally failing upcoming calls with
//! scripted error messages (e.g. rate-limit-shaped errors).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{ChatTransport, MessageId, ParleyError};

/// One observed transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Send(String),
    Edit(String, String),
    Typing,
}

/// A mock chat transport capturing calls and replaying scripted failures.
///
/// Failures are popped from a FIFO queue: each queued message fails
/// exactly one upcoming send/edit with a `Delivery` error carrying that
/// message, then delivery resumes.
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    failures: Arc<Mutex<VecDeque<String>>>,
    next_id: AtomicU64,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Queues one failure for the next send/edit call.
    pub async fn fail_next(&self, message: &str) {
        self.failures.lock().await.push_back(message.to_string());
    }

    /// Queues `n` consecutive failures with the same message.
    pub async fn fail_next_n(&self, n: usize, message: &str) {
        let mut failures = self.failures.lock().await;
        for _ in 0..n {
            failures.push_back(message.to_string());
        }
    }

    /// All observed calls, in order.
    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    /// The text of every successful send/edit, in order.
    pub async fn delivered_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                TransportCall::Send(text) => Some(text.clone()),
                TransportCall::Edit(_, text) => Some(text.clone()),
                TransportCall::Typing => None,
            })
            .collect()
    }

    /// The most recently delivered text, if any.
    pub async fn last_text(&self) -> Option<String> {
        self.delivered_texts().await.pop()
    }

    /// Number of successful send/edit deliveries.
    pub async fn delivery_count(&self) -> usize {
        self.delivered_texts().await.len()
    }

    async fn pop_failure(&self) -> Option<String> {
        self.failures.lock().await.pop_front()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, text: &str) -> Result<MessageId, ParleyError> {
        if let Some(message) = self.pop_failure().await {
            return Err(ParleyError::delivery(message));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .await
            .push(TransportCall::Send(text.to_string()));
        Ok(MessageId(format!("msg-{id}")))
    }

    async fn edit(&self, id: &MessageId, text: &str) -> Result<(), ParleyError> {
        if let Some(message) = self.pop_failure().await {
            return Err(ParleyError::delivery(message));
        }
        self.calls
            .lock()
            .await
            .push(TransportCall::Edit(id.0.clone(), text.to_string()));
        Ok(())
    }

    async fn typing(&self) -> Result<(), ParleyError> {
        self.calls.lock().await.push(TransportCall::Typing);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_then_edit_are_recorded_in_order() {
        let transport = RecordingTransport::new();
        let id = transport.send("first").await.unwrap();
        transport.edit(&id, "first second").await.unwrap();

        let calls = transport.calls().await;
        assert_eq!(
            calls,
            vec![
                TransportCall::Send("first".to_string()),
                TransportCall::Edit(id.0.clone(), "first second".to_string()),
            ]
        );
        assert_eq!(transport.last_text().await.as_deref(), Some("first second"));
    }

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let transport = RecordingTransport::new();
        transport.fail_next("429 Too Many Requests").await;

        let err = transport.send("text").await.unwrap_err();
        assert!(err.to_string().contains("429"));

        // The failure is consumed; the next call succeeds.
        transport.send("text").await.unwrap();
        assert_eq!(transport.delivery_count().await, 1);
    }

    #[tokio::test]
    async fn fail_next_n_queues_consecutive_failures() {
        let transport = RecordingTransport::new();
        transport.fail_next_n(2, "rate limit exceeded").await;

        assert!(transport.send("a").await.is_err());
        assert!(transport.send("a").await.is_err());
        assert!(transport.send("a").await.is_ok());
    }

    #[tokio::test]
    async fn typing_is_recorded_but_not_a_delivery() {
        let transport = RecordingTransport::new();
        transport.typing().await.unwrap();
        assert_eq!(transport.delivery_count().await, 0);
        assert_eq!(transport.calls().await, vec![TransportCall::Typing]);
    }
}
