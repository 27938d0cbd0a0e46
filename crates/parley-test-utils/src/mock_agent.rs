// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat agent for deterministic testing.
//!
//! `MockChatAgent` implements the full `ChatAgent` contract with
//! pre-scripted delta sequences, enabling fast, CI-runnable tests without
//! external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use parley_config::ParleyConfig;
use parley_core::{ChatAgent, ChatRequest, ChatResponse, DeltaSink, ParleyError};

/// A mock chat agent that streams pre-scripted delta sequences.
///
/// Scripts are popped from a FIFO queue, one per request. When the queue
/// is empty, a single default `"mock response"` delta is streamed.
pub struct MockChatAgent {
    name: String,
    scripts: Arc<Mutex<VecDeque<Vec<String>>>>,
}

impl MockChatAgent {
    /// Creates a mock agent with an empty script queue.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scripts: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Creates a mock agent whose next request streams `deltas`.
    pub fn with_deltas(name: &str, deltas: Vec<&str>) -> Self {
        let agent = Self::new(name);
        let script = deltas.into_iter().map(String::from).collect();
        agent
            .scripts
            .try_lock()
            .expect("fresh mock agent lock")
            .push_back(script);
        agent
    }

    /// Queues a delta sequence for a subsequent request.
    pub async fn push_script(&self, deltas: Vec<String>) {
        self.scripts.lock().await.push_back(deltas);
    }

    async fn next_script(&self) -> Vec<String> {
        self.scripts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| vec!["mock response".to_string()])
    }
}

#[async_trait]
impl ChatAgent for MockChatAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_key(&self) -> &str {
        "mock.model"
    }

    fn enabled(&self, _config: &ParleyConfig) -> bool {
        true
    }

    fn current_model(&self, _config: &ParleyConfig) -> String {
        "mock-model".to_string()
    }

    fn model_list(&self, _config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        Ok(vec!["mock-model".to_string()])
    }

    async fn request(
        &self,
        _config: &ParleyConfig,
        _request: &ChatRequest,
        cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        let script = self.next_script().await;
        let mut accumulated = String::new();
        for delta in script {
            if cancel.is_cancelled() {
                return Err(ParleyError::Cancelled);
            }
            accumulated.push_str(&delta);
            sink.on_delta(&delta).await?;
        }
        Ok(ChatResponse::from_text(accumulated))
    }
}
