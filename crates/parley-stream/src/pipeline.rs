// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edit-in-place streaming delivery with pacing.
//!
//! Implements the streaming response pattern: send an initial message,
//! then edit it as deltas arrive, throttled so the chat surface is not
//! thrashed and message-creation rate limits are not tripped. Delivery
//! problems degrade to fewer visible updates; they never corrupt the
//! accumulated text.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parley_config::model::StreamConfig;
use parley_core::{ChatTransport, DeltaSink, MessageId, ParleyError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::retry::{is_rate_limit, RetryPolicy};

/// Mutable per-turn state.
///
/// `last_sent` is always a snapshot of a previous `buffer` value, so every
/// delivered text is a prefix of every later one; nothing is reordered or
/// truncated below a previously sent length except at explicit reset.
struct PipelineState {
    buffer: String,
    last_sent: String,
    last_update: Instant,
    first_flush_done: bool,
    message_id: Option<MessageId>,
}

impl PipelineState {
    fn fresh() -> Self {
        Self {
            buffer: String::new(),
            last_sent: String::new(),
            last_update: Instant::now(),
            first_flush_done: false,
            message_id: None,
        }
    }
}

/// Paced streaming delivery to a single edited-in-place transport
/// message.
///
/// State sits behind a mutex as a safety net for a manual flush racing an
/// automatic one; within one turn use is sequential, so the lock is
/// uncontended.
pub struct StreamingReply {
    transport: Arc<dyn ChatTransport>,
    state: Mutex<PipelineState>,
    min_interval: Duration,
    retry: RetryPolicy,
}

impl StreamingReply {
    /// Creates a pipeline writing to `transport`.
    ///
    /// A zero `min_interval` flushes every differing delta.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        min_interval: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            state: Mutex::new(PipelineState::fresh()),
            min_interval,
            retry,
        }
    }

    /// Creates a pipeline from the `[stream]` configuration section.
    pub fn from_config(transport: Arc<dyn ChatTransport>, config: &StreamConfig) -> Self {
        Self::new(
            transport,
            Duration::from_millis(config.min_interval_ms),
            RetryPolicy::from_config(config),
        )
    }

    /// Appends a delta and flushes when pacing allows.
    ///
    /// The very first delta always flushes; afterwards a flush happens
    /// only when the buffer differs from the last delivered text and
    /// `min_interval` has elapsed. A failed flush is logged and
    /// accumulation continues -- the pipeline delivers less often rather
    /// than aborting the turn.
    pub async fn push_delta(&self, delta: &str) -> Result<(), ParleyError> {
        let mut state = self.state.lock().await;
        state.buffer.push_str(delta);

        if state.buffer.is_empty() || state.buffer == state.last_sent {
            return Ok(());
        }
        let due =
            !state.first_flush_done || state.last_update.elapsed() >= self.min_interval;
        if !due {
            return Ok(());
        }

        if let Err(e) = self.flush(&mut state).await {
            metrics::counter!("parley_stream_flush_failures_total").increment(1);
            warn!(error = %e, "flush failed; continuing to accumulate");
        }
        Ok(())
    }

    /// Delivers the terminal text, ignoring the interval gate, so pacing
    /// never drops the end of a response. Called once, after the adapter
    /// signals end of stream; errors propagate because silently losing
    /// the tail would corrupt the saved conversation.
    pub async fn finalize(&self) -> Result<(), ParleyError> {
        let mut state = self.state.lock().await;
        if state.buffer.is_empty() || state.buffer == state.last_sent {
            return Ok(());
        }
        self.flush(&mut state).await
    }

    /// Clears all turn state for reuse. Must not be called mid-stream.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = PipelineState::fresh();
    }

    /// The transport message this turn writes to, once one exists.
    pub async fn message_id(&self) -> Option<MessageId> {
        self.state.lock().await.message_id.clone()
    }

    /// The accumulated text so far.
    pub async fn buffered_text(&self) -> String {
        self.state.lock().await.buffer.clone()
    }

    async fn flush(&self, state: &mut PipelineState) -> Result<(), ParleyError> {
        let text = state.buffer.clone();
        let id = self
            .deliver_with_retry(state.message_id.as_ref(), &text)
            .await?;
        state.message_id = Some(id);
        state.last_sent = text;
        state.last_update = Instant::now();
        state.first_flush_done = true;
        metrics::counter!("parley_stream_flushes_total").increment(1);
        Ok(())
    }

    /// Send-or-edit with retry. Only rate-limit-classified errors are
    /// retried; any other delivery error returns immediately without
    /// consuming retry attempts.
    async fn deliver_with_retry(
        &self,
        id: Option<&MessageId>,
        text: &str,
    ) -> Result<MessageId, ParleyError> {
        let mut last_error = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.delay(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                tokio::time::sleep(delay).await;
            }

            let result = match id {
                Some(existing) => self
                    .transport
                    .edit(existing, text)
                    .await
                    .map(|()| existing.clone()),
                None => self.transport.send(text).await,
            };

            match result {
                Ok(message_id) => return Ok(message_id),
                Err(e) if !is_rate_limit(&e) => return Err(e),
                Err(e) => {
                    metrics::counter!("parley_stream_delivery_retries_total").increment(1);
                    last_error = Some(e);
                }
            }
        }

        Err(ParleyError::RetriesExhausted {
            attempts: self.retry.max_retries + 1,
            source: Box::new(
                last_error.unwrap_or_else(|| ParleyError::delivery("delivery failed")),
            ),
        })
    }
}

#[async_trait]
impl DeltaSink for StreamingReply {
    async fn on_delta(&mut self, delta: &str) -> Result<(), ParleyError> {
        self.push_delta(delta).await
    }
}
