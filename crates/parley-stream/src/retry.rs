// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery retry policy and rate-limit classification.

use std::time::Duration;

use parley_config::model::StreamConfig;
use parley_core::ParleyError;

/// Retry policy for transport delivery: linear-times-factor backoff
/// capped at a ceiling (not pure exponential).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Base backoff delay.
    pub base_delay: Duration,
    /// Linear growth factor.
    pub backoff_factor: u32,
    /// Backoff ceiling.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&StreamConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &StreamConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            backoff_factor: config.retry_backoff_factor.min(u32::MAX as u64) as u32,
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Backoff before attempt `n` (n >= 1):
    /// `min(base_delay * n * backoff_factor, max_delay)`.
    /// Attempt 0 never waits.
    pub fn delay(&self, attempt: u32) -> Duration {
        let scaled = self
            .base_delay
            .checked_mul(attempt)
            .and_then(|d| d.checked_mul(self.backoff_factor))
            .unwrap_or(self.max_delay);
        scaled.min(self.max_delay)
    }
}

/// Classifies a delivery error as rate limiting by its text: an HTTP 429
/// marker or a recognizable phrase. Only these errors are worth retrying;
/// anything else (malformed markup, revoked chat) will not heal with
/// time.
pub fn is_rate_limit(error: &ParleyError) -> bool {
    let text = error.to_string().to_lowercase();
    text.contains("429") || text.contains("rate limit") || text.contains("too many requests")
}
