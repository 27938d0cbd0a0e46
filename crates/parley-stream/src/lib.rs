// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming delivery pipeline for Parley.
//!
//! Sits between an adapter's delta stream and the chat transport:
//! accumulates deltas, paces edits to a single in-place message, retries
//! rate-limited deliveries with capped linear backoff, and forces a final
//! flush at stream end. Editing one message instead of sending one per
//! delta matters because transports rate-limit message creation far more
//! aggressively than edits.

pub mod pipeline;
pub mod retry;
pub mod typing;

pub use pipeline::StreamingReply;
pub use retry::{is_rate_limit, RetryPolicy};
pub use typing::start_typing_indicator;
