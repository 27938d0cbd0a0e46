// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The delta-sink abstraction adapters stream into.

use async_trait::async_trait;

use crate::error::ParleyError;

/// Consumer of incremental assistant-text fragments.
///
/// Adapters invoke `on_delta` once per extracted delta, in order, before
/// decoding the next frame; concatenation order is final-text order. The
/// end of a stream is signalled by the adapter returning, never by an
/// empty delta.
#[async_trait]
pub trait DeltaSink: Send {
    async fn on_delta(&mut self, delta: &str) -> Result<(), ParleyError>;
}

/// A sink that discards every delta. Useful when the caller only wants
/// the accumulated response.
pub struct NullSink;

#[async_trait]
impl DeltaSink for NullSink {
    async fn on_delta(&mut self, _delta: &str) -> Result<(), ParleyError> {
        Ok(())
    }
}
