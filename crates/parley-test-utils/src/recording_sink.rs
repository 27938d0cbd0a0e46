// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A delta sink that records everything it receives.

use async_trait::async_trait;

use parley_core::{DeltaSink, ParleyError};

/// Records every delta for later assertion.
#[derive(Default)]
pub struct RecordingSink {
    deltas: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded deltas, in arrival order.
    pub fn deltas(&self) -> &[String] {
        &self.deltas
    }

    /// The deltas concatenated in order -- what the final response text
    /// must equal.
    pub fn concatenated(&self) -> String {
        self.deltas.concat()
    }
}

#[async_trait]
impl DeltaSink for RecordingSink {
    async fn on_delta(&mut self, delta: &str) -> Result<(), ParleyError> {
        self.deltas.push(delta.to_string());
        Ok(())
    }
}
