// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability-contract traits implemented by adapters and collaborators.

pub mod agent;
pub mod sink;
pub mod transport;

pub use agent::{model_list_from_json, ChatAgent, ImageAgent};
pub use sink::{DeltaSink, NullSink};
pub use transport::ChatTransport;
