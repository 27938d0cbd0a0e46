// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley: scripted mock agents, a recording chat
//! transport, and a recording delta sink.

pub mod mock_agent;
pub mod recording_sink;
pub mod recording_transport;

pub use mock_agent::MockChatAgent;
pub use recording_sink::RecordingSink;
pub use recording_transport::{RecordingTransport, TransportCall};
