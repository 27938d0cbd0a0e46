// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent registry, selection, and the builtin adapter catalog.
//!
//! The registry is an explicit object built once at startup; the selector
//! resolves which adapter serves a request using a strict priority order
//! (per-user override, then global config, then `auto`).

pub mod catalog;
pub mod registry;
pub mod selector;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::builtin_registry;
pub use registry::AgentRegistry;
pub use selector::{select_chat_agent, select_image_agent};
