// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide agent registry.
//!
//! An explicit registry object constructed once at startup and passed by
//! reference to the selector and callers, so tests can build isolated
//! registries with fake adapters. Registration is append-only; there is
//! no removal and no runtime mutation after startup.

use std::sync::Arc;

use parley_core::{ChatAgent, ImageAgent};

/// Ordered collection of registered adapters.
///
/// Registration order is selection order for `auto`. Name lookup scans in
/// order and the first match wins: a later duplicate name is silently
/// shadowed. Uniqueness is a startup-phase convention verified by tests,
/// not a runtime guard.
#[derive(Default)]
pub struct AgentRegistry {
    chat: Vec<Arc<dyn ChatAgent>>,
    image: Vec<Arc<dyn ImageAgent>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chat agent to the registry.
    pub fn register_chat(&mut self, agent: Arc<dyn ChatAgent>) {
        self.chat.push(agent);
    }

    /// Appends an image agent to the registry.
    pub fn register_image(&mut self, agent: Arc<dyn ImageAgent>) {
        self.image.push(agent);
    }

    /// All chat agents in registration order.
    pub fn chat_agents(&self) -> &[Arc<dyn ChatAgent>] {
        &self.chat
    }

    /// All image agents in registration order.
    pub fn image_agents(&self) -> &[Arc<dyn ImageAgent>] {
        &self.image
    }

    /// First chat agent registered under `name`, if any.
    pub fn find_chat(&self, name: &str) -> Option<&Arc<dyn ChatAgent>> {
        self.chat.iter().find(|a| a.name() == name)
    }

    /// First image agent registered under `name`, if any.
    pub fn find_image(&self, name: &str) -> Option<&Arc<dyn ImageAgent>> {
        self.image.iter().find(|a| a.name() == name)
    }
}
