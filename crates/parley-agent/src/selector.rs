// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent selection with a strict priority order.
//!
//! Priority, first match wins:
//! 1. Per-user override naming a provider -- match-or-fail, never a
//!    fallthrough: an explicit user choice must not silently degrade to
//!    a different provider.
//! 2. Global configuration naming a provider other than `auto` -- same
//!    match-or-fail rule.
//! 3. `auto`: first enabled agent in registration order.
//! 4. Nothing enabled: `NoProviderAvailable`.
//!
//! Enablement is always evaluated against the *global* configuration,
//! even when selection was triggered by a user override: overrides choose
//! which provider, not whether its credentials exist.

use std::sync::Arc;

use parley_config::{ParleyConfig, UserOverride, AUTO_PROVIDER};
use parley_core::{ChatAgent, ImageAgent, ParleyError};
use tracing::debug;

use crate::registry::AgentRegistry;

/// Resolves the chat agent for a request.
pub fn select_chat_agent(
    registry: &AgentRegistry,
    config: &ParleyConfig,
    user_override: Option<&UserOverride>,
) -> Result<Arc<dyn ChatAgent>, ParleyError> {
    let named = user_override
        .and_then(|o| o.chat_provider.as_deref())
        .or_else(|| named_global(&config.chat.provider));

    if let Some(name) = named {
        let agent = registry
            .find_chat(name)
            .filter(|a| a.enabled(config))
            .ok_or_else(|| ParleyError::ProviderNotAvailable {
                name: name.to_string(),
            })?;
        debug!(agent = name, "selected named chat agent");
        return Ok(Arc::clone(agent));
    }

    registry
        .chat_agents()
        .iter()
        .find(|a| a.enabled(config))
        .map(|a| {
            debug!(agent = a.name(), "selected chat agent via auto");
            Arc::clone(a)
        })
        .ok_or(ParleyError::NoProviderAvailable)
}

/// Resolves the image agent for a request.
pub fn select_image_agent(
    registry: &AgentRegistry,
    config: &ParleyConfig,
    user_override: Option<&UserOverride>,
) -> Result<Arc<dyn ImageAgent>, ParleyError> {
    let named = user_override
        .and_then(|o| o.image_provider.as_deref())
        .or_else(|| named_global(&config.chat.image_provider));

    if let Some(name) = named {
        let agent = registry
            .find_image(name)
            .filter(|a| a.enabled(config))
            .ok_or_else(|| ParleyError::ProviderNotAvailable {
                name: name.to_string(),
            })?;
        debug!(agent = name, "selected named image agent");
        return Ok(Arc::clone(agent));
    }

    registry
        .image_agents()
        .iter()
        .find(|a| a.enabled(config))
        .map(Arc::clone)
        .ok_or(ParleyError::NoProviderAvailable)
}

/// The globally configured provider name, unless it is the `auto`
/// sentinel (or empty, treated the same as unset).
fn named_global(configured: &str) -> Option<&str> {
    if configured.is_empty() || configured == AUTO_PROVIDER {
        None
    } else {
        Some(configured)
    }
}
