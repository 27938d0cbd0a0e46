// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builtin adapter catalog.

use std::sync::Arc;

use parley_anthropic::AnthropicAgent;
use parley_azure::AzureAgent;
use parley_cloudflare::CloudflareAgent;
use parley_gemini::GeminiAgent;
use parley_openai::{OpenAiAgent, OpenAiImageAgent};

use crate::registry::AgentRegistry;

/// Builds the registry with every builtin adapter.
///
/// The registration order below is the `auto` selection priority and is
/// part of the observable contract; append new adapters at the end.
pub fn builtin_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register_chat(Arc::new(OpenAiAgent::new()));
    registry.register_chat(Arc::new(AzureAgent::new()));
    registry.register_chat(Arc::new(AnthropicAgent::new()));
    registry.register_chat(Arc::new(GeminiAgent::new()));
    registry.register_chat(Arc::new(CloudflareAgent::new()));
    registry.register_image(Arc::new(OpenAiImageAgent::new()));
    registry
}
