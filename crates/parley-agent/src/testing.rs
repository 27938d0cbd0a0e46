// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal fake agent for registry and selector unit tests.

use async_trait::async_trait;
use parley_config::ParleyConfig;
use parley_core::{
    ChatAgent, ChatRequest, ChatResponse, DeltaSink, ParleyError,
};
use tokio_util::sync::CancellationToken;

/// A chat agent with a fixed name and enablement, independent of config.
pub(crate) struct FakeChatAgent {
    name: String,
    enabled: bool,
    model: String,
}

impl FakeChatAgent {
    pub(crate) fn new(name: &str, enabled: bool) -> Self {
        Self::with_model(name, enabled, "fake-model")
    }

    pub(crate) fn with_model(name: &str, enabled: bool, model: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatAgent for FakeChatAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_key(&self) -> &str {
        "fake.model"
    }

    fn enabled(&self, _config: &ParleyConfig) -> bool {
        self.enabled
    }

    fn current_model(&self, _config: &ParleyConfig) -> String {
        self.model.clone()
    }

    fn model_list(&self, _config: &ParleyConfig) -> Result<Vec<String>, ParleyError> {
        Ok(vec![self.model.clone()])
    }

    async fn request(
        &self,
        _config: &ParleyConfig,
        _request: &ChatRequest,
        _cancel: &CancellationToken,
        sink: &mut dyn DeltaSink,
    ) -> Result<ChatResponse, ParleyError> {
        sink.on_delta(&self.model).await?;
        Ok(ChatResponse::from_text(self.model.clone()))
    }
}
