// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image-generation agent against the OpenAI images endpoint.

use std::time::Duration;

use async_trait::async_trait;
use parley_config::ParleyConfig;
use parley_core::{ImageAgent, ImageOutput, ParleyError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{ImagePayload, ImageResponse};

const AGENT_NAME: &str = "openai";

/// OpenAI image-generation agent.
pub struct OpenAiImageAgent {
    client: reqwest::Client,
}

impl Default for OpenAiImageAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiImageAgent {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageAgent for OpenAiImageAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn enabled(&self, config: &ParleyConfig) -> bool {
        config
            .providers
            .openai
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }

    async fn generate(
        &self,
        config: &ParleyConfig,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageOutput, ParleyError> {
        let cfg = &config.providers.openai;
        let api_key = cfg
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ParleyError::Config("providers.openai.api_key is not set".into()))?;

        let payload = ImagePayload {
            model: cfg.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
        };
        let url = format!("{}/images/generations", cfg.base_url.trim_end_matches('/'));

        debug!(model = cfg.image_model, "sending image generation request");
        let send = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .json(&payload)
            .send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ParleyError::Cancelled),
            response = send => response.map_err(|e| ParleyError::network(AGENT_NAME, e))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParleyError::api(AGENT_NAME, status.as_u16(), &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ParleyError::network(AGENT_NAME, e))?;
        let parsed: ImageResponse = serde_json::from_str(&body)
            .map_err(|e| ParleyError::decode(AGENT_NAME, format!("malformed image body: {e}")))?;
        let datum = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::EmptyCompletion {
                agent: AGENT_NAME.to_string(),
            })?;

        if let Some(url) = datum.url {
            Ok(ImageOutput::Url(url))
        } else if let Some(b64) = datum.b64_json {
            Ok(ImageOutput::Base64(b64))
        } else {
            Err(ParleyError::decode(
                AGENT_NAME,
                "image datum carries neither url nor b64_json",
            ))
        }
    }
}
