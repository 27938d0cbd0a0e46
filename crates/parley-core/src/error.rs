// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the Parley workspace.

use thiserror::Error;

/// Upper bound on how much of a provider error body is preserved in an
/// error value, so raw bodies stay loggable.
const MAX_ERROR_BODY: usize = 2048;

/// The primary error type used across agents, selection, and delivery.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// An explicitly named provider is unknown or disabled.
    ///
    /// Selection never falls back from an explicit choice; this error is
    /// surfaced to the caller as a configuration problem.
    #[error("provider `{name}` is not available")]
    ProviderNotAvailable { name: String },

    /// No registered provider is enabled under the current configuration.
    #[error("no chat provider is enabled")]
    NoProviderAvailable,

    /// The backend answered with a non-2xx status. Terminal per request.
    #[error("{agent} API returned {status}: {body}")]
    Api {
        agent: String,
        status: u16,
        body: String,
    },

    /// The HTTP call itself failed (connect, TLS, read). Terminal per
    /// request; the adapter never retries upstream fetches.
    #[error("{agent} request failed: {source}")]
    Network {
        agent: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A response body or streamed frame could not be decoded. Terminal
    /// for the whole turn; no partial response is salvaged.
    #[error("{agent} sent an undecodable response: {message}")]
    Decode { agent: String, message: String },

    /// The backend reported zero completion candidates.
    #[error("{agent} returned no completion candidates")]
    EmptyCompletion { agent: String },

    /// The configured model list is not a valid JSON string array.
    #[error("model list for {agent} is not valid JSON: {source}")]
    InvalidModelList {
        agent: String,
        source: serde_json::Error,
    },

    /// Delivering buffered text to the chat transport failed.
    #[error("delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Delivery retries were exhausted; wraps the last delivery error.
    #[error("delivery failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: Box<ParleyError>,
    },

    /// The request's cancellation token fired mid-flight.
    #[error("request cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Builds an [`ParleyError::Api`] with the body capped at a bounded
    /// length, keeping the raw (truncated) body available for logging.
    pub fn api(agent: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Api {
            agent: agent.into(),
            status,
            body: truncate_body(body),
        }
    }

    /// Builds a [`ParleyError::Network`] from any transport-level failure.
    pub fn network(
        agent: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            agent: agent.into(),
            source: Box::new(source),
        }
    }

    /// Builds a [`ParleyError::Decode`] for a malformed body or frame.
    pub fn decode(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Builds a [`ParleyError::Delivery`] without an underlying cause.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
            source: None,
        }
    }
}

/// Caps an error body at [`MAX_ERROR_BODY`] bytes on a char boundary.
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
