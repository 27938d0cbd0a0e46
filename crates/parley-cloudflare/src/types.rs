// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workers AI ai/run request and envelope types.

use serde::{Deserialize, Serialize};

/// An ai/run chat request body.
#[derive(Debug, Clone, Serialize)]
pub struct CfPayload {
    /// Conversation messages, system first; content is plain text.
    pub messages: Vec<CfMessage>,

    /// Whether to stream the response.
    pub stream: bool,
}

/// One message in the ai/run format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfMessage {
    pub role: String,
    pub content: String,
}

/// The response envelope, full or one streamed frame.
#[derive(Debug, Clone, Deserialize)]
pub struct CfEnvelope {
    #[serde(default)]
    pub result: Option<CfResult>,

    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub errors: Vec<CfError>,
}

/// The `result` object carrying the generated text.
#[derive(Debug, Clone, Deserialize)]
pub struct CfResult {
    #[serde(default)]
    pub response: Option<String>,
}

/// One API-reported error inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CfError {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_frame_parses_delta() {
        let envelope: CfEnvelope =
            serde_json::from_str(r#"{"result":{"response":"Hel"}}"#).unwrap();
        assert_eq!(
            envelope.result.and_then(|r| r.response).as_deref(),
            Some("Hel")
        );
    }

    #[test]
    fn full_envelope_parses_success_and_errors() {
        let envelope: CfEnvelope = serde_json::from_str(
            r#"{"result":null,"success":false,"errors":[{"code":7009,"message":"no such model"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.success, Some(false));
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].code, Some(7009));
    }
}
