// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-framed JSON stream decoder for the OpenAI wire family.
//!
//! Converts a reqwest response byte stream into one item per data line.
//! Frames arrive one JSON object per line; a `data: ` prefix is tolerated
//! and stripped, blank lines are skipped, and the `[DONE]` sentinel is
//! passed through for the caller to treat as end-of-stream.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

/// Sentinel payload closing a line-framed stream.
pub const DONE_SENTINEL: &str = "[DONE]";

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

struct LineState {
    bytes: ByteStream,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    exhausted: bool,
}

/// Splits a streaming response body into data lines.
///
/// Network errors surface as stream items; after one the stream ends.
pub fn json_lines(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<String, reqwest::Error>> + Send>> {
    let state = LineState {
        bytes: Box::pin(response.bytes_stream()),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }
            if state.exhausted {
                // Flush a final unterminated line, if any.
                let rest = std::mem::take(&mut state.buffer);
                return data_portion(&rest).map(|line| (Ok(line), state));
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    drain_complete_lines(&mut state.buffer, &mut state.pending);
                }
                Some(Err(e)) => {
                    state.exhausted = true;
                    state.buffer.clear();
                    return Some((Err(e), state));
                }
                None => state.exhausted = true,
            }
        }
    }))
}

/// Moves every newline-terminated line out of `buffer` into `pending`.
fn drain_complete_lines(buffer: &mut Vec<u8>, pending: &mut VecDeque<String>) {
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        if let Some(data) = data_portion(&line) {
            pending.push_back(data);
        }
    }
}

/// Extracts the data payload from a raw line: trims whitespace (including
/// `\r`), strips an optional `data:` prefix, and drops blank lines.
fn data_portion(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let data = line
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(line);
    if data.is_empty() {
        None
    } else {
        Some(data.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn data_portion_strips_prefix_and_crlf() {
        assert_eq!(
            data_portion(b"data: {\"a\":1}\r").as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(data_portion(b"{\"a\":1}").as_deref(), Some("{\"a\":1}"));
        assert_eq!(data_portion(b"data: [DONE]").as_deref(), Some("[DONE]"));
        assert_eq!(data_portion(b""), None);
        assert_eq!(data_portion(b"   \r"), None);
        assert_eq!(data_portion(b"data:"), None);
    }

    #[test]
    fn drain_handles_partial_trailing_line() {
        let mut buffer = b"{\"a\":1}\n{\"b\":".to_vec();
        let mut pending = VecDeque::new();
        drain_complete_lines(&mut buffer, &mut pending);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0], "{\"a\":1}");
        assert_eq!(buffer, b"{\"b\":");
    }

    #[tokio::test]
    async fn streams_lines_from_response_body() {
        let server = MockServer::start().await;
        let body = "data: {\"n\":1}\n\ndata: {\"n\":2}\n\ndata: [DONE]\n\n";
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let response = reqwest::get(&server.uri()).await.unwrap();
        let mut lines = json_lines(response);

        let mut collected = Vec::new();
        while let Some(line) = lines.next().await {
            collected.push(line.unwrap());
        }
        assert_eq!(collected, vec!["{\"n\":1}", "{\"n\":2}", "[DONE]"]);
    }

    #[tokio::test]
    async fn flushes_unterminated_final_line() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"n\":1}\n{\"n\":2}"))
            .mount(&server)
            .await;

        let response = reqwest::get(&server.uri()).await.unwrap();
        let mut lines = json_lines(response);

        let mut collected = Vec::new();
        while let Some(line) = lines.next().await {
            collected.push(line.unwrap());
        }
        assert_eq!(collected, vec!["{\"n\":1}", "{\"n\":2}"]);
    }
}
