//! Client for an Ollama-style `/api/chat` endpoint.
//!
//! Non-streaming calls read one JSON object. Streaming calls read
//! newline-delimited JSON and concatenate each line's `message.content`:
//! ```text
//! {"message":{"role":"assistant","content":"he"},"done":false}
//! {"message":{"role":"assistant","content":"llo"},"done":false}
//! {"message":{"role":"assistant","content":""},"done":true}
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::BackendError;
use crate::message::{BackendMessage, BackendReply, BackendRequest};

/// Bytes of a failed response body kept in the error text.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    chat_url: String,
    model: String,
    timeout: Duration,
    stream_timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            http: Client::new(),
            chat_url: format!("{}/api/chat", config.backend_url.trim_end_matches('/')),
            model: config.model.clone(),
            timeout: config.timeout_for(false),
            stream_timeout: config.timeout_for(true),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Sends a non-streaming chat request. `Ok(None)` means the backend
    /// answered but carried no `message.content`.
    pub async fn chat(&self, messages: &[BackendMessage]) -> Result<Option<String>, BackendError> {
        let response = self.send(messages, false).await?;
        let bytes = response.bytes().await?;
        let reply: BackendReply = serde_json::from_slice(&bytes)?;
        Ok(reply.into_content())
    }

    /// Sends a streaming chat request and returns the concatenated content
    /// once the backend closes the stream.
    pub async fn chat_stream(&self, messages: &[BackendMessage]) -> Result<String, BackendError> {
        let response = self.send(messages, true).await?;
        let mut body = response.bytes_stream();
        let mut acc = StreamAccumulator::default();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| BackendError::Stream(e.to_string()))?;
            acc.push_chunk(&chunk);
        }

        Ok(acc.finish())
    }

    async fn send(&self, messages: &[BackendMessage], stream: bool) -> Result<Response, BackendError> {
        let timeout = if stream { self.stream_timeout } else { self.timeout };
        debug!(url = %self.chat_url, model = %self.model, stream, "posting to backend");

        let response = self
            .http
            .post(&self.chat_url)
            .timeout(timeout)
            .json(&BackendRequest {
                model: &self.model,
                messages,
                stream,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(BackendError::Status { status, body });
        }

        Ok(response)
    }
}

/// Reads at most `MAX_ERROR_BODY` bytes of an error response.
async fn read_error_body(response: Response) -> String {
    let mut body = Vec::new();
    let mut truncated = false;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                let room = MAX_ERROR_BODY - body.len();
                if chunk.len() > room {
                    body.extend_from_slice(&chunk[..room]);
                    truncated = true;
                    break;
                }
                body.extend_from_slice(&chunk);
            }
            Err(e) => {
                debug!(error = %e, "failed to read error body");
                break;
            }
        }
    }

    let mut text = String::from_utf8_lossy(&body).into_owned();
    if truncated {
        text.push_str("...");
    }
    text
}

/// Reassembles NDJSON lines from arbitrary byte chunks and collects the
/// text deltas in order. Lines that are not valid JSON are dropped.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no newline.
    scanned: usize,
    text: String,
    skipped: usize,
}

impl StreamAccumulator {
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(chunk);

        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = pending[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            self.process_line(&pending[start..end]);
            start = end + 1;
            from = start;
        }

        pending.drain(..start);
        self.scanned = pending.len();
        self.pending = pending;
    }

    /// Flushes a trailing line without a newline and returns the text.
    pub fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        self.process_line(&rest);
        if self.skipped > 0 {
            debug!(skipped = self.skipped, "dropped malformed stream lines");
        }
        self.text
    }

    #[cfg(test)]
    fn text(&self) -> &str {
        &self.text
    }

    fn process_line(&mut self, line: &[u8]) {
        let line = line.trim_ascii();
        if line.is_empty() {
            return;
        }

        match serde_json::from_slice::<BackendReply>(line) {
            Ok(reply) => {
                if let Some(content) = reply.into_content() {
                    self.text.push_str(&content);
                }
            }
            Err(e) => {
                debug!(error = %e, "skipping malformed stream line");
                self.skipped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_lines_in_order() {
        let mut acc = StreamAccumulator::default();
        acc.push_chunk(b"{\"message\":{\"content\":\"he\"}}\n{\"message\":{\"content\":\"llo\"}}\n");
        assert_eq!(acc.finish(), "hello");
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let mut acc = StreamAccumulator::default();
        acc.push_chunk(b"{\"message\":{\"con");
        assert_eq!(acc.text(), "");
        acc.push_chunk(b"tent\":\"foo\"}}\n{\"message\"");
        assert_eq!(acc.text(), "foo");
        acc.push_chunk(b":{\"content\":\"bar\"}}\n");
        assert_eq!(acc.finish(), "foobar");
    }

    #[test]
    fn long_line_in_many_small_chunks() {
        let content = "x".repeat(10_000);
        let line = format!("{{\"message\":{{\"content\":\"{content}\"}}}}\n");
        let mut acc = StreamAccumulator::default();
        for chunk in line.as_bytes().chunks(7) {
            acc.push_chunk(chunk);
            assert_eq!(acc.scanned, acc.pending.len());
        }
        assert!(acc.pending.is_empty());
        assert_eq!(acc.finish(), content);
    }

    #[test]
    fn keeps_multibyte_characters_split_across_chunks() {
        let line = "{\"message\":{\"content\":\"caf\u{e9}\"}}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xc3).unwrap() + 1;
        let mut acc = StreamAccumulator::default();
        acc.push_chunk(&line[..split]);
        acc.push_chunk(&line[split..]);
        assert_eq!(acc.finish(), "caf\u{e9}");
    }

    #[test]
    fn skips_malformed_and_blank_lines() {
        let mut acc = StreamAccumulator::default();
        acc.push_chunk(b"{\"message\":{\"content\":\"a\"}}\n\nnot json\r\n42\n{\"message\":{\"content\":\"b\"}}\n");
        assert_eq!(acc.skipped, 2);
        assert_eq!(acc.finish(), "ab");
    }

    #[test]
    fn ignores_lines_without_content() {
        let mut acc = StreamAccumulator::default();
        acc.push_chunk(b"{\"done\":true}\n{\"message\":null}\n{\"message\":{\"role\":\"assistant\"}}\n");
        assert_eq!(acc.finish(), "");
    }

    #[test]
    fn flushes_trailing_line_without_newline() {
        let mut acc = StreamAccumulator::default();
        acc.push_chunk(b"{\"message\":{\"content\":\"x\"}}\n{\"message\":{\"content\":\"y\"}}");
        assert_eq!(acc.finish(), "xy");
    }

    #[test]
    fn chat_url_strips_trailing_slash() {
        let config = RelayConfig {
            backend_url: "http://localhost:11434/".to_string(),
            ..RelayConfig::default()
        };
        let client = OllamaClient::new(&config);
        assert_eq!(client.chat_url(), "http://localhost:11434/api/chat");
    }
}
