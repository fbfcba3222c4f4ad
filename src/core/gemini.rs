//! Streaming client for the generative language API.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::StreamExt;
use memchr::memchr;
use tracing::{debug, warn};

use crate::api::{Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::session::{ChatBackend, ChatSession, DeliveryError, FragmentStream};
use crate::utils::url::stream_generate_url;

pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Read the ambient API key from the environment.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

#[derive(Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(session: &ChatSession, user_text: &str) -> GenerateContentRequest {
        let instruction = session.instruction().trim();
        GenerateContentRequest {
            system_instruction: (!instruction.is_empty())
                .then(|| Content::text(None, session.instruction())),
            contents: session.contents_with(user_text),
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn open_reply(
        &self,
        session: &ChatSession,
        user_text: &str,
    ) -> Result<FragmentStream, DeliveryError> {
        let url = stream_generate_url(&self.base_url, &self.model);
        let request = Self::build_request(session, user_text);
        debug!(model = %self.model, turns = request.contents.len(), "opening reply stream");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                message: summarize_api_error(&error_text),
            });
        }

        Ok(decode_event_stream(response.bytes_stream()))
    }
}

/// Turn a byte stream of server-sent events into reply fragments.
///
/// The stream ends after the first error it yields.
pub fn decode_event_stream<S, B, E>(bytes: S) -> FragmentStream
where
    S: futures_util::Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    struct State<S> {
        bytes: std::pin::Pin<Box<S>>,
        decoder: SseDecoder,
        pending: VecDeque<Result<String, DeliveryError>>,
        finished: bool,
    }

    let initial = State {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures_util::stream::unfold(initial, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.pending.clear();
                    state.finished = true;
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => state.pending.extend(state.decoder.push(chunk.as_ref())),
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(DeliveryError::Transport(e.to_string())));
                    state.finished = true;
                }
                None => {
                    state.pending.extend(state.decoder.finish());
                    state.finished = true;
                }
            }
        }
    }))
}

/// Incremental `data:` line parser.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, DeliveryError>> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            match std::str::from_utf8(&line) {
                Ok(line_str) => {
                    if let Some(item) = process_sse_line(line_str.trim()) {
                        out.push(item);
                    }
                }
                Err(e) => warn!("Invalid UTF-8 in stream: {e}"),
            }
        }
        out
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Vec<Result<String, DeliveryError>> {
        let rest = std::mem::take(&mut self.buffer);
        match std::str::from_utf8(&rest) {
            Ok(line) => process_sse_line(line.trim()).into_iter().collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn process_sse_line(line: &str) -> Option<Result<String, DeliveryError>> {
    let payload = extract_data_payload(line)?;
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) if value.get("error").is_some() => {
            Some(Err(DeliveryError::Backend(summarize_api_error(payload))))
        }
        Ok(value) => match serde_json::from_value::<GenerateContentResponse>(value) {
            Ok(response) => response.text().map(Ok),
            Err(e) => Some(Err(DeliveryError::Decode(e.to_string()))),
        },
        Err(e) => Some(Err(DeliveryError::Decode(format!("{e}: {payload}")))),
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// One-line description of an error body, JSON or otherwise.
pub fn summarize_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return summary;
            }
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
