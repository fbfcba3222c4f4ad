//! Session handles and the backend seam.

use std::error::Error as StdError;
use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::api::Content;
use crate::core::message::Turn;

/// Incremental reply text, in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, DeliveryError>> + Send>>;

/// Failure to obtain or finish a reply from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The request never reached the backend or the connection dropped.
    Transport(String),
    /// The backend answered with a non-success status.
    Status { status: u16, message: String },
    /// The backend reported an error inside the stream.
    Backend(String),
    /// The stream carried a payload that could not be understood.
    Decode(String),
    /// The caller abandoned the reply.
    Cancelled,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Transport(msg) => write!(f, "transport error: {msg}"),
            DeliveryError::Status { status, message } => {
                write!(f, "backend returned HTTP {status}: {message}")
            }
            DeliveryError::Backend(msg) => write!(f, "backend error: {msg}"),
            DeliveryError::Decode(msg) => write!(f, "malformed backend response: {msg}"),
            DeliveryError::Cancelled => f.write_str("reply cancelled"),
        }
    }
}

impl StdError for DeliveryError {}

/// Backend-side conversational context: a system instruction plus the
/// exchanges the backend has already seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    instruction: String,
    history: Vec<Content>,
}

impl ChatSession {
    /// Seed a session with a persona's instruction and its prior turns.
    pub fn new(instruction: impl Into<String>, prior_turns: &[Turn]) -> Self {
        Self {
            instruction: instruction.into(),
            history: prior_turns.iter().map(turn_to_content).collect(),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Contents for a request that asks the backend to answer `user_text`.
    pub fn contents_with(&self, user_text: &str) -> Vec<Content> {
        let mut contents = self.history.clone();
        contents.push(Content::text(Some("user"), user_text));
        contents
    }

    /// Remember a completed exchange. Failed exchanges are never recorded.
    pub fn record_exchange(&mut self, user_text: &str, reply: &str) {
        self.history.push(Content::text(Some("user"), user_text));
        self.history.push(Content::text(Some("model"), reply));
    }
}

fn turn_to_content(turn: &Turn) -> Content {
    Content::text(Some(turn.role.as_str()), turn.text.clone())
}

/// A generative backend able to stream a reply for a session.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Start a reply to `user_text` in the context of `session`.
    async fn open_reply(
        &self,
        session: &ChatSession,
        user_text: &str,
    ) -> Result<FragmentStream, DeliveryError>;
}
