use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::session::{ChatBackend, ChatSession, DeliveryError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Completed(String),
    Failed(DeliveryError),
}

/// Stream a reply and hand each fragment to `on_fragment` as it arrives.
///
/// Fragments are delivered synchronously and in arrival order; the resolved
/// value is their concatenation. A failure may arrive after some fragments
/// were already delivered. Cancelling `cancel` drops the backend stream and
/// resolves to [`DeliveryError::Cancelled`].
pub async fn stream_reply<F>(
    backend: &dyn ChatBackend,
    session: &ChatSession,
    user_text: &str,
    cancel: &CancellationToken,
    mut on_fragment: F,
) -> Result<String, DeliveryError>
where
    F: FnMut(&str),
{
    let mut stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(DeliveryError::Cancelled),
        opened = backend.open_reply(session, user_text) => opened?,
    };

    let mut full_response = String::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DeliveryError::Cancelled),
            next = stream.next() => next,
        };
        match next {
            Some(Ok(fragment)) => {
                if fragment.is_empty() {
                    continue;
                }
                on_fragment(&fragment);
                full_response.push_str(&fragment);
            }
            Some(Err(err)) => return Err(err),
            None => break,
        }
    }

    Ok(full_response)
}

pub struct StreamParams {
    pub session: ChatSession,
    pub user_text: String,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

/// Runs replies on background tasks and reports back over one channel.
///
/// Every message is tagged with the stream id it belongs to so the receiver
/// can drop output from streams it has since abandoned.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
    backend: Arc<dyn ChatBackend>,
}

impl ChatStreamService {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, backend }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let StreamParams {
                session,
                user_text,
                cancel_token,
                stream_id,
            } = params;

            let result = stream_reply(
                backend.as_ref(),
                &session,
                &user_text,
                &cancel_token,
                |fragment| {
                    let _ = tx.send((StreamMessage::Chunk(fragment.to_string()), stream_id));
                },
            )
            .await;

            match result {
                Ok(full_response) => {
                    let _ = tx.send((StreamMessage::Completed(full_response), stream_id));
                }
                Err(DeliveryError::Cancelled) => {
                    debug!(stream_id, "reply stream cancelled");
                }
                Err(err) => {
                    let _ = tx.send((StreamMessage::Failed(err), stream_id));
                }
            }
        })
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}
