//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use crate::core::app::{apply_action, App, AppAction};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::config::Config;
use crate::core::session::ChatBackend;
use crate::core::storage::JsonFileStore;

/// Send `prompt` to one persona, stream the reply to stdout, and save the
/// exchange to the persona's transcript.
pub async fn run_say(
    config: &Config,
    backend: Arc<dyn ChatBackend>,
    persona: &str,
    prompt: &str,
) -> Result<(), Box<dyn Error>> {
    let store = JsonFileStore::new(config.data_dir());
    let mut app = App::load(Box::new(store))?;
    let mut stdout = io::stdout();
    say(&mut app, backend, persona, prompt, &mut stdout).await
}

pub async fn say(
    app: &mut App,
    backend: Arc<dyn ChatBackend>,
    persona: &str,
    prompt: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let Some(persona_id) = app
        .personas
        .find_by_id_or_name(persona)
        .map(|p| p.id.clone())
    else {
        return Err(format!("unknown persona: {persona}").into());
    };
    app.select_persona(&persona_id);

    let Some(params) = app.submit_message(prompt) else {
        return Err("message is empty".into());
    };

    let (stream_service, mut rx) = ChatStreamService::new(backend);
    stream_service.spawn_stream(params);

    while let Some((message, stream_id)) = rx.recv().await {
        let outcome = match &message {
            StreamMessage::Chunk(content) => {
                write!(out, "{content}")?;
                out.flush()?;
                None
            }
            StreamMessage::Completed(_) => {
                writeln!(out)?;
                Some(Ok(()))
            }
            StreamMessage::Failed(err) => Some(Err(err.clone())),
        };

        apply_action(app, AppAction::from_stream(message, stream_id))?;

        match outcome {
            Some(Ok(())) => return Ok(()),
            Some(Err(err)) => return Err(err.into()),
            None => {}
        }
    }

    Err("reply stream closed unexpectedly".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::TurnRole;
    use crate::core::session::DeliveryError;
    use crate::utils::test_utils::{create_test_app, ScriptedBackend};

    #[tokio::test]
    async fn streams_reply_and_saves_exchange() {
        let mut app = create_test_app();
        let backend = Arc::new(ScriptedBackend::replying(&["Breathe ", "deeply."]));
        let mut out = Vec::new();

        say(&mut app, backend, "zen guide", "I feel stressed.", &mut out)
            .await
            .expect("say");

        assert_eq!(String::from_utf8(out).expect("utf8"), "Breathe deeply.\n");
        let turns = app.transcripts.turns("2");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[1].text, "Breathe deeply.");
    }

    #[tokio::test]
    async fn failed_reply_is_an_error() {
        let mut app = create_test_app();
        let backend = Arc::new(ScriptedBackend::failing_to_open(DeliveryError::Transport(
            "connection refused".to_string(),
        )));
        let mut out = Vec::new();

        let err = say(&mut app, backend, "2", "hello", &mut out)
            .await
            .expect_err("delivery failure");
        assert!(err.to_string().contains("connection refused"));
        assert!(app.transcripts.turns("2").is_empty());
    }

    #[tokio::test]
    async fn unknown_persona_is_rejected() {
        let mut app = create_test_app();
        let backend = Arc::new(ScriptedBackend::replying(&[]));
        let err = say(&mut app, backend, "Nobody", "hello", &mut Vec::new())
            .await
            .expect_err("unknown");
        assert_eq!(err.to_string(), "unknown persona: Nobody");
    }
}
