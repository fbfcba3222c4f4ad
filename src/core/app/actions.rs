use tokio::sync::mpsc;

use super::App;
use crate::core::chat_stream::{StreamMessage, StreamParams};
use crate::core::session::DeliveryError;
use crate::core::storage::PersistenceError;

pub enum AppAction {
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamCompleted {
        content: String,
        stream_id: u64,
    },
    StreamErrored {
        error: DeliveryError,
        stream_id: u64,
    },
    SubmitMessage {
        message: String,
    },
    ClearChat,
    SelectPersona {
        id: String,
    },
    SelectAdjacentPersona {
        offset: isize,
    },
    GoHome,
    OpenCreateForm,
    DashboardMove {
        offset: isize,
    },
    DashboardActivate,
    FormFocusNext,
    FormFocusPrevious,
    FormCycleCategory {
        forward: bool,
    },
    FormRandomizeAvatar,
    FormInsert {
        text: String,
    },
    FormBackspace,
    FormSubmit,
    ScrollChat {
        lines: i32,
    },
    Quit,
}

impl AppAction {
    /// Translate background stream output into an action for the reducer.
    pub fn from_stream(message: StreamMessage, stream_id: u64) -> Self {
        match message {
            StreamMessage::Chunk(content) => AppAction::AppendResponseChunk { content, stream_id },
            StreamMessage::Completed(content) => AppAction::StreamCompleted { content, stream_id },
            StreamMessage::Failed(error) => AppAction::StreamErrored { error, stream_id },
        }
    }
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        let _ = self.tx.send(action);
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            self.dispatch(action);
        }
    }
}

pub enum AppCommand {
    SpawnStream(StreamParams),
}

/// Apply actions in order. A persistence failure aborts the batch.
pub fn apply_actions(
    app: &mut App,
    actions: impl IntoIterator<Item = AppAction>,
) -> Result<Vec<AppCommand>, PersistenceError> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action)? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

pub fn apply_action(
    app: &mut App,
    action: AppAction,
) -> Result<Option<AppCommand>, PersistenceError> {
    match action {
        AppAction::AppendResponseChunk { content, stream_id } => {
            app.append_response_chunk(stream_id, &content);
        }
        AppAction::StreamCompleted { content, stream_id } => {
            app.complete_response(stream_id, &content)?;
        }
        AppAction::StreamErrored { error, stream_id } => {
            app.fail_response(stream_id, &error);
        }
        AppAction::SubmitMessage { message } => {
            return Ok(app.submit_message(&message).map(AppCommand::SpawnStream));
        }
        AppAction::ClearChat => app.clear_chat()?,
        AppAction::SelectPersona { id } => {
            app.select_persona(&id);
        }
        AppAction::SelectAdjacentPersona { offset } => {
            app.select_adjacent_persona(offset);
        }
        AppAction::GoHome => app.go_home(),
        AppAction::OpenCreateForm => app.open_create_form(),
        AppAction::DashboardMove { offset } => app.move_dashboard_cursor(offset),
        AppAction::DashboardActivate => app.activate_dashboard_card(),
        AppAction::FormFocusNext => app.form.focus_next(),
        AppAction::FormFocusPrevious => app.form.focus_previous(),
        AppAction::FormCycleCategory { forward } => app.form.cycle_category(forward),
        AppAction::FormRandomizeAvatar => app.form.randomize_avatar(),
        AppAction::FormInsert { text } => app.form.insert_text(&text),
        AppAction::FormBackspace => app.form.backspace(),
        AppAction::FormSubmit => {
            app.submit_form()?;
        }
        AppAction::ScrollChat { lines } => {
            let scroll = i32::from(app.ui.chat_scroll) + lines;
            app.ui.chat_scroll = scroll.clamp(0, i32::from(u16::MAX)) as u16;
        }
        AppAction::Quit => app.request_exit(),
    }
    Ok(None)
}
