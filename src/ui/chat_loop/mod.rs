//! Main event loop for the terminal interface.
//!
//! The loop owns the [`App`]. Terminal events arrive from a reader task,
//! reply fragments from [`ChatStreamService`]; both are turned into
//! [`AppAction`]s and applied in order before the next frame is drawn.

mod keybindings;

use self::keybindings::{handle_key, take_submission, KeyContext, KeyResult};

use crate::core::app::{apply_actions, App, AppAction, AppActionDispatcher, AppCommand};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::storage::PersistenceError;
use crate::ui::renderer::ui;
use crate::utils::input::sanitize_text_input;
use ratatui::crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn try_draw_frame(
    app: &mut App,
    terminal: &mut ChatTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    terminal.draw(|f| ui(f, app))?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

/// Handle pending terminal events. Returns whether anything was processed.
fn process_ui_events(
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
) -> bool {
    let mut processed = false;
    while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
        processed = true;
        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match handle_key(&key, KeyContext::from_app(app)) {
                    KeyResult::Dispatch(actions) => dispatcher.dispatch_many(actions),
                    KeyResult::Submit => {
                        if let Some(action) = take_submission(app) {
                            dispatcher.dispatch(action);
                        }
                    }
                    KeyResult::EditInput => {
                        app.ui.textarea_mut().input(tui_textarea::Input::from(key));
                    }
                    KeyResult::NotHandled => {}
                }
            }
            Event::Paste(text) => handle_paste_event(app, dispatcher, &text),
            _ => {}
        }
    }
    processed
}

fn handle_paste_event(app: &mut App, dispatcher: &AppActionDispatcher, text: &str) {
    let sanitized = sanitize_text_input(text);
    match app.router.view() {
        crate::core::app::View::Chat => {
            app.ui.textarea_mut().insert_str(&sanitized);
        }
        crate::core::app::View::Create => {
            dispatcher.dispatch(AppAction::FormInsert { text: sanitized });
        }
        crate::core::app::View::Dashboard => {}
    }
}

/// Forward stream output as actions. Output from abandoned streams is
/// filtered by the reducer, which knows the current stream id.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> bool {
    let mut received_any = false;
    while let Ok((message, stream_id)) = rx.try_recv() {
        dispatcher.dispatch(AppAction::from_stream(message, stream_id));
        received_any = true;
    }
    received_any
}

fn drain_action_queue(
    app: &mut App,
    stream_service: &ChatStreamService,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
) -> Result<bool, PersistenceError> {
    let mut pending = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }

    if pending.is_empty() {
        return Ok(false);
    }

    let commands = apply_actions(app, pending)?;
    for cmd in commands {
        match cmd {
            AppCommand::SpawnStream(params) => {
                debug!(stream_id = params.stream_id, "spawning reply stream");
                stream_service.spawn_stream(params);
            }
        }
    }
    Ok(true)
}

fn restore_terminal(terminal: &mut ChatTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()
}

/// Run the interactive session until the user quits. A persistence failure
/// ends the session with an error after the terminal is restored.
pub async fn run_chat(
    mut app: App,
    stream_service: ChatStreamService,
    mut rx: mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> Result<(), Box<dyn Error>> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();

    // Spawn async event reader task
    let event_reader_handle = tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    });

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    info!("interactive session started");
    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if app.ui.exit_requested {
            break 'main_loop Ok(());
        }

        if let Err(err) = try_draw_frame(
            &mut app,
            &mut terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        ) {
            break 'main_loop Err(err.into());
        }

        let events_processed = process_ui_events(&mut app, &mut event_rx, &action_dispatcher);
        let received_any = process_stream_updates(&action_dispatcher, &mut rx);

        let actions_applied = match drain_action_queue(&mut app, &stream_service, &mut action_rx) {
            Ok(applied) => applied,
            Err(err) => break 'main_loop Err(err.into()),
        };

        // Keep the thinking indicator animated.
        let animating = app.is_awaiting_reply();

        if events_processed || received_any || actions_applied || animating {
            request_redraw = true;
        }

        if !events_processed && !received_any && !actions_applied {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    // Dropping the open chat cancels a reply still in flight.
    app.chat = None;
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    info!("interactive session ended");

    result
}
