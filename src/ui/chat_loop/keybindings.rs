//! View-aware key mapping.
//!
//! Keys are translated into [`AppAction`]s for the reducer. The chat input
//! box is the one exception: plain typing goes straight to the textarea.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::{App, AppAction, FormField, View};

const PAGE_LINES: i32 = 10;

/// What the loop should do with a key press.
pub enum KeyResult {
    Dispatch(Vec<AppAction>),
    /// Send the composed chat message, see [`take_submission`].
    Submit,
    /// Feed the key to the chat input textarea.
    EditInput,
    NotHandled,
}

impl KeyResult {
    fn one(action: AppAction) -> Self {
        KeyResult::Dispatch(vec![action])
    }
}

/// The state a key is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub view: View,
    pub form_focus: FormField,
}

impl KeyContext {
    pub fn from_app(app: &App) -> Self {
        Self {
            view: app.router.view(),
            form_focus: app.form.focus(),
        }
    }
}

/// Translate a key press.
pub fn handle_key(key: &KeyEvent, context: KeyContext) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => return KeyResult::one(AppAction::Quit),
        KeyCode::Char('n') if ctrl => return KeyResult::one(AppAction::OpenCreateForm),
        KeyCode::Up if alt => {
            return KeyResult::one(AppAction::SelectAdjacentPersona { offset: -1 })
        }
        KeyCode::Down if alt => {
            return KeyResult::one(AppAction::SelectAdjacentPersona { offset: 1 })
        }
        KeyCode::Esc if context.view != View::Dashboard => {
            return KeyResult::one(AppAction::GoHome)
        }
        _ => {}
    }

    match context.view {
        View::Dashboard => handle_dashboard_key(key),
        View::Create => handle_form_key(key, context.form_focus),
        View::Chat => handle_chat_key(key),
    }
}

fn handle_dashboard_key(key: &KeyEvent) -> KeyResult {
    match key.code {
        KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
            KeyResult::one(AppAction::DashboardMove { offset: -1 })
        }
        KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
            KeyResult::one(AppAction::DashboardMove { offset: 1 })
        }
        KeyCode::Enter => KeyResult::one(AppAction::DashboardActivate),
        KeyCode::Char('q') => KeyResult::one(AppAction::Quit),
        _ => KeyResult::NotHandled,
    }
}

fn handle_form_key(key: &KeyEvent, focus: FormField) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => KeyResult::one(AppAction::FormSubmit),
        KeyCode::Char('r') if ctrl => KeyResult::one(AppAction::FormRandomizeAvatar),
        KeyCode::Tab | KeyCode::Down => KeyResult::one(AppAction::FormFocusNext),
        KeyCode::BackTab | KeyCode::Up => KeyResult::one(AppAction::FormFocusPrevious),
        KeyCode::Left if focus == FormField::Category => {
            KeyResult::one(AppAction::FormCycleCategory { forward: false })
        }
        KeyCode::Right | KeyCode::Char(' ') if focus == FormField::Category => {
            KeyResult::one(AppAction::FormCycleCategory { forward: true })
        }
        KeyCode::Enter if focus == FormField::Instruction => KeyResult::one(AppAction::FormInsert {
            text: "\n".to_string(),
        }),
        KeyCode::Enter => KeyResult::one(AppAction::FormFocusNext),
        KeyCode::Backspace => KeyResult::one(AppAction::FormBackspace),
        KeyCode::Char(ch) if !ctrl => KeyResult::one(AppAction::FormInsert {
            text: ch.to_string(),
        }),
        _ => KeyResult::NotHandled,
    }
}

fn handle_chat_key(key: &KeyEvent) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if is_submit_key(key) {
        return KeyResult::Submit;
    }
    match key.code {
        KeyCode::Char('l') if ctrl => KeyResult::one(AppAction::ClearChat),
        KeyCode::PageUp => KeyResult::one(AppAction::ScrollChat { lines: PAGE_LINES }),
        KeyCode::PageDown => KeyResult::one(AppAction::ScrollChat { lines: -PAGE_LINES }),
        _ => KeyResult::EditInput,
    }
}

fn is_submit_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Enter
        && !key
            .modifiers
            .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT | KeyModifiers::CONTROL)
}

/// Drain the chat input into a submit action. While a reply is pending the
/// draft stays in the box.
pub fn take_submission(app: &mut App) -> Option<AppAction> {
    if app.is_awaiting_reply() || app.ui.input_text().trim().is_empty() {
        return None;
    }
    let message = app.ui.take_input();
    Some(AppAction::SubmitMessage { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn context(view: View) -> KeyContext {
        KeyContext {
            view,
            form_focus: FormField::Name,
        }
    }

    fn single(result: KeyResult) -> AppAction {
        match result {
            KeyResult::Dispatch(mut actions) if actions.len() == 1 => actions.remove(0),
            _ => panic!("expected one action"),
        }
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        for view in [View::Dashboard, View::Chat, View::Create] {
            assert!(matches!(
                single(handle_key(&ctrl('c'), context(view))),
                AppAction::Quit
            ));
        }
    }

    #[test]
    fn escape_goes_home_from_chat_and_form() {
        assert!(matches!(
            single(handle_key(&key(KeyCode::Esc), context(View::Chat))),
            AppAction::GoHome
        ));
        assert!(matches!(
            handle_key(&key(KeyCode::Esc), context(View::Dashboard)),
            KeyResult::NotHandled
        ));
    }

    #[test]
    fn chat_typing_goes_to_the_input() {
        assert!(matches!(
            handle_key(&key(KeyCode::Char('h')), context(View::Chat)),
            KeyResult::EditInput
        ));
        assert!(matches!(
            single(handle_key(&ctrl('l'), context(View::Chat))),
            AppAction::ClearChat
        ));
    }

    #[test]
    fn category_field_cycles_with_arrows() {
        let ctx = KeyContext {
            form_focus: FormField::Category,
            ..context(View::Create)
        };
        assert!(matches!(
            single(handle_key(&key(KeyCode::Left), ctx)),
            AppAction::FormCycleCategory { forward: false }
        ));
        assert!(matches!(
            handle_key(&key(KeyCode::Left), context(View::Create)),
            KeyResult::NotHandled
        ));
    }

    #[test]
    fn enter_inserts_newline_only_in_instruction() {
        let ctx = KeyContext {
            form_focus: FormField::Instruction,
            ..context(View::Create)
        };
        assert!(matches!(
            single(handle_key(&key(KeyCode::Enter), ctx)),
            AppAction::FormInsert { ref text } if text == "\n"
        ));
        assert!(matches!(
            single(handle_key(&key(KeyCode::Enter), context(View::Create))),
            AppAction::FormFocusNext
        ));
    }

    #[test]
    fn alt_enter_does_not_submit() {
        assert!(matches!(
            handle_key(&key(KeyCode::Enter), context(View::Chat)),
            KeyResult::Submit
        ));
        assert!(matches!(
            handle_key(
                &KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT),
                context(View::Chat)
            ),
            KeyResult::EditInput
        ));
    }

    #[test]
    fn submission_keeps_draft_while_awaiting() {
        let mut app = create_test_app();
        app.select_persona("2");
        app.ui.set_input_text("hello");
        let Some(AppAction::SubmitMessage { message }) = take_submission(&mut app) else {
            panic!("expected submission");
        };
        assert_eq!(message, "hello");
        assert_eq!(app.ui.input_text(), "");

        app.submit_message(&message).expect("stream");
        app.ui.set_input_text("draft");
        assert!(take_submission(&mut app).is_none());
        assert_eq!(app.ui.input_text(), "draft");
    }
}
