use tracing::{debug, info, warn};

use crate::core::builtin_personas::load_builtin_personas;
use crate::core::chat_stream::StreamParams;
use crate::core::persona::{PersonaDraft, PersonaStore};
use crate::core::session::DeliveryError;
use crate::core::storage::{PersistenceError, StateStore};
use crate::core::transcript::TranscriptBook;
use crate::ui::theme::Theme;

pub mod actions;
pub mod controller;
pub mod form;
pub mod router;
pub mod ui_state;

pub use actions::{apply_action, apply_actions, AppAction, AppActionDispatcher, AppCommand};
pub use controller::{ReplyState, TranscriptController};
pub use form::{CreationForm, FormField, ValidationError};
pub use router::{Router, View};
pub use ui_state::UiState;

/// Application state: personas, transcripts, the open conversation and
/// the screen being shown. Every durable change is written through the
/// [`StateStore`] before the mutating call returns.
pub struct App {
    pub personas: PersonaStore,
    pub transcripts: TranscriptBook,
    pub router: Router,
    pub chat: Option<TranscriptController>,
    pub form: CreationForm,
    pub ui: UiState,
    store: Box<dyn StateStore>,
    last_stream_id: u64,
}

impl App {
    /// Load state from `store` with default presentation settings.
    pub fn load(store: Box<dyn StateStore>) -> Result<Self, PersistenceError> {
        Self::load_with_ui(store, UiState::new(Theme::dark_default(), true))
    }

    /// Load state from `store`. A store without a persona record is seeded
    /// with the builtin personas, which are written back immediately.
    pub fn load_with_ui(
        mut store: Box<dyn StateStore>,
        ui: UiState,
    ) -> Result<Self, PersistenceError> {
        let personas = match store.load_personas()? {
            Some(personas) => personas,
            None => {
                let seeds = load_builtin_personas();
                info!(count = seeds.len(), "seeding builtin personas");
                store.save_personas(&seeds)?;
                seeds
            }
        };
        let transcripts = store.load_transcripts()?;
        debug!(
            personas = personas.len(),
            transcripts = transcripts.len(),
            "state loaded"
        );

        Ok(Self {
            personas: PersonaStore::new(personas),
            transcripts: TranscriptBook::new(transcripts),
            router: Router::default(),
            chat: None,
            form: CreationForm::new(),
            ui,
            store,
            last_stream_id: 0,
        })
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.chat
            .as_ref()
            .is_some_and(TranscriptController::is_awaiting_reply)
    }

    /// Open the chat for `persona_id`. Re-selecting the open persona keeps
    /// its conversation; any other choice replaces it, cancelling a reply
    /// that is still streaming.
    pub fn select_persona(&mut self, persona_id: &str) -> bool {
        let Some(persona) = self.personas.find(persona_id) else {
            warn!(persona = persona_id, "unknown persona selected");
            return false;
        };

        let already_open = self
            .chat
            .as_ref()
            .is_some_and(|chat| chat.persona_id() == persona_id);
        if !already_open {
            self.chat = Some(TranscriptController::new(
                persona,
                self.transcripts.turns(persona_id),
            ));
            self.ui.chat_scroll = 0;
        }
        self.router.show_chat(persona_id);
        true
    }

    /// Move the sidebar selection by `offset`, wrapping around.
    pub fn select_adjacent_persona(&mut self, offset: isize) -> bool {
        let order: Vec<String> = self
            .personas
            .navigation_order()
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        if order.is_empty() {
            return false;
        }

        let len = order.len() as isize;
        let next = match self
            .router
            .active_persona_id()
            .and_then(|active| order.iter().position(|id| id == active))
        {
            Some(current) => (current as isize + offset).rem_euclid(len),
            None if offset < 0 => len - 1,
            None => 0,
        };
        let id = order[next as usize].clone();
        self.select_persona(&id)
    }

    pub fn go_home(&mut self) {
        self.chat = None;
        self.router.go_home();
    }

    pub fn open_create_form(&mut self) {
        self.chat = None;
        self.form.reset();
        self.router.open_create();
    }

    /// Cards on the dashboard: the create card plus one per persona.
    pub fn dashboard_len(&self) -> usize {
        self.personas.len() + 1
    }

    pub fn move_dashboard_cursor(&mut self, offset: isize) {
        let len = self.dashboard_len() as isize;
        let cursor = (self.ui.dashboard_cursor as isize + offset).rem_euclid(len);
        self.ui.dashboard_cursor = cursor as usize;
    }

    pub fn activate_dashboard_card(&mut self) {
        match self.ui.dashboard_cursor {
            0 => self.open_create_form(),
            index => {
                if let Some(id) = self.personas.list().get(index - 1).map(|p| p.id.clone()) {
                    self.select_persona(&id);
                }
            }
        }
    }

    /// Store a new persona, persist the persona list and open its chat.
    pub fn create_persona(&mut self, draft: PersonaDraft) -> Result<String, PersistenceError> {
        let id = self.personas.add(draft).id.clone();
        self.store.save_personas(self.personas.list())?;
        info!(persona = %id, "persona created");
        self.select_persona(&id);
        Ok(id)
    }

    /// Submit the creation form. Validation failures stay in the form and
    /// yield `Ok(None)`.
    pub fn submit_form(&mut self) -> Result<Option<String>, PersistenceError> {
        match self.form.submit() {
            Ok(draft) => self.create_persona(draft).map(Some),
            Err(err) => {
                debug!(error = %err, "persona form rejected");
                Ok(None)
            }
        }
    }

    /// Start a reply in the open chat, if one may start.
    pub fn submit_message(&mut self, text: &str) -> Option<StreamParams> {
        let stream_id = self.last_stream_id + 1;
        let params = self.chat.as_mut()?.submit(text, stream_id)?;
        self.last_stream_id = stream_id;
        self.ui.chat_scroll = 0;
        Some(params)
    }

    pub fn append_response_chunk(&mut self, stream_id: u64, fragment: &str) {
        if let Some(chat) = self.chat.as_mut() {
            chat.append_fragment(stream_id, fragment);
        }
    }

    pub fn complete_response(
        &mut self,
        stream_id: u64,
        full_text: &str,
    ) -> Result<(), PersistenceError> {
        let committed = self
            .chat
            .as_mut()
            .is_some_and(|chat| chat.complete(stream_id, full_text));
        if committed {
            self.persist_open_transcript()?;
        }
        Ok(())
    }

    pub fn fail_response(&mut self, stream_id: u64, error: &DeliveryError) {
        if let Some(chat) = self.chat.as_mut() {
            chat.fail(stream_id, error);
        }
    }

    /// Empty the open conversation and persist the empty transcript.
    pub fn clear_chat(&mut self) -> Result<(), PersistenceError> {
        let Some(chat) = self.chat.as_mut() else {
            return Ok(());
        };
        chat.clear();
        info!(persona = chat.persona_id(), "chat cleared");
        self.ui.chat_scroll = 0;
        self.persist_open_transcript()
    }

    pub fn request_exit(&mut self) {
        self.chat = None;
        self.ui.exit_requested = true;
    }

    fn persist_open_transcript(&mut self) -> Result<(), PersistenceError> {
        if let Some(chat) = self.chat.as_ref() {
            self.transcripts
                .replace(chat.persona_id(), chat.turns().to_vec());
            self.store.save_transcripts(self.transcripts.as_map())?;
        }
        Ok(())
    }
}
