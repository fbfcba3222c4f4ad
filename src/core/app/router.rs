/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Chat,
    Create,
}

/// Which screen is shown and, while chatting, with whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Router {
    view: View,
    active_persona_id: Option<String>,
}

impl Router {
    pub fn view(&self) -> View {
        self.view
    }

    /// The persona whose chat is open. Always `None` outside the chat view.
    pub fn active_persona_id(&self) -> Option<&str> {
        match self.view {
            View::Chat => self.active_persona_id.as_deref(),
            View::Dashboard | View::Create => None,
        }
    }

    pub fn show_chat(&mut self, persona_id: impl Into<String>) {
        self.view = View::Chat;
        self.active_persona_id = Some(persona_id.into());
    }

    pub fn go_home(&mut self) {
        self.view = View::Dashboard;
        self.active_persona_id = None;
    }

    pub fn open_create(&mut self) {
        self.view = View::Create;
        self.active_persona_id = None;
    }
}
