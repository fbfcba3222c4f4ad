use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};

use crate::api::Content;
use crate::core::app::App;
use crate::core::builtin_personas::load_builtin_personas;
use crate::core::session::{ChatBackend, ChatSession, DeliveryError, FragmentStream};
use crate::core::storage::MemoryStore;

/// Backend that replays a fixed script of fragments.
pub struct ScriptedBackend {
    open_error: Option<DeliveryError>,
    fragments: Vec<Result<String, DeliveryError>>,
    hang_after_script: bool,
    requests: Mutex<Vec<(String, Vec<Content>)>>,
}

impl ScriptedBackend {
    pub fn new(fragments: Vec<Result<String, DeliveryError>>) -> Self {
        Self {
            open_error: None,
            fragments,
            hang_after_script: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(fragments: &[&str]) -> Self {
        Self::new(fragments.iter().map(|f| Ok(f.to_string())).collect())
    }

    pub fn failing_to_open(error: DeliveryError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::new(Vec::new())
        }
    }

    /// Emits `fragments`, then never finishes.
    pub fn hanging_after(fragments: &[&str]) -> Self {
        Self {
            hang_after_script: true,
            ..Self::replying(fragments)
        }
    }

    /// `(instruction, contents)` for every reply that was opened.
    pub fn requests(&self) -> Vec<(String, Vec<Content>)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn open_reply(
        &self,
        session: &ChatSession,
        user_text: &str,
    ) -> Result<FragmentStream, DeliveryError> {
        self.requests.lock().expect("requests lock").push((
            session.instruction().to_string(),
            session.contents_with(user_text),
        ));
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        let scripted = stream::iter(self.fragments.clone());
        if self.hang_after_script {
            Ok(Box::pin(scripted.chain(stream::pending())))
        } else {
            Ok(Box::pin(scripted))
        }
    }
}

/// App seeded with the builtin personas and an empty in-memory store.
pub fn create_test_app() -> App {
    let mut store = MemoryStore::new();
    store.personas = Some(
        serde_json::to_string(&load_builtin_personas()).expect("encode builtin personas"),
    );
    App::load(Box::new(store)).expect("load test app")
}
