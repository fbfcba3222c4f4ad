use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::chat_stream::StreamParams;
use crate::core::message::{now_millis, Turn, TurnRole};
use crate::core::persona::Persona;
use crate::core::session::{ChatSession, DeliveryError};

/// Whether a reply is being streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    Idle,
    AwaitingReply { stream_id: u64 },
}

/// Conversation with one persona: the visible turns, the backend session
/// and the reply currently being streamed.
///
/// At most one reply is in flight. Output tagged with any other stream id
/// is ignored. Dropping the controller cancels the in-flight reply.
#[derive(Debug)]
pub struct TranscriptController {
    persona_id: String,
    persona_name: String,
    instruction: String,
    turns: Vec<Turn>,
    session: ChatSession,
    state: ReplyState,
    buffer: String,
    pending_user_text: Option<String>,
    cancel_token: Option<CancellationToken>,
}

impl TranscriptController {
    /// Open a conversation seeded with the persona's stored turns.
    pub fn new(persona: &Persona, stored_turns: &[Turn]) -> Self {
        Self {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            instruction: persona.system_instruction.clone(),
            turns: stored_turns.to_vec(),
            session: ChatSession::new(persona.system_instruction.clone(), stored_turns),
            state: ReplyState::Idle,
            buffer: String::new(),
            pending_user_text: None,
            cancel_token: None,
        }
    }

    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Partial reply accumulated so far. Empty when idle.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> ReplyState {
        self.state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self.state, ReplyState::AwaitingReply { .. })
    }

    fn is_current_stream(&self, stream_id: u64) -> bool {
        self.state == ReplyState::AwaitingReply { stream_id }
    }

    /// Append the user's turn and hand back what is needed to stream the
    /// reply. Blank input and submissions while a reply is pending are
    /// ignored.
    pub fn submit(&mut self, text: &str, stream_id: u64) -> Option<StreamParams> {
        let text = text.trim();
        if text.is_empty() || self.is_awaiting_reply() {
            return None;
        }

        self.turns.push(Turn::new(TurnRole::User, text, self.next_timestamp()));
        self.buffer.clear();

        let cancel_token = CancellationToken::new();
        self.cancel_token = Some(cancel_token.clone());
        self.pending_user_text = Some(text.to_string());
        self.state = ReplyState::AwaitingReply { stream_id };
        debug!(persona = %self.persona_id, stream_id, "reply requested");

        Some(StreamParams {
            session: self.session.clone(),
            user_text: text.to_string(),
            cancel_token,
            stream_id,
        })
    }

    /// Extend the partial reply. Returns false for stale streams.
    pub fn append_fragment(&mut self, stream_id: u64, fragment: &str) -> bool {
        if !self.is_current_stream(stream_id) {
            return false;
        }
        self.buffer.push_str(fragment);
        true
    }

    /// Commit the finished reply as a model turn. Returns true when the
    /// transcript changed and should be persisted.
    pub fn complete(&mut self, stream_id: u64, full_text: &str) -> bool {
        if !self.is_current_stream(stream_id) {
            return false;
        }

        self.turns.push(Turn::new(TurnRole::Model, full_text, self.next_timestamp()));
        if let Some(user_text) = self.pending_user_text.take() {
            self.session.record_exchange(&user_text, full_text);
        }
        self.finish_stream();
        true
    }

    /// Abandon the reply after a delivery failure. The user's turn stays.
    pub fn fail(&mut self, stream_id: u64, error: &DeliveryError) -> bool {
        if !self.is_current_stream(stream_id) {
            return false;
        }
        warn!(persona = %self.persona_id, stream_id, error = %error, "reply failed");
        self.pending_user_text = None;
        self.finish_stream();
        true
    }

    /// Forget the conversation and start over with a fresh session.
    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.turns.clear();
        self.session = ChatSession::new(self.instruction.clone(), &[]);
        self.pending_user_text = None;
        self.finish_stream();
    }

    fn finish_stream(&mut self) {
        self.buffer.clear();
        self.cancel_token = None;
        self.state = ReplyState::Idle;
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }

    fn next_timestamp(&self) -> i64 {
        let now = now_millis();
        self.turns
            .last()
            .map_or(now, |last| now.max(last.timestamp))
    }
}

impl Drop for TranscriptController {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persona::PersonaCategory;

    fn zen_guide() -> Persona {
        Persona {
            id: "2".to_string(),
            name: "Zen Guide".to_string(),
            description: "Mindfulness".to_string(),
            category: PersonaCategory::Wellness,
            system_instruction: "Be calm.".to_string(),
            avatar_url: String::new(),
            is_default: true,
        }
    }

    #[test]
    fn submit_appends_user_turn_and_awaits() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        let params = chat.submit("  I feel stressed. ", 1).expect("params");

        assert_eq!(params.user_text, "I feel stressed.");
        assert_eq!(params.stream_id, 1);
        assert_eq!(params.session.instruction(), "Be calm.");
        assert_eq!(chat.turns().len(), 1);
        assert_eq!(chat.turns()[0].role, TurnRole::User);
        assert_eq!(chat.state(), ReplyState::AwaitingReply { stream_id: 1 });
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        assert!(chat.submit("   \n", 1).is_none());
        assert!(chat.turns().is_empty());
        assert_eq!(chat.state(), ReplyState::Idle);
    }

    #[test]
    fn submit_while_awaiting_is_a_no_op() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        chat.submit("first", 1).expect("params");
        assert!(chat.submit("second", 2).is_none());
        assert_eq!(chat.turns().len(), 1);
        assert_eq!(chat.state(), ReplyState::AwaitingReply { stream_id: 1 });
    }

    #[test]
    fn stale_stream_output_is_ignored() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        chat.submit("hi", 5).expect("params");
        assert!(!chat.append_fragment(4, "old"));
        assert!(!chat.complete(4, "old"));
        assert!(!chat.fail(4, &DeliveryError::Cancelled));
        assert_eq!(chat.buffer(), "");
        assert!(chat.is_awaiting_reply());
    }

    #[test]
    fn completion_commits_model_turn_and_records_exchange() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        chat.submit("hi", 1).expect("params");
        chat.append_fragment(1, "Hel");
        assert_eq!(chat.buffer(), "Hel");
        assert!(chat.complete(1, "Hello"));

        assert_eq!(chat.buffer(), "");
        assert_eq!(chat.state(), ReplyState::Idle);
        let roles: Vec<TurnRole> = chat.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TurnRole::User, TurnRole::Model]);
        assert!(chat.turns()[0].timestamp <= chat.turns()[1].timestamp);
        assert_ne!(chat.turns()[0].id, chat.turns()[1].id);
        assert_eq!(chat.session().history().len(), 2);
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let mut future = Turn::user("from the future");
        future.timestamp = now_millis() + 60_000;
        let mut chat = TranscriptController::new(&zen_guide(), &[future.clone()]);
        chat.submit("hi", 1).expect("params");
        chat.complete(1, "hello");
        assert!(chat.turns().iter().all(|t| t.timestamp >= future.timestamp));
    }

    #[test]
    fn failure_keeps_user_turn_and_skips_history() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        chat.submit("hi", 1).expect("params");
        chat.append_fragment(1, "partial");
        assert!(chat.fail(1, &DeliveryError::Transport("reset".to_string())));

        assert_eq!(chat.turns().len(), 1);
        assert_eq!(chat.buffer(), "");
        assert_eq!(chat.state(), ReplyState::Idle);
        assert!(chat.session().history().is_empty());
    }

    #[test]
    fn clear_cancels_and_resets_session() {
        let stored = vec![Turn::user("old"), Turn::model("reply")];
        let mut chat = TranscriptController::new(&zen_guide(), &stored);
        let params = chat.submit("hi", 1).expect("params");
        chat.append_fragment(1, "par");

        chat.clear();
        assert!(params.cancel_token.is_cancelled());
        assert!(chat.turns().is_empty());
        assert!(chat.session().history().is_empty());
        assert_eq!(chat.session().instruction(), "Be calm.");
        assert_eq!(chat.buffer(), "");
        assert_eq!(chat.state(), ReplyState::Idle);
    }

    #[test]
    fn dropping_the_controller_cancels_its_reply() {
        let mut chat = TranscriptController::new(&zen_guide(), &[]);
        let params = chat.submit("hi", 1).expect("params");
        drop(chat);
        assert!(params.cancel_token.is_cancelled());
    }
}
