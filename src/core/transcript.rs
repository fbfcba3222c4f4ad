use std::collections::BTreeMap;

use crate::core::message::Turn;

/// Persona id -> ordered turns. A `BTreeMap` keeps serialization stable.
pub type TranscriptMap = BTreeMap<String, Vec<Turn>>;

/// The stored history of every persona's conversation.
///
/// Transcripts are created lazily (an unknown persona reads as empty) and are
/// only ever replaced wholesale, never merged or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBook {
    sessions: TranscriptMap,
}

impl TranscriptBook {
    pub fn new(sessions: TranscriptMap) -> Self {
        Self { sessions }
    }

    pub fn turns(&self, persona_id: &str) -> &[Turn] {
        self.sessions
            .get(persona_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn replace(&mut self, persona_id: &str, turns: Vec<Turn>) {
        self.sessions.insert(persona_id.to_string(), turns);
    }

    pub fn as_map(&self) -> &TranscriptMap {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_persona_reads_as_empty() {
        let book = TranscriptBook::default();
        assert!(book.turns("missing").is_empty());
    }

    #[test]
    fn replace_only_touches_one_persona() {
        let mut book = TranscriptBook::default();
        book.replace("a", vec![Turn::user("hello")]);
        book.replace("b", vec![Turn::user("hi"), Turn::model("hey")]);
        book.replace("a", Vec::new());

        assert!(book.turns("a").is_empty());
        assert_eq!(book.turns("b").len(), 2);
        assert!(book.as_map().contains_key("a"));
    }
}
