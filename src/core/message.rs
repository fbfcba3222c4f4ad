use serde::{Deserialize, Serialize};

use crate::core::ids::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }

    pub fn is_user(self) -> bool {
        self == TurnRole::User
    }

    pub fn is_model(self) -> bool {
        self == TurnRole::Model
    }
}

impl AsRef<str> for TurnRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for TurnRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(TurnRole::User),
            "model" => Ok(TurnRole::Model),
            _ => Err(format!("invalid turn role: {value}")),
        }
    }
}

impl TryFrom<String> for TurnRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TurnRole> for String {
    fn from(value: TurnRole) -> Self {
        value.as_str().to_string()
    }
}

/// One message exchanged in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: TurnRole,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: new_id(),
            role,
            text: text.into(),
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text, now_millis())
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Model, text, now_millis())
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_model(&self) -> bool {
        self.role.is_model()
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_as_plain_strings() {
        let turn = Turn::new(TurnRole::Model, "hi", 42);
        let json = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(json["role"], "model");
        assert_eq!(json["timestamp"], 42);
    }

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(TurnRole::try_from("assistant").is_err());
        let raw = r#"{"id":"1","role":"system","text":"x","timestamp":1}"#;
        assert!(serde_json::from_str::<Turn>(raw).is_err());
    }

    #[test]
    fn constructors_assign_distinct_ids() {
        let a = Turn::user("one");
        let b = Turn::user("one");
        assert_ne!(a.id, b.id);
        assert!(a.is_user());
        assert!(Turn::model("two").is_model());
    }
}
