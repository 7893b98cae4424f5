use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::constants::MESSAGE_ID_SIZE;

/// Message identifier: 64 random bytes, base64url-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; MESSAGE_ID_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short text message as it travels over the wire and sits in the store.
///
/// `content` holds plaintext while `encrypted` is false and base64url
/// ciphertext once it is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub from: String,
    pub to: String,
    pub time_sent: DateTime<Utc>,
    #[serde(rename = "ID")]
    pub id: MessageId,
    pub content: String,
    pub encrypted: bool,
}

impl Message {
    /// New plaintext message stamped with the current time and a fresh ID.
    pub fn new(from: impl Into<String>, to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            time_sent: Utc::now(),
            id: MessageId::generate(),
            content: content.into(),
            encrypted: false,
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.from == user_id || self.to == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_is_64_random_bytes() {
        let id = MessageId::generate();
        let decoded = URL_SAFE.decode(id.as_str()).unwrap();
        assert_eq!(decoded.len(), MESSAGE_ID_SIZE);
        assert!(!id.as_str().contains('+'));
        assert!(!id.as_str().contains('/'));
    }

    #[test]
    fn test_message_ids_differ() {
        assert_ne!(MessageId::generate(), MessageId::generate());
    }

    #[test]
    fn test_new_message_is_plaintext() {
        let msg = Message::new("MEP", "ROOT", "Hello!");
        assert_eq!(msg.from, "MEP");
        assert_eq!(msg.to, "ROOT");
        assert_eq!(msg.content, "Hello!");
        assert!(!msg.encrypted);
    }

    #[test]
    fn test_wire_field_names() {
        let msg = Message::new("MEP", "ROOT", "Hello!");
        let value = serde_json::to_value(&msg).unwrap();
        for field in ["From", "To", "TimeSent", "ID", "Content", "Encrypted"] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["ID"], serde_json::Value::String(msg.id.0.clone()));
    }

    #[test]
    fn test_decode_wire_message() {
        let json = r#"{
            "From": "MEP",
            "To": "ROOT",
            "TimeSent": "2021-03-04T10:11:12.123456789Z",
            "ID": "abc",
            "Content": "Hello!",
            "Encrypted": false
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, MessageId::from("abc"));
        assert!(msg.involves("MEP"));
        assert!(msg.involves("ROOT"));
        assert!(!msg.involves("OTHER"));
    }
}
