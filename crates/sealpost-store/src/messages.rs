use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use sealpost_shared::{Message, MessageId};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Store-and-forward message storage keyed by message ID.
///
/// Query results are snapshots in no particular order.
pub trait MessageStore: Send + Sync {
    fn add(&self, message: Message) -> Result<()>;
    fn delete_by_id(&self, id: &MessageId) -> Result<()>;
    fn find_received_by_user_id(&self, user_id: &str) -> Result<Vec<Message>>;
    fn find_sent_by_user_id(&self, user_id: &str) -> Result<Vec<Message>>;
    /// Messages to or from `user_id`. A note-to-self appears once.
    fn find_all_by_user_id(&self, user_id: &str) -> Result<Vec<Message>>;
}

/// In-memory [`MessageStore`].
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: RwLock<HashMap<MessageId, Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.read().map(|messages| messages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // One pass over the map per query, so every message is considered once.
    fn filter<F>(&self, predicate: F) -> Result<Vec<Message>>
    where
        F: Fn(&Message) -> bool,
    {
        let messages = self.messages.read()?;
        Ok(messages
            .values()
            .filter(|message| predicate(message))
            .cloned()
            .collect())
    }
}

impl MessageStore for MemoryMessageStore {
    fn add(&self, message: Message) -> Result<()> {
        let mut messages = self.messages.write()?;
        match messages.entry(message.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(message.id)),
            Entry::Vacant(slot) => {
                debug!(id = %message.id.short(), from = %message.from, to = %message.to, "Stored message");
                slot.insert(message);
                Ok(())
            }
        }
    }

    fn delete_by_id(&self, id: &MessageId) -> Result<()> {
        self.messages
            .write()?
            .remove(id)
            .map(|_| debug!(id = %id.short(), "Deleted message"))
            .ok_or_else(|| StoreError::MessageNotFound(id.clone()))
    }

    fn find_received_by_user_id(&self, user_id: &str) -> Result<Vec<Message>> {
        self.filter(|message| message.to == user_id)
    }

    fn find_sent_by_user_id(&self, user_id: &str) -> Result<Vec<Message>> {
        self.filter(|message| message.from == user_id)
    }

    fn find_all_by_user_id(&self, user_id: &str) -> Result<Vec<Message>> {
        self.filter(|message| message.involves(user_id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    fn message(id: &str, from: &str, to: &str) -> Message {
        let mut message = Message::new(from, to, format!("{from} -> {to}"));
        message.id = MessageId::from(id);
        message
    }

    fn ids(messages: &[Message]) -> HashSet<String> {
        messages.iter().map(|m| m.id.0.clone()).collect()
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn populated() -> MemoryMessageStore {
        let store = MemoryMessageStore::new();
        for m in [
            message("0", "A", "B"),
            message("1", "B", "A"),
            message("2", "A", "C"),
            message("3", "C", "B"),
            message("4", "A", "A"),
            message("5", "C", "A"),
        ] {
            store.add(m).unwrap();
        }
        store
    }

    #[test]
    fn test_add() {
        let store = MemoryMessageStore::new();
        let m = Message::new("PEM", "MEP", "Test");
        store.add(m.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_received_by_user_id("MEP").unwrap(), vec![m]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryMessageStore::new();
        store.add(message("1", "PEM", "MEP")).unwrap();

        let err = store.add(message("1", "BLAH", "MEP")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(MessageId::from("1")));
        assert_eq!(store.len(), 1);
        // The original survives
        let stored = store.find_received_by_user_id("MEP").unwrap();
        assert_eq!(stored[0].from, "PEM");
    }

    #[test]
    fn test_find_sent() {
        let store = populated();
        let sent = store.find_sent_by_user_id("A").unwrap();
        assert_eq!(ids(&sent), set(&["0", "2", "4"]));
        assert!(sent.iter().all(|m| m.from == "A"));
    }

    #[test]
    fn test_find_received() {
        let store = populated();
        let received = store.find_received_by_user_id("A").unwrap();
        assert_eq!(ids(&received), set(&["1", "4", "5"]));
        assert!(received.iter().all(|m| m.to == "A"));
    }

    #[test]
    fn test_find_all_dedupes_self_message() {
        let store = populated();
        let all = store.find_all_by_user_id("A").unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(ids(&all), set(&["0", "1", "2", "4", "5"]));
        assert_eq!(all.iter().filter(|m| m.id.0 == "4").count(), 1);
    }

    #[test]
    fn test_find_unknown_user() {
        let store = populated();
        assert!(store.find_all_by_user_id("Z").unwrap().is_empty());
    }

    #[test]
    fn test_delete_by_id() {
        let store = populated();
        store.delete_by_id(&MessageId::from("0")).unwrap();
        assert_eq!(store.len(), 5);

        let err = store.delete_by_id(&MessageId::from("foo")).unwrap_err();
        assert_eq!(err, StoreError::MessageNotFound(MessageId::from("foo")));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_concurrent_duplicate_adds() {
        let store = Arc::new(MemoryMessageStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.add(message("same", &format!("U{i}"), "X")))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_adds() {
        let store = Arc::new(MemoryMessageStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.add(Message::new("A", "B", "hi")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 200);
        assert_eq!(store.find_all_by_user_id("B").unwrap().len(), 200);
    }
}
