use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{hash_password, verify_password, User};

/// Credential directory keyed by username.
pub trait UserStore: Send + Sync {
    fn add(&self, user: User) -> Result<()>;
    fn find(&self, username: &str) -> Result<User>;
    fn delete(&self, username: &str) -> Result<()>;

    /// Resolve a username/password pair to a user.
    ///
    /// An unknown user and a wrong password both yield `Ok(None)`, and both
    /// cost one password verification.
    fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.find(username) {
            Ok(user) => Ok(user.authenticate(password).then_some(user)),
            Err(StoreError::UserNotFound(_)) => {
                burn_verification(password);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Run a verification against a fixed hash so a miss takes as long as a
/// wrong password.
fn burn_verification(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get_or_init(|| hash_password("sealpost-dummy-password").ok()) {
        let _ = verify_password(password, hash);
    }
}

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for MemoryUserStore {
    fn add(&self, user: User) -> Result<()> {
        let mut users = self.users.write()?;
        match users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UserAlreadyExists(user.username)),
            Entry::Vacant(slot) => {
                debug!(user = %user.username, "Added user");
                slot.insert(user);
                Ok(())
            }
        }
    }

    fn find(&self, username: &str) -> Result<User> {
        self.users
            .read()?
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }

    fn delete(&self, username: &str) -> Result<()> {
        self.users
            .write()?
            .remove(username)
            .map(|_| debug!(user = %username, "Deleted user"))
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, password: &str) -> User {
        User::new(name, password, format!("{}@example.foo", name.to_lowercase())).unwrap()
    }

    #[test]
    fn test_add_and_find() {
        let store = MemoryUserStore::new();
        store.add(user("MEP", "HELLO")).unwrap();

        let found = store.find("MEP").unwrap();
        assert_eq!(found.username, "MEP");
        assert_eq!(found.email, "mep@example.foo");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_username() {
        let store = MemoryUserStore::new();
        store.add(user("MEP", "HELLO")).unwrap();

        let err = store.add(user("MEP", "OTHER")).unwrap_err();
        assert_eq!(err, StoreError::UserAlreadyExists("MEP".into()));
        assert_eq!(store.len(), 1);
        // First registration wins
        assert!(store.find("MEP").unwrap().authenticate("HELLO"));
    }

    #[test]
    fn test_find_missing() {
        let store = MemoryUserStore::new();
        assert!(matches!(store.find("nobody"), Err(StoreError::UserNotFound(_))));
    }

    #[test]
    fn test_delete() {
        let store = MemoryUserStore::new();
        store.add(user("MEP", "HELLO")).unwrap();

        store.delete("MEP").unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.delete("MEP"), Err(StoreError::UserNotFound(_))));
    }

    #[test]
    fn test_verify_credentials() {
        let store = MemoryUserStore::new();
        store.add(user("ROOT", "GOODBYE")).unwrap();

        let ok = store.verify_credentials("ROOT", "GOODBYE").unwrap();
        assert_eq!(ok.map(|u| u.username), Some("ROOT".to_string()));

        // Wrong password and unknown user look the same to the caller
        assert!(store.verify_credentials("ROOT", "HELLO").unwrap().is_none());
        assert!(store.verify_credentials("MEP", "HELLO").unwrap().is_none());
    }
}
