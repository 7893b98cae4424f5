use sealpost_shared::MessageId;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A message with this ID is already stored.
    #[error("Duplicate message id {0}")]
    DuplicateId(MessageId),

    /// No message with this ID is stored.
    #[error("Message {0} does not exist")]
    MessageNotFound(MessageId),

    /// The username is already registered.
    #[error("User {0} already exists")]
    UserAlreadyExists(String),

    #[error("User {0} does not exist")]
    UserNotFound(String),

    /// A public key is already registered for this user ID.
    #[error("Key for {0} already exists")]
    KeyAlreadyExists(String),

    #[error("Key for {0} does not exist")]
    KeyNotFound(String),

    /// Hashing a new password failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// A writer panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Insert refused because the key is taken.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateId(_)
                | StoreError::UserAlreadyExists(_)
                | StoreError::KeyAlreadyExists(_)
        )
    }

    /// Lookup or delete found nothing.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            StoreError::MessageNotFound(_) | StoreError::UserNotFound(_) | StoreError::KeyNotFound(_)
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(StoreError::DuplicateId("a".into()).is_conflict());
        assert!(StoreError::KeyAlreadyExists("u".into()).is_conflict());
        assert!(StoreError::KeyNotFound("u".into()).is_miss());
        assert!(StoreError::MessageNotFound("a".into()).is_miss());
        assert!(!StoreError::Poisoned.is_conflict());
        assert!(!StoreError::Poisoned.is_miss());
    }
}
