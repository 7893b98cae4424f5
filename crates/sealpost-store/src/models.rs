//! Domain model structs held by the server-side stores.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account. The password is only ever held as an Argon2id
/// PHC string with a per-user random salt.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    password_hash: String,
    pub email: String,
}

impl User {
    /// Create a user, hashing `password` on the way in.
    pub fn new(username: impl Into<String>, password: &str, email: impl Into<String>) -> Result<Self> {
        Ok(Self {
            username: username.into(),
            password_hash: hash_password(password)?,
            email: email.into(),
        })
    }

    /// Check a candidate password against the stored hash.
    ///
    /// Returns only a yes/no; the hash never leaves this type.
    pub fn authenticate(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.password_hash)
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Password hashing
// ---------------------------------------------------------------------------

pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::PasswordHash(e.to_string()))
}

pub(crate) fn verify_password(candidate: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        tracing::error!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate() {
        let user = User::new("MEP", "HELLO", "mep@example.foo").unwrap();
        assert!(user.authenticate("HELLO"));
        assert!(!user.authenticate("hello"));
        assert!(!user.authenticate(""));
    }

    #[test]
    fn test_password_is_salted() {
        let a = User::new("a", "same", "").unwrap();
        let b = User::new("b", "same", "").unwrap();
        assert_ne!(a.password_hash, b.password_hash);
        assert!(a.password_hash.starts_with("$argon2id$"));
        assert!(!a.password_hash.contains("same"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let user = User::new("MEP", "HELLO", "mep@example.foo").unwrap();
        let debug = format!("{user:?}");
        assert!(!debug.contains("argon2"));
        assert!(!debug.contains("HELLO"));
    }
}
