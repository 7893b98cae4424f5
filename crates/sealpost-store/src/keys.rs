use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use sealpost_shared::RsaPublicKey;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Public key directory: at most one key per user ID, insert-once.
pub trait KeyStore: Send + Sync {
    fn add_public_key(&self, user_id: &str, key: RsaPublicKey) -> Result<()>;
    fn public_key_by_user_id(&self, user_id: &str) -> Result<RsaPublicKey>;
    fn delete_public_key_by_user_id(&self, user_id: &str) -> Result<()>;
}

/// In-memory [`KeyStore`].
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, RsaPublicKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyStore for MemoryKeyStore {
    fn add_public_key(&self, user_id: &str, key: RsaPublicKey) -> Result<()> {
        let mut keys = self.keys.write()?;
        match keys.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(StoreError::KeyAlreadyExists(user_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(key);
                debug!(user = %user_id, "Registered public key");
                Ok(())
            }
        }
    }

    fn public_key_by_user_id(&self, user_id: &str) -> Result<RsaPublicKey> {
        self.keys
            .read()?
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound(user_id.to_string()))
    }

    fn delete_public_key_by_user_id(&self, user_id: &str) -> Result<()> {
        self.keys
            .write()?
            .remove(user_id)
            .map(|_| debug!(user = %user_id, "Deleted public key"))
            .ok_or_else(|| StoreError::KeyNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use sealpost_shared::KeyPair;

    fn keys() -> &'static (RsaPublicKey, RsaPublicKey) {
        static KEYS: OnceLock<(RsaPublicKey, RsaPublicKey)> = OnceLock::new();
        KEYS.get_or_init(|| {
            (
                KeyPair::generate().unwrap().public_key().clone(),
                KeyPair::generate().unwrap().public_key().clone(),
            )
        })
    }

    #[test]
    fn test_add_and_lookup() {
        let (k1, _) = keys();
        let store = MemoryKeyStore::new();
        store.add_public_key("MEP", k1.clone()).unwrap();

        assert_eq!(&store.public_key_by_user_id("MEP").unwrap(), k1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_is_one_shot() {
        let (k1, k2) = keys();
        let store = MemoryKeyStore::new();
        store.add_public_key("MEP", k1.clone()).unwrap();

        let err = store.add_public_key("MEP", k2.clone()).unwrap_err();
        assert_eq!(err, StoreError::KeyAlreadyExists("MEP".into()));
        assert_eq!(&store.public_key_by_user_id("MEP").unwrap(), k1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let store = MemoryKeyStore::new();
        let err = store.public_key_by_user_id("ROOT").unwrap_err();
        assert!(err.is_miss());
    }

    #[test]
    fn test_delete() {
        let (k1, k2) = keys();
        let store = MemoryKeyStore::new();
        store.add_public_key("MEP", k1.clone()).unwrap();

        store.delete_public_key_by_user_id("MEP").unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.delete_public_key_by_user_id("MEP"),
            Err(StoreError::KeyNotFound(_))
        ));

        // Deleting frees the slot for a fresh registration
        store.add_public_key("MEP", k2.clone()).unwrap();
        assert_eq!(&store.public_key_by_user_id("MEP").unwrap(), k2);
    }
}
