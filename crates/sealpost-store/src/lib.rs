//! # sealpost-store
//!
//! Server-side storage for sealpost: the user credential directory, the
//! public key directory and the message store.
//!
//! Each store is a trait with an in-memory implementation. The in-memory
//! stores guard their map with a single `RwLock`: mutations check and write
//! under the write lock, queries clone a snapshot under the read lock. No
//! lock is ever held across an `.await`.

pub mod keys;
pub mod messages;
pub mod models;
pub mod users;

mod error;

pub use error::{Result, StoreError};
pub use keys::{KeyStore, MemoryKeyStore};
pub use messages::{MemoryMessageStore, MessageStore};
pub use models::User;
pub use users::{MemoryUserStore, UserStore};
