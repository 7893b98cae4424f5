//! # sealpost-shared
//!
//! Types and cryptography shared by the sealpost server and client: the
//! message wire model, the RSA keypair and its PEM form, the JWK wire form
//! of public keys, and the per-message encryption codec.

pub mod constants;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod jwk;
pub mod types;

pub use error::{CryptoError, EncodingError, SealpostError};
pub use identity::KeyPair;
pub use jwk::RsaJwk;
pub use types::{Message, MessageId};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
