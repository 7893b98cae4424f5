//! # sealpost-client
//!
//! Client SDK for the sealpost messaging service.
//!
//! A [`Client`] owns the local RSA keypair (persisted by [`keyfile`]),
//! registers its public key with the server, looks up other users' keys,
//! and sends and retrieves messages. Encryption happens here, never on the
//! server.

pub mod client;
pub mod error;
pub mod keyfile;

pub use client::Client;
pub use error::ClientError;
pub use sealpost_shared::Message;
