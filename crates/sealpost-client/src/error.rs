use sealpost_shared::{CryptoError, EncodingError, SealpostError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status: expected {expected}, got {actual}")]
    UnexpectedStatus {
        expected: reqwest::StatusCode,
        actual: reqwest::StatusCode,
    },

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Key file error: {0}")]
    KeyFile(#[from] SealpostError),
}

impl ClientError {
    /// Whether the server answered, but not with the expected status.
    pub fn is_status(&self) -> bool {
        matches!(self, ClientError::UnexpectedStatus { .. })
    }
}
