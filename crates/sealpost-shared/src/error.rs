use thiserror::Error;

#[derive(Error, Debug)]
pub enum SealpostError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Failed to generate keypair: {0}")]
    KeyGeneration(String),

    #[error("Plaintext too long: {len} bytes (max {max} for this key)")]
    PlaintextTooLong { len: usize, max: usize },

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Malformed ciphertext encoding: {0}")]
    MalformedCiphertext(#[from] base64::DecodeError),

    #[error("Message content is not encrypted")]
    NotEncrypted,

    #[error("Message content is already encrypted")]
    AlreadyEncrypted,
}

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid PEM: {0}")]
    Pem(String),

    #[error("Invalid JWK: {0}")]
    Jwk(String),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
