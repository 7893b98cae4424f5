use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::constants::{PEM_PRIVATE_KEY_LABEL, PKCS1_V15_OVERHEAD, RSA_KEY_BITS};
use crate::error::{CryptoError, EncodingError};

/// A client's RSA keypair. The private half never leaves the process that
/// generated it, except to the local key file.
#[derive(Clone)]
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyPair {
    /// Generate a new 2048-bit keypair
    pub fn generate() -> Result<Self, CryptoError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Largest plaintext a single PKCS#1 v1.5 block can carry under this key
    pub fn max_plaintext_len(&self) -> usize {
        max_plaintext_len(&self.public_key)
    }

    /// Serialize as two PEM blocks: the PKCS#1 private key followed by the
    /// PKCS#1 public key.
    pub fn to_pem(&self) -> Result<String, EncodingError> {
        let private_pem = EncodeRsaPrivateKey::to_pkcs1_pem(&self.private_key, LineEnding::LF)
            .map_err(|e| EncodingError::Pem(e.to_string()))?;
        let public_pem = EncodeRsaPublicKey::to_pkcs1_pem(&self.public_key, LineEnding::LF)
            .map_err(|e| EncodingError::Pem(e.to_string()))?;

        let mut out = String::with_capacity(private_pem.len() + public_pem.len());
        out.push_str(&private_pem);
        out.push_str(&public_pem);
        Ok(out)
    }

    /// Restore from PEM text. Only the private key block is read; the public
    /// key is derived from it, so a stale or missing public block is harmless.
    pub fn from_pem(pem: &str) -> Result<Self, EncodingError> {
        let block = find_pem_block(pem, PEM_PRIVATE_KEY_LABEL).ok_or_else(|| {
            EncodingError::Pem(format!("no {PEM_PRIVATE_KEY_LABEL} block found"))
        })?;
        let private_key =
            RsaPrivateKey::from_pkcs1_pem(block).map_err(|e| EncodingError::Pem(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &(self.public_key.size() * 8))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

pub fn max_plaintext_len(public_key: &RsaPublicKey) -> usize {
    public_key.size().saturating_sub(PKCS1_V15_OVERHEAD)
}

/// Slice out the first `-----BEGIN <label>-----` .. `-----END <label>-----`
/// block of a multi-block PEM file.
fn find_pem_block<'a>(data: &'a str, label: &str) -> Option<&'a str> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");
    let start = data.find(&begin)?;
    let stop = start + data[start..].find(&end)? + end.len();
    Some(&data[start..stop])
}
