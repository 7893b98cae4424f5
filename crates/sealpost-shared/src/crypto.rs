use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

use crate::error::CryptoError;
use crate::identity::max_plaintext_len;
use crate::types::Message;

// Single-block RSA PKCS#1 v1.5. No chunking: content longer than
// key size - 11 bytes is rejected outright.
pub fn encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let max = max_plaintext_len(public_key);
    if plaintext.len() > max {
        return Err(CryptoError::PlaintextTooLong {
            len: plaintext.len(),
            max,
        });
    }

    public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)
}

pub fn decrypt(private_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    private_key
        .decrypt_blinded(&mut OsRng, Pkcs1v15Encrypt, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Encrypt `message.content` to the recipient's public key. On success the
/// content becomes base64url ciphertext and `encrypted` is set. On failure
/// the message is left untouched.
pub fn encrypt_for_recipient(
    message: &mut Message,
    recipient_key: &RsaPublicKey,
) -> Result<(), CryptoError> {
    if message.encrypted {
        return Err(CryptoError::AlreadyEncrypted);
    }

    let ciphertext = encrypt(recipient_key, message.content.as_bytes())?;
    message.content = URL_SAFE.encode(ciphertext);
    message.encrypted = true;
    Ok(())
}

/// Reverse of [`encrypt_for_recipient`] using our own private key.
pub fn decrypt_as_recipient(
    message: &mut Message,
    private_key: &RsaPrivateKey,
) -> Result<(), CryptoError> {
    if !message.encrypted {
        return Err(CryptoError::NotEncrypted);
    }

    let ciphertext = URL_SAFE.decode(message.content.as_bytes())?;
    let plaintext = decrypt(private_key, &ciphertext)?;
    message.content = String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)?;
    message.encrypted = false;
    Ok(())
}
