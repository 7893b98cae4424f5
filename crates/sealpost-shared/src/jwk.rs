//! JSON Web Key (RFC 7517) representation of an RSA public key, the wire
//! format of the public key directory.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};

use crate::constants::{JWK_ALG_RSA1_5, JWK_KTY_RSA};
use crate::error::EncodingError;

/// An RSA public JWK. `n` and `e` are unsigned big-endian integers encoded
/// as unpadded base64url without leading zero bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RsaJwk {
    pub kty: String,
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl RsaJwk {
    pub fn from_public_key(key: &RsaPublicKey) -> Self {
        Self {
            kty: JWK_KTY_RSA.to_string(),
            n: encode_uint(key.n()),
            e: encode_uint(key.e()),
            alg: Some(JWK_ALG_RSA1_5.to_string()),
            key_use: Some("enc".to_string()),
            kid: None,
        }
    }

    pub fn to_public_key(&self) -> Result<RsaPublicKey, EncodingError> {
        if self.kty != JWK_KTY_RSA {
            return Err(EncodingError::Jwk(format!(
                "unsupported key type {:?}",
                self.kty
            )));
        }

        let n = decode_uint(&self.n, "n")?;
        let e = decode_uint(&self.e, "e")?;
        RsaPublicKey::new(n, e).map_err(|err| EncodingError::Jwk(err.to_string()))
    }

    pub fn from_json(data: &[u8]) -> Result<Self, EncodingError> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl From<&RsaPublicKey> for RsaJwk {
    fn from(key: &RsaPublicKey) -> Self {
        Self::from_public_key(key)
    }
}

impl TryFrom<&RsaJwk> for RsaPublicKey {
    type Error = EncodingError;

    fn try_from(jwk: &RsaJwk) -> Result<Self, Self::Error> {
        jwk.to_public_key()
    }
}

fn encode_uint(value: &BigUint) -> String {
    // to_bytes_be never emits leading zeros (zero itself is a single 0x00)
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

fn decode_uint(value: &str, field: &str) -> Result<BigUint, EncodingError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| EncodingError::Jwk(format!("member {field:?}: {e}")))?;
    if bytes.is_empty() {
        return Err(EncodingError::Jwk(format!("member {field:?} is empty")));
    }
    Ok(BigUint::from_bytes_be(&bytes))
}
