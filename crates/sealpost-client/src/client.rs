use std::path::Path;

use reqwest::{RequestBuilder, Response, StatusCode};
use sealpost_shared::constants::{MESSAGES_PATH, PUBKEY_PATH, USER_ID_PARAM};
use sealpost_shared::{crypto, EncodingError, KeyPair, Message, RsaJwk, RsaPublicKey};
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::keyfile;

/// HTTP client for a sealpost server.
///
/// Holds the local keypair and the Basic credentials sent with every call.
/// Content is encrypted and decrypted here; the server only ever sees
/// ciphertext for encrypted messages.
pub struct Client {
    http: reqwest::Client,
    server_host: String,
    keys: KeyPair,
    credentials: Option<Credentials>,
}

#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

impl Client {
    /// Create a client using the keypair at `key_path`, generating one if the
    /// file is missing or unusable.
    pub fn new(key_path: impl AsRef<Path>, server_host: impl Into<String>) -> Result<Self, ClientError> {
        let keys = keyfile::load_or_generate(key_path)?;
        Ok(Self::with_keys(keys, server_host))
    }

    pub fn with_keys(keys: KeyPair, server_host: impl Into<String>) -> Self {
        let server_host = server_host.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            server_host,
            keys,
            credentials: None,
        }
    }

    pub fn set_basic_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    /// Publish our public key. The server files it under the authenticated
    /// username; `user_id` is only used for logging.
    pub async fn register_key(&self, user_id: &str) -> Result<(), ClientError> {
        let jwk = RsaJwk::from_public_key(self.keys.public_key());
        let response = self
            .authorized(self.http.post(self.url(PUBKEY_PATH)))
            .json(&jwk)
            .send()
            .await?;

        expect_status(response, StatusCode::CREATED)?;
        info!(user = %user_id, "Registered public key");
        Ok(())
    }

    pub async fn fetch_public_key_by_user_id(&self, user_id: &str) -> Result<RsaPublicKey, ClientError> {
        let response = self
            .authorized(self.http.get(self.url(PUBKEY_PATH)))
            .query(&[(USER_ID_PARAM, user_id)])
            .send()
            .await?;

        let body = expect_status(response, StatusCode::OK)?.bytes().await?;
        let key = RsaJwk::from_json(&body)?.to_public_key()?;
        debug!(user = %user_id, "Fetched public key");
        Ok(key)
    }

    /// Post `message` as-is.
    pub async fn send_message(&self, message: &Message) -> Result<(), ClientError> {
        let response = self
            .authorized(self.http.post(self.url(MESSAGES_PATH)))
            .json(message)
            .send()
            .await?;

        expect_status(response, StatusCode::OK)?;
        debug!(id = %message.id.short(), to = %message.to, encrypted = message.encrypted, "Sent message");
        Ok(())
    }

    /// Encrypt `message` to `recipient_key` and post it. Content longer than
    /// the key allows fails before anything is sent.
    pub async fn send_encrypted_message(
        &self,
        mut message: Message,
        recipient_key: &RsaPublicKey,
    ) -> Result<(), ClientError> {
        crypto::encrypt_for_recipient(&mut message, recipient_key)?;
        self.send_message(&message).await
    }

    /// Messages to or from `user_id`. Encrypted messages are decrypted with
    /// our private key; one we cannot decrypt (such as our own message to
    /// someone else) is returned still encrypted.
    pub async fn get_messages(&self, user_id: &str) -> Result<Vec<Message>, ClientError> {
        let response = self
            .authorized(self.http.get(self.url(MESSAGES_PATH)))
            .query(&[(USER_ID_PARAM, user_id)])
            .send()
            .await?;

        let body = expect_status(response, StatusCode::OK)?.bytes().await?;
        let mut messages: Vec<Message> =
            serde_json::from_slice(&body).map_err(EncodingError::from)?;

        for message in messages.iter_mut().filter(|m| m.encrypted) {
            if let Err(e) = crypto::decrypt_as_recipient(message, self.keys.private_key()) {
                warn!(id = %message.id.short(), error = %e, "Leaving message encrypted");
            }
        }

        Ok(messages)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_host, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("server_host", &self.server_host)
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}

fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ClientError> {
    let actual = response.status();
    if actual != expected {
        warn!(url = %response.url(), %expected, %actual, "Unexpected response status");
        return Err(ClientError::UnexpectedStatus { expected, actual });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let keys = KeyPair::generate().unwrap();
        let client = Client::with_keys(keys, "http://localhost:8080/");
        assert_eq!(client.url(PUBKEY_PATH), "http://localhost:8080/pubkey");
    }

    #[test]
    fn test_debug_hides_password() {
        let keys = KeyPair::generate().unwrap();
        let mut client = Client::with_keys(keys, "http://localhost:8080");
        client.set_basic_auth("MEP", "HELLO");

        let debug = format!("{client:?}");
        assert!(debug.contains("MEP"));
        assert!(!debug.contains("HELLO"));
    }

    #[tokio::test]
    async fn test_oversized_content_fails_before_sending() {
        let keys = KeyPair::generate().unwrap();
        // Nothing listens here; reaching the network would be a transport error
        let client = Client::with_keys(keys.clone(), "http://127.0.0.1:9");

        let content = "x".repeat(keys.max_plaintext_len() + 1);
        let err = client
            .send_encrypted_message(Message::new("MEP", "ROOT", content), keys.public_key())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Crypto(sealpost_shared::CryptoError::PlaintextTooLong { .. })
        ));
    }
}
