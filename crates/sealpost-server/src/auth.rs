//! HTTP Basic authentication against the user directory.
//!
//! [`authenticate`] runs in front of every routed handler. On success it
//! stores the resolved [`Principal`] in the request extensions; handlers
//! name it as a typed argument instead of fishing it out of a context map.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sealpost_store::UserStore;
use tracing::{debug, warn};

use crate::error::ServerError;

/// The authenticated user behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(ServerError::Unauthorized)
    }
}

/// Reject the request with 401 unless it carries valid Basic credentials.
/// Nothing downstream runs on rejection.
pub async fn authenticate(
    State(users): State<Arc<dyn UserStore>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some((username, password)) = basic_credentials(req.headers()) else {
        debug!(path = %req.uri().path(), "Request without Basic credentials");
        return Err(ServerError::Unauthorized);
    };

    // Argon2 verification is CPU-bound, keep it off the async workers.
    let lookup_name = username.clone();
    let user = tokio::task::spawn_blocking(move || users.verify_credentials(&lookup_name, &password))
        .await
        .map_err(|e| ServerError::Internal(format!("Credential check panicked: {e}")))??;

    let Some(user) = user else {
        warn!(user = %username, "Rejected credentials");
        return Err(ServerError::Unauthorized);
    };

    req.extensions_mut().insert(Principal {
        username: user.username,
    });
    Ok(next.run(req).await)
}

/// Decode `Authorization: Basic base64(user:password)`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_basic_credentials() {
        let encoded = STANDARD.encode("MEP:HELLO");
        assert_eq!(
            basic_credentials(&headers(&format!("Basic {encoded}"))),
            Some(("MEP".to_string(), "HELLO".to_string()))
        );
        assert_eq!(
            basic_credentials(&headers(&format!("basic {encoded}"))),
            Some(("MEP".to_string(), "HELLO".to_string()))
        );
    }

    #[test]
    fn test_password_may_contain_colon() {
        let encoded = STANDARD.encode("MEP:a:b");
        assert_eq!(
            basic_credentials(&headers(&format!("Basic {encoded}"))),
            Some(("MEP".to_string(), "a:b".to_string()))
        );
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
        assert!(basic_credentials(&headers("Bearer abc")).is_none());
        assert!(basic_credentials(&headers("Basic !!!")).is_none());
        let no_colon = STANDARD.encode("MEPHELLO");
        assert!(basic_credentials(&headers(&format!("Basic {no_colon}"))).is_none());
    }
}
