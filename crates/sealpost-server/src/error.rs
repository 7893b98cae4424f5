use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sealpost_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Missing or invalid credentials")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Conflicts and misses included: the wire only ever says 500
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Only the status code goes on the wire. The detail stays in the server log.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ServerError::Unauthorized | ServerError::BadRequest(_) => {
                tracing::debug!(status = %status, error = %self, "Request rejected");
            }
            ServerError::Store(e) if e.is_conflict() || e.is_miss() => {
                tracing::warn!(status = %status, error = %self, "Store refused request");
            }
            ServerError::Store(_) | ServerError::Internal(_) => {
                tracing::error!(status = %status, error = %self, "Request failed");
            }
        }

        status.into_response()
    }
}
