use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use sealpost_shared::constants::{MESSAGES_PATH, PUBKEY_PATH};
use sealpost_shared::{Message, RsaJwk};
use sealpost_store::{KeyStore, MessageStore, UserStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{authenticate, Principal};
use crate::cors::{cors_middleware, CorsPolicy};
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub keys: Arc<dyn KeyStore>,
    pub messages: Arc<dyn MessageStore>,
    pub cors: CorsPolicy,
}

/// Every route sits behind CORS (outer) and Basic auth (inner). Paths that
/// are not routed fall through to a plain 404.
///
/// HEAD is routed explicitly, otherwise axum would hand it to the GET
/// handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            PUBKEY_PATH,
            get(get_public_key)
                .post(add_public_key)
                .head(method_not_allowed),
        )
        .route(
            MESSAGES_PATH,
            get(get_messages).post(add_message).head(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            state.users.clone(),
            authenticate,
        ))
        .route_layer(middleware::from_fn_with_state(state.cors, cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    #[serde(rename = "userID")]
    user_id: Option<String>,
}

impl UserQuery {
    /// Rejections become a bare 400 instead of axum's plain-text body.
    fn parse(query: Result<Query<Self>, QueryRejection>) -> Result<Self, ServerError> {
        query
            .map(|Query(query)| query)
            .map_err(|e| ServerError::BadRequest(format!("Invalid query: {e}")))
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

/// Register the caller's public key. The key is filed under the
/// authenticated username, never under a client-supplied identifier.
async fn add_public_key(
    State(state): State<AppState>,
    principal: Principal,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let key = RsaJwk::from_json(&body)
        .and_then(|jwk| jwk.to_public_key())
        .map_err(|e| ServerError::BadRequest(format!("Invalid JWK: {e}")))?;

    state.keys.add_public_key(&principal.username, key)?;

    info!(user = %principal.username, "Public key registered");
    Ok(StatusCode::CREATED)
}

async fn get_public_key(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<RsaJwk>, ServerError> {
    let query = UserQuery::parse(query)?;
    let user_id = query
        .user_id()
        .ok_or_else(|| ServerError::BadRequest("Missing userID".into()))?;

    let key = state.keys.public_key_by_user_id(user_id)?;
    Ok(Json(RsaJwk::from_public_key(&key)))
}

async fn add_message(
    State(state): State<AppState>,
    principal: Principal,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let message: Message = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid message: {e}")))?;

    info!(
        user = %principal.username,
        id = %message.id.short(),
        to = %message.to,
        encrypted = message.encrypted,
        "Message accepted"
    );
    state.messages.add(message)?;
    Ok(StatusCode::OK)
}

/// Messages to or from `userID`, or the caller when the parameter is absent.
async fn get_messages(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Vec<Message>>, ServerError> {
    let query = UserQuery::parse(query)?;
    let user_id = query.user_id().unwrap_or(&principal.username);
    let messages = state.messages.find_all_by_user_id(user_id)?;
    Ok(Json(messages))
}

pub async fn serve<F>(
    state: AppState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
