//! # sealpost-server
//!
//! HTTP server for the sealpost messaging service.
//!
//! The server keeps three directories in memory: user credentials, one RSA
//! public key per user and the message store. It never sees plaintext for
//! encrypted messages; clients encrypt to the recipient's public key before
//! posting. Every route requires HTTP Basic authentication and is wrapped in
//! a permissive CORS layer.
//!
//! A [`Server`] owns its stores and builds its own router, so any number of
//! instances can run side by side in one process.

pub mod api;
pub mod auth;
pub mod config;
pub mod cors;
pub mod error;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sealpost_store::{
    KeyStore, MemoryKeyStore, MemoryMessageStore, MemoryUserStore, MessageStore, User, UserStore,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::AppState;
use crate::config::{SeedUser, ServerConfig};
use crate::cors::CorsPolicy;

pub use crate::auth::Principal;
pub use crate::error::ServerError;

#[derive(Clone)]
pub struct Server {
    state: AppState,
}

impl Server {
    /// A server backed by fresh in-memory stores.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryKeyStore::new()),
            Arc::new(MemoryMessageStore::new()),
        )
    }

    pub fn with_stores(
        config: &ServerConfig,
        users: Arc<dyn UserStore>,
        keys: Arc<dyn KeyStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            state: AppState {
                users,
                keys,
                messages,
                cors: CorsPolicy::new(config.cors_max_age_secs),
            },
        }
    }

    /// Create an account. Fails if the username is taken.
    pub fn add_user(&self, username: &str, password: &str, email: &str) -> Result<(), ServerError> {
        let user = User::new(username, password, email)?;
        self.state.users.add(user)?;
        info!(user = %username, "User added");
        Ok(())
    }

    pub fn seed_users(&self, users: &[SeedUser]) -> Result<(), ServerError> {
        for user in users {
            self.add_user(&user.username, &user.password, &user.email)?;
        }
        Ok(())
    }

    pub fn router(&self) -> Router {
        api::build_router(self.state.clone())
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        api::serve(self.state.clone(), listener, shutdown).await
    }

    /// Bind `addr` and serve in a background task. Returns the bound address,
    /// which differs from `addr` when it asks for port 0.
    pub async fn spawn(
        &self,
        addr: SocketAddr,
    ) -> anyhow::Result<(SocketAddr, JoinHandle<anyhow::Result<()>>)> {
        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;

        let server = self.clone();
        let handle = tokio::spawn(async move {
            server
                .serve(listener, std::future::pending::<()>())
                .await
        });

        Ok((bound, handle))
    }
}
