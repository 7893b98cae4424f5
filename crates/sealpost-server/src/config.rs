//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;

use sealpost_shared::constants::DEFAULT_HTTP_PORT;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Accounts created at startup. There is no HTTP registration endpoint.
    /// Env: `SEALPOST_USERS` as `user:password[:email]`, comma-separated
    /// Default: none
    pub users: Vec<SeedUser>,

    /// `Access-Control-Max-Age` sent on CORS preflight responses.
    /// Env: `CORS_MAX_AGE_SECS`
    /// Default: `86400`
    pub cors_max_age_secs: u64,
}

/// An account to create when the server starts.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            users: Vec::new(),
            cors_max_age_secs: 86_400,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(list) = std::env::var("SEALPOST_USERS") {
            config.users = parse_seed_users(&list);
        }

        if let Ok(val) = std::env::var("CORS_MAX_AGE_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => config.cors_max_age_secs = secs,
                Err(_) => tracing::warn!(value = %val, "Invalid CORS_MAX_AGE_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Parse `user:password[:email]` entries separated by commas. Malformed
/// entries are skipped with a warning that never echoes the password.
fn parse_seed_users(list: &str) -> Vec<SeedUser> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .filter_map(|(index, entry)| {
            let mut parts = entry.splitn(3, ':');
            let username = parts.next().unwrap_or("").trim();
            let password = parts.next().unwrap_or("");
            let email = parts.next().unwrap_or("").trim();

            if username.is_empty() || password.is_empty() {
                tracing::warn!(index, "Skipping malformed SEALPOST_USERS entry");
                return None;
            }

            Some(SeedUser {
                username: username.to_string(),
                password: password.to_string(),
                email: email.to_string(),
            })
        })
        .collect()
}
