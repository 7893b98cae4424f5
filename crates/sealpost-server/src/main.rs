use sealpost_server::config::ServerConfig;
use sealpost_server::Server;
use sealpost_shared::constants::APP_NAME;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sealpost_server=debug")),
        )
        .init();

    info!("Starting {} server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Build the server and seed accounts
    // -----------------------------------------------------------------------
    let server = Server::new(&config);
    server.seed_users(&config.users)?;
    if config.users.is_empty() {
        tracing::warn!("No users configured (SEALPOST_USERS); every request will get 401");
    }

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server until Ctrl+C (graceful shutdown)
    // -----------------------------------------------------------------------
    let listener = TcpListener::bind(config.http_addr).await?;
    server.serve(listener, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C. In-flight requests are allowed to finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
