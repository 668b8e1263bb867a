//! Release Relay web server.
//!
//! This binary:
//! - Loads GitHub App credentials once at startup
//! - Receives signed GitHub webhooks
//! - Fans release events out as repository dispatches
//!
//! Credentials are never logged, only whether they were found.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::web::router;
use relay::{AppClient, AppCredentials, AppState, Config, EnvSecretStore, FileSecretStore, SecretStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    let config = Config::from_env();

    let store: Box<dyn SecretStore> = match &config.secrets_dir {
        Some(dir) => Box::new(FileSecretStore::new(dir)),
        None => Box::new(EnvSecretStore),
    };
    let credentials = Arc::new(AppCredentials::load(store.as_ref(), &config.secret_names).await);

    info!(
        port = config.port,
        github_api_url = %config.github_api_url,
        request_timeout_ms = config.request_timeout_ms,
        secrets_from_files = config.secrets_dir.is_some(),
        app_id_configured = credentials.app_id.is_some(),
        private_key_configured = credentials.private_key_pem.is_some(),
        webhook_secret_configured = credentials.webhook_secret.is_some(),
        "config_loaded"
    );

    let github = AppClient::new(&config, credentials.clone())
        .context("Failed to build GitHub client")?;

    let port = config.port;
    let state = AppState::new(config, credentials, Arc::new(github));
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_shutting_down");
}
