//! Web server module for handling inbound GitHub webhooks.
//!
//! This module provides the HTTP surface of the relay:
//! - `POST /webhooks/github` receives signed GitHub App deliveries
//! - `GET /health` for liveness probes

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{github_webhook, health, AppState, HealthResponse, WebhookResponse};
pub use signature::{verify_github_signature, SignatureError, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/github", post(github_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
