//! Webhook endpoint handlers.
//!
//! The GitHub endpoint maps one delivery to one status code:
//! 1. Missing signature header → 400
//! 2. Invalid signature → 401
//! 3. Unparsable JSON → 400
//! 4. Unsupported event → 200 (no-op, GitHub retries non-2xx deliveries)
//! 5. Processing failure → 500
//! 6. Processed → 200

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::github::{GitHubApp, WebhookPayload};
use crate::process::{process_webhook, resolve_event_type};
use crate::secrets::AppCredentials;
use crate::web::signature::{verify_github_signature, SIGNATURE_HEADER};
use crate::Config;

const DELIVERY_HEADER: &str = "x-github-delivery";
const EVENT_HEADER: &str = "x-github-event";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Arc<AppCredentials>,
    pub github: Arc<dyn GitHubApp>,
}

impl AppState {
    pub fn new(config: Config, credentials: Arc<AppCredentials>, github: Arc<dyn GitHubApp>) -> Self {
        Self {
            config: Arc::new(config),
            credentials,
            github,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched: Option<usize>,
}

impl WebhookResponse {
    fn status(status: &'static str) -> Json<Self> {
        Json(Self {
            status,
            dispatched: None,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// GitHub App webhook endpoint.
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what GitHub signed, before any parsing.
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let delivery = header_str(&headers, DELIVERY_HEADER).unwrap_or("unknown");
    let event_header = header_str(&headers, EVENT_HEADER).unwrap_or("unknown");

    info!(
        delivery = %delivery,
        github_event = %event_header,
        body_length = body.len(),
        "webhook_received"
    );

    let signature = match header_str(&headers, SIGNATURE_HEADER) {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!(delivery = %delivery, "webhook_signature_missing");
            return (
                StatusCode::BAD_REQUEST,
                WebhookResponse::status("missing_signature"),
            );
        }
    };

    if let Err(e) = verify_github_signature(
        state.credentials.webhook_secret.as_deref(),
        &body,
        signature,
    ) {
        warn!(delivery = %delivery, error = %e, "webhook_signature_invalid");
        return (
            StatusCode::UNAUTHORIZED,
            WebhookResponse::status("unauthorized"),
        );
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            error!(delivery = %delivery, error = %e, "webhook_payload_invalid");
            return (
                StatusCode::BAD_REQUEST,
                WebhookResponse::status("invalid_payload"),
            );
        }
    };

    let event_type = match resolve_event_type(&payload) {
        Ok(t) => t,
        Err(e) => {
            warn!(
                delivery = %delivery,
                error = %e,
                repo = %payload.repository.full_name,
                "webhook_event_not_supported"
            );
            return (StatusCode::OK, WebhookResponse::status("not_supported"));
        }
    };

    info!(
        delivery = %delivery,
        event_type = event_type,
        repo = %payload.repository.full_name,
        "webhook_signature_verified"
    );

    match process_webhook(state.github.as_ref(), &payload).await {
        Ok(summary) => {
            info!(
                delivery = %delivery,
                event_type = %summary.event_type,
                dispatched = summary.sent,
                failed = summary.failed,
                "webhook_processed"
            );
            (
                StatusCode::OK,
                Json(WebhookResponse {
                    status: "processed",
                    dispatched: Some(summary.sent),
                }),
            )
        }
        Err(e) if !e.is_fatal() => {
            warn!(delivery = %delivery, error = %e, "webhook_process_skipped");
            (StatusCode::OK, WebhookResponse::status("not_supported"))
        }
        Err(e) => {
            error!(delivery = %delivery, error = %e, "webhook_process_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                WebhookResponse::status("error"),
            )
        }
    }
}
