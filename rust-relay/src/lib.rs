//! Release Relay - GitHub App webhook relay.
//!
//! Receives `release` webhooks, verifies them, reads the source repository's
//! `.github/app-config.yaml` and sends a `repository_dispatch` to each
//! configured target.
//!
//! ## Architecture
//!
//! ```text
//! GitHub → web (signature) → process (rules) → github (dispatches) → target repos
//! ```

pub mod config;
pub mod error;
pub mod github;
pub mod process;
pub mod secrets;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{RelayError, RelayResult};
pub use github::{AppClient, DispatchConfig, GitHubApp, RepositoryApi, Rule, Target, WebhookPayload};
pub use process::{matches_rule, process_webhook, resolve_event_type, DispatchSummary};
pub use secrets::{AppCredentials, EnvSecretStore, FileSecretStore, SecretStore};
pub use web::AppState;
