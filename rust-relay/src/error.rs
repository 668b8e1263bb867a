//! Error types for the relay.
//!
//! [`RelayError`] covers everything that can stop or degrade the processing
//! of one webhook delivery. Signature failures have their own type in
//! [`crate::web::signature`] because they are answered before the payload is
//! even parsed.

use thiserror::Error;

/// Errors raised while processing a verified webhook delivery.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A credential the operation needs was never loaded.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Could not obtain an installation token.
    #[error("installation authentication failed: {0}")]
    Auth(String),

    /// The dispatch configuration could not be fetched from the repository.
    #[error("failed to load app config: {0}")]
    ConfigLoad(String),

    /// The dispatch configuration was fetched but is not valid YAML for the schema.
    #[error("failed to parse app config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// The payload does not describe an event type the relay handles.
    #[error("unsupported or unknown event type")]
    UnsupportedEvent,

    /// A single repository dispatch could not be delivered.
    #[error("failed to dispatch to {target}: {reason}")]
    Dispatch { target: String, reason: String },

    /// Transport-level failure talking to the GitHub API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RelayError {
    /// Whether the error aborts the whole request.
    ///
    /// Dispatch failures are isolated to their target and unsupported events
    /// are accepted as no-ops.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RelayError::UnsupportedEvent | RelayError::Dispatch { .. }
        )
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
