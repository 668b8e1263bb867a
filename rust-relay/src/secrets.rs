//! Credential loading.
//!
//! The three GitHub App credentials are resolved once at startup through a
//! [`SecretStore`] and then handed to the web server as read-only
//! [`AppCredentials`]. A credential that cannot be loaded is logged and left
//! unset; the operations that need it fail later with a descriptive error.

use std::env;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SecretNames;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret {0} not found")]
    NotFound(String),

    #[error("failed to read secret {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read access to a secrets parameter store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}

/// Secrets taken from environment variables, one variable per secret name.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore;

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        env::var(name).map_err(|_| SecretError::NotFound(name.to_string()))
    }
}

/// Secrets taken from files in a directory, e.g. mounted container secrets.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let path = self.dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(value.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SecretError::NotFound(name.to_string()))
            }
            Err(e) => Err(SecretError::Io {
                name: name.to_string(),
                source: e,
            }),
        }
    }
}

/// GitHub App credentials, read-only after startup.
#[derive(Clone, Default)]
pub struct AppCredentials {
    pub app_id: Option<u64>,
    pub private_key_pem: Option<String>,
    pub webhook_secret: Option<String>,
}

// Secrets must never reach the logs, so only presence is printed.
impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("private_key_configured", &self.private_key_pem.is_some())
            .field("webhook_secret_configured", &self.webhook_secret.is_some())
            .finish()
    }
}

impl AppCredentials {
    /// Resolve all credentials from the store.
    pub async fn load(store: &dyn SecretStore, names: &SecretNames) -> Self {
        let app_id = match fetch(store, &names.app_id, "github_app_id").await {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(id) if id > 0 => {
                    info!(app_id = id, "github_app_id_loaded");
                    Some(id)
                }
                _ => {
                    warn!(secret = %names.app_id, "github_app_id_invalid");
                    None
                }
            },
            None => None,
        };

        let private_key_pem = fetch(store, &names.private_key, "github_app_private_key").await;
        let webhook_secret = fetch(store, &names.webhook_secret, "github_webhook_secret").await;

        Self {
            app_id,
            private_key_pem,
            webhook_secret,
        }
    }
}

async fn fetch(store: &dyn SecretStore, name: &str, label: &'static str) -> Option<String> {
    match store.get_secret(name).await {
        Ok(value) if !value.trim().is_empty() => {
            info!(secret = %name, credential = label, "secret_loaded");
            Some(value)
        }
        Ok(_) => {
            warn!(secret = %name, credential = label, "secret_empty");
            None
        }
        Err(e) => {
            warn!(error = %e, credential = label, "secret_load_failed");
            None
        }
    }
}
