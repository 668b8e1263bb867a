//! Configuration module for environment variable parsing.
//!
//! Only non-secret settings live here. Credentials are resolved separately
//! through a [`crate::secrets::SecretStore`], using the secret names below.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Base URL of the GitHub REST API (GitHub Enterprise Server uses `/api/v3`)
    pub github_api_url: String,

    /// HTTP request timeout in milliseconds for outbound GitHub calls
    pub request_timeout_ms: u64,

    /// User-Agent sent with every GitHub API request
    pub user_agent: String,

    /// When set, secrets are read from files in this directory instead of the environment
    pub secrets_dir: Option<PathBuf>,

    /// Names under which the credentials are stored
    pub secret_names: SecretNames,
}

/// Names of the three credentials in the secret store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretNames {
    pub app_id: String,
    pub private_key: String,
    pub webhook_secret: String,
}

impl Default for SecretNames {
    fn default() -> Self {
        Self {
            app_id: "GITHUB_APP_ID".to_string(),
            private_key: "GITHUB_APP_PRIVATE_KEY".to_string(),
            webhook_secret: "GITHUB_WEBHOOK_SECRET".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            request_timeout_ms: 10_000,
            user_agent: default_user_agent(),
            secrets_dir: None,
            secret_names: SecretNames::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = SecretNames::default();

        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            github_api_url: parse_api_url("GITHUB_API_URL"),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),

            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| default_user_agent()),

            secrets_dir: non_empty("SECRETS_DIR").map(PathBuf::from),

            secret_names: SecretNames {
                app_id: non_empty("SECRET_GITHUB_APP_ID").unwrap_or(defaults.app_id),
                private_key: non_empty("SECRET_GITHUB_APP_PRIVATE_KEY")
                    .unwrap_or(defaults.private_key),
                webhook_secret: non_empty("SECRET_GITHUB_WEBHOOK_SECRET")
                    .unwrap_or(defaults.webhook_secret),
            },
        }
    }
}

fn default_user_agent() -> String {
    format!("release-relay/{}", env!("CARGO_PKG_VERSION"))
}

/// Read an API base URL, falling back to the public API when it does not parse.
fn parse_api_url(name: &str) -> String {
    let raw = match non_empty(name) {
        Some(v) => v,
        None => return DEFAULT_GITHUB_API_URL.to_string(),
    };

    match url::Url::parse(&raw) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {
            raw.trim_end_matches('/').to_string()
        }
        _ => {
            warn!(env_var = name, value = %raw, "Invalid API URL, using default");
            DEFAULT_GITHUB_API_URL.to_string()
        }
    }
}

/// Read an environment variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
