//! GitHub REST client for a GitHub App.
//!
//! [`GitHubApp`] and [`RepositoryApi`] are the only GitHub capabilities the
//! relay depends on; [`AppClient`] implements them over `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{RelayError, RelayResult};
use crate::github::auth::app_jwt;
use crate::github::types::ClientPayload;
use crate::secrets::AppCredentials;

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Repository operations available to an authenticated installation.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// Fetch the raw contents of a file on the default branch.
    async fn fetch_config_file(&self, owner: &str, repo: &str, path: &str) -> RelayResult<String>;

    /// Create a `repository_dispatch` event on `owner/repo`.
    async fn create_dispatch(
        &self,
        owner: &str,
        repo: &str,
        event_type: &str,
        client_payload: &ClientPayload,
    ) -> RelayResult<()>;
}

/// A GitHub App able to act as one of its installations.
#[async_trait]
pub trait GitHubApp: Send + Sync {
    async fn installation(&self, installation_id: u64) -> RelayResult<Box<dyn RepositoryApi>>;
}

#[derive(Deserialize)]
struct AccessToken {
    token: String,
}

#[derive(Serialize)]
struct DispatchRequest<'a> {
    event_type: &'a str,
    client_payload: &'a ClientPayload,
}

/// App-level client. Holds the credentials and mints installation clients.
#[derive(Clone)]
pub struct AppClient {
    http: Client,
    api_url: String,
    credentials: Arc<AppCredentials>,
}

impl AppClient {
    pub fn new(config: &Config, credentials: Arc<AppCredentials>) -> RelayResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

#[async_trait]
impl GitHubApp for AppClient {
    async fn installation(&self, installation_id: u64) -> RelayResult<Box<dyn RepositoryApi>> {
        let private_key = self
            .credentials
            .private_key_pem
            .as_deref()
            .ok_or_else(|| RelayError::Configuration("GitHub App private key not loaded".into()))?;
        let app_id = self
            .credentials
            .app_id
            .ok_or_else(|| RelayError::Configuration("GitHub App ID not configured".into()))?;

        let jwt = app_jwt(app_id, private_key)?;
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url, installation_id
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(jwt)
            .header(header::ACCEPT, JSON_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| RelayError::Auth(format!("token request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Auth(format!(
                "token request returned {}: {}",
                status, body
            )));
        }

        let token: AccessToken = resp
            .json()
            .await
            .map_err(|e| RelayError::Auth(format!("invalid token response: {}", e)))?;

        info!(installation_id = installation_id, "github_installation_authenticated");

        Ok(Box::new(InstallationClient {
            http: self.http.clone(),
            api_url: self.api_url.clone(),
            token: token.token,
        }))
    }
}

/// Client scoped to one installation token.
pub struct InstallationClient {
    http: Client,
    api_url: String,
    token: String,
}

impl InstallationClient {
    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, owner, repo, rest)
    }
}

#[async_trait]
impl RepositoryApi for InstallationClient {
    async fn fetch_config_file(&self, owner: &str, repo: &str, path: &str) -> RelayResult<String> {
        let url = self.repo_url(owner, repo, &format!("contents/{}", path));

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, RAW_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| RelayError::ConfigLoad(format!("failed to get config file: {}", e)))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(RelayError::ConfigLoad(format!(
                "config file not found at {}",
                path
            ))),
            status if status.is_success() => resp
                .text()
                .await
                .map_err(|e| RelayError::ConfigLoad(format!("failed to read config file: {}", e))),
            status => {
                warn!(owner = owner, repo = repo, status_code = status.as_u16(), "github_contents_error");
                Err(RelayError::ConfigLoad(format!(
                    "contents request returned {}",
                    status
                )))
            }
        }
    }

    async fn create_dispatch(
        &self,
        owner: &str,
        repo: &str,
        event_type: &str,
        client_payload: &ClientPayload,
    ) -> RelayResult<()> {
        let url = self.repo_url(owner, repo, "dispatches");
        let target = format!("{}/{}", owner, repo);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, JSON_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&DispatchRequest {
                event_type,
                client_payload,
            })
            .send()
            .await
            .map_err(|e| RelayError::Dispatch {
                target: target.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(RelayError::Dispatch {
            target,
            reason: format!("status {}: {}", status, body),
        })
    }
}
