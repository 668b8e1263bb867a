//! In-memory GitHub used by tests. Records every call it receives.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{RelayError, RelayResult};
use crate::github::{ClientPayload, GitHubApp, RepositoryApi, CONFIG_FILE_PATH};

#[derive(Debug, Clone)]
pub struct RecordedDispatch {
    pub owner: String,
    pub repo: String,
    pub event_type: String,
    pub payload: ClientPayload,
}

#[derive(Default)]
struct Calls {
    installations: Vec<u64>,
    config_loads: Vec<(String, String)>,
    dispatches: Vec<RecordedDispatch>,
}

#[derive(Clone, Default)]
pub struct FakeGitHub {
    config: Option<String>,
    failing_repos: Vec<String>,
    auth_fails: bool,
    calls: Arc<Mutex<Calls>>,
}

impl FakeGitHub {
    pub fn with_config(yaml: &str) -> Self {
        Self {
            config: Some(yaml.to_string()),
            ..Self::default()
        }
    }

    /// Dispatches to `repo` fail as if the connection dropped.
    pub fn failing_repo(mut self, repo: &str) -> Self {
        self.failing_repos.push(repo.to_string());
        self
    }

    /// Behave like an app whose credentials were never loaded.
    pub fn failing_auth(mut self) -> Self {
        self.auth_fails = true;
        self
    }

    pub fn installations(&self) -> Vec<u64> {
        self.calls.lock().unwrap().installations.clone()
    }

    pub fn config_loads(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().config_loads.clone()
    }

    pub fn dispatches(&self) -> Vec<RecordedDispatch> {
        self.calls.lock().unwrap().dispatches.clone()
    }
}

#[async_trait]
impl GitHubApp for FakeGitHub {
    async fn installation(&self, installation_id: u64) -> RelayResult<Box<dyn RepositoryApi>> {
        if self.auth_fails {
            return Err(RelayError::Configuration(
                "GitHub App private key not loaded".to_string(),
            ));
        }
        self.calls.lock().unwrap().installations.push(installation_id);
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl RepositoryApi for FakeGitHub {
    async fn fetch_config_file(&self, owner: &str, repo: &str, path: &str) -> RelayResult<String> {
        assert_eq!(path, CONFIG_FILE_PATH);
        self.calls
            .lock()
            .unwrap()
            .config_loads
            .push((owner.to_string(), repo.to_string()));

        self.config
            .clone()
            .ok_or_else(|| RelayError::ConfigLoad(format!("config file not found at {}", path)))
    }

    async fn create_dispatch(
        &self,
        owner: &str,
        repo: &str,
        event_type: &str,
        client_payload: &ClientPayload,
    ) -> RelayResult<()> {
        if self.failing_repos.iter().any(|r| r == repo) {
            return Err(RelayError::Dispatch {
                target: format!("{}/{}", owner, repo),
                reason: "connection reset by peer".to_string(),
            });
        }

        self.calls.lock().unwrap().dispatches.push(RecordedDispatch {
            owner: owner.to_string(),
            repo: repo.to_string(),
            event_type: event_type.to_string(),
            payload: client_payload.clone(),
        });
        Ok(())
    }
}
