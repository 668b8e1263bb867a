//! GitHub wire types.
//!
//! This module defines:
//! - the subset of the webhook payload the relay consumes
//! - the `.github/app-config.yaml` dispatch rules
//! - the `client_payload` attached to outbound repository dispatches

use serde::{Deserialize, Serialize};

/// Path of the dispatch configuration inside the triggering repository.
pub const CONFIG_FILE_PATH: &str = ".github/app-config.yaml";

// =============================================================================
// Inbound Webhook Payload
// =============================================================================

/// GitHub webhook payload.
///
/// Only the fields needed to route a release are kept; everything else in
/// GitHub's schema is ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub repository: Repository,
    #[serde(default)]
    pub sender: User,
    #[serde(default)]
    pub installation: Installation,
    #[serde(default)]
    pub release: Option<Release>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub id: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Installation {
    pub id: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// GitHub sends `null` for releases created without a title.
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub draft: bool,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Dispatch Configuration (.github/app-config.yaml)
// =============================================================================

/// Dispatch rules read from the source repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub dispatches: Vec<Rule>,
}

/// One source event fanned out to a list of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// A repository (under the source owner) and the dispatch event type to send it.
///
/// Missing keys parse as empty strings; such a target is rejected when it is
/// dispatched, without affecting its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Target {
    pub repo: String,
    pub event_type: String,
}

// =============================================================================
// Outbound Dispatch Payload
// =============================================================================

/// `client_payload` sent with each repository dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPayload {
    pub source_repo: String,
    pub source_event: String,
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub name: String,
    pub draft: bool,
}

impl ClientPayload {
    /// Build the dispatch payload for a webhook and its resolved event type.
    pub fn from_webhook(payload: &WebhookPayload, source_event: &str) -> Self {
        Self {
            source_repo: payload.repository.full_name.clone(),
            source_event: source_event.to_string(),
            sender: payload.sender.login.clone(),
            release: payload.release.as_ref().map(|r| ReleaseInfo {
                tag_name: r.tag_name.clone(),
                name: r.name.clone(),
                draft: r.draft,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Trimmed `release.published` delivery as GitHub sends it.
    pub const RELEASE_PUBLISHED: &str = r#"{
        "action": "published",
        "release": {
            "id": 123,
            "tag_name": "v1.0.0",
            "name": "Release 1.0.0",
            "draft": false,
            "prerelease": false
        },
        "repository": {
            "id": 42,
            "name": "source-repo",
            "full_name": "octo-org/source-repo",
            "private": true,
            "owner": {"login": "octo-org", "id": 7, "type": "Organization"}
        },
        "sender": {"login": "octocat", "id": 1},
        "installation": {"id": 999, "node_id": "MDIz"}
    }"#;

    /// A push delivery, which carries no release.
    pub const PUSH: &str = r#"{
        "ref": "refs/heads/main",
        "repository": {
            "id": 42,
            "name": "source-repo",
            "full_name": "octo-org/source-repo",
            "owner": {"login": "octo-org", "id": 7}
        },
        "sender": {"login": "octocat", "id": 1},
        "installation": {"id": 999}
    }"#;

    pub fn release_payload() -> WebhookPayload {
        serde_json::from_str(RELEASE_PUBLISHED).unwrap()
    }
}
