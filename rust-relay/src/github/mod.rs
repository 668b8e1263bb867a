//! GitHub module: wire types, app authentication and the REST client.

pub mod auth;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{AppClient, GitHubApp, InstallationClient, RepositoryApi};
pub use types::{
    ClientPayload, DispatchConfig, Installation, Release, ReleaseInfo, Repository, Rule, Target,
    User, WebhookPayload, CONFIG_FILE_PATH,
};
