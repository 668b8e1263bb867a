//! Loading of the per-repository dispatch configuration.

use tracing::{debug, info};

use crate::error::RelayResult;
use crate::github::{DispatchConfig, RepositoryApi, CONFIG_FILE_PATH};

/// Fetch and parse `.github/app-config.yaml` from `owner/repo`.
pub async fn load_app_config(
    api: &dyn RepositoryApi,
    owner: &str,
    repo: &str,
) -> RelayResult<DispatchConfig> {
    info!(owner = owner, repo = repo, path = CONFIG_FILE_PATH, "app_config_loading");

    let content = api.fetch_config_file(owner, repo, CONFIG_FILE_PATH).await?;
    let config = parse_app_config(&content)?;

    info!(dispatches_count = config.dispatches.len(), "app_config_loaded");

    for (i, rule) in config.dispatches.iter().enumerate() {
        debug!(
            rule_index = i,
            event = %rule.event,
            targets_count = rule.targets.len(),
            "app_config_rule"
        );
        for (j, target) in rule.targets.iter().enumerate() {
            debug!(
                rule_index = i,
                target_index = j,
                repo = %target.repo,
                event_type = %target.event_type,
                "app_config_target"
            );
        }
    }

    Ok(config)
}

/// Parse the YAML document. A blank file is an empty configuration.
pub fn parse_app_config(content: &str) -> RelayResult<DispatchConfig> {
    if content.trim().is_empty() {
        return Ok(DispatchConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}
