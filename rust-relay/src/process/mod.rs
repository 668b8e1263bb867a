//! Webhook processing module.
//!
//! Turns a verified webhook payload into repository dispatches according to
//! the source repository's dispatch rules.
//!
//! ## Processing Flow
//!
//! ```text
//! WebhookPayload → installation auth → app-config.yaml → matching rules → dispatches
//! ```

pub mod dispatch;
pub mod repo_config;

use tracing::{error, info};

use crate::error::{RelayError, RelayResult};
use crate::github::{GitHubApp, Rule, WebhookPayload};

pub use dispatch::send_repository_dispatch;
pub use repo_config::{load_app_config, parse_app_config};

/// Event types the relay forwards.
pub const SUPPORTED_EVENTS: &[&str] = &["release"];

/// Outcome of one processed webhook, for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub event_type: String,
    pub sent: usize,
    pub failed: usize,
}

/// Determine the event type carried by a payload.
///
/// A payload is a release event whenever it carries a release object,
/// whatever its action or draft state.
pub fn resolve_event_type(payload: &WebhookPayload) -> RelayResult<&'static str> {
    if payload.release.is_some() {
        let event_type = "release";
        if SUPPORTED_EVENTS.contains(&event_type) {
            return Ok(event_type);
        }
    }
    Err(RelayError::UnsupportedEvent)
}

/// Whether `rule` applies to `event_type`. Exact, case-sensitive match.
pub fn matches_rule(rule: &Rule, event_type: &str) -> bool {
    !event_type.is_empty() && rule.event == event_type
}

/// Process a verified webhook and send repository dispatches based on config.
///
/// Authentication and config loading failures abort the request. A failed
/// dispatch is logged and the remaining targets are still attempted.
pub async fn process_webhook(
    app: &dyn GitHubApp,
    payload: &WebhookPayload,
) -> RelayResult<DispatchSummary> {
    let api = app.installation(payload.installation.id).await?;

    let owner = &payload.repository.owner.login;
    let config = load_app_config(api.as_ref(), owner, &payload.repository.name).await?;

    let event_type = resolve_event_type(payload)?;

    info!(
        event_type = event_type,
        action = %payload.action,
        repo = %payload.repository.full_name,
        "webhook_process_start"
    );

    let mut summary = DispatchSummary {
        event_type: event_type.to_string(),
        sent: 0,
        failed: 0,
    };

    for rule in config.dispatches.iter().filter(|r| matches_rule(r, event_type)) {
        for target in &rule.targets {
            match send_repository_dispatch(api.as_ref(), target, payload, event_type).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    error!(
                        error = %e,
                        target = %format!("{}/{}", owner, target.repo),
                        "dispatch_failed"
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        dispatches_sent = summary.sent,
        dispatches_failed = summary.failed,
        "webhook_process_complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeGitHub;
    use crate::github::types::fixtures::release_payload;
    use crate::github::Release;

    const ONE_RULE: &str = r#"
dispatches:
  - event: release
    targets:
      - repo: deploy
        event_type: source-released
"#;

    fn rule(event: &str) -> Rule {
        Rule {
            event: event.to_string(),
            targets: vec![],
        }
    }

    #[test]
    fn test_resolve_event_type_release() {
        let payload = release_payload();
        assert_eq!(resolve_event_type(&payload).unwrap(), "release");
    }

    #[test]
    fn test_resolve_event_type_draft_release() {
        let mut payload = release_payload();
        payload.action = "created".to_string();
        payload.release = Some(Release {
            id: 456,
            tag_name: "v2.0.0".to_string(),
            name: "Release 2.0.0".to_string(),
            draft: true,
        });
        assert_eq!(resolve_event_type(&payload).unwrap(), "release");
    }

    #[test]
    fn test_resolve_event_type_without_release() {
        let mut payload = release_payload();
        payload.release = None;
        assert!(matches!(
            resolve_event_type(&payload),
            Err(RelayError::UnsupportedEvent)
        ));
    }

    #[test]
    fn test_matches_rule() {
        assert!(matches_rule(&rule("release"), "release"));
        assert!(!matches_rule(&rule("Release"), "release"));
        assert!(!matches_rule(&rule("release"), "RELEASE"));
        assert!(!matches_rule(&rule("push"), "release"));
        assert!(!matches_rule(&rule("releases"), "release"));
        assert!(!matches_rule(&rule(""), ""));
        assert!(!matches_rule(&rule(""), "release"));
        assert!(!matches_rule(&rule("release"), ""));
    }

    #[tokio::test]
    async fn test_process_webhook_single_target() {
        let github = FakeGitHub::with_config(ONE_RULE);

        let summary = process_webhook(&github, &release_payload()).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);

        let dispatches = github.dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].owner, "octo-org");
        assert_eq!(dispatches[0].repo, "deploy");
        assert_eq!(dispatches[0].event_type, "source-released");
        assert_eq!(dispatches[0].payload.source_repo, "octo-org/source-repo");
        assert_eq!(dispatches[0].payload.sender, "octocat");
        assert_eq!(
            dispatches[0].payload.release.as_ref().unwrap().tag_name,
            "v1.0.0"
        );

        assert_eq!(github.installations(), vec![999]);
        assert_eq!(
            github.config_loads(),
            vec![("octo-org".to_string(), "source-repo".to_string())]
        );
    }

    #[tokio::test]
    async fn test_process_webhook_rule_and_target_order() {
        let github = FakeGitHub::with_config(
            r#"
dispatches:
  - event: release
    targets:
      - repo: a
        event_type: one
      - repo: b
        event_type: two
  - event: push
    targets:
      - repo: skipped
        event_type: never
  - event: release
    targets:
      - repo: c
        event_type: three
"#,
        );

        let summary = process_webhook(&github, &release_payload()).await.unwrap();

        assert_eq!(summary.sent, 3);
        let repos: Vec<String> = github.dispatches().into_iter().map(|d| d.repo).collect();
        assert_eq!(repos, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_process_webhook_partial_failure() {
        let github = FakeGitHub::with_config(
            r#"
dispatches:
  - event: release
    targets:
      - repo: ok-1
        event_type: deploy
      - repo: broken
        event_type: deploy
      - repo: ok-2
        event_type: deploy
"#,
        )
        .failing_repo("broken");

        let summary = process_webhook(&github, &release_payload()).await.unwrap();

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);
        let repos: Vec<String> = github.dispatches().into_iter().map(|d| d.repo).collect();
        assert_eq!(repos, vec!["ok-1", "ok-2"]);
    }

    #[tokio::test]
    async fn test_process_webhook_incomplete_target_fails_alone() {
        let github = FakeGitHub::with_config(
            r#"
dispatches:
  - event: release
    targets:
      - repo: good
        event_type: deploy
      - repo: half
"#,
        );

        let summary = process_webhook(&github, &release_payload()).await.unwrap();

        assert_eq!(summary.event_type, "release");
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
        let repos: Vec<String> = github.dispatches().into_iter().map(|d| d.repo).collect();
        assert_eq!(repos, vec!["good"]);
    }

    #[tokio::test]
    async fn test_process_webhook_missing_config() {
        let github = FakeGitHub::default();

        let err = process_webhook(&github, &release_payload()).await.unwrap_err();

        assert!(matches!(err, RelayError::ConfigLoad(_)));
        assert!(github.dispatches().is_empty());
    }

    #[tokio::test]
    async fn test_process_webhook_unparsable_config() {
        let github = FakeGitHub::with_config("dispatches: {{{");

        let err = process_webhook(&github, &release_payload()).await.unwrap_err();

        assert!(matches!(err, RelayError::ConfigParse(_)));
        assert!(github.dispatches().is_empty());
    }

    #[tokio::test]
    async fn test_process_webhook_auth_failure() {
        let github = FakeGitHub::with_config(ONE_RULE).failing_auth();

        let err = process_webhook(&github, &release_payload()).await.unwrap_err();

        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(github.config_loads().is_empty());
        assert!(github.dispatches().is_empty());
    }
}
