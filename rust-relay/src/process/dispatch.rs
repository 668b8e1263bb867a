//! Repository dispatch sending.

use tracing::info;

use crate::error::{RelayError, RelayResult};
use crate::github::{ClientPayload, RepositoryApi, Target, WebhookPayload};

/// Send one repository dispatch to `target`.
///
/// Targets are repositories under the same owner as the source repository.
pub async fn send_repository_dispatch(
    api: &dyn RepositoryApi,
    target: &Target,
    payload: &WebhookPayload,
    source_event: &str,
) -> RelayResult<()> {
    let owner = &payload.repository.owner.login;

    if target.repo.is_empty() || target.event_type.is_empty() {
        return Err(RelayError::Dispatch {
            target: format!("{}/{}", owner, target.repo),
            reason: "target needs both repo and event_type".to_string(),
        });
    }

    info!(
        target = %format!("{}/{}", owner, target.repo),
        event_type = %target.event_type,
        "dispatch_sending"
    );

    let client_payload = ClientPayload::from_webhook(payload, source_event);

    api.create_dispatch(owner, &target.repo, &target.event_type, &client_payload)
        .await?;

    info!(
        target = %format!("{}/{}", owner, target.repo),
        event_type = %target.event_type,
        "dispatch_sent"
    );

    Ok(())
}
