use chrono::Utc;
use uuid::Uuid;

use fixlane_domain::activity::ActivityKind;
use fixlane_domain::pagination::PageRequest;

use crate::domain::repository::ActivityRepository;
use crate::domain::types::Activity;
use crate::error::MarketplaceError;

/// Append a line to `user_id`'s feed. The feed trails the change it
/// describes, so a failed write is logged and dropped.
pub async fn record_activity<A: ActivityRepository>(
    repo: &A,
    user_id: Uuid,
    kind: ActivityKind,
    description: String,
    entity_id: Option<Uuid>,
) {
    let activity = Activity {
        id: Uuid::now_v7(),
        user_id,
        kind,
        description,
        entity_id,
        created_at: Utc::now(),
    };
    if let Err(e) = repo.record(&activity).await {
        tracing::warn!(error = ?e, %user_id, kind = kind.as_str(), "activity not recorded");
    }
}

// ── ListActivities ───────────────────────────────────────────────────────────

pub struct ListActivitiesUseCase<A: ActivityRepository> {
    pub repo: A,
}

impl<A: ActivityRepository> ListActivitiesUseCase<A> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Activity>, MarketplaceError> {
        self.repo.list(user_id, page.clamped()).await
    }
}
