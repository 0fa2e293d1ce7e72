use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::activity::ActivityKind;
use fixlane_domain::pagination::PageRequest;

use crate::domain::types::Activity;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::activities::ListActivitiesUseCase;

#[derive(Serialize)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub entity_id: Option<Uuid>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            kind: activity.kind,
            description: activity.description,
            entity_id: activity.entity_id,
            created_at: activity.created_at,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct ActivityListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ── GET /activities ──────────────────────────────────────────────────────────

pub async fn list_activities(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<Vec<ActivityResponse>>, MarketplaceError> {
    let usecase = ListActivitiesUseCase {
        repo: state.activity_repo(),
    };
    let activities = usecase
        .execute(
            identity.user_id,
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(Json(activities.into_iter().map(Into::into).collect()))
}
