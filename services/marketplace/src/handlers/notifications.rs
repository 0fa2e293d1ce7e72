use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::activity::NotificationKind;
use fixlane_domain::pagination::PageRequest;

use crate::domain::types::Notification;
use crate::error::MarketplaceError;
use crate::handlers::messages::MarkedReadResponse;
use crate::state::AppState;
use crate::usecase::notifications::{
    ListNotificationsUseCase, MarkAllNotificationsReadUseCase, MarkNotificationReadUseCase,
    UnreadCountUseCase,
};

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            is_read: notification.is_read,
            link: notification.link,
            created_at: notification.created_at,
        }
    }
}

// ── GET /notifications ───────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct NotificationListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_notifications(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<NotificationResponse>>, MarketplaceError> {
    let usecase = ListNotificationsUseCase {
        repo: state.notification_repo(),
    };
    let notifications = usecase
        .execute(
            identity.user_id,
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

// ── GET /notifications/unread-count ──────────────────────────────────────────

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

pub async fn unread_count(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, MarketplaceError> {
    let usecase = UnreadCountUseCase {
        repo: state.notification_repo(),
    };
    let count = usecase.execute(identity.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

// ── PUT /notifications/{id}/read ─────────────────────────────────────────────

pub async fn mark_notification_read(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = MarkNotificationReadUseCase {
        repo: state.notification_repo(),
    };
    usecase.execute(id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /notifications/read-all ──────────────────────────────────────────────

pub async fn mark_all_notifications_read(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<MarkedReadResponse>, MarketplaceError> {
    let usecase = MarkAllNotificationsReadUseCase {
        repo: state.notification_repo(),
    };
    let updated = usecase.execute(identity.user_id).await?;
    Ok(Json(MarkedReadResponse { updated }))
}
