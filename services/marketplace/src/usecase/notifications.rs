use chrono::Utc;
use uuid::Uuid;

use fixlane_domain::activity::NotificationKind;
use fixlane_domain::pagination::PageRequest;

use crate::domain::realtime::ServerEvent;
use crate::domain::repository::{NotificationRepository, RealtimePort};
use crate::domain::types::Notification;
use crate::error::MarketplaceError;

// ── Notifier ─────────────────────────────────────────────────────────────────

/// Content of a notification about to be sent.
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Persists a notification, then pushes it to the user's live connections.
pub struct Notifier<N: NotificationRepository, P: RealtimePort> {
    pub repo: N,
    pub realtime: P,
}

impl<N: NotificationRepository, P: RealtimePort> Notifier<N, P> {
    pub async fn send(&self, input: NewNotification) -> Result<Notification, MarketplaceError> {
        let notification = Notification {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            is_read: false,
            link: input.link,
            created_at: Utc::now(),
        };
        self.repo.create(&notification).await?;
        self.realtime
            .send_to_user(notification.user_id, ServerEvent::from(&notification))
            .await;
        tracing::debug!(
            user_id = %notification.user_id,
            kind = notification.kind.as_str(),
            "notification sent"
        );
        Ok(notification)
    }

    /// Send after a committed state change. A failure is logged, never
    /// returned, since the change it reports already happened.
    pub async fn notify(&self, input: NewNotification) {
        let (user_id, kind) = (input.user_id, input.kind);
        if let Err(e) = self.send(input).await {
            tracing::warn!(error = ?e, %user_id, kind = kind.as_str(), "notification not delivered");
        }
    }
}

// ── ListNotifications ────────────────────────────────────────────────────────

pub struct ListNotificationsUseCase<N: NotificationRepository> {
    pub repo: N,
}

impl<N: NotificationRepository> ListNotificationsUseCase<N> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError> {
        self.repo.list(user_id, page.clamped()).await
    }
}

// ── UnreadCount ──────────────────────────────────────────────────────────────

pub struct UnreadCountUseCase<N: NotificationRepository> {
    pub repo: N,
}

impl<N: NotificationRepository> UnreadCountUseCase<N> {
    pub async fn execute(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        self.repo.count_unread(user_id).await
    }
}

// ── MarkNotificationRead ─────────────────────────────────────────────────────

pub struct MarkNotificationReadUseCase<N: NotificationRepository> {
    pub repo: N,
}

impl<N: NotificationRepository> MarkNotificationReadUseCase<N> {
    /// Someone else's notification is reported as not found.
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), MarketplaceError> {
        if self.repo.mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(MarketplaceError::NotificationNotFound(id))
        }
    }
}

// ── MarkAllNotificationsRead ─────────────────────────────────────────────────

pub struct MarkAllNotificationsReadUseCase<N: NotificationRepository> {
    pub repo: N,
}

impl<N: NotificationRepository> MarkAllNotificationsReadUseCase<N> {
    pub async fn execute(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        self.repo.mark_all_read(user_id).await
    }
}
