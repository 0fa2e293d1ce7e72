use anyhow::Context as _;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::pagination::PageRequest;
use fixlane_marketplace_schema::notifications;

use crate::domain::repository::NotificationRepository;
use crate::domain::types::Notification;
use crate::error::MarketplaceError;

use super::parse_column;

#[derive(Clone)]
pub struct DbNotificationRepository {
    pub db: DatabaseConnection,
}

impl NotificationRepository for DbNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<(), MarketplaceError> {
        notifications::ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            kind: Set(notification.kind.as_str().to_owned()),
            title: Set(notification.title.clone()),
            message: Set(notification.message.clone()),
            is_read: Set(notification.is_read),
            link: Set(notification.link.clone()),
            created_at: Set(notification.created_at),
        }
        .insert(&self.db)
        .await
        .context("create notification")?;
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError> {
        let models = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .page_by(page)
            .all(&self.db)
            .await
            .context("list notifications")?;
        Ok(models
            .into_iter()
            .map(notification_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        let count = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .context("count unread notifications")?;
        Ok(count)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, MarketplaceError> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("mark notification read")?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .context("mark all notifications read")?;
        Ok(result.rows_affected)
    }
}

fn notification_from_model(model: notifications::Model) -> anyhow::Result<Notification> {
    Ok(Notification {
        id: model.id,
        user_id: model.user_id,
        kind: parse_column("notifications.kind", &model.kind)?,
        title: model.title,
        message: model.message,
        is_read: model.is_read,
        link: model.link,
        created_at: model.created_at,
    })
}
