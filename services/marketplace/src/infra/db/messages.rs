use anyhow::Context as _;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use fixlane_marketplace_schema::messages;

use crate::domain::repository::MessageRepository;
use crate::domain::types::Message;
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct DbMessageRepository {
    pub db: DatabaseConnection,
}

impl MessageRepository for DbMessageRepository {
    async fn create(&self, message: &Message) -> Result<(), MarketplaceError> {
        messages::ActiveModel {
            id: Set(message.id),
            job_id: Set(message.job_id),
            sender_id: Set(message.sender_id),
            content: Set(message.content.clone()),
            is_read: Set(message.is_read),
            created_at: Set(message.created_at),
        }
        .insert(&self.db)
        .await
        .context("create message")?;
        Ok(())
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Message>, MarketplaceError> {
        let models = messages::Entity::find()
            .filter(messages::Column::JobId.eq(job_id))
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await
            .context("list messages by job")?;
        Ok(models.into_iter().map(message_from_model).collect())
    }

    async fn last_message(&self, job_id: Uuid) -> Result<Option<Message>, MarketplaceError> {
        let model = messages::Entity::find()
            .filter(messages::Column::JobId.eq(job_id))
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .one(&self.db)
            .await
            .context("find last message")?;
        Ok(model.map(message_from_model))
    }

    async fn count_unread(&self, job_id: Uuid, reader_id: Uuid) -> Result<u64, MarketplaceError> {
        let count = messages::Entity::find()
            .filter(messages::Column::JobId.eq(job_id))
            .filter(messages::Column::SenderId.ne(reader_id))
            .filter(messages::Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .context("count unread messages")?;
        Ok(count)
    }

    async fn mark_read(&self, job_id: Uuid, reader_id: Uuid) -> Result<u64, MarketplaceError> {
        let result = messages::Entity::update_many()
            .col_expr(messages::Column::IsRead, Expr::value(true))
            .filter(messages::Column::JobId.eq(job_id))
            .filter(messages::Column::SenderId.ne(reader_id))
            .filter(messages::Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .context("mark messages read")?;
        Ok(result.rows_affected)
    }
}

fn message_from_model(model: messages::Model) -> Message {
    Message {
        id: model.id,
        job_id: model.job_id,
        sender_id: model.sender_id,
        content: model.content,
        is_read: model.is_read,
        created_at: model.created_at,
    }
}
