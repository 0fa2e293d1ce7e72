use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::pagination::PageRequest;
use fixlane_marketplace_schema::activities;

use crate::domain::repository::ActivityRepository;
use crate::domain::types::Activity;
use crate::error::MarketplaceError;

use super::parse_column;

#[derive(Clone)]
pub struct DbActivityRepository {
    pub db: DatabaseConnection,
}

impl ActivityRepository for DbActivityRepository {
    async fn record(&self, activity: &Activity) -> Result<(), MarketplaceError> {
        activities::ActiveModel {
            id: Set(activity.id),
            user_id: Set(activity.user_id),
            kind: Set(activity.kind.as_str().to_owned()),
            description: Set(activity.description.clone()),
            entity_id: Set(activity.entity_id),
            created_at: Set(activity.created_at),
        }
        .insert(&self.db)
        .await
        .context("record activity")?;
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Activity>, MarketplaceError> {
        let models = activities::Entity::find()
            .filter(activities::Column::UserId.eq(user_id))
            .order_by_desc(activities::Column::CreatedAt)
            .page_by(page)
            .all(&self.db)
            .await
            .context("list activities")?;
        Ok(models
            .into_iter()
            .map(|model| {
                Ok(Activity {
                    id: model.id,
                    user_id: model.user_id,
                    kind: parse_column("activities.kind", &model.kind)?,
                    description: model.description,
                    entity_id: model.entity_id,
                    created_at: model.created_at,
                })
            })
            .collect::<anyhow::Result<_>>()?)
    }
}
