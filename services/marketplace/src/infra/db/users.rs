use anyhow::Context as _;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::user::{Role, RoleSet};
use fixlane_marketplace_schema::users;

use crate::domain::repository::UserRepository;
use crate::domain::types::{ContactUpdate, User};
use crate::error::MarketplaceError;

fn provider_bit() -> i16 {
    i16::from(RoleSet::EMPTY.with(Role::Provider).bits())
}

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            roles: Set(i16::from(user.roles.bits())),
            phone: Set(user.phone.clone()),
            address: Set(user.address.clone()),
            business_name: Set(user.business_name.clone()),
            service_types: Set(serde_json::json!(user.service_types)),
            rating: Set(user.rating),
            review_count: Set(user.review_count),
            is_verified: Set(user.is_verified),
            provider_onboarding_complete: Set(user.provider_onboarding_complete),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if super::is_unique_violation(&e) => {
                Err(MarketplaceError::UserAlreadyExists(user.email.clone()))
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_contact(
        &self,
        id: Uuid,
        update: &ContactUpdate,
    ) -> Result<Option<User>, MarketplaceError> {
        let mut query = users::Entity::update_many()
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id));
        if let Some(name) = &update.name {
            query = query.col_expr(users::Column::Name, Expr::value(name.clone()));
        }
        if let Some(phone) = &update.phone {
            query = query.col_expr(users::Column::Phone, Expr::value(phone.clone()));
        }
        if let Some(address) = &update.address {
            query = query.col_expr(users::Column::Address, Expr::value(address.clone()));
        }
        let result = query.exec(&self.db).await.context("update user contact")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn complete_provider_profile(
        &self,
        id: Uuid,
        business_name: &str,
        service_types: &[String],
    ) -> Result<Option<User>, MarketplaceError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::BusinessName,
                Expr::value(business_name.to_owned()),
            )
            .col_expr(
                users::Column::ServiceTypes,
                Expr::value(serde_json::json!(service_types)),
            )
            .col_expr(users::Column::ProviderOnboardingComplete, Expr::value(true))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("complete provider profile")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list_providers(
        &self,
        service_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError> {
        let mut query = users::Entity::find()
            .filter(Expr::cust_with_values("(roles & $1) <> 0", [provider_bit()]));
        if let Some(service_type) = service_type {
            query = query.filter(Expr::cust_with_values(
                "service_types @> $1",
                [serde_json::json!([service_type])],
            ));
        }
        let models = query
            .order_by_desc(users::Column::Rating)
            .order_by_asc(users::Column::CreatedAt)
            .page_by(page)
            .all(&self.db)
            .await
            .context("list providers")?;
        Ok(models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_featured_providers(&self, limit: u64) -> Result<Vec<User>, MarketplaceError> {
        let models = users::Entity::find()
            .filter(Expr::cust_with_values("(roles & $1) <> 0", [provider_bit()]))
            .filter(users::Column::IsVerified.eq(true))
            .filter(users::Column::ProviderOnboardingComplete.eq(true))
            .order_by_desc(users::Column::Rating)
            .order_by_desc(users::Column::ReviewCount)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list featured providers")?;
        Ok(models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    let bits = u8::try_from(model.roles).context("decode column users.roles")?;
    let roles = RoleSet::from_bits(bits)
        .with_context(|| format!("unknown role bits {bits:#b} on user {}", model.id))?;
    let service_types: Vec<String> =
        serde_json::from_value(model.service_types).context("decode column users.service_types")?;
    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        roles,
        phone: model.phone,
        address: model.address,
        business_name: model.business_name,
        service_types,
        rating: model.rating,
        review_count: model.review_count,
        is_verified: model.is_verified,
        provider_onboarding_complete: model.provider_onboarding_complete,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
