use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::user::Lens;
use fixlane_marketplace_schema::payments;

use crate::domain::repository::PaymentRepository;
use crate::domain::types::Payment;
use crate::error::MarketplaceError;

use super::{is_unique_violation, parse_column};

#[derive(Clone)]
pub struct DbPaymentRepository {
    pub db: DatabaseConnection,
}

impl DbPaymentRepository {
    async fn move_status(
        &self,
        id: Uuid,
        from: &[PaymentStatus],
        to: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<bool, MarketplaceError> {
        let now = Utc::now();
        let mut update = payments::Entity::update_many()
            .col_expr(payments::Column::Status, Expr::value(to.as_str()))
            .col_expr(payments::Column::UpdatedAt, Expr::value(paid_at.unwrap_or(now)))
            .filter(payments::Column::Id.eq(id))
            .filter(payments::Column::Status.is_in(from.iter().map(|s| s.as_str())));
        if let Some(paid_at) = paid_at {
            update = update.col_expr(payments::Column::PaidAt, Expr::value(Some(paid_at)));
        }
        let result = update
            .exec(&self.db)
            .await
            .with_context(|| format!("move payment {id} to {to}"))?;
        Ok(result.rows_affected > 0)
    }
}

impl PaymentRepository for DbPaymentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, MarketplaceError> {
        let model = payments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find payment by id")?;
        Ok(model.map(payment_from_model).transpose()?)
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Option<Payment>, MarketplaceError> {
        let model = payments::Entity::find()
            .filter(payments::Column::JobId.eq(job_id))
            .one(&self.db)
            .await
            .context("find payment by job")?;
        Ok(model.map(payment_from_model).transpose()?)
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, MarketplaceError> {
        let model = payments::Entity::find()
            .filter(payments::Column::PaymentIntentId.eq(intent_id))
            .one(&self.db)
            .await
            .context("find payment by intent")?;
        Ok(model.map(payment_from_model).transpose()?)
    }

    async fn create(&self, payment: &Payment) -> Result<(), MarketplaceError> {
        let result = payments::ActiveModel {
            id: Set(payment.id),
            job_id: Set(payment.job_id),
            owner_id: Set(payment.owner_id),
            provider_id: Set(payment.provider_id),
            amount: Set(payment.amount),
            status: Set(payment.status.as_str().to_owned()),
            payment_intent_id: Set(payment.payment_intent_id.clone()),
            paid_at: Set(payment.paid_at),
            created_at: Set(payment.created_at),
            updated_at: Set(payment.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(MarketplaceError::PaymentAlreadyExists(payment.job_id))
            }
            Err(e) => Err(anyhow::Error::new(e).context("create payment").into()),
        }
    }

    async fn list(
        &self,
        user_id: Uuid,
        lens: Lens,
        page: PageRequest,
    ) -> Result<Vec<Payment>, MarketplaceError> {
        let query = match lens {
            Lens::Provider => {
                payments::Entity::find().filter(payments::Column::ProviderId.eq(user_id))
            }
            Lens::Owner => payments::Entity::find().filter(payments::Column::OwnerId.eq(user_id)),
        };
        let models = query
            .order_by_desc(payments::Column::CreatedAt)
            .page_by(page)
            .all(&self.db)
            .await
            .context("list payments")?;
        Ok(models
            .into_iter()
            .map(payment_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, MarketplaceError> {
        self.move_status(
            id,
            &[PaymentStatus::Pending, PaymentStatus::Failed],
            PaymentStatus::Completed,
            Some(at),
        )
        .await
    }

    async fn mark_failed(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        self.move_status(id, &[PaymentStatus::Pending], PaymentStatus::Failed, None)
            .await
    }

    async fn mark_paid(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        self.move_status(id, &[PaymentStatus::Completed], PaymentStatus::Paid, None)
            .await
    }
}

fn payment_from_model(model: payments::Model) -> anyhow::Result<Payment> {
    Ok(Payment {
        id: model.id,
        job_id: model.job_id,
        owner_id: model.owner_id,
        provider_id: model.provider_id,
        amount: model.amount,
        status: parse_column("payments.status", &model.status)?,
        payment_intent_id: model.payment_intent_id,
        paid_at: model.paid_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
