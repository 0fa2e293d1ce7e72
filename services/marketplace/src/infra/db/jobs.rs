use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::request::RequestStatus;
use fixlane_domain::user::Lens;
use fixlane_marketplace_schema::{jobs, service_requests};

use crate::domain::repository::JobRepository;
use crate::domain::types::Job;
use crate::error::MarketplaceError;

use super::parse_column;

#[derive(Clone)]
pub struct DbJobRepository {
    pub db: DatabaseConnection,
}

impl JobRepository for DbJobRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, MarketplaceError> {
        let model = jobs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find job by id")?;
        Ok(model.map(job_from_model).transpose()?)
    }

    async fn list(
        &self,
        user_id: Uuid,
        lens: Lens,
        status: Option<JobStatus>,
        page: PageRequest,
    ) -> Result<Vec<Job>, MarketplaceError> {
        let mut query = match lens {
            Lens::Provider => jobs::Entity::find().filter(jobs::Column::ProviderId.eq(user_id)),
            Lens::Owner => jobs::Entity::find().filter(jobs::Column::OwnerId.eq(user_id)),
        };
        if let Some(status) = status {
            query = query.filter(jobs::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_desc(jobs::Column::CreatedAt)
            .page_by(page)
            .all(&self.db)
            .await
            .context("list jobs")?;
        Ok(models
            .into_iter()
            .map(job_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_for_participant(&self, user_id: Uuid) -> Result<Vec<Job>, MarketplaceError> {
        let models = jobs::Entity::find()
            .filter(
                Condition::any()
                    .add(jobs::Column::OwnerId.eq(user_id))
                    .add(jobs::Column::ProviderId.eq(user_id)),
            )
            .order_by_desc(jobs::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list jobs for participant")?;
        Ok(models
            .into_iter()
            .map(job_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn transition(
        &self,
        job: &Job,
        to: JobStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MarketplaceError> {
        let txn = self.db.begin().await.context("begin job transition")?;

        let mut update = jobs::Entity::update_many()
            .col_expr(jobs::Column::Status, Expr::value(to.as_str()))
            .col_expr(jobs::Column::UpdatedAt, Expr::value(at))
            .filter(jobs::Column::Id.eq(job.id))
            .filter(jobs::Column::Status.eq(job.status.as_str()));
        match to {
            JobStatus::InProgress => {
                update = update.col_expr(jobs::Column::StartedAt, Expr::value(Some(at)));
            }
            JobStatus::Completed => {
                update = update.col_expr(jobs::Column::CompletedAt, Expr::value(Some(at)));
            }
            _ => {}
        }
        let moved = update.exec(&txn).await.context("transition job")?;
        if moved.rows_affected == 0 {
            txn.rollback().await.context("rollback job transition")?;
            return Ok(false);
        }

        if let Some(request_status) = to.request_status() {
            let sources = RequestStatus::sources_of(request_status);
            let moved = service_requests::Entity::update_many()
                .col_expr(
                    service_requests::Column::Status,
                    Expr::value(request_status.as_str()),
                )
                .col_expr(service_requests::Column::UpdatedAt, Expr::value(at))
                .filter(service_requests::Column::Id.eq(job.request_id))
                .filter(
                    service_requests::Column::Status.is_in(sources.iter().map(|s| s.as_str())),
                )
                .exec(&txn)
                .await
                .context("transition request with job")?;
            if moved.rows_affected == 0 {
                txn.rollback().await.context("rollback job transition")?;
                return Ok(false);
            }
        }

        txn.commit().await.context("commit job transition")?;
        Ok(true)
    }
}

fn job_from_model(model: jobs::Model) -> anyhow::Result<Job> {
    Ok(Job {
        id: model.id,
        request_id: model.request_id,
        quote_id: model.quote_id,
        owner_id: model.owner_id,
        provider_id: model.provider_id,
        status: parse_column("jobs.status", &model.status)?,
        started_at: model.started_at,
        completed_at: model.completed_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
