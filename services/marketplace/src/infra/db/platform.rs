use anyhow::Context as _;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use fixlane_domain::job::JobStatus;
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::request::RequestStatus;
use fixlane_domain::user::{Role, RoleSet};
use fixlane_marketplace_schema::{jobs, payments, service_requests, users};

use crate::domain::repository::PlatformStatsRepository;
use crate::domain::types::PlatformStats;
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct DbPlatformStatsRepository {
    pub db: DatabaseConnection,
}

impl PlatformStatsRepository for DbPlatformStatsRepository {
    async fn stats(&self) -> Result<PlatformStats, MarketplaceError> {
        let users = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        let provider_bit = i16::from(RoleSet::EMPTY.with(Role::Provider).bits());
        let providers = users::Entity::find()
            .filter(Expr::cust_with_values("(roles & $1) <> 0", [provider_bit]))
            .count(&self.db)
            .await
            .context("count providers")?;

        let mut requests_by_status = Vec::with_capacity(RequestStatus::ALL.len());
        for status in RequestStatus::ALL {
            let count = service_requests::Entity::find()
                .filter(service_requests::Column::Status.eq(status.as_str()))
                .count(&self.db)
                .await
                .with_context(|| format!("count {status} requests"))?;
            requests_by_status.push((status, count));
        }

        let completed_jobs = jobs::Entity::find()
            .filter(jobs::Column::Status.eq(JobStatus::Completed.as_str()))
            .count(&self.db)
            .await
            .context("count completed jobs")?;

        let volume: Option<Option<Decimal>> = payments::Entity::find()
            .select_only()
            .column_as(payments::Column::Amount.sum(), "volume")
            .filter(payments::Column::Status.is_in([
                PaymentStatus::Completed.as_str(),
                PaymentStatus::Paid.as_str(),
            ]))
            .into_tuple()
            .one(&self.db)
            .await
            .context("sum payment volume")?;

        Ok(PlatformStats {
            users,
            providers,
            requests_by_status,
            completed_jobs,
            payment_volume: volume.flatten().unwrap_or(Decimal::ZERO),
        })
    }
}
