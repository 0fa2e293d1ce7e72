use std::collections::HashMap;

use anyhow::Context as _;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use fixlane_core::sea_ext::Paginate;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::quote::QuoteStatus;
use fixlane_domain::request::RequestStatus;
use fixlane_marketplace_schema::{jobs, quote_parts, quotes, service_requests};

use crate::domain::repository::QuoteRepository;
use crate::domain::types::{AcceptOutcome, Job, Quote, QuotePart};
use crate::error::MarketplaceError;

use super::{is_unique_violation, parse_column};


#[derive(Clone)]
pub struct DbQuoteRepository {
    pub db: DatabaseConnection,
}

impl DbQuoteRepository {
    /// Load parts for `models` and assemble domain quotes, keeping order.
    async fn with_parts(&self, models: Vec<quotes::Model>) -> Result<Vec<Quote>, MarketplaceError> {
        if models.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let part_models = quote_parts::Entity::find()
            .filter(quote_parts::Column::QuoteId.is_in(ids))
            .order_by_asc(quote_parts::Column::Name)
            .all(&self.db)
            .await
            .context("load quote parts")?;

        let mut parts: HashMap<Uuid, Vec<QuotePart>> = HashMap::new();
        for model in part_models {
            let part = part_from_model(model)?;
            parts.entry(part.quote_id).or_default().push(part);
        }
        Ok(models
            .into_iter()
            .map(|model| {
                let quote_parts = parts.remove(&model.id).unwrap_or_default();
                quote_from_model(model, quote_parts)
            })
            .collect::<anyhow::Result<_>>()?)
    }
}

impl QuoteRepository for DbQuoteRepository {
    async fn create(&self, quote: &Quote) -> Result<bool, MarketplaceError> {
        let quote = quote.clone();
        let created = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    // quoted → quoted matches too, which keeps the row locked
                    // for the rest of the transaction
                    let moved = service_requests::Entity::update_many()
                        .col_expr(
                            service_requests::Column::Status,
                            Expr::value(RequestStatus::Quoted.as_str()),
                        )
                        .col_expr(
                            service_requests::Column::UpdatedAt,
                            Expr::value(quote.created_at),
                        )
                        .filter(service_requests::Column::Id.eq(quote.request_id))
                        .filter(
                            service_requests::Column::Status
                                .is_in(RequestStatus::QUOTABLE.iter().map(|s| s.as_str())),
                        )
                        .exec(txn)
                        .await?;
                    if moved.rows_affected == 0 {
                        return Ok(false);
                    }

                    quotes::ActiveModel {
                        id: Set(quote.id),
                        request_id: Set(quote.request_id),
                        provider_id: Set(quote.provider_id),
                        amount: Set(quote.amount),
                        labor_cost: Set(quote.labor_cost),
                        parts_cost: Set(quote.parts_cost),
                        estimated_duration: Set(quote.estimated_duration.clone()),
                        notes: Set(quote.notes.clone()),
                        includes_warranty: Set(quote.includes_warranty),
                        status: Set(quote.status.as_str().to_owned()),
                        created_at: Set(quote.created_at),
                        updated_at: Set(quote.updated_at),
                    }
                    .insert(txn)
                    .await?;

                    for part in &quote.parts {
                        quote_parts::ActiveModel {
                            id: Set(part.id),
                            quote_id: Set(quote.id),
                            name: Set(part.name.clone()),
                            condition: Set(part.condition.as_str().to_owned()),
                            price: Set(part.price),
                            quantity: Set(part.quantity),
                        }
                        .insert(txn)
                        .await?;
                    }
                    Ok(true)
                })
            })
            .await
            .context("create quote")?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, MarketplaceError> {
        let model = quotes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find quote by id")?;
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(self.with_parts(vec![model]).await?.pop())
    }

    async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<Quote>, MarketplaceError> {
        let models = quotes::Entity::find()
            .filter(quotes::Column::RequestId.eq(request_id))
            .order_by_asc(quotes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list quotes by request")?;
        self.with_parts(models).await
    }

    async fn list_by_provider(
        &self,
        provider_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Quote>, MarketplaceError> {
        let models = quotes::Entity::find()
            .filter(quotes::Column::ProviderId.eq(provider_id))
            .order_by_desc(quotes::Column::CreatedAt)
            .page_by(page)
            .all(&self.db)
            .await
            .context("list quotes by provider")?;
        self.with_parts(models).await
    }

    async fn accept(&self, quote: &Quote, job: &Job) -> Result<AcceptOutcome, MarketplaceError> {
        let txn = self.db.begin().await.context("begin quote acceptance")?;

        let accepted = quotes::Entity::update_many()
            .col_expr(
                quotes::Column::Status,
                Expr::value(QuoteStatus::Accepted.as_str()),
            )
            .col_expr(quotes::Column::UpdatedAt, Expr::value(job.created_at))
            .filter(quotes::Column::Id.eq(quote.id))
            .filter(quotes::Column::Status.eq(QuoteStatus::Pending.as_str()))
            .exec(&txn)
            .await
            .context("accept quote")?;
        if accepted.rows_affected == 0 {
            txn.rollback().await.context("rollback quote acceptance")?;
            return Ok(AcceptOutcome::Lost);
        }

        let moved = service_requests::Entity::update_many()
            .col_expr(
                service_requests::Column::Status,
                Expr::value(RequestStatus::Accepted.as_str()),
            )
            .col_expr(
                service_requests::Column::UpdatedAt,
                Expr::value(job.created_at),
            )
            .filter(service_requests::Column::Id.eq(quote.request_id))
            .filter(
                service_requests::Column::Status
                    .is_in(RequestStatus::QUOTABLE.iter().map(|s| s.as_str())),
            )
            .exec(&txn)
            .await
            .context("advance request to accepted")?;
        if moved.rows_affected == 0 {
            txn.rollback().await.context("rollback quote acceptance")?;
            return Ok(AcceptOutcome::Lost);
        }

        let mut rejected_provider_ids: Vec<Uuid> = quotes::Entity::find()
            .select_only()
            .column(quotes::Column::ProviderId)
            .filter(quotes::Column::RequestId.eq(quote.request_id))
            .filter(quotes::Column::Id.ne(quote.id))
            .filter(quotes::Column::Status.eq(QuoteStatus::Pending.as_str()))
            .into_tuple()
            .all(&txn)
            .await
            .context("find sibling quotes")?;
        rejected_provider_ids.sort_unstable();
        rejected_provider_ids.dedup();

        quotes::Entity::update_many()
            .col_expr(
                quotes::Column::Status,
                Expr::value(QuoteStatus::Rejected.as_str()),
            )
            .col_expr(quotes::Column::UpdatedAt, Expr::value(job.created_at))
            .filter(quotes::Column::RequestId.eq(quote.request_id))
            .filter(quotes::Column::Id.ne(quote.id))
            .filter(quotes::Column::Status.eq(QuoteStatus::Pending.as_str()))
            .exec(&txn)
            .await
            .context("reject sibling quotes")?;

        if let Err(e) = insert_job(&txn, job).await {
            txn.rollback().await.context("rollback quote acceptance")?;
            if is_unique_violation(&e) {
                return Ok(AcceptOutcome::Lost);
            }
            return Err(anyhow::Error::new(e).context("insert job").into());
        }

        txn.commit().await.context("commit quote acceptance")?;
        Ok(AcceptOutcome::Accepted {
            rejected_provider_ids,
        })
    }

    async fn reject(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = quotes::Entity::update_many()
            .col_expr(
                quotes::Column::Status,
                Expr::value(QuoteStatus::Rejected.as_str()),
            )
            .col_expr(quotes::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(quotes::Column::Id.eq(id))
            .filter(quotes::Column::Status.eq(QuoteStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("reject quote")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_job<C: ConnectionTrait>(db: &C, job: &Job) -> Result<(), DbErr> {
    jobs::ActiveModel {
        id: Set(job.id),
        request_id: Set(job.request_id),
        quote_id: Set(job.quote_id),
        owner_id: Set(job.owner_id),
        provider_id: Set(job.provider_id),
        status: Set(job.status.as_str().to_owned()),
        started_at: Set(job.started_at),
        completed_at: Set(job.completed_at),
        created_at: Set(job.created_at),
        updated_at: Set(job.updated_at),
    }
    .insert(db)
    .await?;
    Ok(())
}

fn quote_from_model(model: quotes::Model, parts: Vec<QuotePart>) -> anyhow::Result<Quote> {
    Ok(Quote {
        id: model.id,
        request_id: model.request_id,
        provider_id: model.provider_id,
        amount: model.amount,
        labor_cost: model.labor_cost,
        parts_cost: model.parts_cost,
        estimated_duration: model.estimated_duration,
        notes: model.notes,
        includes_warranty: model.includes_warranty,
        status: parse_column("quotes.status", &model.status)?,
        parts,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn part_from_model(model: quote_parts::Model) -> anyhow::Result<QuotePart> {
    Ok(QuotePart {
        id: model.id,
        quote_id: model.quote_id,
        name: model.name,
        condition: parse_column("quote_parts.condition", &model.condition)?,
        price: model.price,
        quantity: model.quantity,
    })
}
