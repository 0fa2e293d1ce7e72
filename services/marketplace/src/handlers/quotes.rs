use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::quote::{PartCondition, QuoteStatus};

use crate::domain::types::{Quote, QuotePart};
use crate::error::MarketplaceError;
use crate::handlers::jobs::JobResponse;
use crate::state::AppState;
use crate::usecase::quotes::{
    AcceptQuoteUseCase, CreateQuoteInput, CreateQuoteUseCase, ListMyQuotesUseCase,
    ListQuotesForRequestUseCase, PartInput, RejectQuoteUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub provider_id: Uuid,
    pub amount: Decimal,
    pub labor_cost: Option<Decimal>,
    pub parts_cost: Option<Decimal>,
    pub estimated_duration: String,
    pub notes: Option<String>,
    pub includes_warranty: bool,
    pub status: QuoteStatus,
    pub parts: Vec<QuotePartResponse>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct QuotePartResponse {
    pub id: Uuid,
    pub name: String,
    pub condition: PartCondition,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<QuotePart> for QuotePartResponse {
    fn from(part: QuotePart) -> Self {
        Self {
            id: part.id,
            name: part.name,
            condition: part.condition,
            price: part.price,
            quantity: part.quantity,
        }
    }
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            request_id: quote.request_id,
            provider_id: quote.provider_id,
            amount: quote.amount,
            labor_cost: quote.labor_cost,
            parts_cost: quote.parts_cost,
            estimated_duration: quote.estimated_duration,
            notes: quote.notes,
            includes_warranty: quote.includes_warranty,
            status: quote.status,
            parts: quote.parts.into_iter().map(Into::into).collect(),
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }
}

// ── POST /quotes ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct QuotePartRequest {
    pub name: String,
    pub condition: PartCondition,
    pub price: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Money fields arrive as decimal strings, e.g. `"150.00"`.
#[derive(Deserialize)]
pub struct CreateQuoteRequest {
    pub request_id: Uuid,
    pub amount: String,
    pub labor_cost: Option<String>,
    pub parts_cost: Option<String>,
    pub estimated_duration: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub includes_warranty: bool,
    #[serde(default)]
    pub parts: Vec<QuotePartRequest>,
}

pub async fn create_quote(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteResponse>), MarketplaceError> {
    let usecase = CreateQuoteUseCase {
        requests: state.request_repo(),
        quotes: state.quote_repo(),
        activities: state.activity_repo(),
        notifier: state.notifier(),
    };
    let input = CreateQuoteInput {
        request_id: body.request_id,
        amount: body.amount,
        labor_cost: body.labor_cost,
        parts_cost: body.parts_cost,
        estimated_duration: body.estimated_duration,
        notes: body.notes,
        includes_warranty: body.includes_warranty,
        parts: body
            .parts
            .into_iter()
            .map(|p| PartInput {
                name: p.name,
                condition: p.condition,
                price: p.price,
                quantity: p.quantity,
            })
            .collect(),
    };
    let quote = usecase
        .execute(identity.user_id, identity.roles, input)
        .await?;
    Ok((StatusCode::CREATED, Json(quote.into())))
}

// ── GET /quotes/request/{request_id} ─────────────────────────────────────────

pub async fn list_request_quotes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Vec<QuoteResponse>>, MarketplaceError> {
    let usecase = ListQuotesForRequestUseCase {
        requests: state.request_repo(),
        quotes: state.quote_repo(),
    };
    let quotes = usecase
        .execute(request_id, identity.user_id, identity.roles)
        .await?;
    Ok(Json(quotes.into_iter().map(Into::into).collect()))
}

// ── GET /quotes/mine ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct MyQuotesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_my_quotes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<MyQuotesQuery>,
) -> Result<Json<Vec<QuoteResponse>>, MarketplaceError> {
    let usecase = ListMyQuotesUseCase {
        repo: state.quote_repo(),
    };
    let quotes = usecase
        .execute(
            identity.user_id,
            identity.roles,
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(Json(quotes.into_iter().map(Into::into).collect()))
}

// ── POST /quotes/{id}/accept ─────────────────────────────────────────────────

pub async fn accept_quote(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, MarketplaceError> {
    let usecase = AcceptQuoteUseCase {
        requests: state.request_repo(),
        quotes: state.quote_repo(),
        activities: state.activity_repo(),
        notifier: state.notifier(),
    };
    let job = usecase.execute(id, identity.user_id).await?;
    Ok(Json(job.into()))
}

// ── POST /quotes/{id}/reject ─────────────────────────────────────────────────

pub async fn reject_quote(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = RejectQuoteUseCase {
        requests: state.request_repo(),
        quotes: state.quote_repo(),
        notifier: state.notifier(),
    };
    usecase.execute(id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
