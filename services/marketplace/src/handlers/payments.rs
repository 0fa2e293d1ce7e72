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
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::user::Lens;

use crate::domain::types::Payment;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::payments::{
    CompletePaymentUseCase, CreateChargeUseCase, CreatePayoutUseCase, ListTransactionsUseCase,
    SettlePaymentUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub owner_id: Uuid,
    pub provider_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_intent_id: String,
    #[serde(serialize_with = "fixlane_core::serde::opt_to_rfc3339_ms")]
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            job_id: payment.job_id,
            owner_id: payment.owner_id,
            provider_id: payment.provider_id,
            amount: payment.amount,
            status: payment.status,
            payment_intent_id: payment.payment_intent_id,
            paid_at: payment.paid_at,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

// ── GET /payments ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct TransactionListQuery {
    pub view: Option<Lens>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_transactions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<PaymentResponse>>, MarketplaceError> {
    let usecase = ListTransactionsUseCase {
        repo: state.payment_repo(),
    };
    let payments = usecase
        .execute(
            identity.user_id,
            identity.roles,
            query.view,
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

// ── POST /payments/charge/{job_id} ───────────────────────────────────────────

#[derive(Serialize)]
pub struct ChargeResponse {
    pub payment_id: Uuid,
    pub client_secret: String,
    pub amount: Decimal,
}

pub async fn create_charge(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ChargeResponse>), MarketplaceError> {
    let usecase = CreateChargeUseCase {
        jobs: state.job_repo(),
        quotes: state.quote_repo(),
        payments: state.payment_repo(),
        gateway: state.gateway.clone(),
        currency: state.settings.currency.clone(),
    };
    let outcome = usecase.execute(job_id, identity.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ChargeResponse {
            payment_id: outcome.payment_id,
            client_secret: outcome.client_secret,
            amount: outcome.amount,
        }),
    ))
}

// ── POST /payments/complete/{payment_id} ─────────────────────────────────────

pub async fn complete_payment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, MarketplaceError> {
    let usecase = CompletePaymentUseCase {
        payments: state.payment_repo(),
        activities: state.activity_repo(),
        notifier: state.notifier(),
    };
    let payment = usecase.execute(payment_id, identity.user_id).await?;
    Ok(Json(payment.into()))
}

// ── POST /payments/payout/{job_id} ───────────────────────────────────────────

#[derive(Serialize)]
pub struct PayoutResponse {
    pub message: String,
    pub amount: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
}

pub async fn create_payout(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<PayoutResponse>, MarketplaceError> {
    let usecase = CreatePayoutUseCase {
        jobs: state.job_repo(),
        payments: state.payment_repo(),
        platform_fee_percent: state.settings.platform_fee_percent,
    };
    let summary = usecase.execute(job_id, identity.user_id).await?;
    Ok(Json(PayoutResponse {
        message: format!("payout of {} scheduled", summary.net_amount),
        amount: summary.amount,
        platform_fee: summary.platform_fee,
        net_amount: summary.net_amount,
    }))
}

// ── POST /payments/settle/{payment_id} ───────────────────────────────────────

pub async fn settle_payment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, MarketplaceError> {
    if !identity.roles.is_admin() {
        return Err(MarketplaceError::forbidden("settling payments requires admin"));
    }
    let usecase = SettlePaymentUseCase {
        repo: state.payment_repo(),
    };
    let payment = usecase.execute(payment_id).await?;
    Ok(Json(payment.into()))
}
