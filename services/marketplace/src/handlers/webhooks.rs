use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use bytes::Bytes;
use serde::Serialize;

use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::webhooks::HandleWebhookUseCase;

pub const STRIPE_SIGNATURE: &str = "stripe-signature";

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

// ── POST /webhooks/stripe ────────────────────────────────────────────────────

/// Called by the payment gateway, not through the identity gateway, so no
/// identity headers are expected. The body must stay raw for verification.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, MarketplaceError> {
    let signature = headers
        .get(STRIPE_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| MarketplaceError::invalid_input("missing stripe-signature header"))?;
    if body.is_empty() {
        return Err(MarketplaceError::invalid_input("empty webhook body"));
    }

    let usecase = HandleWebhookUseCase {
        payments: state.payment_repo(),
        activities: state.activity_repo(),
        notifier: state.notifier(),
        secret: state.webhook_secret.clone(),
    };
    usecase
        .execute(&body, signature, chrono::Utc::now())
        .await?;
    Ok(Json(WebhookAck { received: true }))
}
