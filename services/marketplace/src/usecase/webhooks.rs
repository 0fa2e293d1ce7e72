use chrono::{DateTime, Utc};

use crate::domain::repository::{
    ActivityRepository, NotificationRepository, PaymentRepository, RealtimePort,
};
use crate::domain::webhook::{
    PAYMENT_INTENT_FAILED, PAYMENT_INTENT_SUCCEEDED, WebhookEvent, verify_signature,
};
use crate::error::MarketplaceError;
use crate::usecase::notifications::Notifier;
use crate::usecase::payments::complete_payment;

// ── HandleWebhook ────────────────────────────────────────────────────────────

/// Applies payment gateway events. Safe under at-least-once delivery.
pub struct HandleWebhookUseCase<Pay, A, N, P>
where
    Pay: PaymentRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub payments: Pay,
    pub activities: A,
    pub notifier: Notifier<N, P>,
    pub secret: Option<String>,
}

impl<Pay, A, N, P> HandleWebhookUseCase<Pay, A, N, P>
where
    Pay: PaymentRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub async fn execute(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        let Some(secret) = self.secret.as_deref() else {
            tracing::warn!("webhook received but no signing secret is configured");
            return Err(MarketplaceError::WebhookRejected);
        };
        if let Err(e) = verify_signature(secret, payload, signature, now.timestamp()) {
            tracing::warn!(reason = %e, "webhook signature rejected");
            return Err(MarketplaceError::WebhookRejected);
        }
        let event = WebhookEvent::parse(payload).map_err(|e| {
            tracing::warn!(error = %e, "webhook payload is not a gateway event");
            MarketplaceError::WebhookRejected
        })?;

        match event.event_type.as_str() {
            PAYMENT_INTENT_SUCCEEDED => self.succeeded(event.intent_id(), now).await,
            PAYMENT_INTENT_FAILED => self.failed(event.intent_id()).await,
            other => {
                tracing::info!(event_type = other, "ignoring webhook event");
                Ok(())
            }
        }
    }

    async fn succeeded(&self, intent_id: &str, now: DateTime<Utc>) -> Result<(), MarketplaceError> {
        let Some(payment) = self.payments.find_by_intent(intent_id).await? else {
            tracing::info!(intent_id, "no payment for succeeded intent");
            return Ok(());
        };
        let applied =
            complete_payment(&self.payments, &self.activities, &self.notifier, &payment, now)
                .await?;
        if !applied {
            tracing::debug!(payment_id = %payment.id, "payment already settled");
        }
        Ok(())
    }

    async fn failed(&self, intent_id: &str) -> Result<(), MarketplaceError> {
        let Some(payment) = self.payments.find_by_intent(intent_id).await? else {
            tracing::info!(intent_id, "no payment for failed intent");
            return Ok(());
        };
        if self.payments.mark_failed(payment.id).await? {
            tracing::info!(payment_id = %payment.id, "payment failed");
        } else {
            tracing::info!(
                payment_id = %payment.id,
                status = %payment.status,
                "failure event ignored"
            );
        }
        Ok(())
    }
}
