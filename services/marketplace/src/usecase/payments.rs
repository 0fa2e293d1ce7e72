use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use fixlane_domain::activity::{ActivityKind, NotificationKind};
use fixlane_domain::job::JobStatus;
use fixlane_domain::money::to_minor_units;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::user::{Lens, RoleSet};

use crate::domain::repository::{
    ActivityRepository, JobRepository, NotificationRepository, PaymentGateway,
    PaymentIntentRequest, PaymentRepository, QuoteRepository, RealtimePort,
};
use crate::domain::types::Payment;
use crate::error::MarketplaceError;
use crate::usecase::activities::record_activity;
use crate::usecase::notifications::{NewNotification, Notifier};

/// Move a payment to `completed` and run the completion side effects.
///
/// Returns `false` without side effects when the payment was already
/// settled, so repeated calls and duplicate webhook deliveries are no-ops.
pub async fn complete_payment<Pay, A, N, P>(
    payments: &Pay,
    activities: &A,
    notifier: &Notifier<N, P>,
    payment: &Payment,
    at: DateTime<Utc>,
) -> Result<bool, MarketplaceError>
where
    Pay: PaymentRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    if payment.status.is_settled() {
        return Ok(false);
    }
    if !payments.mark_completed(payment.id, at).await? {
        return Ok(false);
    }
    tracing::info!(payment_id = %payment.id, job_id = %payment.job_id, "payment completed");

    notifier
        .notify(NewNotification {
            user_id: payment.provider_id,
            kind: NotificationKind::PaymentReceived,
            title: "Payment received".to_owned(),
            message: format!("The owner paid {} for the job", payment.amount),
            link: Some(format!("/jobs/{}", payment.job_id)),
        })
        .await;
    record_activity(
        activities,
        payment.owner_id,
        ActivityKind::PaymentCompleted,
        format!("Paid {}", payment.amount),
        Some(payment.id),
    )
    .await;
    Ok(true)
}

// ── CreateCharge ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub payment_id: Uuid,
    pub client_secret: String,
    pub amount: Decimal,
}

pub struct CreateChargeUseCase<J, Q, Pay, G>
where
    J: JobRepository,
    Q: QuoteRepository,
    Pay: PaymentRepository,
    G: PaymentGateway,
{
    pub jobs: J,
    pub quotes: Q,
    pub payments: Pay,
    pub gateway: G,
    pub currency: String,
}

impl<J, Q, Pay, G> CreateChargeUseCase<J, Q, Pay, G>
where
    J: JobRepository,
    Q: QuoteRepository,
    Pay: PaymentRepository,
    G: PaymentGateway,
{
    pub async fn execute(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<ChargeOutcome, MarketplaceError> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(MarketplaceError::JobNotFound(job_id))?;
        if job.owner_id != user_id {
            return Err(MarketplaceError::forbidden(
                "only the job owner can pay for it",
            ));
        }
        if job.status != JobStatus::Completed {
            return Err(MarketplaceError::invalid_state(format!(
                "job {job_id} is {}, only completed jobs can be charged",
                job.status
            )));
        }
        if self.payments.find_by_job(job_id).await?.is_some() {
            return Err(MarketplaceError::PaymentAlreadyExists(job_id));
        }

        let quote = self
            .quotes
            .find_by_id(job.quote_id)
            .await?
            .ok_or(MarketplaceError::QuoteNotFound(job.quote_id))?;
        let minor_units = to_minor_units(quote.amount)
            .with_context(|| format!("quote {} amount out of range", quote.id))?;

        let intent = self
            .gateway
            .create_payment_intent(&PaymentIntentRequest {
                amount: minor_units,
                currency: self.currency.clone(),
                metadata: vec![
                    ("job_id".to_owned(), job.id.to_string()),
                    ("owner_id".to_owned(), job.owner_id.to_string()),
                    ("provider_id".to_owned(), job.provider_id.to_string()),
                ],
            })
            .await?;

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::now_v7(),
            job_id,
            owner_id: job.owner_id,
            provider_id: job.provider_id,
            amount: quote.amount,
            status: PaymentStatus::Pending,
            payment_intent_id: intent.id,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        self.payments.create(&payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            %job_id,
            amount = minor_units,
            "payment intent created"
        );
        Ok(ChargeOutcome {
            payment_id: payment.id,
            client_secret: intent.client_secret,
            amount: payment.amount,
        })
    }
}

// ── CompletePayment ──────────────────────────────────────────────────────────

pub struct CompletePaymentUseCase<Pay, A, N, P>
where
    Pay: PaymentRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub payments: Pay,
    pub activities: A,
    pub notifier: Notifier<N, P>,
}

impl<Pay, A, N, P> CompletePaymentUseCase<Pay, A, N, P>
where
    Pay: PaymentRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    /// Idempotent: a settled payment is returned unchanged.
    pub async fn execute(
        &self,
        payment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Payment, MarketplaceError> {
        let payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or(MarketplaceError::PaymentNotFound(payment_id))?;
        if payment.owner_id != user_id {
            return Err(MarketplaceError::forbidden(
                "only the paying owner can complete a payment",
            ));
        }
        if payment.status.is_settled() {
            return Ok(payment);
        }

        let now = Utc::now();
        if complete_payment(&self.payments, &self.activities, &self.notifier, &payment, now)
            .await?
        {
            return Ok(Payment {
                status: PaymentStatus::Completed,
                paid_at: Some(now),
                updated_at: now,
                ..payment
            });
        }
        // Settled concurrently, most likely by the webhook.
        self.payments
            .find_by_id(payment_id)
            .await?
            .ok_or(MarketplaceError::PaymentNotFound(payment_id))
    }
}

// ── CreatePayout ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutSummary {
    pub amount: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
}

impl PayoutSummary {
    pub fn new(amount: Decimal, platform_fee_percent: u8) -> Self {
        let platform_fee =
            (amount * Decimal::from(platform_fee_percent) / Decimal::ONE_HUNDRED).round_dp(2);
        Self {
            amount,
            platform_fee,
            net_amount: amount - platform_fee,
        }
    }
}

pub struct CreatePayoutUseCase<J: JobRepository, Pay: PaymentRepository> {
    pub jobs: J,
    pub payments: Pay,
    pub platform_fee_percent: u8,
}

impl<J: JobRepository, Pay: PaymentRepository> CreatePayoutUseCase<J, Pay> {
    /// Computes what the provider is owed. Funds are not moved here.
    pub async fn execute(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<PayoutSummary, MarketplaceError> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(MarketplaceError::JobNotFound(job_id))?;
        if job.provider_id != user_id {
            return Err(MarketplaceError::forbidden(
                "only the job's provider can request a payout",
            ));
        }
        let payment = self
            .payments
            .find_by_job(job_id)
            .await?
            .ok_or_else(|| MarketplaceError::invalid_state(format!("job {job_id} has no payment")))?;
        if payment.status != PaymentStatus::Paid {
            return Err(MarketplaceError::invalid_state(format!(
                "payment {} is {}, funds are not cleared yet",
                payment.id, payment.status
            )));
        }
        tracing::info!(%job_id, payment_id = %payment.id, "payout requested");
        Ok(PayoutSummary::new(payment.amount, self.platform_fee_percent))
    }
}

// ── SettlePayment ────────────────────────────────────────────────────────────

pub struct SettlePaymentUseCase<Pay: PaymentRepository> {
    pub repo: Pay,
}

impl<Pay: PaymentRepository> SettlePaymentUseCase<Pay> {
    pub async fn execute(&self, payment_id: Uuid) -> Result<Payment, MarketplaceError> {
        let payment = self
            .repo
            .find_by_id(payment_id)
            .await?
            .ok_or(MarketplaceError::PaymentNotFound(payment_id))?;
        if !self.repo.mark_paid(payment_id).await? {
            return Err(MarketplaceError::invalid_state(format!(
                "payment {payment_id} is {}, expected completed",
                payment.status
            )));
        }
        tracing::info!(%payment_id, "payment settled");
        Ok(Payment {
            status: PaymentStatus::Paid,
            updated_at: Utc::now(),
            ..payment
        })
    }
}

// ── ListTransactions ─────────────────────────────────────────────────────────

pub struct ListTransactionsUseCase<Pay: PaymentRepository> {
    pub repo: Pay,
}

impl<Pay: PaymentRepository> ListTransactionsUseCase<Pay> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        roles: RoleSet,
        view: Option<Lens>,
        page: PageRequest,
    ) -> Result<Vec<Payment>, MarketplaceError> {
        self.repo
            .list(user_id, roles.lens(view), page.clamped())
            .await
    }
}
