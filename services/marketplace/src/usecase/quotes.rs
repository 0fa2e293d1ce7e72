use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use fixlane_domain::activity::{ActivityKind, NotificationKind};
use fixlane_domain::job::JobStatus;
use fixlane_domain::money::parse_money;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::quote::{PartCondition, QuoteStatus};
use fixlane_domain::user::RoleSet;

use crate::domain::repository::{
    ActivityRepository, NotificationRepository, QuoteRepository, RealtimePort, RequestRepository,
};
use crate::domain::types::{AcceptOutcome, Job, Quote, QuotePart, non_blank};
use crate::error::MarketplaceError;
use crate::usecase::activities::record_activity;
use crate::usecase::notifications::{NewNotification, Notifier};

fn money(field: &str, value: &str) -> Result<Decimal, MarketplaceError> {
    parse_money(value.trim())
        .map_err(|_| MarketplaceError::invalid_input(format!("{field} must be a decimal like 120.50")))
}

fn optional_money(field: &str, value: Option<&str>) -> Result<Option<Decimal>, MarketplaceError> {
    value.map(|v| money(field, v)).transpose()
}

// ── CreateQuote ──────────────────────────────────────────────────────────────

pub struct PartInput {
    pub name: String,
    pub condition: PartCondition,
    pub price: String,
    pub quantity: i32,
}

pub struct CreateQuoteInput {
    pub request_id: Uuid,
    pub amount: String,
    pub labor_cost: Option<String>,
    pub parts_cost: Option<String>,
    pub estimated_duration: String,
    pub notes: Option<String>,
    pub includes_warranty: bool,
    pub parts: Vec<PartInput>,
}

pub struct CreateQuoteUseCase<R, Q, A, N, P>
where
    R: RequestRepository,
    Q: QuoteRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub requests: R,
    pub quotes: Q,
    pub activities: A,
    pub notifier: Notifier<N, P>,
}

impl<R, Q, A, N, P> CreateQuoteUseCase<R, Q, A, N, P>
where
    R: RequestRepository,
    Q: QuoteRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub async fn execute(
        &self,
        provider_id: Uuid,
        roles: RoleSet,
        input: CreateQuoteInput,
    ) -> Result<Quote, MarketplaceError> {
        if !roles.is_provider() {
            return Err(MarketplaceError::forbidden("only providers can submit quotes"));
        }
        let request = self
            .requests
            .find_by_id(input.request_id)
            .await?
            .ok_or(MarketplaceError::RequestNotFound(input.request_id))?;
        if request.owner_id == provider_id {
            return Err(MarketplaceError::forbidden(
                "providers cannot quote their own requests",
            ));
        }
        if !request.status.accepts_quotes() {
            return Err(MarketplaceError::invalid_state(format!(
                "request {} is {}, not accepting quotes",
                request.id, request.status
            )));
        }

        let amount = money("amount", &input.amount)?;
        let labor_cost = optional_money("labor_cost", input.labor_cost.as_deref())?;
        let parts_cost = optional_money("parts_cost", input.parts_cost.as_deref())?;
        let estimated_duration = non_blank(&input.estimated_duration)
            .ok_or_else(|| MarketplaceError::invalid_input("estimated_duration must not be blank"))?;

        let quote_id = Uuid::now_v7();
        let parts = input
            .parts
            .into_iter()
            .map(|part| {
                let name = non_blank(&part.name)
                    .ok_or_else(|| MarketplaceError::invalid_input("part name must not be blank"))?;
                if part.quantity < 1 {
                    return Err(MarketplaceError::invalid_input(
                        "part quantity must be at least 1",
                    ));
                }
                Ok(QuotePart {
                    id: Uuid::now_v7(),
                    quote_id,
                    name: name.to_owned(),
                    condition: part.condition,
                    price: money("part price", &part.price)?,
                    quantity: part.quantity,
                })
            })
            .collect::<Result<Vec<_>, MarketplaceError>>()?;

        let now = Utc::now();
        let quote = Quote {
            id: quote_id,
            request_id: request.id,
            provider_id,
            amount,
            labor_cost,
            parts_cost,
            estimated_duration: estimated_duration.to_owned(),
            notes: input.notes.and_then(|n| non_blank(&n).map(str::to_owned)),
            includes_warranty: input.includes_warranty,
            status: QuoteStatus::Pending,
            parts,
            created_at: now,
            updated_at: now,
        };
        if !self.quotes.create(&quote).await? {
            return Err(MarketplaceError::invalid_state(format!(
                "request {} stopped accepting quotes",
                request.id
            )));
        }

        self.notifier
            .notify(NewNotification {
                user_id: request.owner_id,
                kind: NotificationKind::QuoteReceived,
                title: "New quote received".to_owned(),
                message: format!("You received a quote of {} for \"{}\"", amount, request.title),
                link: Some(format!("/requests/{}", request.id)),
            })
            .await;
        record_activity(
            &self.activities,
            provider_id,
            ActivityKind::QuoteSubmitted,
            format!("Quoted {} on \"{}\"", amount, request.title),
            Some(quote.id),
        )
        .await;
        tracing::info!(quote_id = %quote.id, request_id = %request.id, "quote submitted");
        Ok(quote)
    }
}

// ── ListQuotesForRequest ─────────────────────────────────────────────────────

pub struct ListQuotesForRequestUseCase<R: RequestRepository, Q: QuoteRepository> {
    pub requests: R,
    pub quotes: Q,
}

impl<R: RequestRepository, Q: QuoteRepository> ListQuotesForRequestUseCase<R, Q> {
    pub async fn execute(
        &self,
        request_id: Uuid,
        user_id: Uuid,
        roles: RoleSet,
    ) -> Result<Vec<Quote>, MarketplaceError> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(MarketplaceError::RequestNotFound(request_id))?;
        if request.owner_id != user_id && !roles.is_provider() {
            return Err(MarketplaceError::forbidden(
                "quotes are visible to the request owner and providers",
            ));
        }
        self.quotes.list_by_request(request_id).await
    }
}

// ── ListMyQuotes ─────────────────────────────────────────────────────────────

pub struct ListMyQuotesUseCase<Q: QuoteRepository> {
    pub repo: Q,
}

impl<Q: QuoteRepository> ListMyQuotesUseCase<Q> {
    pub async fn execute(
        &self,
        provider_id: Uuid,
        roles: RoleSet,
        page: PageRequest,
    ) -> Result<Vec<Quote>, MarketplaceError> {
        if !roles.is_provider() {
            return Err(MarketplaceError::forbidden("only providers have quotes"));
        }
        self.repo.list_by_provider(provider_id, page.clamped()).await
    }
}

// ── AcceptQuote ──────────────────────────────────────────────────────────────

pub struct AcceptQuoteUseCase<R, Q, A, N, P>
where
    R: RequestRepository,
    Q: QuoteRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub requests: R,
    pub quotes: Q,
    pub activities: A,
    pub notifier: Notifier<N, P>,
}

impl<R, Q, A, N, P> AcceptQuoteUseCase<R, Q, A, N, P>
where
    R: RequestRepository,
    Q: QuoteRepository,
    A: ActivityRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    /// Accepting a quote rejects its siblings and creates exactly one job,
    /// atomically. A concurrent acceptance surfaces as `Conflict`.
    pub async fn execute(&self, quote_id: Uuid, user_id: Uuid) -> Result<Job, MarketplaceError> {
        let quote = self
            .quotes
            .find_by_id(quote_id)
            .await?
            .ok_or(MarketplaceError::QuoteNotFound(quote_id))?;
        let request = self
            .requests
            .find_by_id(quote.request_id)
            .await?
            .ok_or(MarketplaceError::RequestNotFound(quote.request_id))?;
        if request.owner_id != user_id {
            return Err(MarketplaceError::forbidden(
                "only the request owner can accept a quote",
            ));
        }
        if quote.status != QuoteStatus::Pending {
            return Err(MarketplaceError::invalid_state(format!(
                "quote {quote_id} is {}, expected pending",
                quote.status
            )));
        }
        if !request.status.accepts_quotes() {
            return Err(MarketplaceError::invalid_state(format!(
                "request {} is {}, not accepting quotes",
                request.id, request.status
            )));
        }

        let now = Utc::now();
        let job = Job {
            id: Uuid::now_v7(),
            request_id: request.id,
            quote_id: quote.id,
            owner_id: request.owner_id,
            provider_id: quote.provider_id,
            status: JobStatus::Pending,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let rejected_provider_ids = match self.quotes.accept(&quote, &job).await? {
            AcceptOutcome::Accepted {
                rejected_provider_ids,
            } => rejected_provider_ids,
            AcceptOutcome::Lost => {
                tracing::info!(%quote_id, request_id = %request.id, "quote acceptance lost a race");
                return Err(MarketplaceError::Conflict(format!(
                    "request {} was updated concurrently",
                    request.id
                )));
            }
        };
        tracing::info!(%quote_id, job_id = %job.id, "quote accepted");

        self.notifier
            .notify(NewNotification {
                user_id: quote.provider_id,
                kind: NotificationKind::QuoteAccepted,
                title: "Quote accepted".to_owned(),
                message: format!("Your quote for \"{}\" was accepted", request.title),
                link: Some(format!("/jobs/{}", job.id)),
            })
            .await;
        for provider_id in rejected_provider_ids {
            self.notifier
                .notify(NewNotification {
                    user_id: provider_id,
                    kind: NotificationKind::QuoteRejected,
                    title: "Quote not selected".to_owned(),
                    message: format!("The owner chose another quote for \"{}\"", request.title),
                    link: Some(format!("/requests/{}", request.id)),
                })
                .await;
        }
        record_activity(
            &self.activities,
            user_id,
            ActivityKind::QuoteAccepted,
            format!("Accepted a quote of {} for \"{}\"", quote.amount, request.title),
            Some(job.id),
        )
        .await;
        Ok(job)
    }
}

// ── RejectQuote ──────────────────────────────────────────────────────────────

pub struct RejectQuoteUseCase<R, Q, N, P>
where
    R: RequestRepository,
    Q: QuoteRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub requests: R,
    pub quotes: Q,
    pub notifier: Notifier<N, P>,
}

impl<R, Q, N, P> RejectQuoteUseCase<R, Q, N, P>
where
    R: RequestRepository,
    Q: QuoteRepository,
    N: NotificationRepository,
    P: RealtimePort,
{
    pub async fn execute(&self, quote_id: Uuid, user_id: Uuid) -> Result<(), MarketplaceError> {
        let quote = self
            .quotes
            .find_by_id(quote_id)
            .await?
            .ok_or(MarketplaceError::QuoteNotFound(quote_id))?;
        let request = self
            .requests
            .find_by_id(quote.request_id)
            .await?
            .ok_or(MarketplaceError::RequestNotFound(quote.request_id))?;
        if request.owner_id != user_id {
            return Err(MarketplaceError::forbidden(
                "only the request owner can reject a quote",
            ));
        }
        if !self.quotes.reject(quote_id).await? {
            return Err(MarketplaceError::invalid_state(format!(
                "quote {quote_id} is {}, expected pending",
                quote.status
            )));
        }
        self.notifier
            .notify(NewNotification {
                user_id: quote.provider_id,
                kind: NotificationKind::QuoteRejected,
                title: "Quote declined".to_owned(),
                message: format!("Your quote for \"{}\" was declined", request.title),
                link: Some(format!("/requests/{}", request.id)),
            })
            .await;
        Ok(())
    }
}
