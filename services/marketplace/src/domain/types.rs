use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use fixlane_domain::activity::{ActivityKind, NotificationKind};
use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::{PageRequest, Sort};
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::quote::{PartCondition, QuoteStatus};
use fixlane_domain::request::{RequestStatus, Urgency};
use fixlane_domain::user::{Lens, RoleSet};

/// Longest message body accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Number of providers returned by the featured listing.
pub const FEATURED_PROVIDER_LIMIT: u64 = 6;

/// Marketplace user profile.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub business_name: Option<String>,
    pub service_types: Vec<String>,
    pub rating: Decimal,
    pub review_count: i32,
    pub is_verified: bool,
    pub provider_onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            business_name: self.business_name.clone(),
        }
    }
}

/// Public view of a user embedded in other resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
}

/// Contact fields a user may edit on their own profile.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Model years accepted for a vehicle: 1900 up to next year's models.
pub fn validate_vehicle_year(year: i32, now: DateTime<Utc>) -> bool {
    (1900..=now.year() + 1).contains(&year)
}

#[derive(Debug, Clone)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub owner_id: Uuid,
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: Option<i32>,
    pub cost: Option<Decimal>,
    pub performed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: String,
    pub urgency: Urgency,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image attached to a request. Removal is by `id`, so duplicate URLs are fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestImage {
    pub id: Uuid,
    pub request_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// A request with everything its detail page shows.
#[derive(Debug, Clone)]
pub struct RequestDetail {
    pub request: ServiceRequest,
    pub vehicle: Option<Vehicle>,
    pub owner: Option<UserSummary>,
    pub quotes: Vec<Quote>,
    pub images: Vec<RequestImage>,
}

/// Listing filter for service requests.
///
/// Under the provider lens `status` only narrows within {open, quoted}.
#[derive(Debug, Clone, Copy)]
pub struct RequestFilter {
    pub lens: Lens,
    pub user_id: Uuid,
    pub status: Option<RequestStatus>,
    pub sort: Sort,
    pub page: PageRequest,
}

impl RequestFilter {
    /// Statuses a listing may return.
    pub fn statuses(&self) -> Vec<RequestStatus> {
        match (self.lens, self.status) {
            (Lens::Provider, Some(s)) if s.accepts_quotes() => vec![s],
            (Lens::Provider, Some(_)) => vec![],
            (Lens::Provider, None) => RequestStatus::QUOTABLE.to_vec(),
            (Lens::Owner, Some(s)) => vec![s],
            (Lens::Owner, None) => RequestStatus::ALL.to_vec(),
        }
    }

    /// `Some(owner)` when the listing is restricted to one owner's requests.
    pub fn owner_id(&self) -> Option<Uuid> {
        match self.lens {
            Lens::Owner => Some(self.user_id),
            Lens::Provider => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Quote {
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
    pub parts: Vec<QuotePart>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePart {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub name: String,
    pub condition: PartCondition,
    pub price: Decimal,
    pub quantity: i32,
}

/// Result of the quote-acceptance transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// Quote accepted and job inserted; carries the providers whose sibling
    /// quotes were rejected.
    Accepted { rejected_provider_ids: Vec<Uuid> },
    /// A guard failed inside the transaction; nothing was written.
    Lost,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub request_id: Uuid,
    pub quote_id: Uuid,
    pub owner_id: Uuid,
    pub provider_id: Uuid,
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.provider_id == user_id
    }

    /// The participant who is not `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.owner_id == user_id {
            self.provider_id
        } else {
            self.owner_id
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub owner_id: Uuid,
    pub provider_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_intent_id: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub job_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of a user's inbox, keyed by job.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub job_id: Uuid,
    pub other_participant: Option<UserSummary>,
    pub other_participant_id: Uuid,
    pub last_message: Message,
    pub unread_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub entity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct PlatformStats {
    pub users: u64,
    pub providers: u64,
    pub requests_by_status: Vec<(RequestStatus, u64)>,
    pub completed_jobs: u64,
    pub payment_volume: Decimal,
}

/// Public platform settings, sourced from configuration.
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub currency: String,
    pub platform_fee_percent: u8,
    pub support_email: String,
}

/// Non-blank after trimming.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
