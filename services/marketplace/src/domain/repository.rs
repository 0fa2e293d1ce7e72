#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::request::RequestStatus;
use fixlane_domain::user::Lens;

use crate::domain::realtime::ServerEvent;
use crate::domain::types::{
    AcceptOutcome, Activity, ContactUpdate, Job, MaintenanceRecord, Message, Notification,
    Payment, PlatformStats, Quote, RequestFilter, RequestImage, ServiceRequest, User, Vehicle,
};
use crate::error::MarketplaceError;

/// Repository for user profiles.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError>;
    async fn create(&self, user: &User) -> Result<(), MarketplaceError>;
    /// Returns the updated user, or `None` if it does not exist.
    async fn update_contact(
        &self,
        id: Uuid,
        update: &ContactUpdate,
    ) -> Result<Option<User>, MarketplaceError>;
    /// Store the provider profile and mark onboarding complete.
    async fn complete_provider_profile(
        &self,
        id: Uuid,
        business_name: &str,
        service_types: &[String],
    ) -> Result<Option<User>, MarketplaceError>;
    async fn list_providers(
        &self,
        service_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError>;
    /// Onboarded, verified providers, best rated first.
    async fn list_featured_providers(&self, limit: u64) -> Result<Vec<User>, MarketplaceError>;
}

/// Repository for owner vehicles.
pub trait VehicleRepository: Send + Sync {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, MarketplaceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, MarketplaceError>;
    async fn create(&self, vehicle: &Vehicle) -> Result<(), MarketplaceError>;
    async fn update(&self, vehicle: &Vehicle) -> Result<(), MarketplaceError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
    async fn has_requests(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for vehicle maintenance history.
pub trait MaintenanceRepository: Send + Sync {
    async fn list_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<MaintenanceRecord>, MarketplaceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRecord>, MarketplaceError>;
    async fn create(&self, record: &MaintenanceRecord) -> Result<(), MarketplaceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for service requests and their images.
pub trait RequestRepository: Send + Sync {
    async fn create(&self, request: &ServiceRequest) -> Result<(), MarketplaceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceRequest>, MarketplaceError>;
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ServiceRequest>, MarketplaceError>;
    /// Persist title, description and urgency. Returns `false` if the
    /// request no longer accepts quotes.
    async fn update_details(&self, request: &ServiceRequest) -> Result<bool, MarketplaceError>;
    /// Conditional status update. Returns `false` if the request was not in
    /// one of `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: &[RequestStatus],
        to: RequestStatus,
    ) -> Result<bool, MarketplaceError>;
    async fn list_images(&self, request_id: Uuid) -> Result<Vec<RequestImage>, MarketplaceError>;
    async fn add_images(&self, images: &[RequestImage]) -> Result<(), MarketplaceError>;
    async fn delete_image(&self, request_id: Uuid, image_id: Uuid)
    -> Result<bool, MarketplaceError>;
}

/// Repository for quotes and the acceptance transaction.
pub trait QuoteRepository: Send + Sync {
    /// Insert the quote with its parts and move the request `open → quoted`,
    /// atomically. Returns `false` (nothing written) if the request no
    /// longer accepts quotes.
    async fn create(&self, quote: &Quote) -> Result<bool, MarketplaceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, MarketplaceError>;
    async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<Quote>, MarketplaceError>;
    async fn list_by_provider(
        &self,
        provider_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Quote>, MarketplaceError>;
    /// In one transaction: accept `quote`, reject its pending siblings,
    /// advance the request to `accepted` and insert `job`.
    async fn accept(&self, quote: &Quote, job: &Job) -> Result<AcceptOutcome, MarketplaceError>;
    /// Conditional `pending → rejected`.
    async fn reject(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for jobs.
pub trait JobRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, MarketplaceError>;
    async fn list(
        &self,
        user_id: Uuid,
        lens: Lens,
        status: Option<JobStatus>,
        page: PageRequest,
    ) -> Result<Vec<Job>, MarketplaceError>;
    /// Every job the user participates in, on either side.
    async fn list_for_participant(&self, user_id: Uuid) -> Result<Vec<Job>, MarketplaceError>;
    /// Conditional `job.status → to` together with the request move implied
    /// by `to`, in one transaction. Returns `false` if either guard failed.
    async fn transition(
        &self,
        job: &Job,
        to: JobStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MarketplaceError>;
}

/// Repository for payments.
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, MarketplaceError>;
    async fn find_by_job(&self, job_id: Uuid) -> Result<Option<Payment>, MarketplaceError>;
    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, MarketplaceError>;
    /// Fails with `PaymentAlreadyExists` when the job already has a payment.
    async fn create(&self, payment: &Payment) -> Result<(), MarketplaceError>;
    async fn list(
        &self,
        user_id: Uuid,
        lens: Lens,
        page: PageRequest,
    ) -> Result<Vec<Payment>, MarketplaceError>;
    /// Conditional `pending|failed → completed`. Returns `false` if the
    /// payment was already settled.
    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, MarketplaceError>;
    /// Conditional `pending → failed`. Never touches settled payments.
    async fn mark_failed(&self, id: Uuid) -> Result<bool, MarketplaceError>;
    /// Conditional `completed → paid`.
    async fn mark_paid(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Repository for conversation messages.
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> Result<(), MarketplaceError>;
    /// Messages of a conversation, oldest first.
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Message>, MarketplaceError>;
    async fn last_message(&self, job_id: Uuid) -> Result<Option<Message>, MarketplaceError>;
    /// Unread messages in `job_id` not sent by `reader_id`.
    async fn count_unread(&self, job_id: Uuid, reader_id: Uuid) -> Result<u64, MarketplaceError>;
    /// Returns the number of messages marked read.
    async fn mark_read(&self, job_id: Uuid, reader_id: Uuid) -> Result<u64, MarketplaceError>;
}

/// Repository for user notifications.
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<(), MarketplaceError>;
    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError>;
    async fn count_unread(&self, user_id: Uuid) -> Result<u64, MarketplaceError>;
    /// Returns `false` if no such notification belongs to `user_id`.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, MarketplaceError>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, MarketplaceError>;
}

/// Append-only activity feed.
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, activity: &Activity) -> Result<(), MarketplaceError>;
    async fn list(&self, user_id: Uuid, page: PageRequest)
    -> Result<Vec<Activity>, MarketplaceError>;
}

/// Aggregate queries for the admin dashboard.
pub trait PlatformStatsRepository: Send + Sync {
    async fn stats(&self) -> Result<PlatformStats, MarketplaceError>;
}

// ── Ports ────────────────────────────────────────────────────────────────────

/// Parameters of a payment intent, amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Outbound payment gateway.
pub trait PaymentGateway: Send + Sync {
    /// Failures surface as `MarketplaceError::PaymentGateway`.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, MarketplaceError>;
}

/// Push channel to live client connections. Delivery is best effort.
pub trait RealtimePort: Send + Sync {
    /// Deliver to every connection of `user_id`.
    async fn send_to_user(&self, user_id: Uuid, event: ServerEvent);
    /// Deliver to every connection of `recipient_id` and every connection
    /// that joined `conversation_id`, at most once per connection.
    async fn publish_to_conversation(
        &self,
        conversation_id: Uuid,
        recipient_id: Uuid,
        event: ServerEvent,
    );
}
