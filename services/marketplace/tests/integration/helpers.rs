use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::{PageRequest, Sort};
use fixlane_domain::payment::PaymentStatus;
use fixlane_domain::quote::QuoteStatus;
use fixlane_domain::request::{RequestStatus, Urgency};
use fixlane_domain::user::{Lens, Role, RoleSet};
use fixlane_marketplace::domain::realtime::ServerEvent;
use fixlane_marketplace::domain::repository::{
    ActivityRepository, JobRepository, MaintenanceRepository, MessageRepository,
    NotificationRepository, PaymentGateway, PaymentIntent, PaymentIntentRequest,
    PaymentRepository, PlatformStatsRepository, QuoteRepository, RealtimePort, RequestRepository,
    UserRepository, VehicleRepository,
};
use fixlane_marketplace::domain::types::{
    AcceptOutcome, Activity, ContactUpdate, Job, MaintenanceRecord, Message, Notification,
    Payment, PlatformStats, Quote, RequestFilter, RequestImage, ServiceRequest, User, Vehicle,
};
use fixlane_marketplace::error::MarketplaceError;
use fixlane_marketplace::usecase::notifications::Notifier;

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub vehicles: Vec<Vehicle>,
    pub maintenance: Vec<MaintenanceRecord>,
    pub requests: Vec<ServiceRequest>,
    pub images: Vec<RequestImage>,
    pub quotes: Vec<Quote>,
    pub jobs: Vec<Job>,
    pub payments: Vec<Payment>,
    pub messages: Vec<Message>,
    pub notifications: Vec<Notification>,
    pub activities: Vec<Activity>,
    /// When set, notification and activity writes fail.
    pub feeds_down: bool,
}

/// In-memory implementation of every repository, sharing one set of tables
/// so cross-table guards behave like the database's.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

fn page_of<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    let page = page.clamped();
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect()
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Err(MarketplaceError::UserAlreadyExists(user.email.clone()));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn update_contact(
        &self,
        id: Uuid,
        update: &ContactUpdate,
    ) -> Result<Option<User>, MarketplaceError> {
        let mut tables = self.tables();
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(address) = &update.address {
            user.address = Some(address.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn complete_provider_profile(
        &self,
        id: Uuid,
        business_name: &str,
        service_types: &[String],
    ) -> Result<Option<User>, MarketplaceError> {
        let mut tables = self.tables();
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.business_name = Some(business_name.to_owned());
        user.service_types = service_types.to_vec();
        user.provider_onboarding_complete = true;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_providers(
        &self,
        service_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<User>, MarketplaceError> {
        let providers: Vec<User> = self
            .tables()
            .users
            .iter()
            .filter(|u| u.roles.is_provider())
            .filter(|u| service_type.is_none_or(|st| u.service_types.iter().any(|s| s == st)))
            .cloned()
            .collect();
        Ok(page_of(newest_first(providers, |u| u.created_at), page))
    }

    async fn list_featured_providers(&self, limit: u64) -> Result<Vec<User>, MarketplaceError> {
        let mut providers: Vec<User> = self
            .tables()
            .users
            .iter()
            .filter(|u| u.roles.is_provider() && u.is_verified && u.provider_onboarding_complete)
            .cloned()
            .collect();
        providers.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then(b.review_count.cmp(&a.review_count))
        });
        providers.truncate(limit as usize);
        Ok(providers)
    }
}

impl VehicleRepository for MemoryStore {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, MarketplaceError> {
        let vehicles = self
            .tables()
            .vehicles
            .iter()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(vehicles, |v| v.created_at))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, MarketplaceError> {
        Ok(self.tables().vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn create(&self, vehicle: &Vehicle) -> Result<(), MarketplaceError> {
        self.tables().vehicles.push(vehicle.clone());
        Ok(())
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<(), MarketplaceError> {
        let mut tables = self.tables();
        if let Some(row) = tables.vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            *row = vehicle.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        let before = tables.vehicles.len();
        tables.vehicles.retain(|v| v.id != id);
        Ok(tables.vehicles.len() < before)
    }

    async fn has_requests(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        Ok(self.tables().requests.iter().any(|r| r.vehicle_id == id))
    }
}

impl MaintenanceRepository for MemoryStore {
    async fn list_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<MaintenanceRecord>, MarketplaceError> {
        let records = self
            .tables()
            .maintenance
            .iter()
            .filter(|m| m.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        Ok(newest_first(records, |m| m.performed_at))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRecord>, MarketplaceError> {
        Ok(self.tables().maintenance.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, record: &MaintenanceRecord) -> Result<(), MarketplaceError> {
        self.tables().maintenance.push(record.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        let before = tables.maintenance.len();
        tables.maintenance.retain(|m| m.id != id);
        Ok(tables.maintenance.len() < before)
    }
}

impl RequestRepository for MemoryStore {
    async fn create(&self, request: &ServiceRequest) -> Result<(), MarketplaceError> {
        self.tables().requests.push(request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceRequest>, MarketplaceError> {
        Ok(self.tables().requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ServiceRequest>, MarketplaceError> {
        let statuses = filter.statuses();
        let mut requests: Vec<ServiceRequest> = self
            .tables()
            .requests
            .iter()
            .filter(|r| statuses.contains(&r.status))
            .filter(|r| filter.owner_id().is_none_or(|owner| r.owner_id == owner))
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.created_at);
        if filter.sort == Sort::Newest {
            requests.reverse();
        }
        Ok(page_of(requests, filter.page))
    }

    async fn update_details(&self, request: &ServiceRequest) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        let Some(row) = tables
            .requests
            .iter_mut()
            .find(|r| r.id == request.id && r.status.accepts_quotes())
        else {
            return Ok(false);
        };
        row.title = request.title.clone();
        row.description = request.description.clone();
        row.urgency = request.urgency;
        row.updated_at = request.updated_at;
        Ok(true)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: &[RequestStatus],
        to: RequestStatus,
    ) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        match tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && from.contains(&r.status))
        {
            Some(request) => {
                request.status = to;
                request.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_images(&self, request_id: Uuid) -> Result<Vec<RequestImage>, MarketplaceError> {
        Ok(self
            .tables()
            .images
            .iter()
            .filter(|i| i.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn add_images(&self, images: &[RequestImage]) -> Result<(), MarketplaceError> {
        self.tables().images.extend_from_slice(images);
        Ok(())
    }

    async fn delete_image(
        &self,
        request_id: Uuid,
        image_id: Uuid,
    ) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        let before = tables.images.len();
        tables
            .images
            .retain(|i| !(i.id == image_id && i.request_id == request_id));
        Ok(tables.images.len() < before)
    }
}


impl QuoteRepository for MemoryStore {
    async fn create(&self, quote: &Quote) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        let Some(request) = tables
            .requests
            .iter_mut()
            .find(|r| r.id == quote.request_id && RequestStatus::QUOTABLE.contains(&r.status))
        else {
            return Ok(false);
        };
        request.status = RequestStatus::Quoted;
        request.updated_at = quote.created_at;
        tables.quotes.push(quote.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quote>, MarketplaceError> {
        Ok(self.tables().quotes.iter().find(|q| q.id == id).cloned())
    }

    async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<Quote>, MarketplaceError> {
        Ok(self
            .tables()
            .quotes
            .iter()
            .filter(|q| q.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn list_by_provider(
        &self,
        provider_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Quote>, MarketplaceError> {
        let quotes = self
            .tables()
            .quotes
            .iter()
            .filter(|q| q.provider_id == provider_id)
            .cloned()
            .collect();
        Ok(page_of(newest_first(quotes, |q| q.created_at), page))
    }

    async fn accept(&self, quote: &Quote, job: &Job) -> Result<AcceptOutcome, MarketplaceError> {
        let mut tables = self.tables();
        let quote_pending = tables
            .quotes
            .iter()
            .any(|q| q.id == quote.id && q.status == QuoteStatus::Pending);
        let request_quotable = tables
            .requests
            .iter()
            .any(|r| r.id == quote.request_id && RequestStatus::QUOTABLE.contains(&r.status));
        let job_exists = tables
            .jobs
            .iter()
            .any(|j| j.request_id == job.request_id || j.quote_id == job.quote_id);
        if !quote_pending || !request_quotable || job_exists {
            return Ok(AcceptOutcome::Lost);
        }

        let mut rejected: HashSet<Uuid> = HashSet::new();
        for q in tables
            .quotes
            .iter_mut()
            .filter(|q| q.request_id == quote.request_id)
        {
            if q.id == quote.id {
                q.status = QuoteStatus::Accepted;
            } else if q.status == QuoteStatus::Pending {
                q.status = QuoteStatus::Rejected;
                rejected.insert(q.provider_id);
            }
            q.updated_at = job.created_at;
        }
        if let Some(request) = tables.requests.iter_mut().find(|r| r.id == quote.request_id) {
            request.status = RequestStatus::Accepted;
            request.updated_at = job.created_at;
        }
        tables.jobs.push(job.clone());

        let mut rejected_provider_ids: Vec<Uuid> = rejected.into_iter().collect();
        rejected_provider_ids.sort_unstable();
        Ok(AcceptOutcome::Accepted {
            rejected_provider_ids,
        })
    }

    async fn reject(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        match tables
            .quotes
            .iter_mut()
            .find(|q| q.id == id && q.status == QuoteStatus::Pending)
        {
            Some(quote) => {
                quote.status = QuoteStatus::Rejected;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl JobRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, MarketplaceError> {
        Ok(self.tables().jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list(
        &self,
        user_id: Uuid,
        lens: Lens,
        status: Option<JobStatus>,
        page: PageRequest,
    ) -> Result<Vec<Job>, MarketplaceError> {
        let jobs = self
            .tables()
            .jobs
            .iter()
            .filter(|j| match lens {
                Lens::Provider => j.provider_id == user_id,
                Lens::Owner => j.owner_id == user_id,
            })
            .filter(|j| status.is_none_or(|s| j.status == s))
            .cloned()
            .collect();
        Ok(page_of(newest_first(jobs, |j| j.created_at), page))
    }

    async fn list_for_participant(&self, user_id: Uuid) -> Result<Vec<Job>, MarketplaceError> {
        let jobs = self
            .tables()
            .jobs
            .iter()
            .filter(|j| j.is_participant(user_id))
            .cloned()
            .collect();
        Ok(newest_first(jobs, |j| j.created_at))
    }

    async fn transition(
        &self,
        job: &Job,
        to: JobStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        let job_matches = tables
            .jobs
            .iter()
            .any(|j| j.id == job.id && j.status == job.status);
        if !job_matches {
            return Ok(false);
        }
        if let Some(request_status) = to.request_status() {
            let sources = RequestStatus::sources_of(request_status);
            let Some(request) = tables
                .requests
                .iter_mut()
                .find(|r| r.id == job.request_id && sources.contains(&r.status))
            else {
                return Ok(false);
            };
            request.status = request_status;
            request.updated_at = at;
        }
        if let Some(row) = tables.jobs.iter_mut().find(|j| j.id == job.id) {
            row.status = to;
            row.updated_at = at;
            match to {
                JobStatus::InProgress => row.started_at = Some(at),
                JobStatus::Completed => row.completed_at = Some(at),
                _ => {}
            }
        }
        Ok(true)
    }
}

impl MemoryStore {
    fn move_payment(
        &self,
        id: Uuid,
        from: &[PaymentStatus],
        to: PaymentStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> bool {
        let mut tables = self.tables();
        match tables
            .payments
            .iter_mut()
            .find(|p| p.id == id && from.contains(&p.status))
        {
            Some(payment) => {
                payment.status = to;
                if paid_at.is_some() {
                    payment.paid_at = paid_at;
                }
                payment.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

impl PaymentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, MarketplaceError> {
        Ok(self.tables().payments.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Option<Payment>, MarketplaceError> {
        Ok(self
            .tables()
            .payments
            .iter()
            .find(|p| p.job_id == job_id)
            .cloned())
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, MarketplaceError> {
        Ok(self
            .tables()
            .payments
            .iter()
            .find(|p| p.payment_intent_id == intent_id)
            .cloned())
    }

    async fn create(&self, payment: &Payment) -> Result<(), MarketplaceError> {
        let mut tables = self.tables();
        if tables.payments.iter().any(|p| p.job_id == payment.job_id) {
            return Err(MarketplaceError::PaymentAlreadyExists(payment.job_id));
        }
        tables.payments.push(payment.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        lens: Lens,
        page: PageRequest,
    ) -> Result<Vec<Payment>, MarketplaceError> {
        let payments = self
            .tables()
            .payments
            .iter()
            .filter(|p| match lens {
                Lens::Provider => p.provider_id == user_id,
                Lens::Owner => p.owner_id == user_id,
            })
            .cloned()
            .collect();
        Ok(page_of(newest_first(payments, |p| p.created_at), page))
    }

    async fn mark_completed(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, MarketplaceError> {
        Ok(self.move_payment(
            id,
            &[PaymentStatus::Pending, PaymentStatus::Failed],
            PaymentStatus::Completed,
            Some(at),
        ))
    }

    async fn mark_failed(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        Ok(self.move_payment(id, &[PaymentStatus::Pending], PaymentStatus::Failed, None))
    }

    async fn mark_paid(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        Ok(self.move_payment(id, &[PaymentStatus::Completed], PaymentStatus::Paid, None))
    }
}

impl MessageRepository for MemoryStore {
    async fn create(&self, message: &Message) -> Result<(), MarketplaceError> {
        self.tables().messages.push(message.clone());
        Ok(())
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Message>, MarketplaceError> {
        let mut messages: Vec<Message> = self
            .tables()
            .messages
            .iter()
            .filter(|m| m.job_id == job_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn last_message(&self, job_id: Uuid) -> Result<Option<Message>, MarketplaceError> {
        Ok(self
            .tables()
            .messages
            .iter()
            .filter(|m| m.job_id == job_id)
            .max_by_key(|m| (m.created_at, m.id))
            .cloned())
    }

    async fn count_unread(&self, job_id: Uuid, reader_id: Uuid) -> Result<u64, MarketplaceError> {
        Ok(self
            .tables()
            .messages
            .iter()
            .filter(|m| m.job_id == job_id && m.sender_id != reader_id && !m.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, job_id: Uuid, reader_id: Uuid) -> Result<u64, MarketplaceError> {
        let mut tables = self.tables();
        let mut updated = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.job_id == job_id && m.sender_id != reader_id && !m.is_read)
        {
            message.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

impl NotificationRepository for MemoryStore {
    async fn create(&self, notification: &Notification) -> Result<(), MarketplaceError> {
        let mut tables = self.tables();
        if tables.feeds_down {
            return Err(anyhow::anyhow!("notifications table unavailable").into());
        }
        tables.notifications.push(notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Notification>, MarketplaceError> {
        let notifications = self
            .tables()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(newest_first(notifications, |n| n.created_at), page))
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        Ok(self
            .tables()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, MarketplaceError> {
        let mut tables = self.tables();
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, MarketplaceError> {
        let mut tables = self.tables();
        let mut updated = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

impl ActivityRepository for MemoryStore {
    async fn record(&self, activity: &Activity) -> Result<(), MarketplaceError> {
        let mut tables = self.tables();
        if tables.feeds_down {
            return Err(anyhow::anyhow!("activities table unavailable").into());
        }
        tables.activities.push(activity.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Activity>, MarketplaceError> {
        let activities = self
            .tables()
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(newest_first(activities, |a| a.created_at), page))
    }
}

impl PlatformStatsRepository for MemoryStore {
    async fn stats(&self) -> Result<PlatformStats, MarketplaceError> {
        let tables = self.tables();
        Ok(PlatformStats {
            users: tables.users.len() as u64,
            providers: tables.users.iter().filter(|u| u.roles.is_provider()).count() as u64,
            requests_by_status: RequestStatus::ALL
                .iter()
                .map(|s| {
                    let count = tables.requests.iter().filter(|r| r.status == *s).count();
                    (*s, count as u64)
                })
                .collect(),
            completed_jobs: tables
                .jobs
                .iter()
                .filter(|j| j.status == JobStatus::Completed)
                .count() as u64,
            payment_volume: tables
                .payments
                .iter()
                .filter(|p| p.status.is_settled())
                .map(|p| p.amount)
                .sum(),
        })
    }
}

// ── RecordingRealtime ────────────────────────────────────────────────────────

/// Where an event was pushed: to a user's connections or a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    User(Uuid),
    Conversation { conversation_id: Uuid, recipient_id: Uuid },
}

#[derive(Clone, Default)]
pub struct RecordingRealtime {
    pub events: Arc<Mutex<Vec<(Delivery, ServerEvent)>>>,
}

impl RecordingRealtime {
    pub fn events(&self) -> Vec<(Delivery, ServerEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl RealtimePort for RecordingRealtime {
    async fn send_to_user(&self, user_id: Uuid, event: ServerEvent) {
        self.events
            .lock()
            .unwrap()
            .push((Delivery::User(user_id), event));
    }

    async fn publish_to_conversation(
        &self,
        conversation_id: Uuid,
        recipient_id: Uuid,
        event: ServerEvent,
    ) {
        self.events.lock().unwrap().push((
            Delivery::Conversation {
                conversation_id,
                recipient_id,
            },
            event,
        ));
    }
}

// ── MockGateway ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockGateway {
    pub requests: Arc<Mutex<Vec<PaymentIntentRequest>>>,
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl MockGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last_request(&self) -> Option<PaymentIntentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl PaymentGateway for MockGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, MarketplaceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(MarketplaceError::PaymentGateway(anyhow::anyhow!(
                "card_declined"
            )));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(PaymentIntent {
            id: format!("pi_test_{n}"),
            client_secret: format!("pi_test_{n}_secret"),
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn notifier(
    store: &MemoryStore,
    realtime: &RecordingRealtime,
) -> Notifier<MemoryStore, RecordingRealtime> {
    Notifier {
        repo: store.clone(),
        realtime: realtime.clone(),
    }
}

pub fn owner_roles() -> RoleSet {
    RoleSet::EMPTY.with(Role::Owner)
}

pub fn provider_roles() -> RoleSet {
    RoleSet::EMPTY.with(Role::Provider)
}

pub fn test_user(roles: RoleSet, name: &str) -> User {
    let now = Utc::now();
    let id = Uuid::now_v7();
    User {
        id,
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.to_owned(),
        roles,
        phone: None,
        address: None,
        business_name: None,
        service_types: vec![],
        rating: Decimal::ZERO,
        review_count: 0,
        is_verified: false,
        provider_onboarding_complete: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_vehicle(owner_id: Uuid) -> Vehicle {
    let now = Utc::now();
    Vehicle {
        id: Uuid::now_v7(),
        owner_id,
        make: "Toyota".to_owned(),
        model: "Corolla".to_owned(),
        year: 2018,
        vin: None,
        license_plate: Some("7ABC123".to_owned()),
        mileage: Some(84_000),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_request(owner_id: Uuid, vehicle_id: Uuid, status: RequestStatus) -> ServiceRequest {
    let now = Utc::now();
    ServiceRequest {
        id: Uuid::now_v7(),
        owner_id,
        vehicle_id,
        title: "Brake pads squeal".to_owned(),
        description: "Front brakes squeal when stopping".to_owned(),
        urgency: Urgency::Medium,
        status,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_quote(request_id: Uuid, provider_id: Uuid, amount: Decimal) -> Quote {
    let now = Utc::now();
    Quote {
        id: Uuid::now_v7(),
        request_id,
        provider_id,
        amount,
        labor_cost: None,
        parts_cost: None,
        estimated_duration: "2 hours".to_owned(),
        notes: None,
        includes_warranty: false,
        status: QuoteStatus::Pending,
        parts: vec![],
        created_at: now,
        updated_at: now,
    }
}

pub fn test_job(quote: &Quote, owner_id: Uuid, status: JobStatus) -> Job {
    let now = Utc::now();
    Job {
        id: Uuid::now_v7(),
        request_id: quote.request_id,
        quote_id: quote.id,
        owner_id,
        provider_id: quote.provider_id,
        status,
        started_at: None,
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_payment(job: &Job, amount: Decimal, status: PaymentStatus, intent_id: &str) -> Payment {
    let now = Utc::now();
    Payment {
        id: Uuid::now_v7(),
        job_id: job.id,
        owner_id: job.owner_id,
        provider_id: job.provider_id,
        amount,
        status,
        payment_intent_id: intent_id.to_owned(),
        paid_at: status.is_settled().then_some(now),
        created_at: now,
        updated_at: now,
    }
}

/// Owner, provider, vehicle, a request in `request_status`, an accepted
/// quote for 150.00 and a job in `job_status`, all stored.
pub struct JobScenario {
    pub owner: User,
    pub provider: User,
    pub request: ServiceRequest,
    pub quote: Quote,
    pub job: Job,
}

pub fn seed_job(
    store: &MemoryStore,
    request_status: RequestStatus,
    job_status: JobStatus,
) -> JobScenario {
    let owner = test_user(owner_roles(), "Olivia");
    let provider = test_user(provider_roles(), "Pat");
    let vehicle = test_vehicle(owner.id);
    let request = test_request(owner.id, vehicle.id, request_status);
    let mut quote = test_quote(request.id, provider.id, Decimal::new(15000, 2));
    quote.status = QuoteStatus::Accepted;
    let job = test_job(&quote, owner.id, job_status);

    let mut tables = store.tables();
    tables.users.push(owner.clone());
    tables.users.push(provider.clone());
    tables.vehicles.push(vehicle);
    tables.requests.push(request.clone());
    tables.quotes.push(quote.clone());
    tables.jobs.push(job.clone());
    drop(tables);

    JobScenario {
        owner,
        provider,
        request,
        quote,
        job,
    }
}
