use chrono::Utc;
use uuid::Uuid;

use fixlane_domain::activity::ActivityKind;
use fixlane_domain::pagination::{PageRequest, Sort};
use fixlane_domain::request::{RequestStatus, Urgency};
use fixlane_domain::user::{Lens, RoleSet};

use crate::domain::repository::{
    ActivityRepository, QuoteRepository, RequestRepository, UserRepository, VehicleRepository,
};
use crate::domain::types::{RequestDetail, RequestFilter, RequestImage, ServiceRequest, non_blank};
use crate::error::MarketplaceError;
use crate::usecase::activities::record_activity;

/// Images accepted in a single upload call.
pub const MAX_IMAGES_PER_CALL: usize = 10;

/// Load a request and check that `user_id` owns it.
pub async fn owned_request<R: RequestRepository>(
    repo: &R,
    request_id: Uuid,
    user_id: Uuid,
) -> Result<ServiceRequest, MarketplaceError> {
    let request = repo
        .find_by_id(request_id)
        .await?
        .ok_or(MarketplaceError::RequestNotFound(request_id))?;
    if request.owner_id != user_id {
        return Err(MarketplaceError::forbidden(
            "only the request owner can do this",
        ));
    }
    Ok(request)
}

// ── CreateRequest ────────────────────────────────────────────────────────────

pub struct CreateRequestInput {
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: String,
    pub urgency: Option<Urgency>,
}

pub struct CreateRequestUseCase<R, V, A>
where
    R: RequestRepository,
    V: VehicleRepository,
    A: ActivityRepository,
{
    pub requests: R,
    pub vehicles: V,
    pub activities: A,
}

impl<R, V, A> CreateRequestUseCase<R, V, A>
where
    R: RequestRepository,
    V: VehicleRepository,
    A: ActivityRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateRequestInput,
    ) -> Result<ServiceRequest, MarketplaceError> {
        let vehicle = self
            .vehicles
            .find_by_id(input.vehicle_id)
            .await?
            .ok_or(MarketplaceError::VehicleNotFound(input.vehicle_id))?;
        if vehicle.owner_id != user_id {
            return Err(MarketplaceError::forbidden(
                "vehicle belongs to another owner",
            ));
        }
        let title = non_blank(&input.title)
            .ok_or_else(|| MarketplaceError::invalid_input("title must not be blank"))?;
        let description = non_blank(&input.description)
            .ok_or_else(|| MarketplaceError::invalid_input("description must not be blank"))?;

        let now = Utc::now();
        let request = ServiceRequest {
            id: Uuid::now_v7(),
            owner_id: user_id,
            vehicle_id: vehicle.id,
            title: title.to_owned(),
            description: description.to_owned(),
            urgency: input.urgency.unwrap_or_default(),
            status: RequestStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.requests.create(&request).await?;
        record_activity(
            &self.activities,
            user_id,
            ActivityKind::RequestCreated,
            format!("Requested \"{}\"", request.title),
            Some(request.id),
        )
        .await;
        tracing::info!(request_id = %request.id, owner_id = %user_id, "service request created");
        Ok(request)
    }
}

// ── ListRequests ─────────────────────────────────────────────────────────────

pub struct ListRequestsInput {
    pub view: Option<Lens>,
    pub status: Option<RequestStatus>,
    pub sort: Sort,
    pub page: PageRequest,
}

pub struct ListRequestsUseCase<R: RequestRepository> {
    pub repo: R,
}

impl<R: RequestRepository> ListRequestsUseCase<R> {
    /// Providers browse every open or quoted request; everyone else sees
    /// their own.
    pub async fn execute(
        &self,
        user_id: Uuid,
        roles: RoleSet,
        input: ListRequestsInput,
    ) -> Result<Vec<ServiceRequest>, MarketplaceError> {
        let filter = RequestFilter {
            lens: roles.lens(input.view),
            user_id,
            status: input.status,
            sort: input.sort,
            page: input.page.clamped(),
        };
        if filter.statuses().is_empty() {
            return Ok(vec![]);
        }
        self.repo.list(&filter).await
    }
}

// ── GetRequest ───────────────────────────────────────────────────────────────

pub struct GetRequestUseCase<R, V, U, Q>
where
    R: RequestRepository,
    V: VehicleRepository,
    U: UserRepository,
    Q: QuoteRepository,
{
    pub requests: R,
    pub vehicles: V,
    pub users: U,
    pub quotes: Q,
}

impl<R, V, U, Q> GetRequestUseCase<R, V, U, Q>
where
    R: RequestRepository,
    V: VehicleRepository,
    U: UserRepository,
    Q: QuoteRepository,
{
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        roles: RoleSet,
    ) -> Result<RequestDetail, MarketplaceError> {
        let request = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::RequestNotFound(id))?;
        if request.owner_id != user_id && !roles.is_provider() {
            return Err(MarketplaceError::forbidden(
                "request is visible to its owner and providers",
            ));
        }

        let vehicle = self.vehicles.find_by_id(request.vehicle_id).await?;
        let owner = self
            .users
            .find_by_id(request.owner_id)
            .await?
            .map(|u| u.summary());
        let quotes = self.quotes.list_by_request(id).await?;
        let images = self.requests.list_images(id).await?;
        Ok(RequestDetail {
            request,
            vehicle,
            owner,
            quotes,
            images,
        })
    }
}

// ── UpdateRequest ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateRequestInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub urgency: Option<Urgency>,
}

pub struct UpdateRequestUseCase<R: RequestRepository> {
    pub repo: R,
}

impl<R: RequestRepository> UpdateRequestUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateRequestInput,
    ) -> Result<ServiceRequest, MarketplaceError> {
        if input.title.is_none() && input.description.is_none() && input.urgency.is_none() {
            return Err(MarketplaceError::invalid_input(
                "at least one of title, description, urgency is required",
            ));
        }
        let mut request = owned_request(&self.repo, id, user_id).await?;
        if !request.status.accepts_quotes() {
            return Err(MarketplaceError::invalid_state(format!(
                "request {id} is {}, only open or quoted requests can be edited",
                request.status
            )));
        }
        if let Some(title) = input.title {
            request.title = non_blank(&title)
                .ok_or_else(|| MarketplaceError::invalid_input("title must not be blank"))?
                .to_owned();
        }
        if let Some(description) = input.description {
            request.description = non_blank(&description)
                .ok_or_else(|| MarketplaceError::invalid_input("description must not be blank"))?
                .to_owned();
        }
        if let Some(urgency) = input.urgency {
            request.urgency = urgency;
        }
        request.updated_at = Utc::now();
        if !self.repo.update_details(&request).await? {
            return Err(MarketplaceError::invalid_state(format!(
                "request {id} changed status concurrently"
            )));
        }
        Ok(request)
    }
}

// ── AddRequestImages ─────────────────────────────────────────────────────────

pub struct AddRequestImagesUseCase<R: RequestRepository> {
    pub repo: R,
}

impl<R: RequestRepository> AddRequestImagesUseCase<R> {
    /// Returns every image on the request after the append.
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        urls: Vec<String>,
    ) -> Result<Vec<RequestImage>, MarketplaceError> {
        owned_request(&self.repo, id, user_id).await?;
        let urls: Vec<&str> = urls.iter().filter_map(|u| non_blank(u)).collect();
        if urls.is_empty() {
            return Err(MarketplaceError::invalid_input("no image urls given"));
        }
        if urls.len() > MAX_IMAGES_PER_CALL {
            return Err(MarketplaceError::invalid_input(format!(
                "at most {MAX_IMAGES_PER_CALL} images per call"
            )));
        }
        let now = Utc::now();
        let images: Vec<RequestImage> = urls
            .into_iter()
            .map(|url| RequestImage {
                id: Uuid::now_v7(),
                request_id: id,
                url: url.to_owned(),
                created_at: now,
            })
            .collect();
        self.repo.add_images(&images).await?;
        self.repo.list_images(id).await
    }
}

// ── RemoveRequestImage ───────────────────────────────────────────────────────

pub struct RemoveRequestImageUseCase<R: RequestRepository> {
    pub repo: R,
}

impl<R: RequestRepository> RemoveRequestImageUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        image_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), MarketplaceError> {
        owned_request(&self.repo, id, user_id).await?;
        if !self.repo.delete_image(id, image_id).await? {
            return Err(MarketplaceError::ImageNotFound(image_id));
        }
        Ok(())
    }
}

// ── CancelRequest ────────────────────────────────────────────────────────────

pub struct CancelRequestUseCase<R: RequestRepository> {
    pub repo: R,
}

impl<R: RequestRepository> CancelRequestUseCase<R> {
    /// Requests that already have a job are cancelled through the job.
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), MarketplaceError> {
        let request = owned_request(&self.repo, id, user_id).await?;
        if !request.status.accepts_quotes() {
            return Err(MarketplaceError::invalid_state(format!(
                "request {id} is {}, only open or quoted requests can be cancelled",
                request.status
            )));
        }
        let moved = self
            .repo
            .transition(id, &RequestStatus::QUOTABLE, RequestStatus::Cancelled)
            .await?;
        if !moved {
            return Err(MarketplaceError::invalid_state(format!(
                "request {id} changed status concurrently"
            )));
        }
        Ok(())
    }
}
