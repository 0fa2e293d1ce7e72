use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::pagination::{PageRequest, Sort};
use fixlane_domain::request::{RequestStatus, Urgency};
use fixlane_domain::user::Lens;

use crate::domain::types::{RequestDetail, RequestImage, ServiceRequest};
use crate::error::MarketplaceError;
use crate::handlers::quotes::QuoteResponse;
use crate::handlers::users::UserSummaryResponse;
use crate::handlers::vehicles::VehicleResponse;
use crate::state::AppState;
use crate::usecase::requests::{
    AddRequestImagesUseCase, CancelRequestUseCase, CreateRequestInput, CreateRequestUseCase,
    GetRequestUseCase, ListRequestsInput, ListRequestsUseCase, RemoveRequestImageUseCase,
    UpdateRequestInput, UpdateRequestUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: String,
    pub urgency: Urgency,
    pub status: RequestStatus,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ServiceRequest> for RequestResponse {
    fn from(request: ServiceRequest) -> Self {
        Self {
            id: request.id,
            owner_id: request.owner_id,
            vehicle_id: request.vehicle_id,
            title: request.title,
            description: request.description,
            urgency: request.urgency,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub url: String,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RequestImage> for ImageResponse {
    fn from(image: RequestImage) -> Self {
        Self {
            id: image.id,
            url: image.url,
            created_at: image.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct RequestDetailResponse {
    #[serde(flatten)]
    pub request: RequestResponse,
    pub vehicle: Option<VehicleResponse>,
    pub owner: Option<UserSummaryResponse>,
    pub quotes: Vec<QuoteResponse>,
    pub images: Vec<ImageResponse>,
}

impl From<RequestDetail> for RequestDetailResponse {
    fn from(detail: RequestDetail) -> Self {
        Self {
            request: detail.request.into(),
            vehicle: detail.vehicle.map(Into::into),
            owner: detail.owner.map(Into::into),
            quotes: detail.quotes.into_iter().map(Into::into).collect(),
            images: detail.images.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RequestListQuery {
    pub view: Option<Lens>,
    pub status: Option<RequestStatus>,
    pub sort: Option<Sort>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ── GET /requests ────────────────────────────────────────────────────────────

pub async fn list_requests(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Vec<RequestResponse>>, MarketplaceError> {
    let usecase = ListRequestsUseCase {
        repo: state.request_repo(),
    };
    let requests = usecase
        .execute(
            identity.user_id,
            identity.roles,
            ListRequestsInput {
                view: query.view,
                status: query.status,
                sort: query.sort.unwrap_or_default(),
                page: PageRequest::from_query(query.page, query.limit),
            },
        )
        .await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

// ── GET /requests/{id} ───────────────────────────────────────────────────────

pub async fn get_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestDetailResponse>, MarketplaceError> {
    let usecase = GetRequestUseCase {
        requests: state.request_repo(),
        vehicles: state.vehicle_repo(),
        users: state.user_repo(),
        quotes: state.quote_repo(),
    };
    let detail = usecase
        .execute(id, identity.user_id, identity.roles)
        .await?;
    Ok(Json(detail.into()))
}

// ── POST /requests ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRequestRequest {
    pub vehicle_id: Uuid,
    pub title: String,
    pub description: String,
    pub urgency: Option<Urgency>,
}

pub async fn create_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateRequestRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), MarketplaceError> {
    let usecase = CreateRequestUseCase {
        requests: state.request_repo(),
        vehicles: state.vehicle_repo(),
        activities: state.activity_repo(),
    };
    let request = usecase
        .execute(
            identity.user_id,
            CreateRequestInput {
                vehicle_id: body.vehicle_id,
                title: body.title,
                description: body.description,
                urgency: body.urgency,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

// ── PATCH /requests/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRequestRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub urgency: Option<Urgency>,
}

pub async fn update_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRequestRequest>,
) -> Result<Json<RequestResponse>, MarketplaceError> {
    let usecase = UpdateRequestUseCase {
        repo: state.request_repo(),
    };
    let request = usecase
        .execute(
            id,
            identity.user_id,
            UpdateRequestInput {
                title: body.title,
                description: body.description,
                urgency: body.urgency,
            },
        )
        .await?;
    Ok(Json(request.into()))
}

// ── POST /requests/{id}/images ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddImagesRequest {
    pub urls: Vec<String>,
}

pub async fn add_request_images(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddImagesRequest>,
) -> Result<Json<Vec<ImageResponse>>, MarketplaceError> {
    let usecase = AddRequestImagesUseCase {
        repo: state.request_repo(),
    };
    let images = usecase.execute(id, identity.user_id, body.urls).await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

// ── DELETE /requests/{id}/images/{image_id} ──────────────────────────────────

pub async fn remove_request_image(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = RemoveRequestImageUseCase {
        repo: state.request_repo(),
    };
    usecase.execute(id, image_id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /requests/{id}/cancel ───────────────────────────────────────────────

pub async fn cancel_request(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = CancelRequestUseCase {
        repo: state.request_repo(),
    };
    usecase.execute(id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
