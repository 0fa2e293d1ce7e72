use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::job::JobStatus;
use fixlane_domain::pagination::PageRequest;
use fixlane_domain::user::Lens;

use crate::domain::types::Job;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::jobs::{GetJobUseCase, JobAction, ListJobsUseCase, TransitionJobUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub quote_id: Uuid,
    pub owner_id: Uuid,
    pub provider_id: Uuid,
    pub status: JobStatus,
    #[serde(serialize_with = "fixlane_core::serde::opt_to_rfc3339_ms")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "fixlane_core::serde::opt_to_rfc3339_ms")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            request_id: job.request_id,
            quote_id: job.quote_id,
            owner_id: job.owner_id,
            provider_id: job.provider_id,
            status: job.status,
            started_at: job.started_at,
            completed_at: job.completed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

// ── GET /jobs ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct JobListQuery {
    pub view: Option<Lens>,
    pub status: Option<JobStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_jobs(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<JobResponse>>, MarketplaceError> {
    let usecase = ListJobsUseCase {
        repo: state.job_repo(),
    };
    let jobs = usecase
        .execute(
            identity.user_id,
            identity.roles,
            query.view,
            query.status,
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(Json(jobs.into_iter().map(Into::into).collect()))
}

// ── GET /jobs/{id} ───────────────────────────────────────────────────────────

pub async fn get_job(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, MarketplaceError> {
    let usecase = GetJobUseCase {
        repo: state.job_repo(),
    };
    let job = usecase.execute(id, identity.user_id).await?;
    Ok(Json(job.into()))
}

// ── POST /jobs/{id}/{start,complete,confirm,cancel} ──────────────────────────

async fn transition(
    identity: IdentityHeaders,
    state: AppState,
    id: Uuid,
    action: JobAction,
) -> Result<Json<JobResponse>, MarketplaceError> {
    let usecase = TransitionJobUseCase {
        jobs: state.job_repo(),
        activities: state.activity_repo(),
        notifier: state.notifier(),
    };
    let job = usecase.execute(id, identity.user_id, action).await?;
    Ok(Json(job.into()))
}

pub async fn start_job(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, MarketplaceError> {
    transition(identity, state, id, JobAction::Start).await
}

pub async fn complete_job(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, MarketplaceError> {
    transition(identity, state, id, JobAction::RequestCompletion).await
}

pub async fn confirm_job(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, MarketplaceError> {
    transition(identity, state, id, JobAction::ConfirmCompletion).await
}

pub async fn cancel_job(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, MarketplaceError> {
    transition(identity, state, id, JobAction::Cancel).await
}
