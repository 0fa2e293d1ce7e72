use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::user::RoleSet;

use crate::domain::types::{ContactUpdate, User, UserSummary};
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::users::{
    GetMeUseCase, ProviderProfileInput, SyncUserInput, SyncUserUseCase, UpdateMeUseCase,
    UpdateProviderProfileUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
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
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            roles: user.roles,
            phone: user.phone,
            address: user.address,
            business_name: user.business_name,
            service_types: user.service_types,
            rating: user.rating,
            review_count: user.review_count,
            is_verified: user.is_verified,
            provider_onboarding_complete: user.provider_onboarding_complete,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public user view embedded in requests and conversations.
#[derive(Serialize)]
pub struct UserSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            business_name: summary.business_name,
        }
    }
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: RoleSet,
}

pub async fn create_user(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), MarketplaceError> {
    if !identity.roles.is_admin() {
        return Err(MarketplaceError::forbidden("user sync requires admin"));
    }
    let usecase = SyncUserUseCase {
        users: state.user_repo(),
        notifier: state.notifier(),
    };
    let user = usecase
        .execute(SyncUserInput {
            id: body.id,
            email: body.email,
            name: body.name,
            roles: body.roles,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, MarketplaceError> {
    let usecase = GetMeUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}

// ── PATCH /users/@me ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn update_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, MarketplaceError> {
    let usecase = UpdateMeUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity.user_id,
            ContactUpdate {
                name: body.name,
                phone: body.phone,
                address: body.address,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── PUT /users/@me/provider-profile ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProviderProfileRequest {
    pub business_name: String,
    pub service_types: Vec<String>,
}

pub async fn update_provider_profile(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<ProviderProfileRequest>,
) -> Result<Json<UserResponse>, MarketplaceError> {
    let usecase = UpdateProviderProfileUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity.user_id,
            identity.roles,
            ProviderProfileInput {
                business_name: body.business_name,
                service_types: body.service_types,
            },
        )
        .await?;
    Ok(Json(user.into()))
}
