use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;
use fixlane_domain::pagination::PageRequest;

use crate::domain::types::User;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::providers::{
    FeaturedProvidersUseCase, GetProviderUseCase, ListProvidersUseCase,
};

/// Public provider profile. Contact details are not exposed.
#[derive(Serialize)]
pub struct ProviderResponse {
    pub id: Uuid,
    pub name: String,
    pub business_name: Option<String>,
    pub service_types: Vec<String>,
    pub rating: Decimal,
    pub review_count: i32,
    pub is_verified: bool,
}

impl From<User> for ProviderResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            business_name: user.business_name,
            service_types: user.service_types,
            rating: user.rating,
            review_count: user.review_count,
            is_verified: user.is_verified,
        }
    }
}

// ── GET /providers ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ProviderListQuery {
    pub service_type: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_providers(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<ProviderListQuery>,
) -> Result<Json<Vec<ProviderResponse>>, MarketplaceError> {
    let usecase = ListProvidersUseCase {
        repo: state.user_repo(),
    };
    let providers = usecase
        .execute(
            query.service_type.as_deref(),
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

// ── GET /providers/public/featured ───────────────────────────────────────────

pub async fn featured_providers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProviderResponse>>, MarketplaceError> {
    let usecase = FeaturedProvidersUseCase {
        repo: state.user_repo(),
    };
    let providers = usecase.execute().await?;
    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

// ── GET /providers/{id} ──────────────────────────────────────────────────────

pub async fn get_provider(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProviderResponse>, MarketplaceError> {
    let usecase = GetProviderUseCase {
        repo: state.user_repo(),
    };
    let provider = usecase.execute(id).await?;
    Ok(Json(provider.into()))
}
