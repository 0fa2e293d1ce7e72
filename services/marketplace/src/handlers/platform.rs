use std::collections::BTreeMap;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;

use fixlane_auth_types::identity::IdentityHeaders;

use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::platform::{PlatformSettingsUseCase, PlatformStatsUseCase};

// ── GET /platform/stats ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PlatformStatsResponse {
    pub users: u64,
    pub providers: u64,
    pub requests_by_status: BTreeMap<&'static str, u64>,
    pub completed_jobs: u64,
    pub payment_volume: Decimal,
}

pub async fn platform_stats(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<PlatformStatsResponse>, MarketplaceError> {
    if !identity.roles.is_admin() {
        return Err(MarketplaceError::forbidden("platform stats require admin"));
    }
    let usecase = PlatformStatsUseCase {
        repo: state.stats_repo(),
    };
    let stats = usecase.execute().await?;
    Ok(Json(PlatformStatsResponse {
        users: stats.users,
        providers: stats.providers,
        requests_by_status: stats
            .requests_by_status
            .into_iter()
            .map(|(status, count)| (status.as_str(), count))
            .collect(),
        completed_jobs: stats.completed_jobs,
        payment_volume: stats.payment_volume,
    }))
}

// ── GET /platform/settings ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PlatformSettingsResponse {
    pub currency: String,
    pub platform_fee_percent: u8,
    pub support_email: String,
}

pub async fn platform_settings(State(state): State<AppState>) -> Json<PlatformSettingsResponse> {
    let usecase = PlatformSettingsUseCase {
        settings: &state.settings,
    };
    let settings = usecase.execute();
    Json(PlatformSettingsResponse {
        currency: settings.currency,
        platform_fee_percent: settings.platform_fee_percent,
        support_email: settings.support_email,
    })
}
