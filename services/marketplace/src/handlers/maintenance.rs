use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;

use crate::domain::types::MaintenanceRecord;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::maintenance::{
    CreateMaintenanceUseCase, DeleteMaintenanceUseCase, ListMaintenanceUseCase, MaintenanceInput,
};

#[derive(Serialize)]
pub struct MaintenanceResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: Option<i32>,
    pub cost: Option<Decimal>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub performed_at: DateTime<Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<MaintenanceRecord> for MaintenanceResponse {
    fn from(record: MaintenanceRecord) -> Self {
        Self {
            id: record.id,
            vehicle_id: record.vehicle_id,
            service_type: record.service_type,
            description: record.description,
            mileage: record.mileage,
            cost: record.cost,
            performed_at: record.performed_at,
            created_at: record.created_at,
        }
    }
}

// ── GET /vehicles/{id}/maintenance ───────────────────────────────────────────

pub async fn list_maintenance(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<Vec<MaintenanceResponse>>, MarketplaceError> {
    let usecase = ListMaintenanceUseCase {
        vehicles: state.vehicle_repo(),
        records: state.maintenance_repo(),
    };
    let records = usecase.execute(vehicle_id, identity.user_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

// ── POST /vehicles/{id}/maintenance ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateMaintenanceRequest {
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: Option<i32>,
    pub cost: Option<Decimal>,
    pub performed_at: DateTime<Utc>,
}

pub async fn create_maintenance(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    Json(body): Json<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<MaintenanceResponse>), MarketplaceError> {
    let usecase = CreateMaintenanceUseCase {
        vehicles: state.vehicle_repo(),
        records: state.maintenance_repo(),
    };
    let record = usecase
        .execute(
            vehicle_id,
            identity.user_id,
            MaintenanceInput {
                service_type: body.service_type,
                description: body.description,
                mileage: body.mileage,
                cost: body.cost,
                performed_at: body.performed_at,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

// ── DELETE /vehicles/{id}/maintenance/{record_id} ────────────────────────────

pub async fn delete_maintenance(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((vehicle_id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = DeleteMaintenanceUseCase {
        vehicles: state.vehicle_repo(),
        records: state.maintenance_repo(),
    };
    usecase
        .execute(vehicle_id, record_id, identity.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
