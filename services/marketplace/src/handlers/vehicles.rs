use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixlane_auth_types::identity::IdentityHeaders;

use crate::domain::types::Vehicle;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::vehicles::{
    CreateVehicleUseCase, DeleteVehicleUseCase, GetVehicleUseCase, ListVehiclesUseCase,
    UpdateVehicleUseCase, VehicleInput, VehicleUpdate,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "fixlane_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            owner_id: vehicle.owner_id,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            vin: vehicle.vin,
            license_plate: vehicle.license_plate,
            mileage: vehicle.mileage,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

// ── GET /vehicles ────────────────────────────────────────────────────────────

pub async fn list_vehicles(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleResponse>>, MarketplaceError> {
    let usecase = ListVehiclesUseCase {
        repo: state.vehicle_repo(),
    };
    let vehicles = usecase.execute(identity.user_id).await?;
    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

// ── GET /vehicles/{id} ───────────────────────────────────────────────────────

pub async fn get_vehicle(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, MarketplaceError> {
    let usecase = GetVehicleUseCase {
        repo: state.vehicle_repo(),
    };
    let vehicle = usecase.execute(id, identity.user_id).await?;
    Ok(Json(vehicle.into()))
}

// ── POST /vehicles ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateVehicleRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
}

pub async fn create_vehicle(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), MarketplaceError> {
    let usecase = CreateVehicleUseCase {
        vehicles: state.vehicle_repo(),
        activities: state.activity_repo(),
    };
    let vehicle = usecase
        .execute(
            identity.user_id,
            VehicleInput {
                make: body.make,
                model: body.model,
                year: body.year,
                vin: body.vin,
                license_plate: body.license_plate,
                mileage: body.mileage,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(vehicle.into())))
}

// ── PATCH /vehicles/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateVehicleRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
}

pub async fn update_vehicle(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, MarketplaceError> {
    let usecase = UpdateVehicleUseCase {
        repo: state.vehicle_repo(),
    };
    let vehicle = usecase
        .execute(
            id,
            identity.user_id,
            VehicleUpdate {
                make: body.make,
                model: body.model,
                year: body.year,
                vin: body.vin,
                license_plate: body.license_plate,
                mileage: body.mileage,
            },
        )
        .await?;
    Ok(Json(vehicle.into()))
}

// ── DELETE /vehicles/{id} ────────────────────────────────────────────────────

pub async fn delete_vehicle(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = DeleteVehicleUseCase {
        repo: state.vehicle_repo(),
    };
    usecase.execute(id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
