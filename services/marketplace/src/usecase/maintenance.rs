use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::repository::{MaintenanceRepository, VehicleRepository};
use crate::domain::types::{MaintenanceRecord, non_blank};
use crate::error::MarketplaceError;
use crate::usecase::vehicles::owned_vehicle;

// ── ListMaintenance ──────────────────────────────────────────────────────────

pub struct ListMaintenanceUseCase<V: VehicleRepository, M: MaintenanceRepository> {
    pub vehicles: V,
    pub records: M,
}

impl<V: VehicleRepository, M: MaintenanceRepository> ListMaintenanceUseCase<V, M> {
    pub async fn execute(
        &self,
        vehicle_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MaintenanceRecord>, MarketplaceError> {
        owned_vehicle(&self.vehicles, vehicle_id, user_id).await?;
        self.records.list_by_vehicle(vehicle_id).await
    }
}

// ── CreateMaintenance ────────────────────────────────────────────────────────

pub struct MaintenanceInput {
    pub service_type: String,
    pub description: Option<String>,
    pub mileage: Option<i32>,
    pub cost: Option<Decimal>,
    pub performed_at: DateTime<Utc>,
}

pub struct CreateMaintenanceUseCase<V: VehicleRepository, M: MaintenanceRepository> {
    pub vehicles: V,
    pub records: M,
}

impl<V: VehicleRepository, M: MaintenanceRepository> CreateMaintenanceUseCase<V, M> {
    pub async fn execute(
        &self,
        vehicle_id: Uuid,
        user_id: Uuid,
        input: MaintenanceInput,
    ) -> Result<MaintenanceRecord, MarketplaceError> {
        owned_vehicle(&self.vehicles, vehicle_id, user_id).await?;
        let service_type = non_blank(&input.service_type)
            .ok_or_else(|| MarketplaceError::invalid_input("service_type must not be blank"))?;
        let now = Utc::now();
        if input.performed_at > now {
            return Err(MarketplaceError::invalid_input(
                "performed_at must not be in the future",
            ));
        }
        if input.cost.is_some_and(|c| c.is_sign_negative()) {
            return Err(MarketplaceError::invalid_input("cost must not be negative"));
        }

        let record = MaintenanceRecord {
            id: Uuid::now_v7(),
            vehicle_id,
            owner_id: user_id,
            service_type: service_type.to_owned(),
            description: input
                .description
                .and_then(|d| non_blank(&d).map(str::to_owned)),
            mileage: input.mileage,
            cost: input.cost,
            performed_at: input.performed_at,
            created_at: now,
        };
        self.records.create(&record).await?;
        Ok(record)
    }
}

// ── DeleteMaintenance ────────────────────────────────────────────────────────

pub struct DeleteMaintenanceUseCase<V: VehicleRepository, M: MaintenanceRepository> {
    pub vehicles: V,
    pub records: M,
}

impl<V: VehicleRepository, M: MaintenanceRepository> DeleteMaintenanceUseCase<V, M> {
    pub async fn execute(
        &self,
        vehicle_id: Uuid,
        record_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), MarketplaceError> {
        owned_vehicle(&self.vehicles, vehicle_id, user_id).await?;
        let record = self
            .records
            .find_by_id(record_id)
            .await?
            .filter(|r| r.vehicle_id == vehicle_id)
            .ok_or(MarketplaceError::MaintenanceRecordNotFound(record_id))?;
        if !self.records.delete(record.id).await? {
            return Err(MarketplaceError::MaintenanceRecordNotFound(record_id));
        }
        Ok(())
    }
}
