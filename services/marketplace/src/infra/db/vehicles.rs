use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use fixlane_marketplace_schema::{maintenance_records, service_requests, vehicles};

use crate::domain::repository::{MaintenanceRepository, VehicleRepository};
use crate::domain::types::{MaintenanceRecord, Vehicle};
use crate::error::MarketplaceError;

// ── Vehicle repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVehicleRepository {
    pub db: DatabaseConnection,
}

impl VehicleRepository for DbVehicleRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, MarketplaceError> {
        let models = vehicles::Entity::find()
            .filter(vehicles::Column::OwnerId.eq(owner_id))
            .order_by_desc(vehicles::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list vehicles by owner")?;
        Ok(models.into_iter().map(vehicle_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, MarketplaceError> {
        let model = vehicles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find vehicle by id")?;
        Ok(model.map(vehicle_from_model))
    }

    async fn create(&self, vehicle: &Vehicle) -> Result<(), MarketplaceError> {
        vehicle_active_model(vehicle)
            .insert(&self.db)
            .await
            .context("create vehicle")?;
        Ok(())
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<(), MarketplaceError> {
        vehicle_active_model(vehicle)
            .update(&self.db)
            .await
            .context("update vehicle")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = vehicles::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete vehicle")?;
        Ok(result.rows_affected > 0)
    }

    async fn has_requests(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let count = service_requests::Entity::find()
            .filter(service_requests::Column::VehicleId.eq(id))
            .count(&self.db)
            .await
            .context("count requests for vehicle")?;
        Ok(count > 0)
    }
}

fn vehicle_active_model(vehicle: &Vehicle) -> vehicles::ActiveModel {
    vehicles::ActiveModel {
        id: Set(vehicle.id),
        owner_id: Set(vehicle.owner_id),
        make: Set(vehicle.make.clone()),
        model: Set(vehicle.model.clone()),
        year: Set(vehicle.year),
        vin: Set(vehicle.vin.clone()),
        license_plate: Set(vehicle.license_plate.clone()),
        mileage: Set(vehicle.mileage),
        created_at: Set(vehicle.created_at),
        updated_at: Set(vehicle.updated_at),
    }
}

fn vehicle_from_model(model: vehicles::Model) -> Vehicle {
    Vehicle {
        id: model.id,
        owner_id: model.owner_id,
        make: model.make,
        model: model.model,
        year: model.year,
        vin: model.vin,
        license_plate: model.license_plate,
        mileage: model.mileage,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Maintenance repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMaintenanceRepository {
    pub db: DatabaseConnection,
}

impl MaintenanceRepository for DbMaintenanceRepository {
    async fn list_by_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<MaintenanceRecord>, MarketplaceError> {
        let models = maintenance_records::Entity::find()
            .filter(maintenance_records::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(maintenance_records::Column::PerformedAt)
            .all(&self.db)
            .await
            .context("list maintenance records")?;
        Ok(models.into_iter().map(maintenance_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MaintenanceRecord>, MarketplaceError> {
        let model = maintenance_records::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find maintenance record")?;
        Ok(model.map(maintenance_from_model))
    }

    async fn create(&self, record: &MaintenanceRecord) -> Result<(), MarketplaceError> {
        maintenance_records::ActiveModel {
            id: Set(record.id),
            vehicle_id: Set(record.vehicle_id),
            owner_id: Set(record.owner_id),
            service_type: Set(record.service_type.clone()),
            description: Set(record.description.clone()),
            mileage: Set(record.mileage),
            cost: Set(record.cost),
            performed_at: Set(record.performed_at),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create maintenance record")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let result = maintenance_records::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete maintenance record")?;
        Ok(result.rows_affected > 0)
    }
}

fn maintenance_from_model(model: maintenance_records::Model) -> MaintenanceRecord {
    MaintenanceRecord {
        id: model.id,
        vehicle_id: model.vehicle_id,
        owner_id: model.owner_id,
        service_type: model.service_type,
        description: model.description,
        mileage: model.mileage,
        cost: model.cost,
        performed_at: model.performed_at,
        created_at: model.created_at,
    }
}
