use chrono::Utc;
use uuid::Uuid;

use fixlane_domain::activity::ActivityKind;

use crate::domain::repository::{ActivityRepository, VehicleRepository};
use crate::domain::types::{Vehicle, non_blank, validate_vehicle_year};
use crate::error::MarketplaceError;
use crate::usecase::activities::record_activity;

/// Load a vehicle and check that `user_id` owns it.
pub async fn owned_vehicle<V: VehicleRepository>(
    repo: &V,
    vehicle_id: Uuid,
    user_id: Uuid,
) -> Result<Vehicle, MarketplaceError> {
    let vehicle = repo
        .find_by_id(vehicle_id)
        .await?
        .ok_or(MarketplaceError::VehicleNotFound(vehicle_id))?;
    if vehicle.owner_id != user_id {
        return Err(MarketplaceError::forbidden("vehicle belongs to another owner"));
    }
    Ok(vehicle)
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| non_blank(&v).map(str::to_owned))
}

fn check_mileage(mileage: Option<i32>) -> Result<(), MarketplaceError> {
    match mileage {
        Some(m) if m < 0 => Err(MarketplaceError::invalid_input(
            "mileage must not be negative",
        )),
        _ => Ok(()),
    }
}

// ── ListVehicles ─────────────────────────────────────────────────────────────

pub struct ListVehiclesUseCase<V: VehicleRepository> {
    pub repo: V,
}

impl<V: VehicleRepository> ListVehiclesUseCase<V> {
    pub async fn execute(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, MarketplaceError> {
        self.repo.list_by_owner(owner_id).await
    }
}

// ── GetVehicle ───────────────────────────────────────────────────────────────

pub struct GetVehicleUseCase<V: VehicleRepository> {
    pub repo: V,
}

impl<V: VehicleRepository> GetVehicleUseCase<V> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<Vehicle, MarketplaceError> {
        owned_vehicle(&self.repo, id, user_id).await
    }
}

// ── CreateVehicle ────────────────────────────────────────────────────────────

pub struct VehicleInput {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
}

pub struct CreateVehicleUseCase<V: VehicleRepository, A: ActivityRepository> {
    pub vehicles: V,
    pub activities: A,
}

impl<V: VehicleRepository, A: ActivityRepository> CreateVehicleUseCase<V, A> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        input: VehicleInput,
    ) -> Result<Vehicle, MarketplaceError> {
        let make = non_blank(&input.make)
            .ok_or_else(|| MarketplaceError::invalid_input("make must not be blank"))?;
        let model = non_blank(&input.model)
            .ok_or_else(|| MarketplaceError::invalid_input("model must not be blank"))?;
        let now = Utc::now();
        if !validate_vehicle_year(input.year, now) {
            return Err(MarketplaceError::invalid_input(format!(
                "year {} is out of range",
                input.year
            )));
        }
        check_mileage(input.mileage)?;

        let vehicle = Vehicle {
            id: Uuid::now_v7(),
            owner_id,
            make: make.to_owned(),
            model: model.to_owned(),
            year: input.year,
            vin: clean_optional(input.vin).map(|v| v.to_uppercase()),
            license_plate: clean_optional(input.license_plate),
            mileage: input.mileage,
            created_at: now,
            updated_at: now,
        };
        self.vehicles.create(&vehicle).await?;
        record_activity(
            &self.activities,
            owner_id,
            ActivityKind::VehicleAdded,
            format!(
                "Added {} {} {}",
                vehicle.year, vehicle.make, vehicle.model
            ),
            Some(vehicle.id),
        )
        .await;
        Ok(vehicle)
    }
}

// ── UpdateVehicle ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct VehicleUpdate {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i32>,
}

pub struct UpdateVehicleUseCase<V: VehicleRepository> {
    pub repo: V,
}

impl<V: VehicleRepository> UpdateVehicleUseCase<V> {
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: VehicleUpdate,
    ) -> Result<Vehicle, MarketplaceError> {
        let mut vehicle = owned_vehicle(&self.repo, id, user_id).await?;
        let now = Utc::now();

        if let Some(make) = update.make {
            vehicle.make = non_blank(&make)
                .ok_or_else(|| MarketplaceError::invalid_input("make must not be blank"))?
                .to_owned();
        }
        if let Some(model) = update.model {
            vehicle.model = non_blank(&model)
                .ok_or_else(|| MarketplaceError::invalid_input("model must not be blank"))?
                .to_owned();
        }
        if let Some(year) = update.year {
            if !validate_vehicle_year(year, now) {
                return Err(MarketplaceError::invalid_input(format!(
                    "year {year} is out of range"
                )));
            }
            vehicle.year = year;
        }
        if update.vin.is_some() {
            vehicle.vin = clean_optional(update.vin).map(|v| v.to_uppercase());
        }
        if update.license_plate.is_some() {
            vehicle.license_plate = clean_optional(update.license_plate);
        }
        if update.mileage.is_some() {
            check_mileage(update.mileage)?;
            vehicle.mileage = update.mileage;
        }
        vehicle.updated_at = now;

        self.repo.update(&vehicle).await?;
        Ok(vehicle)
    }
}

// ── DeleteVehicle ────────────────────────────────────────────────────────────

pub struct DeleteVehicleUseCase<V: VehicleRepository> {
    pub repo: V,
}

impl<V: VehicleRepository> DeleteVehicleUseCase<V> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), MarketplaceError> {
        owned_vehicle(&self.repo, id, user_id).await?;
        if self.repo.has_requests(id).await? {
            return Err(MarketplaceError::Conflict(format!(
                "vehicle {id} has service requests"
            )));
        }
        if !self.repo.delete(id).await? {
            return Err(MarketplaceError::VehicleNotFound(id));
        }
        Ok(())
    }
}
