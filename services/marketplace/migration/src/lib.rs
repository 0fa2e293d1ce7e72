use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_vehicles;
mod m20260301_000003_create_maintenance_records;
mod m20260301_000004_create_service_requests;
mod m20260301_000005_create_service_request_images;
mod m20260301_000006_create_quotes;
mod m20260301_000007_create_quote_parts;
mod m20260301_000008_create_jobs;
mod m20260301_000009_create_payments;
mod m20260301_000010_create_messages;
mod m20260301_000011_create_notifications;
mod m20260301_000012_create_activities;
mod m20260301_000013_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_vehicles::Migration),
            Box::new(m20260301_000003_create_maintenance_records::Migration),
            Box::new(m20260301_000004_create_service_requests::Migration),
            Box::new(m20260301_000005_create_service_request_images::Migration),
            Box::new(m20260301_000006_create_quotes::Migration),
            Box::new(m20260301_000007_create_quote_parts::Migration),
            Box::new(m20260301_000008_create_jobs::Migration),
            Box::new(m20260301_000009_create_payments::Migration),
            Box::new(m20260301_000010_create_messages::Migration),
            Box::new(m20260301_000011_create_notifications::Migration),
            Box::new(m20260301_000012_create_activities::Migration),
            Box::new(m20260301_000013_add_lookup_indexes::Migration),
        ]
    }
}
