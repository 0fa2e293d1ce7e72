use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, columns) for the foreign-key and listing lookups.
const INDEXES: &[(&str, &str, &[&str])] = &[
    ("idx_vehicles_owner_id", "vehicles", &["owner_id"]),
    (
        "idx_maintenance_records_vehicle_id",
        "maintenance_records",
        &["vehicle_id", "performed_at"],
    ),
    (
        "idx_service_requests_owner_id",
        "service_requests",
        &["owner_id", "created_at"],
    ),
    (
        "idx_service_requests_status",
        "service_requests",
        &["status", "created_at"],
    ),
    (
        "idx_service_requests_vehicle_id",
        "service_requests",
        &["vehicle_id"],
    ),
    (
        "idx_service_request_images_request_id",
        "service_request_images",
        &["request_id"],
    ),
    ("idx_quotes_request_id", "quotes", &["request_id", "status"]),
    ("idx_quotes_provider_id", "quotes", &["provider_id"]),
    ("idx_quote_parts_quote_id", "quote_parts", &["quote_id"]),
    ("idx_jobs_owner_id", "jobs", &["owner_id"]),
    ("idx_jobs_provider_id", "jobs", &["provider_id"]),
    ("idx_payments_owner_id", "payments", &["owner_id"]),
    ("idx_payments_provider_id", "payments", &["provider_id"]),
    ("idx_messages_job_id", "messages", &["job_id", "created_at"]),
    (
        "idx_notifications_user_id",
        "notifications",
        &["user_id", "created_at"],
    ),
    (
        "idx_activities_user_id",
        "activities",
        &["user_id", "created_at"],
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, columns) in INDEXES {
            let mut index = Index::create();
            index.name(*name).table(Alias::new(*table));
            for column in *columns {
                index.col(Alias::new(*column));
            }
            manager.create_index(index.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
