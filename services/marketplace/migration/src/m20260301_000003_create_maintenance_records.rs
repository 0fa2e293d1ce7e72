use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaintenanceRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MaintenanceRecords::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(MaintenanceRecords::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(MaintenanceRecords::ServiceType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MaintenanceRecords::Description).text().null())
                    .col(ColumnDef::new(MaintenanceRecords::Mileage).integer().null())
                    .col(
                        ColumnDef::new(MaintenanceRecords::Cost)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::PerformedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MaintenanceRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MaintenanceRecords::Table, MaintenanceRecords::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MaintenanceRecords {
    Table,
    Id,
    VehicleId,
    OwnerId,
    ServiceType,
    Description,
    Mileage,
    Cost,
    PerformedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
}
