use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quotes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Quotes::RequestId).uuid().not_null())
                    .col(ColumnDef::new(Quotes::ProviderId).uuid().not_null())
                    .col(ColumnDef::new(Quotes::Amount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Quotes::LaborCost).decimal_len(12, 2).null())
                    .col(ColumnDef::new(Quotes::PartsCost).decimal_len(12, 2).null())
                    .col(
                        ColumnDef::new(Quotes::EstimatedDuration)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Quotes::Notes).text().null())
                    .col(
                        ColumnDef::new(Quotes::IncludesWarranty)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Quotes::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Quotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Quotes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Quotes::Table, Quotes::RequestId)
                            .to(ServiceRequests::Table, ServiceRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Quotes::Table, Quotes::ProviderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Quotes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Quotes {
    Table,
    Id,
    RequestId,
    ProviderId,
    Amount,
    LaborCost,
    PartsCost,
    EstimatedDuration,
    Notes,
    IncludesWarranty,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ServiceRequests {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
