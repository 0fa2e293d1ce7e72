use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequestImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceRequestImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceRequestImages::RequestId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceRequestImages::Url).text().not_null())
                    .col(
                        ColumnDef::new(ServiceRequestImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ServiceRequestImages::Table, ServiceRequestImages::RequestId)
                            .to(ServiceRequests::Table, ServiceRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceRequestImages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServiceRequestImages {
    Table,
    Id,
    RequestId,
    Url,
    CreatedAt,
}

#[derive(Iden)]
enum ServiceRequests {
    Table,
    Id,
}
