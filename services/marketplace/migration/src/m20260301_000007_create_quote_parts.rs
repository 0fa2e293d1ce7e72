use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QuoteParts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QuoteParts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(QuoteParts::QuoteId).uuid().not_null())
                    .col(ColumnDef::new(QuoteParts::Name).string().not_null())
                    .col(ColumnDef::new(QuoteParts::Condition).string_len(16).not_null())
                    .col(ColumnDef::new(QuoteParts::Price).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(QuoteParts::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuoteParts::Table, QuoteParts::QuoteId)
                            .to(Quotes::Table, Quotes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuoteParts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum QuoteParts {
    Table,
    Id,
    QuoteId,
    Name,
    Condition,
    Price,
    Quantity,
}

#[derive(Iden)]
enum Quotes {
    Table,
    Id,
}
