use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cycles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cycles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cycles::ControlType).string_len(20).not_null())
                    .col(ColumnDef::new(Cycles::Date).date().not_null())
                    .col(
                        ColumnDef::new(Cycles::CycleId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cycles::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Cycles::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cycles_date")
                    .table(Cycles::Table)
                    .col(Cycles::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cycles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cycles {
    Table,
    Id,
    ControlType,
    Date,
    CycleId,
    CreatedAt,
    UpdatedAt,
}
