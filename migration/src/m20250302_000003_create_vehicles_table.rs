use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CarNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vehicles::Brand).string_len(100).not_null())
                    .col(ColumnDef::new(Vehicles::Kilometers).integer().not_null())
                    .col(ColumnDef::new(Vehicles::CylinderCount).integer().not_null())
                    .col(ColumnDef::new(Vehicles::Mesures).string_len(100).not_null())
                    .col(ColumnDef::new(Vehicles::Ligne).string_len(100).not_null())
                    .col(ColumnDef::new(Vehicles::EntryDate).date().not_null())
                    .col(ColumnDef::new(Vehicles::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Vehicles::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vehicles {
    Table,
    Id,
    CarNumber,
    Brand,
    Kilometers,
    CylinderCount,
    Mesures,
    Ligne,
    EntryDate,
    CreatedAt,
    UpdatedAt,
}
