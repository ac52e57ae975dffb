use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FaultyParts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FaultyParts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FaultyParts::VehicleId).integer().not_null())
                    .col(ColumnDef::new(FaultyParts::PartName).string_len(100).not_null())
                    .col(ColumnDef::new(FaultyParts::Description).text().not_null())
                    .col(ColumnDef::new(FaultyParts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faulty_parts_vehicle_id")
                            .from(FaultyParts::Table, FaultyParts::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FaultyParts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FaultyParts {
    Table,
    Id,
    VehicleId,
    PartName,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vehicles {
    Table,
    Id,
}
