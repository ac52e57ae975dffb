use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VehicleImages::VehicleId).integer().not_null())
                    .col(ColumnDef::new(VehicleImages::Image).string_len(255).not_null())
                    .col(ColumnDef::new(VehicleImages::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_images_vehicle_id")
                            .from(VehicleImages::Table, VehicleImages::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WheelImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WheelImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WheelImages::VehicleId).integer().not_null())
                    .col(ColumnDef::new(WheelImages::Image).string_len(255).not_null())
                    .col(ColumnDef::new(WheelImages::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wheel_images_vehicle_id")
                            .from(WheelImages::Table, WheelImages::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleDocuments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VehicleDocuments::VehicleId).integer().not_null())
                    .col(ColumnDef::new(VehicleDocuments::Document).string_len(255).not_null())
                    .col(ColumnDef::new(VehicleDocuments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_documents_vehicle_id")
                            .from(VehicleDocuments::Table, VehicleDocuments::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FaultyPartImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FaultyPartImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FaultyPartImages::FaultyPartId).integer().not_null())
                    .col(ColumnDef::new(FaultyPartImages::Image).string_len(255).not_null())
                    .col(ColumnDef::new(FaultyPartImages::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faulty_part_images_faulty_part_id")
                            .from(FaultyPartImages::Table, FaultyPartImages::FaultyPartId)
                            .to(FaultyParts::Table, FaultyParts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FaultyPartImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WheelImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleImages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VehicleImages {
    Table,
    Id,
    VehicleId,
    Image,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WheelImages {
    Table,
    Id,
    VehicleId,
    Image,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleDocuments {
    Table,
    Id,
    VehicleId,
    Document,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FaultyPartImages {
    Table,
    Id,
    FaultyPartId,
    Image,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vehicles {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum FaultyParts {
    Table,
    Id,
}
