use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CycleAttachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CycleAttachments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CycleAttachments::CycleId).integer().not_null())
                    .col(ColumnDef::new(CycleAttachments::File).string_len(255).not_null())
                    .col(
                        ColumnDef::new(CycleAttachments::FileType)
                            .string_len(10)
                            .not_null()
                            .default("photo"),
                    )
                    .col(ColumnDef::new(CycleAttachments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cycle_attachments_cycle_id")
                            .from(CycleAttachments::Table, CycleAttachments::CycleId)
                            .to(Cycles::Table, Cycles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Reference checks look rows up by stored path.
        manager
            .create_index(
                Index::create()
                    .name("idx_cycle_attachments_file")
                    .table(CycleAttachments::Table)
                    .col(CycleAttachments::File)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CycleAttachments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CycleAttachments {
    Table,
    Id,
    CycleId,
    File,
    FileType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Cycles {
    Table,
    Id,
}
