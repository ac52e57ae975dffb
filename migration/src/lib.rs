pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_cycles_table;
mod m20250301_000002_create_cycle_attachments_table;
mod m20250302_000003_create_vehicles_table;
mod m20250302_000004_create_faulty_parts_table;
mod m20250302_000005_create_vehicle_files_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_cycles_table::Migration),
            Box::new(m20250301_000002_create_cycle_attachments_table::Migration),
            Box::new(m20250302_000003_create_vehicles_table::Migration),
            Box::new(m20250302_000004_create_faulty_parts_table::Migration),
            Box::new(m20250302_000005_create_vehicle_files_tables::Migration),
        ]
    }
}
