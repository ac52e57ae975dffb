use sea_orm::{ConnectionTrait, Database, Statement};
use std::env;

const TABLES: [&str; 9] = [
    "faulty_part_images",
    "vehicle_documents",
    "wheel_images",
    "vehicle_images",
    "faulty_parts",
    "vehicles",
    "cycle_attachments",
    "cycles",
    "seaql_migrations",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let db = Database::connect(database_url).await?;
    let backend = db.get_database_backend();

    for table in TABLES {
        db.execute(Statement::from_string(
            backend,
            format!("DROP TABLE IF EXISTS \"{}\" CASCADE;", table),
        ))
        .await?;
    }
    println!("Database reset successfully");
    Ok(())
}
