use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use asset_vault::config::Config;
use asset_vault::services::filter::{FilterParams, RecordFilter};
use asset_vault::services::storage::LocalStorage;
use asset_vault::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportTarget {
    Cycles,
    Vehicles,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Write a backup archive to disk.
    Export {
        #[arg(value_enum)]
        target: ExportTarget,
        /// Inclusive lower bound, YYYY-MM-DD.
        #[arg(long)]
        start_date: Option<String>,
        /// Inclusive upper bound, YYYY-MM-DD.
        #[arg(long)]
        end_date: Option<String>,
        /// Identifier substring.
        #[arg(long)]
        query: Option<String>,
        /// Directory the archive is written into.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Debug, Parser)]
#[command(name = "asset-vault", version, about = "Vehicle and inspection-cycle records with media")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    asset_vault::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration")?;
    let db = Database::connect(&config.database_url)
        .await
        .context("connecting to the database")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if config.run_migrations {
                Migrator::up(&db, None).await.context("running migrations")?;
            }

            let storage = Arc::new(LocalStorage::new(&config.media_root).await?);
            tracing::info!(media_root = %config.media_root.display(), "Media storage ready");

            let bind_addr = config.bind_addr;
            let app = asset_vault::build_app(AppState::new(db, config, storage));

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            tracing::info!("Listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Command::Migrate => {
            Migrator::up(&db, None).await.context("running migrations")?;
            tracing::info!("Migrations applied");
        }
        Command::Export {
            target,
            start_date,
            end_date,
            query,
            out,
        } => {
            let storage = Arc::new(LocalStorage::new(&config.media_root).await?);
            let state = AppState::new(db, config, storage);
            let filter = RecordFilter::from_params(&FilterParams {
                start_date,
                end_date,
                q: query,
            });

            let export = match target {
                ExportTarget::Cycles => state.exporter.export_cycles(&filter).await,
                ExportTarget::Vehicles => state.exporter.export_vehicles(&filter).await,
            }
            .map_err(|e| anyhow::anyhow!("export failed: {:?}", e))?;

            tokio::fs::create_dir_all(&out).await?;
            let path = out.join(&export.filename);
            tokio::fs::write(&path, &export.bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                records = export.records,
                files = export.files,
                skipped = export.skipped,
                "Archive written"
            );
        }
    }

    Ok(())
}
