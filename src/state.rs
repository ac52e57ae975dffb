use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::export::ArchiveExporter;
use crate::services::records::RecordStore;
use crate::services::storage::FileStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub storage: Arc<dyn FileStorage>,
    pub records: RecordStore,
    pub exporter: ArchiveExporter,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, storage: Arc<dyn FileStorage>) -> Self {
        let records = RecordStore::new(db.clone(), storage.clone());
        let exporter = ArchiveExporter::new(records.clone());
        Self {
            db,
            config: Arc::new(config),
            storage,
            records,
            exporter,
        }
    }
}
