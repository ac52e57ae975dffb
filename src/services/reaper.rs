//! Orphan-file reaping.
//!
//! A backing file is deleted only when no row of the owning table still
//! stores its path. Callers invoke the reaper explicitly after a delete, or
//! before committing a replaced file value.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::file_records::FileRecord;
use crate::services::storage::FileStorage;

#[derive(Clone)]
pub struct FileReaper {
    db: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

impl FileReaper {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { db, storage }
    }

    /// Call after `record`'s row has been removed. Returns whether the
    /// backing file was deleted.
    pub async fn reap_deleted<R: FileRecord>(&self, record: &R) -> bool {
        self.delete_if_unused::<R>(record.stored_path(), record.record_id())
            .await
    }

    /// Call before committing `new_path` as the file value of row `id`.
    ///
    /// The persisted row is fetched by primary key; when it is gone there is
    /// nothing to compare against and nothing is deleted.
    pub async fn reap_replaced<R: FileRecord>(&self, id: i32, new_path: &str) -> bool {
        let previous = match R::find_persisted(&self.db, id).await {
            Ok(Some(previous)) => previous,
            Ok(None) => {
                tracing::debug!(kind = R::KIND, id, "Reaper | no persisted row, skipping");
                return false;
            }
            Err(e) => {
                tracing::warn!(kind = R::KIND, id, "Reaper | lookup failed: {}", e);
                return false;
            }
        };

        if previous.stored_path() == new_path {
            return false;
        }

        self.delete_if_unused::<R>(previous.stored_path(), id).await
    }

    async fn delete_if_unused<R: FileRecord>(&self, path: &str, exclude_id: i32) -> bool {
        if path.is_empty() {
            return false;
        }

        match R::path_referenced_elsewhere(&self.db, path, exclude_id).await {
            Ok(true) => {
                tracing::debug!(kind = R::KIND, path, "Reaper | still referenced, keeping file");
                false
            }
            Ok(false) => match self.storage.delete(path).await {
                Ok(true) => {
                    tracing::info!(kind = R::KIND, path, "Reaper | deleted orphan file");
                    true
                }
                Ok(false) => {
                    tracing::debug!(kind = R::KIND, path, "Reaper | file already absent");
                    false
                }
                Err(e) => {
                    tracing::warn!(kind = R::KIND, path, "Reaper | delete failed: {}", e);
                    false
                }
            },
            Err(e) => {
                tracing::warn!(kind = R::KIND, path, "Reaper | reference check failed: {}", e);
                false
            }
        }
    }
}
