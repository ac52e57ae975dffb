//! Local media-root file storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::utils::filename::{split_extension, validate_relative_path};

/// Attempts at finding a free name before giving up on a save.
const MAX_NAME_ATTEMPTS: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage path: {0}")]
    InvalidPath(&'static str),
    #[error("no available name for {0}")]
    NameExhausted(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// File storage addressed by `/`-separated paths relative to a media root.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `data` at `path`, or at a fresh variant of it when `path` is
    /// already taken. Returns the path actually written.
    async fn save(&self, path: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Reads a stored file. `Ok(None)` when it does not exist.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Deletes a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

/// Media root on the local filesystem.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let path = validate_relative_path(path).map_err(StorageError::InvalidPath)?;
        let mut full = self.root.clone();
        for segment in path.split('/') {
            full.push(segment);
        }
        Ok(full)
    }

    /// Writes into a file that must not exist yet. `Ok(false)` when it does.
    async fn write_new(&self, full: &Path, data: &[u8]) -> Result<bool, StorageError> {
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(full)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(full).await;
            return Err(e.into());
        }

        Ok(true)
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect()
}

/// `images/a/photo.jpg` -> `images/a/photo_Xk3pQ9z.jpg`
fn alternative_name(path: &str) -> String {
    let (dir, name) = match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    };
    let (stem, ext) = split_extension(name);
    format!("{}{}_{}{}", dir, stem, random_suffix(), ext)
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn save(&self, path: &str, data: &[u8]) -> Result<String, StorageError> {
        let mut candidate = path.to_string();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let full = self.full_path(&candidate)?;
            if self.write_new(&full, data).await? {
                return Ok(candidate);
            }
            candidate = alternative_name(path);
        }
        Err(StorageError::NameExhausted(path.to_string()))
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let full = self.full_path(path)?;
        match fs::read(&full).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
