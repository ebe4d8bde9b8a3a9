use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::users::repo_types::User;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("encode users: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whole-collection persistence for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn read_all(&self) -> Result<Vec<User>, StorageError>;
    async fn write_all(&self, users: &[User]) -> Result<(), StorageError>;
}

/// Pretty-printed JSON array on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seed an empty collection when the file does not exist yet.
    pub async fn ensure_exists(&self) -> Result<(), StorageError> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| self.read_err(source))?
        {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.write_err(source))?;
        }
        self.write_all(&[]).await?;
        info!(path = %self.path.display(), "created empty users file");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "users.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn read_all(&self) -> Result<Vec<User>, StorageError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| self.read_err(source))?;
        let users: Vec<User> =
            serde_json::from_slice(&raw).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = users.len(), "users loaded");
        Ok(users)
    }

    async fn write_all(&self, users: &[User]) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(users).map_err(StorageError::Encode)?;

        // Replace through a sibling temp file so readers never see a partial file.
        let tmp = self.tmp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|source| self.write_err(source))?;
        file.write_all(&body)
            .await
            .map_err(|source| self.write_err(source))?;
        file.sync_all()
            .await
            .map_err(|source| self.write_err(source))?;
        drop(file);

        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.write_err(source));
        }
        debug!(count = users.len(), "users written");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory store that counts writes.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        users: Mutex<Vec<User>>,
        writes: AtomicUsize,
    }

    impl MemoryStore {
        pub(crate) fn with_users(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users),
                writes: AtomicUsize::new(0),
            }
        }

        pub(crate) fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub(crate) fn snapshot(&self) -> Vec<User> {
            self.users.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn read_all(&self) -> Result<Vec<User>, StorageError> {
            Ok(self.users.lock().unwrap().clone())
        }

        async fn write_all(&self, users: &[User]) -> Result<(), StorageError> {
            *self.users.lock().unwrap() = users.to_vec();
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
