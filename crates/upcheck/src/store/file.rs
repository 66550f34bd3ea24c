use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::CheckStore;
use crate::error::StoreError;

const RECORD_EXTENSION: &str = "json";

/// Check store keeping one `<id>.json` file per check in a directory
#[derive(Debug, Clone)]
pub struct FileCheckStore {
    dir: PathBuf,
}

impl FileCheckStore {
    /// Open the store, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Write a new record, failing if the check already exists
    pub async fn insert(&self, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&path).await?;
        file.write_all(&serde_json::to_vec(record)?).await?;
        file.flush().await?;
        Ok(())
    }

    /// Path of a record file; IDs that could escape the directory are unknown
    fn record_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.{RECORD_EXTENSION}")))
    }
}

fn not_found_as(id: &str, error: std::io::Error) -> StoreError {
    if error.kind() == ErrorKind::NotFound {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Io(error)
    }
}

#[async_trait]
impl CheckStore for FileCheckStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
                if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                    ids.push(id.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn read(&self, id: &str) -> Result<Value, StoreError> {
        let path = self.record_path(id)?;
        let raw = fs::read(&path).await.map_err(|e| not_found_as(id, e))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn update(&self, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        let contents = serde_json::to_vec(record)?;

        // Rewritten in place: a check deleted meanwhile must not be recreated
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| not_found_as(id, e))?;
        file.write_all(&contents).await?;
        file.flush().await?;
        Ok(())
    }
}
