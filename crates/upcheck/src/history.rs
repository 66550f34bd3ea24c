//! Per-check outcome history.
//!
//! Every completed probe can be appended as one JSON line to
//! `<dir>/<check id>.log`. The history is write-only from the engine's
//! point of view and losing a line never affects checking.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::monitoring::types::{CheckOutcome, CheckStatus};

/// One line of a check's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeEntry {
    pub check_id: String,
    pub target: String,
    pub outcome: CheckOutcome,
    pub state: CheckStatus,
    pub alert: bool,
    /// Whether the new state was persisted
    pub committed: bool,
    pub latency_ms: u64,
    pub time: DateTime<Utc>,
}

#[async_trait]
pub trait OutcomeHistory: Send + Sync {
    async fn append(&self, entry: &OutcomeEntry) -> Result<(), StoreError>;
}

/// Appends history lines to one file per check
#[derive(Debug, Clone)]
pub struct FileOutcomeHistory {
    dir: PathBuf,
}

impl FileOutcomeHistory {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn log_path(&self, check_id: &str) -> PathBuf {
        self.dir.join(format!("{check_id}.log"))
    }
}

#[async_trait]
impl OutcomeHistory for FileOutcomeHistory {
    async fn append(&self, entry: &OutcomeEntry) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(&entry.check_id))
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
