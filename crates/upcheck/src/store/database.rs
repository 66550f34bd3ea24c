use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use deadpool::managed::{Object, PoolConfig};
use libsql::params;
use serde_json::Value;

use super::CheckStore;
use super::migrations::run_migrations;
use super::pool::{LibsqlManager, LibsqlPool};
use crate::error::StoreError;

const DEFAULT_POOL_SIZE: usize = 8;

/// Check store backed by a local libsql database
pub struct LibsqlCheckStore {
    pool: LibsqlPool,
}

impl LibsqlCheckStore {
    /// Open (or create) the database at `path` and bring its schema up to date
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let database = libsql::Builder::new_local(path).build().await?;
        let pool = LibsqlPool::builder(LibsqlManager::new(database))
            .config(PoolConfig::new(DEFAULT_POOL_SIZE))
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        Self::from_pool(pool).await
    }

    /// Create a store from an existing pool, running migrations first
    pub async fn from_pool(pool: LibsqlPool) -> Result<Self, StoreError> {
        let store = Self { pool };
        let conn = store.get_conn().await?;
        run_migrations(&conn).await?;
        drop(conn);
        Ok(store)
    }

    /// Insert a new check record, as the CRUD layer would
    pub async fn insert(&self, id: &str, record: &Value) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO checks (id, record, updated_at) VALUES (?, ?, ?)",
            params![id, serde_json::to_string(record)?, Utc::now().timestamp_millis()],
        )
        .await?;
        Ok(())
    }

    async fn get_conn(&self) -> Result<Object<LibsqlManager>, StoreError> {
        self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl CheckStore for LibsqlCheckStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query("SELECT id FROM checks ORDER BY id", ()).await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }

        Ok(ids)
    }

    async fn read(&self, id: &str) -> Result<Value, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query("SELECT record FROM checks WHERE id = ?", params![id]).await?;

        match rows.next().await? {
            Some(row) => {
                let record: String = row.get(0)?;
                Ok(serde_json::from_str(&record)?)
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn update(&self, id: &str, record: &Value) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;
        let changed = conn
            .execute(
                "UPDATE checks SET record = ?, updated_at = ? WHERE id = ?",
                params![serde_json::to_string(record)?, Utc::now().timestamp_millis(), id],
            )
            .await?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
