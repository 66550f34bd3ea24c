use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::CheckStore;
use crate::error::StoreError;

/// In-process store, used for embedding the engine and in tests
#[derive(Debug, Default)]
pub struct MemoryCheckStore {
    records: RwLock<BTreeMap<String, Value>>,
}

impl MemoryCheckStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record
    pub async fn insert(&self, id: impl Into<String>, record: Value) {
        self.records.write().await.insert(id.into(), record);
    }

    /// Current record of a check, if any
    pub async fn get(&self, id: &str) -> Option<Value> {
        self.records.read().await.get(id).cloned()
    }
}

#[async_trait]
impl CheckStore for MemoryCheckStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn read(&self, id: &str) -> Result<Value, StoreError> {
        self.get(id).await.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, record: &Value) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_requires_existing_record() {
        let store = MemoryCheckStore::new();

        let result = store.update("missing", &json!({})).await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "missing"));

        store.insert("a", json!({ "state": "down" })).await;
        store.update("a", &json!({ "state": "up" })).await.unwrap();
        assert_eq!(store.read("a").await.unwrap(), json!({ "state": "up" }));
    }

    #[tokio::test]
    async fn test_removed_records_disappear_from_list() {
        let store = MemoryCheckStore::new();
        store.insert("b", json!({})).await;
        store.insert("a", json!({})).await;
        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);

        store.records.write().await.remove("a");
        assert_eq!(store.list().await.unwrap(), vec!["b"]);
        assert!(store.read("a").await.unwrap_err().is_not_found());
    }
}
