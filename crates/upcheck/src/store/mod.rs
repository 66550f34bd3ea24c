//! Check record storage
//!
//! The engine only ever lists, reads and updates records; creating and
//! deleting checks belongs to the CRUD layer. Records are kept as raw JSON
//! values so that validation, not the store, decides what is well formed.

pub mod database;
pub mod file;
pub mod memory;
pub mod migrations;
pub mod pool;

pub use database::LibsqlCheckStore;
pub use file::FileCheckStore;
pub use memory::MemoryCheckStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Durable key-value storage of check records, keyed by check ID
#[async_trait]
pub trait CheckStore: Send + Sync {
    /// IDs of every stored check
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Raw record of one check, `StoreError::NotFound` if it does not exist
    async fn read(&self, id: &str) -> Result<Value, StoreError>;

    /// Replace the record of an existing check
    async fn update(&self, id: &str, record: &Value) -> Result<(), StoreError>;
}
