use std::io::Error as IoError;

use thiserror::Error;

/// Failures of a `CheckStore`
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Check {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Io(#[from] IoError),

    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database query failed: {0}")]
    Database(#[from] libsql::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Failure to hand a notification to the delivery transport
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Alert delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid recipient: {0}")]
    Recipient(String),
}
