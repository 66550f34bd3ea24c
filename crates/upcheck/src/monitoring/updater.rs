use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::{CheckState, CheckStatus};
use super::validation::fields;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::store::CheckStore;

/// Writes the outcome of a probe back to the check's record
pub struct StateUpdater {
    store: Arc<dyn CheckStore>,
    clock: Arc<dyn Clock>,
}

impl StateUpdater {
    pub fn new(store: Arc<dyn CheckStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Persist `status` and a fresh `lastChecked` for the record stored under `id`.
    ///
    /// All other fields of `raw` are written back untouched. `lastChecked`
    /// never moves backwards, even if the clock does. Nothing is retried;
    /// the caller decides what a failed write means for alerting.
    pub async fn commit(
        &self,
        id: &str,
        raw: &Value,
        prior: &CheckState,
        status: CheckStatus,
    ) -> Result<CheckState, StoreError> {
        let now = self.clock.now();
        let last_checked = prior.last_checked.map_or(now, |prior| prior.max(now));

        let mut record = raw.clone();
        if let Value::Object(record) = &mut record {
            record.insert(fields::STATE.to_string(), Value::from(status.as_str()));
            record.insert(
                fields::LAST_CHECKED.to_string(),
                Value::from(last_checked.timestamp_millis()),
            );
        }

        self.store.update(id, &record).await?;

        Ok(CheckState { status, last_checked: Some(last_checked) })
    }
}
