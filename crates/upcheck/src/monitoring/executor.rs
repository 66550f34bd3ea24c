use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::checker::Checker;
use super::classifier::classify;
use super::types::{CheckOutcome, CheckSpec, CheckStatus};
use super::updater::StateUpdater;
use super::validation::{ValidationError, validate};
use crate::alert::{Alerter, alert_message};
use crate::clock::Clock;
use crate::error::StoreError;
use crate::history::{OutcomeEntry, OutcomeHistory};
use crate::store::CheckStore;

/// What happened to the alert for one probed check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    NotWarranted,
    Sent,
    Failed,
    /// Warranted, but held back because the new state was not persisted
    Suppressed,
}

/// Result of running the pipeline for one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckReport {
    /// The record could not be read (or vanished after listing)
    ReadFailed,

    /// The record is malformed and was not probed
    Skipped(ValidationError),

    Probed {
        outcome: CheckOutcome,
        status: CheckStatus,
        committed: bool,
        alert: AlertStatus,
    },
}

/// Monitoring executor - runs the full pipeline for individual checks:
/// read, validate, probe, classify, commit, alert.
pub struct MonitoringExecutor {
    store: Arc<dyn CheckStore>,
    checker: Arc<dyn Checker>,
    updater: StateUpdater,
    alerter: Arc<dyn Alerter>,
    history: Option<Arc<dyn OutcomeHistory>>,
}

impl MonitoringExecutor {
    pub fn new(
        store: Arc<dyn CheckStore>,
        checker: Arc<dyn Checker>,
        alerter: Arc<dyn Alerter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            updater: StateUpdater::new(Arc::clone(&store), clock),
            store,
            checker,
            alerter,
            history: None,
        }
    }

    /// Also append every probe outcome to `history`
    pub fn with_history(mut self, history: Arc<dyn OutcomeHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn store(&self) -> &Arc<dyn CheckStore> {
        &self.store
    }

    /// Execute the pipeline for the check stored under `id`.
    ///
    /// Never fails: every problem is logged and reflected in the report so
    /// that one check cannot affect the others in its cycle.
    pub async fn execute_check(&self, id: &str) -> CheckReport {
        let raw = match self.store.read(id).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                debug!(check_id = id, "Check was removed before it could be read");
                return CheckReport::ReadFailed;
            }
            Err(StoreError::Json(e)) => {
                let e = ValidationError::Unparsable(e.to_string());
                warn!(check_id = id, "Check is not properly formatted, skipping it: {e}");
                return CheckReport::Skipped(e);
            }
            Err(e) => {
                error!(check_id = id, "Error reading check data: {e}");
                return CheckReport::ReadFailed;
            }
        };

        let check = match validate(&raw) {
            Ok(check) => check,
            Err(e) => {
                warn!(check_id = id, "Check is not properly formatted, skipping it: {e}");
                return CheckReport::Skipped(e);
            }
        };
        let spec = &check.spec;

        let started = Instant::now();
        let outcome = self.checker.check(spec).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        log_outcome(spec, &outcome, latency_ms);

        let classification = classify(spec, &check.state, &outcome);

        let committed = match self.updater.commit(id, &raw, &check.state, classification.status).await {
            Ok(_) => true,
            Err(e) => {
                error!(check_id = id, "Error trying to save updates to check: {e}");
                false
            }
        };

        let alert = match (classification.alert_warranted, committed) {
            (false, _) => {
                debug!(check_id = id, state = %classification.status, "Check outcome has not changed, no alert needed");
                AlertStatus::NotWarranted
            }
            (true, false) => {
                warn!(check_id = id, "State change to {} not persisted, alert held back", classification.status);
                AlertStatus::Suppressed
            }
            (true, true) => self.alert_owner(spec, classification.status).await,
        };

        if let Some(history) = &self.history {
            let entry = OutcomeEntry {
                check_id: id.to_string(),
                target: spec.target(),
                outcome: outcome.clone(),
                state: classification.status,
                alert: alert == AlertStatus::Sent,
                committed,
                latency_ms,
                time: self.updater.now(),
            };
            if let Err(e) = history.append(&entry).await {
                warn!(check_id = id, "Failed to append check history: {e}");
            }
        }

        CheckReport::Probed { outcome, status: classification.status, committed, alert }
    }

    async fn alert_owner(&self, spec: &CheckSpec, status: CheckStatus) -> AlertStatus {
        let message = alert_message(spec, status);
        match self.alerter.notify(&spec.owner_phone, &message).await {
            Ok(()) => {
                info!(check_id = %spec.id, state = %status, "User was alerted to a status change in their check");
                AlertStatus::Sent
            }
            Err(e) => {
                error!(check_id = %spec.id, "Could not alert user to a status change in their check: {e}");
                AlertStatus::Failed
            }
        }
    }
}

fn log_outcome(spec: &CheckSpec, outcome: &CheckOutcome, latency_ms: u64) {
    match outcome {
        CheckOutcome::Response { code } => {
            debug!(check_id = %spec.id, code, latency_ms, "{} {} responded", spec.method.as_upper(), spec.target());
        }
        CheckOutcome::Timeout => {
            warn!(check_id = %spec.id, "{} timed out after {}s", spec.target(), spec.timeout_seconds);
        }
        CheckOutcome::TransportError { detail } => {
            warn!(check_id = %spec.id, "{} failed: {detail}", spec.target());
        }
    }
}
