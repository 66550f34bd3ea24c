//! Upcheck - check execution and state-transition engine for Uppe
//!
//! Periodically probes every registered HTTP/HTTPS check, classifies it as
//! up or down, persists the new state and alerts the owner when it changes.

pub mod alert;
pub mod clock;
pub mod error;
pub mod history;
pub mod monitoring;
pub mod store;

pub use alert::{Alerter, LogAlerter};
pub use clock::{Clock, SystemClock};
pub use error::{AlertError, StoreError};
pub use history::{FileOutcomeHistory, OutcomeEntry, OutcomeHistory};
pub use monitoring::{
    CheckOutcome, CheckReport, CheckSpec, CheckState, CheckStatus, Checker, CycleReport,
    HttpChecker, MonitoringExecutor, MonitoringScheduler,
};
pub use store::{CheckStore, FileCheckStore, LibsqlCheckStore, MemoryCheckStore};
