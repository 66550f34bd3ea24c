//! Monitoring engine module - handles execution of checks
//!
//! This module is responsible for:
//! - Validating stored check records
//! - Executing HTTP/HTTPS probes under a timeout
//! - Classifying outcomes and persisting state
//! - Scheduling cycles across all checks

pub mod checker;
pub mod classifier;
pub mod executor;
pub mod scheduler;
pub mod slot;
pub mod types;
pub mod updater;
pub mod validation;

pub use checker::{Checker, HttpChecker};
pub use classifier::classify;
pub use executor::{AlertStatus, CheckReport, MonitoringExecutor};
pub use scheduler::{CycleReport, DEFAULT_INTERVAL, MIN_INTERVAL, MonitoringScheduler};
pub use types::{CheckOutcome, CheckSpec, CheckState, CheckStatus, Classification};
pub use updater::StateUpdater;
pub use validation::{ValidationError, validate};
