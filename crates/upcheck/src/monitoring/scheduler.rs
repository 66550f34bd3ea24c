use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use super::executor::{AlertStatus, CheckReport, MonitoringExecutor};
use super::types::CheckStatus;

/// Default time between two cycles
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest accepted time between two cycles
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Tally of one pass over all checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checks: usize,
    pub up: usize,
    pub down: usize,
    pub skipped: usize,
    pub read_failures: usize,
    pub persist_failures: usize,
    pub alerts_sent: usize,
    pub alert_failures: usize,
    /// Check tasks that panicked or were cancelled
    pub aborted: usize,
}

impl CycleReport {
    fn record(&mut self, report: &CheckReport) {
        match report {
            CheckReport::ReadFailed => self.read_failures += 1,
            CheckReport::Skipped(_) => self.skipped += 1,
            CheckReport::Probed { status, committed, alert, .. } => {
                match status {
                    CheckStatus::Up => self.up += 1,
                    CheckStatus::Down => self.down += 1,
                }
                if !committed {
                    self.persist_failures += 1;
                }
                match alert {
                    AlertStatus::Sent => self.alerts_sent += 1,
                    AlertStatus::Failed => self.alert_failures += 1,
                    AlertStatus::NotWarranted | AlertStatus::Suppressed => {}
                }
            }
        }
    }

    /// Checks that reached the probe stage
    pub fn probed(&self) -> usize {
        self.up + self.down
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checks: {} up, {} down, {} skipped, {} read failures, {} persistence failures, \
             {} alerts sent, {} alert failures, {} aborted",
            self.checks,
            self.up,
            self.down,
            self.skipped,
            self.read_failures,
            self.persist_failures,
            self.alerts_sent,
            self.alert_failures,
            self.aborted
        )
    }
}

/// Monitoring scheduler - runs the executor across all checks once per interval
pub struct MonitoringScheduler {
    executor: Arc<MonitoringExecutor>,
    interval: Duration,
    /// Held for the duration of a cycle so cycles never overlap
    cycle_lock: Mutex<()>,
}

impl MonitoringScheduler {
    /// Create a new monitoring scheduler.
    ///
    /// Intervals shorter than `MIN_INTERVAL` are raised to it.
    pub fn new(executor: Arc<MonitoringExecutor>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!("Interval of {interval:?} is too short, using {MIN_INTERVAL:?}");
        }

        Self { executor, interval: interval.max(MIN_INTERVAL), cycle_lock: Mutex::new(()) }
    }

    /// Run one cycle: list every check and process them all concurrently.
    ///
    /// If another cycle is still in progress this waits for it to finish
    /// first. Returns once every check of this cycle has completed.
    pub async fn run_cycle(&self) -> CycleReport {
        let _running = self.cycle_lock.lock().await;
        let mut report = CycleReport::default();

        let ids = match self.executor.store().list().await {
            Ok(ids) => ids,
            Err(e) => {
                error!("Could not list checks: {e}");
                return report;
            }
        };

        if ids.is_empty() {
            info!("No checks to process");
            return report;
        }

        let mut tasks = JoinSet::new();
        for id in ids {
            let executor = Arc::clone(&self.executor);
            tasks.spawn(async move { executor.execute_check(&id).await });
        }

        while let Some(joined) = tasks.join_next().await {
            report.checks += 1;
            match joined {
                Ok(check) => report.record(&check),
                Err(e) => {
                    error!("Check task did not complete: {e}");
                    report.aborted += 1;
                }
            }
        }

        info!(
            checks = report.checks,
            probed = report.probed(),
            up = report.up,
            down = report.down,
            skipped = report.skipped,
            alerts = report.alerts_sent,
            "Cycle complete"
        );

        report
    }

    /// Run a cycle now and then once per interval, forever.
    ///
    /// A cycle that overruns the interval delays the next one instead of
    /// causing a burst of catch-up cycles.
    pub async fn run(&self) {
        info!("Checking all checks every {}s", self.interval.as_secs());

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.run_cycle().await;
        }
    }
}
