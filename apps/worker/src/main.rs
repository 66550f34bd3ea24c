#![warn(clippy::all)]

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logger::{LogFormat, try_init_tracing};
use tracing::info;
use tracing::level_filters::LevelFilter;
use upcheck::{
    CheckStore, FileCheckStore, FileOutcomeHistory, HttpChecker, LibsqlCheckStore, LogAlerter,
    MonitoringExecutor, MonitoringScheduler, SystemClock,
};

use config::{Backend, Config};

/// Probes every registered check and alerts owners when a check goes up or down
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the worker config file
    #[arg(short, long, env = "UPPE_WORKER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Check continuously until interrupted (default)
    Run,
    /// Run a single cycle and print its report
    Once,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Config => {
            print!("{config}");
        }
        Command::Once => {
            init_logging(&config)?;
            let scheduler = build_scheduler(&config).await?;
            let report = scheduler.run_cycle().await;
            println!("{report}");
        }
        Command::Run => {
            init_logging(&config)?;
            let scheduler = build_scheduler(&config).await?;

            tokio::select! {
                () = scheduler.run() => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("Failed to listen for shutdown signal")?;
                    info!("Shutting down");
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let level: LevelFilter = config
        .logging
        .level
        .parse()
        .with_context(|| format!("Invalid logging.level '{}'", config.logging.level))?;
    let format: LogFormat = config.logging.format.parse().map_err(anyhow::Error::msg)?;

    try_init_tracing(level, format).context("Failed to initialize logging")
}

async fn build_scheduler(config: &Config) -> Result<MonitoringScheduler> {
    let storage_path = &config.storage.path;
    let store: Arc<dyn CheckStore> = match config.storage.backend {
        Backend::File => Arc::new(
            FileCheckStore::open(storage_path.clone())
                .await
                .with_context(|| format!("Failed to open check directory {}", storage_path.display()))?,
        ),
        Backend::Libsql => Arc::new(
            LibsqlCheckStore::open(storage_path)
                .await
                .with_context(|| format!("Failed to open check database {}", storage_path.display()))?,
        ),
    };
    info!("Using {} check store at {}", config.storage.backend, storage_path.display());

    let checker = Arc::new(HttpChecker::new().context("Failed to build HTTP client")?);
    let mut executor =
        MonitoringExecutor::new(store, checker, Arc::new(LogAlerter), Arc::new(SystemClock));

    if config.history.enabled {
        let history = FileOutcomeHistory::open(config.history.path.clone())
            .await
            .with_context(|| format!("Failed to open history directory {}", config.history.path.display()))?;
        executor = executor.with_history(Arc::new(history));
    }

    Ok(MonitoringScheduler::new(
        Arc::new(executor),
        Duration::from_secs(config.scheduler.interval_seconds),
    ))
}
