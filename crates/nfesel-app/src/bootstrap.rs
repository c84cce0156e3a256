//! Mode entry points shared by the CLI.
//!
//! # Design
//! - The configuration store is opened once per process and handed to the
//!   coordinator, which owns it from then on.
//! - `run_service` wires the scheduler to a shutdown future so signal handling
//!   stays outside the loop and tests can stop it with any future.

use std::future::Future;
use std::path::Path;

use tracing::{info, warn};

use nfesel_config::{
    RunConfiguration, TomlStore, load_run_configuration, scan_interval_minutes,
};

use crate::coordinator::{RunCoordinator, RunPass};
use crate::error::{AppError, AppResult};
use crate::report::RunReport;
use crate::scheduler::{ScheduleSettings, Scheduler, SchedulerExit};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Open the TOML configuration store at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing or cannot be decoded.
pub fn open_store(path: &Path) -> AppResult<TomlStore> {
    TomlStore::load(path).map_err(|err| AppError::config("config.load", err))
}

/// Load and validate the configuration without touching any source or destination file.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, a field is malformed, or
/// validation reports any problem.
pub fn check_configuration(path: &Path) -> AppResult<RunConfiguration> {
    let store = open_store(path)?;
    scan_interval_minutes(&store).map_err(|err| AppError::config("config.interval", err))?;
    load_run_configuration(&store).map_err(|err| AppError::config("config.validate", err))
}

/// Execute exactly one pass: no alignment, no waits.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the pass fails.
pub fn run_once(path: &Path) -> AppResult<RunReport> {
    let store = open_store(path)?;
    let mut coordinator = RunCoordinator::new(store)?;
    Ok(coordinator.run_pass()?)
}

/// Run the scheduler loop until `shutdown` resolves or a pass fails.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the interval is invalid.
/// Run failures are reported through [`SchedulerExit::Fatal`].
pub async fn run_service<F>(path: &Path, shutdown: F) -> AppResult<SchedulerExit>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = open_store(path)?;
    let minutes =
        scan_interval_minutes(&store).map_err(|err| AppError::config("config.interval", err))?;
    let coordinator = RunCoordinator::new(store)?;
    let scheduler = Scheduler::new(coordinator, ScheduleSettings::every_minutes(minutes));

    let handle = scheduler.handle();
    let watcher = tokio::spawn(async move {
        shutdown.await;
        info!("stop requested");
        handle.stop();
    });

    let exit = scheduler.run().await;
    watcher.abort();
    Ok(exit)
}

/// Resolve on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
}
