#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! NF-e selector service wiring.
//!
//! Layout: `coordinator.rs` (one selection pass), `scheduler.rs` (aligned,
//! stoppable loop of passes), `report.rs` (pass summary), `bootstrap.rs`
//! (store loading and mode entry points), `cli.rs` (command-line surface).

/// Store loading and mode entry points.
pub mod bootstrap;
/// Command-line surface for the `nfesel` binary.
pub mod cli;
/// Single selection pass over every configured source directory.
pub mod coordinator;
/// Application and run-level errors.
pub mod error;
/// Pass summary rendered by `run-once` and logged by the scheduler.
pub mod report;
/// Aligned, stoppable loop of passes.
pub mod scheduler;

pub use coordinator::{RunCoordinator, RunPass};
pub use error::{AppError, AppResult, RunError};
pub use report::RunReport;
pub use scheduler::{
    ScheduleSettings, Scheduler, SchedulerExit, SchedulerState, StopHandle, delay_until_aligned,
    next_wait,
};
