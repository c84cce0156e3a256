//! # Design
//!
//! - Provide structured, constant-message errors for the selection pipeline.
//! - Capture operation context (paths, labels, counters) to make failures reproducible in tests.
//! - Per-file failures are not errors here; they are counted in `RunOutcome`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for selection operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Directory-level failures that abort a selection pass.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The carrier pattern failed to compile.
    #[error("fsops pattern failure")]
    Pattern {
        /// Pattern text that failed to compile.
        pattern: &'static str,
        /// Underlying regex error.
        source: regex::Error,
    },
    /// Too many per-file failures in one source directory.
    #[error("fsops error budget exceeded")]
    BudgetExceeded {
        /// Property name of the source directory.
        label: String,
        /// Source directory being processed.
        directory: PathBuf,
        /// Failures counted before aborting.
        errors: usize,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
