//! Request and outcome types for one source directory.

use std::path::PathBuf;

use serde::Serialize;

use nfesel_config::{SourceDirectory, Watermark};

/// Inputs for selecting documents from one source directory.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Directory to scan, with the property it was configured under.
    pub source: &'a SourceDirectory,
    /// Normalised carrier identifier that documents must declare.
    pub target_identifier: &'a str,
    /// Files modified before this instant are not considered.
    pub watermark: Watermark,
}

/// Counters produced by selecting from one source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Property name of the source directory.
    pub label: String,
    /// Source directory that was scanned.
    pub directory: PathBuf,
    /// Regular files at or after the watermark.
    pub considered: usize,
    /// Documents copied into the destination leaf.
    pub copied: usize,
    /// Per-file IO failures.
    pub errors: usize,
    /// Files skipped because the destination already holds that name.
    pub skipped_existing: usize,
    /// Empty files and documents for another (or no) carrier.
    pub not_matching: usize,
}

impl RunOutcome {
    pub(crate) fn for_source(source: &SourceDirectory) -> Self {
        Self {
            label: source.label.clone(),
            directory: source.path.clone(),
            ..Self::default()
        }
    }
}

/// Recoverable failure on a single file; counted against the error budget.
#[derive(Debug)]
pub struct FileFailure {
    /// Step that failed.
    pub operation: &'static str,
    /// File (or destination) involved.
    pub path: PathBuf,
    /// Underlying IO error.
    pub source: std::io::Error,
}
