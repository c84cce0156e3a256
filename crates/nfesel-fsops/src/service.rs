//! # Design
//!
//! - One call to [`FileSelector::select`] processes one source directory,
//!   top level only, in file-name order.
//! - Per-file IO failures are logged and counted; the directory is abandoned
//!   once the count exceeds the tolerance.
//! - Copies go through a hidden staging file in the destination leaf and are
//!   hard-linked into place, so a destination name never holds a partial
//!   document and an existing destination file is never replaced.
//! - Files before the watermark are never opened.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use crate::matcher::CarrierMatcher;
use crate::model::{FileFailure, RunOutcome, SelectionRequest};
use crate::partition::DestinationLeaf;

/// Per-file failures tolerated in one source directory before it is abandoned.
pub const IO_ERROR_TOLERANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileVerdict {
    Copied,
    AlreadyPresent,
    Empty,
    OtherCarrier,
}

/// Selects carrier documents from source directories into a destination leaf.
#[derive(Debug, Clone)]
pub struct FileSelector {
    matcher: CarrierMatcher,
    tolerance: usize,
}

impl FileSelector {
    /// Build a selector with the default error tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Pattern`] if the carrier pattern fails to compile.
    pub fn new() -> FsOpsResult<Self> {
        Ok(Self {
            matcher: CarrierMatcher::new()?,
            tolerance: IO_ERROR_TOLERANCE,
        })
    }

    /// Override the number of per-file failures tolerated per directory.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Copy every new document declaring the target carrier from one source directory.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Io`] when the source directory cannot be listed and
    /// [`FsOpsError::BudgetExceeded`] when per-file failures exceed the tolerance.
    pub fn select(
        &self,
        request: SelectionRequest<'_>,
        leaf: &mut DestinationLeaf,
    ) -> FsOpsResult<RunOutcome> {
        let source = request.source;
        let span = info_span!("source", label = %source.label);
        let _entered = span.enter();

        let directory = source.path.as_path();
        fs::read_dir(directory)
            .map_err(|err| FsOpsError::io("select.list_source", directory, err))?;

        let mut outcome = RunOutcome::for_source(source);
        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let result = match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let modified = entry
                        .metadata()
                        .map_err(io::Error::from)
                        .and_then(|metadata| metadata.modified());
                    match modified {
                        Ok(modified) if !request.watermark.admits(modified) => continue,
                        Ok(_) => {
                            outcome.considered += 1;
                            self.process_file(entry.path(), request.target_identifier, leaf)
                        }
                        Err(err) => Err(failure("select.metadata", entry.path(), err)),
                    }
                }
                Err(err) => {
                    let path = err.path().unwrap_or(directory).to_path_buf();
                    Err(walk_failure("select.walk", &path, err))
                }
            };

            match result {
                Ok(FileVerdict::Copied) => outcome.copied += 1,
                Ok(FileVerdict::AlreadyPresent) => outcome.skipped_existing += 1,
                Ok(FileVerdict::Empty | FileVerdict::OtherCarrier) => outcome.not_matching += 1,
                Err(problem) => {
                    outcome.errors += 1;
                    warn!(
                        operation = problem.operation,
                        path = %problem.path.display(),
                        error = %problem.source,
                        errors = outcome.errors,
                        "failed to process source file"
                    );
                    if outcome.errors > self.tolerance {
                        return Err(FsOpsError::BudgetExceeded {
                            label: outcome.label,
                            directory: outcome.directory,
                            errors: outcome.errors,
                        });
                    }
                }
            }
        }

        info!(
            directory = %directory.display(),
            copied = outcome.copied,
            errors = outcome.errors,
            skipped_existing = outcome.skipped_existing,
            not_matching = outcome.not_matching,
            "copied {} files from {}",
            outcome.copied,
            directory.display()
        );
        Ok(outcome)
    }

    fn process_file(
        &self,
        path: &Path,
        target: &str,
        leaf: &mut DestinationLeaf,
    ) -> Result<FileVerdict, FileFailure> {
        let Some(file_name) = path.file_name() else {
            return Ok(FileVerdict::OtherCarrier);
        };
        let destination = leaf.path().join(file_name);
        if destination.exists() {
            debug!(path = %path.display(), "destination already holds file; skipping");
            return Ok(FileVerdict::AlreadyPresent);
        }

        let bytes = fs::read(path).map_err(|err| failure("select.read", path, err))?;
        if bytes.is_empty() {
            return Ok(FileVerdict::Empty);
        }
        let content = String::from_utf8_lossy(&bytes);
        if !self.matcher.declares(&content, target) {
            return Ok(FileVerdict::OtherCarrier);
        }

        leaf.ensure()
            .map_err(|err| failure("select.create_destination", leaf.path(), err))?;
        let verdict = copy_atomically(path, &destination)
            .map_err(|err| failure("select.copy", &destination, err))?;
        if verdict == FileVerdict::AlreadyPresent {
            debug!(path = %path.display(), "destination appeared during copy; keeping it");
            return Ok(verdict);
        }
        debug!(
            source = %path.display(),
            destination = %destination.display(),
            "copied carrier document"
        );
        Ok(FileVerdict::Copied)
    }
}

fn failure(operation: &'static str, path: &Path, source: io::Error) -> FileFailure {
    FileFailure {
        operation,
        path: path.to_path_buf(),
        source,
    }
}

fn walk_failure(operation: &'static str, path: &Path, source: walkdir::Error) -> FileFailure {
    failure(operation, path, io::Error::from(source))
}

fn copy_atomically(source: &Path, destination: &Path) -> io::Result<FileVerdict> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    let file_name = destination
        .file_name()
        .map_or(Cow::Borrowed("document"), |name| name.to_string_lossy());
    let staging: PathBuf = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    if let Err(err) = fs::copy(source, &staging) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    let placed = match fs::hard_link(&staging, destination) {
        Ok(()) => Ok(FileVerdict::Copied),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(FileVerdict::AlreadyPresent),
        Err(err) => Err(err),
    };
    let _ = fs::remove_file(&staging);
    placed
}
