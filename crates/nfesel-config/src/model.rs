//! Property keys and the per-run configuration value.
//!
//! # Design
//! - Pure data carriers; parsing and validation live in `loader.rs` and `validate.rs`.
//! - A `RunConfiguration` is built once per pass and never mutated; the next
//!   watermark is computed by the coordinator and written back to the store.

use std::path::PathBuf;

use serde::Serialize;

use crate::watermark::Watermark;

/// Root of the copy target tree.
pub const KEY_DESTINATION_DIRECTORY: &str = "destination-directory";
/// Persisted watermark in `dd/mm/yyyy HH:MM:SS` format.
pub const KEY_MINIMUM_FILE_DATE: &str = "minimum-file-date";
/// Carrier identifier (CNPJ) that selected documents must declare.
pub const KEY_TARGET_IDENTIFIER: &str = "target-identifier";
/// Prefix of every source directory property.
pub const KEY_SOURCE_DIRECTORY_PREFIX: &str = "source-directory.";
/// Optional interval between passes, in minutes.
pub const KEY_SCAN_INTERVAL_MINUTES: &str = "scan-interval-minutes";
/// Interval used when `scan-interval-minutes` is absent.
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u32 = 15;

/// One configured scan target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDirectory {
    /// Full property name the directory was read from; used in diagnostics.
    pub label: String,
    /// Directory scanned for new documents.
    pub path: PathBuf,
}

/// Validated settings for one selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Root of the date-partitioned copy tree.
    pub destination_directory: PathBuf,
    /// Identifier with separators stripped; digits only.
    pub target_identifier: String,
    /// Files modified before this instant are ignored.
    pub watermark: Watermark,
    /// Scan targets in configuration order.
    pub source_directories: Vec<SourceDirectory>,
}
