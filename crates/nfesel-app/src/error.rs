//! # Design
//!
//! - `AppError` covers process-level failures (loading the store, logging, rendering).
//! - `RunError` covers the fatal outcomes of one pass; every variant stops the service.
//! - Keep error messages constant while carrying context fields for debugging.

use std::error::Error as _;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use nfesel_config::{ConfigError, ValidationReport};
use nfesel_fsops::FsOpsError;
use nfesel_telemetry::TelemetryError;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: ConfigError,
    },
    /// The file selector could not be built.
    #[error("file selector setup failed")]
    FsOps {
        /// Operation identifier.
        operation: &'static str,
        /// Source fsops error.
        source: FsOpsError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: TelemetryError,
    },
    /// A selection pass failed.
    #[error("selection run failed")]
    Run {
        /// Source run error.
        #[from]
        source: RunError,
    },
    /// Rendering a report failed.
    #[error("report rendering failed")]
    Render {
        /// Operation identifier.
        operation: &'static str,
        /// Source serde error.
        source: serde_json::Error,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn fsops(operation: &'static str, source: FsOpsError) -> Self {
        Self::FsOps { operation, source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: TelemetryError) -> Self {
        Self::Telemetry { operation, source }
    }

    /// Operator-facing description: the error chain plus any validation problems.
    #[must_use]
    pub fn display_message(&self) -> String {
        let mut message = self.to_string();
        let mut current = self.source();
        while let Some(err) = current {
            message.push_str(": ");
            message.push_str(&err.to_string());
            current = err.source();
        }
        if let Some(report) = self.validation_report() {
            message.push('\n');
            message.push_str(&report.to_string());
        }
        message
    }

    fn validation_report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Config {
                source: ConfigError::Validation { report },
                ..
            }
            | Self::Run {
                source: RunError::Validation { report },
            } => Some(report),
            _ => None,
        }
    }
}

/// Fatal outcome of one selection pass.
#[derive(Debug, Error)]
pub enum RunError {
    /// The configuration could not be read (for example a malformed minimum date).
    #[error("run configuration could not be loaded")]
    Configuration {
        /// Source configuration error.
        source: ConfigError,
    },
    /// The configuration is incomplete or points at unusable directories.
    #[error("run configuration is invalid")]
    Validation {
        /// Every problem found.
        report: ValidationReport,
    },
    /// A source directory produced more per-file failures than tolerated.
    #[error("source directory error budget exceeded")]
    DirectoryBudgetExceeded {
        /// Property name of the source directory.
        label: String,
        /// Source directory being processed.
        directory: PathBuf,
        /// Failures counted before aborting.
        errors: usize,
    },
    /// A source directory could not be listed.
    #[error("source directory unavailable")]
    SourceUnavailable {
        /// Property name of the source directory.
        label: String,
        /// Source directory that could not be listed.
        directory: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The pass could not be executed to completion.
    #[error("run worker failed")]
    Worker {
        /// Description of the failure.
        detail: String,
    },
}

impl RunError {
    pub(crate) fn from_selection(label: &str, err: FsOpsError) -> Self {
        match err {
            FsOpsError::BudgetExceeded {
                label,
                directory,
                errors,
            } => Self::DirectoryBudgetExceeded {
                label,
                directory,
                errors,
            },
            FsOpsError::Io { path, source, .. } => Self::SourceUnavailable {
                label: label.to_string(),
                directory: path,
                source,
            },
            FsOpsError::Pattern { source, .. } => Self::Worker {
                detail: source.to_string(),
            },
        }
    }

    /// Short machine-readable kind used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Validation { .. } => "validation",
            Self::DirectoryBudgetExceeded { .. } => "directory_budget_exceeded",
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::Worker { .. } => "worker",
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { report } => Self::Validation { report },
            other => Self::Configuration { source: other },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfesel_config::{DirectoryRole, validate_directory};

    fn report() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.record(validate_directory(
            None,
            "destination-directory",
            DirectoryRole::Destination,
            "config.toml",
        ));
        report
    }

    #[test]
    fn config_errors_split_into_validation_and_configuration() {
        let validation = RunError::from(ConfigError::Validation { report: report() });
        assert!(matches!(validation, RunError::Validation { .. }));
        assert_eq!(validation.kind(), "validation");

        let malformed = RunError::from(ConfigError::MalformedWatermark {
            field: "minimum-file-date",
            value: "yesterday".into(),
        });
        assert!(matches!(malformed, RunError::Configuration { .. }));
        assert!(std::error::Error::source(&malformed).is_some());
    }

    #[test]
    fn selection_errors_map_to_run_errors() {
        let budget = RunError::from_selection(
            "source-directory.gm",
            FsOpsError::BudgetExceeded {
                label: "source-directory.gm".into(),
                directory: PathBuf::from("/in"),
                errors: 4,
            },
        );
        assert!(matches!(
            budget,
            RunError::DirectoryBudgetExceeded { errors: 4, .. }
        ));

        let unavailable = RunError::from_selection(
            "source-directory.gm",
            FsOpsError::Io {
                operation: "select.list_source",
                path: PathBuf::from("/in"),
                source: io::Error::other("gone"),
            },
        );
        match unavailable {
            RunError::SourceUnavailable { label, directory, .. } => {
                assert_eq!(label, "source-directory.gm");
                assert_eq!(directory, PathBuf::from("/in"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn display_message_includes_chain_and_report() {
        let err = AppError::from(RunError::from(ConfigError::Validation { report: report() }));
        let message = err.display_message();
        assert!(message.starts_with("selection run failed"));
        assert!(message.contains("destination-directory"));

        let err = AppError::config(
            "config.load",
            ConfigError::MissingFile {
                path: PathBuf::from("config.toml"),
            },
        );
        assert_eq!(
            err.display_message(),
            "configuration operation failed: configuration file not found"
        );
    }

    #[test]
    fn app_error_helpers_build_variants() {
        let telemetry = AppError::telemetry(
            "telemetry.init",
            TelemetryError::UnknownFormat {
                value: "xml".into(),
            },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));
        let fsops = AppError::fsops(
            "selector.new",
            FsOpsError::Io {
                operation: "select.list_source",
                path: PathBuf::from("/in"),
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(fsops, AppError::FsOps { .. }));
    }
}
