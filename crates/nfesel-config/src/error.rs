//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationReport;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found")]
    MissingFile {
        /// Location that was probed.
        path: PathBuf,
    },
    /// The configuration file is not a valid TOML document.
    #[error("malformed configuration file")]
    Syntax {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic, including the offending span.
        source: toml_edit::TomlError,
    },
    /// A setting holds a value the store cannot represent as text.
    #[error("unsupported configuration value")]
    UnsupportedValue {
        /// File containing the value.
        path: PathBuf,
        /// Dotted key of the setting.
        key: String,
    },
    /// The persisted minimum file date could not be parsed.
    #[error("malformed minimum file date")]
    MalformedWatermark {
        /// Property holding the value.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Property that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// One or more settings are missing or structurally wrong.
    #[error("configuration validation failed")]
    Validation {
        /// Every problem found, in discovery order.
        report: ValidationReport,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
