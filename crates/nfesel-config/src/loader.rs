//! Turns raw store values into a validated `RunConfiguration`.
//!
//! Two stages: `RunDraft::from_store` parses (a malformed minimum file date
//! is a hard configuration error), then `RunDraft::validate` accumulates
//! every missing or unusable setting into one `ValidationReport`.

use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    DEFAULT_SCAN_INTERVAL_MINUTES, KEY_DESTINATION_DIRECTORY, KEY_MINIMUM_FILE_DATE,
    KEY_SCAN_INTERVAL_MINUTES, KEY_SOURCE_DIRECTORY_PREFIX, KEY_TARGET_IDENTIFIER,
    RunConfiguration, SourceDirectory,
};
use crate::store::ConfigStore;
use crate::validate::{
    DirectoryRole, MIN_IDENTIFIER_DIGITS, ValidationProblem, ValidationReport,
    normalize_identifier, validate_directory,
};
use crate::watermark::Watermark;

/// Parsed but not yet validated run settings.
#[derive(Debug, Clone, Default)]
pub struct RunDraft {
    /// Raw destination directory value.
    pub destination_directory: Option<String>,
    /// Raw target identifier value, separators included.
    pub target_identifier: Option<String>,
    /// Parsed watermark; `None` when the property is absent or blank.
    pub watermark: Option<Watermark>,
    /// `(property name, raw path)` pairs in store order.
    pub source_directories: Vec<(String, String)>,
}

impl RunDraft {
    /// Read every recognised property from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedWatermark`] when the minimum file date
    /// is present but does not follow `dd/mm/yyyy HH:MM:SS`.
    pub fn from_store<S: ConfigStore + ?Sized>(store: &S) -> ConfigResult<Self> {
        let watermark = match non_blank(store.get(KEY_MINIMUM_FILE_DATE)) {
            None => None,
            Some(raw) => Some(Watermark::parse(raw).map_err(|_| {
                ConfigError::MalformedWatermark {
                    field: KEY_MINIMUM_FILE_DATE,
                    value: raw.to_string(),
                }
            })?),
        };

        let source_directories = store
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(KEY_SOURCE_DIRECTORY_PREFIX))
            .map(|key| {
                let path = store.get(key).unwrap_or_default().trim().to_string();
                (key.to_string(), path)
            })
            .collect();

        Ok(Self {
            destination_directory: non_blank(store.get(KEY_DESTINATION_DIRECTORY))
                .map(str::to_string),
            target_identifier: non_blank(store.get(KEY_TARGET_IDENTIFIER)).map(str::to_string),
            watermark,
            source_directories,
        })
    }

    /// Validate the draft, producing the immutable run configuration.
    ///
    /// `origin` names the configuration source in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns every problem found when any setting is missing or unusable.
    pub fn validate(self, origin: &str) -> Result<RunConfiguration, ValidationReport> {
        let mut report = ValidationReport::new();

        report.record(validate_directory(
            self.destination_directory.as_deref(),
            KEY_DESTINATION_DIRECTORY,
            DirectoryRole::Destination,
            origin,
        ));
        for (label, path) in &self.source_directories {
            report.record(validate_directory(
                Some(path.as_str()),
                label,
                DirectoryRole::Source,
                origin,
            ));
        }

        let identifier = self
            .target_identifier
            .as_deref()
            .map(normalize_identifier)
            .filter(|id| {
                id.len() >= MIN_IDENTIFIER_DIGITS && id.chars().all(|ch| ch.is_ascii_digit())
            });
        if identifier.is_none() {
            report.record(Some(ValidationProblem {
                field: KEY_TARGET_IDENTIFIER.to_string(),
                message: format!(
                    "property \"{KEY_TARGET_IDENTIFIER}\" is missing or invalid in {origin}; set the carrier CNPJ to look for in the NF-e documents using at least {MIN_IDENTIFIER_DIGITS} digits (separators . / - are ignored)"
                ),
            }));
        }

        if self.watermark.is_none() {
            report.record(Some(ValidationProblem {
                field: KEY_MINIMUM_FILE_DATE.to_string(),
                message: format!(
                    "property \"{KEY_MINIMUM_FILE_DATE}\" is missing or empty in {origin}; set the minimum modification date of the files to inspect (e.g. 25/04/2017 08:00:00)"
                ),
            }));
        }

        match (self.destination_directory, identifier, self.watermark) {
            (Some(destination), Some(target_identifier), Some(watermark)) if report.is_empty() => {
                Ok(RunConfiguration {
                    destination_directory: PathBuf::from(destination.trim()),
                    target_identifier,
                    watermark,
                    source_directories: self
                        .source_directories
                        .into_iter()
                        .map(|(label, path)| SourceDirectory {
                            label,
                            path: PathBuf::from(path),
                        })
                        .collect(),
                })
            }
            _ => Err(report),
        }
    }
}

/// Load and validate the run configuration held by `store`.
///
/// # Errors
///
/// Returns [`ConfigError::MalformedWatermark`] for an unparseable minimum file
/// date and [`ConfigError::Validation`] when any setting is missing or unusable.
pub fn load_run_configuration<S: ConfigStore + ?Sized>(
    store: &S,
) -> ConfigResult<RunConfiguration> {
    let draft = RunDraft::from_store(store)?;
    draft
        .validate(&store.origin())
        .map_err(|report| ConfigError::Validation { report })
}

/// Interval between passes in minutes, defaulting to 15.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a positive integer.
pub fn scan_interval_minutes<S: ConfigStore + ?Sized>(store: &S) -> ConfigResult<u32> {
    let Some(raw) = non_blank(store.get(KEY_SCAN_INTERVAL_MINUTES)) else {
        return Ok(DEFAULT_SCAN_INTERVAL_MINUTES);
    };
    raw.parse::<u32>()
        .ok()
        .filter(|minutes| *minutes > 0)
        .ok_or_else(|| ConfigError::InvalidField {
            field: KEY_SCAN_INTERVAL_MINUTES,
            reason: "not_positive_integer",
            value: Some(raw.to_string()),
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
