//! # Design
//!
//! - One pass: load and validate the configuration, select from every source
//!   directory in order, then advance and persist the watermark.
//! - The store is owned for the lifetime of the process; a failed save keeps the
//!   advanced watermark in memory for the following passes.
//! - Any directory-level failure aborts the remaining directories and leaves the
//!   watermark untouched.

use std::time::Instant;

use chrono::Local;
use tracing::{info, info_span, warn};

use nfesel_config::{ConfigStore, KEY_MINIMUM_FILE_DATE, load_run_configuration};
use nfesel_fsops::{DestinationLeaf, FileSelector, SelectionRequest};

use crate::error::{AppError, AppResult, RunError};
use crate::report::RunReport;

/// A unit of work the scheduler can execute repeatedly.
pub trait RunPass: Send {
    /// Execute one complete pass.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] for every outcome that must stop the service.
    fn run_pass(&mut self) -> Result<RunReport, RunError>;
}

/// Runs selection passes against a configuration store it owns.
#[derive(Debug)]
pub struct RunCoordinator<S> {
    store: S,
    selector: FileSelector,
}

impl<S: ConfigStore> RunCoordinator<S> {
    /// Build a coordinator over `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file selector cannot be built.
    pub fn new(store: S) -> AppResult<Self> {
        let selector =
            FileSelector::new().map_err(|err| AppError::fsops("selector.new", err))?;
        Ok(Self { store, selector })
    }

    /// Replace the file selector (for example to change its error tolerance).
    #[must_use]
    pub fn with_selector(mut self, selector: FileSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ConfigStore> RunPass for RunCoordinator<S> {
    fn run_pass(&mut self) -> Result<RunReport, RunError> {
        let span = info_span!("run");
        let _entered = span.enter();
        let clock = Instant::now();

        let config = load_run_configuration(&self.store)?;

        let started_at = Local::now();
        let mut leaf =
            DestinationLeaf::for_date(&config.destination_directory, started_at.date_naive());
        let mut outcomes = Vec::with_capacity(config.source_directories.len());
        for source in &config.source_directories {
            let outcome = self
                .selector
                .select(
                    SelectionRequest {
                        source,
                        target_identifier: &config.target_identifier,
                        watermark: config.watermark,
                    },
                    &mut leaf,
                )
                .map_err(|err| RunError::from_selection(&source.label, err))?;
            outcomes.push(outcome);
        }

        let watermark = config.watermark.advance_to(started_at);
        self.store.set(KEY_MINIMUM_FILE_DATE, &watermark.to_string());
        let watermark_persisted = match self.store.save() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    error = %err,
                    origin = %self.store.origin(),
                    watermark = %watermark,
                    "failed to persist watermark; keeping it in memory"
                );
                false
            }
        };

        let report = RunReport {
            started_at,
            previous_watermark: config.watermark,
            watermark,
            outcomes,
            watermark_persisted,
            elapsed: clock.elapsed(),
        };
        info!(
            copied = report.total_copied(),
            errors = report.total_errors(),
            watermark = %report.watermark,
            watermark_persisted,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "run complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use nfesel_config::{
        KEY_DESTINATION_DIRECTORY, KEY_TARGET_IDENTIFIER, MemoryStore, Watermark,
    };
    use nfesel_test_support::documents::{CARRIER_CNPJ, compact_nfe_document};
    use nfesel_test_support::fixtures::{SelectorLayout, file_names, seconds_ago, write_with_mtime};

    fn store_for(layout: &SelectorLayout, watermark: Watermark) -> MemoryStore {
        let mut store = MemoryStore::new()
            .with(
                KEY_DESTINATION_DIRECTORY,
                &layout.destination.to_string_lossy(),
            )
            .with(KEY_TARGET_IDENTIFIER, "12.345.678/0001-99")
            .with(KEY_MINIMUM_FILE_DATE, &watermark.to_string());
        for (index, source) in layout.sources.iter().enumerate() {
            store = store.with(
                &format!("source-directory.s{index}"),
                &source.to_string_lossy(),
            );
        }
        store
    }

    fn hour_ago() -> Watermark {
        Watermark::from_local(Local::now() - TimeDelta::hours(1))
    }

    #[test]
    fn pass_copies_into_todays_partition_and_advances_watermark() -> anyhow::Result<()> {
        let layout = SelectorLayout::new(1)?;
        write_with_mtime(
            &layout.source(0).join("nfe.xml"),
            compact_nfe_document(CARRIER_CNPJ),
            seconds_ago(60),
        )?;
        let previous = hour_ago();
        let mut coordinator = RunCoordinator::new(store_for(&layout, previous))?;

        let before = Watermark::from_local(Local::now());
        let report = coordinator.run_pass()?;
        let after = Watermark::from_local(Local::now());

        assert_eq!(report.total_copied(), 1);
        assert!(report.watermark_persisted);
        assert_eq!(report.watermark, Watermark::from_local(report.started_at));
        assert!(before <= report.watermark && report.watermark <= after);
        assert_eq!(
            coordinator.store().get(KEY_MINIMUM_FILE_DATE),
            Some(report.watermark.to_string().as_str())
        );
        assert_eq!(coordinator.store().save_count(), 1);

        let leaf = DestinationLeaf::for_date(&layout.destination, report.started_at.date_naive());
        assert_eq!(file_names(leaf.path()), vec!["nfe.xml"]);
        Ok(())
    }

    #[test]
    fn failed_save_keeps_watermark_in_memory() -> anyhow::Result<()> {
        let layout = SelectorLayout::new(0)?;
        let store = store_for(&layout, hour_ago()).failing_saves();
        let mut coordinator = RunCoordinator::new(store)?;

        let report = coordinator.run_pass()?;
        assert!(!report.watermark_persisted);
        assert_eq!(
            coordinator.store().get(KEY_MINIMUM_FILE_DATE),
            Some(report.watermark.to_string().as_str())
        );
        Ok(())
    }

    #[test]
    fn watermark_never_moves_backward() -> anyhow::Result<()> {
        let layout = SelectorLayout::new(0)?;
        let future = Watermark::from_local(Local::now() + TimeDelta::days(2));
        let mut coordinator = RunCoordinator::new(store_for(&layout, future))?;
        let report = coordinator.run_pass()?;
        assert_eq!(report.watermark, future);
        Ok(())
    }

    #[test]
    fn invalid_configuration_touches_nothing() -> anyhow::Result<()> {
        let layout = SelectorLayout::new(1)?;
        write_with_mtime(
            &layout.source(0).join("nfe.xml"),
            compact_nfe_document(CARRIER_CNPJ),
            seconds_ago(60),
        )?;
        let store = MemoryStore::new()
            .with(
                KEY_DESTINATION_DIRECTORY,
                &layout.destination.to_string_lossy(),
            )
            .with("source-directory.s0", &layout.source(0).to_string_lossy());
        let mut coordinator = RunCoordinator::new(store)?;

        let err = coordinator.run_pass().expect_err("validation should fail");
        let RunError::Validation { report } = err else {
            panic!("expected a validation error");
        };
        assert!(report.mentions(KEY_TARGET_IDENTIFIER));
        assert!(report.mentions(KEY_MINIMUM_FILE_DATE));
        assert!(file_names(&layout.destination).is_empty());
        assert_eq!(std::fs::read_dir(&layout.destination)?.count(), 0);
        assert_eq!(coordinator.store().save_count(), 0);
        Ok(())
    }

    #[test]
    fn malformed_watermark_is_a_configuration_error() -> anyhow::Result<()> {
        let layout = SelectorLayout::new(0)?;
        let store = store_for(&layout, hour_ago()).with(KEY_MINIMUM_FILE_DATE, "2017-04-25");
        let mut coordinator = RunCoordinator::new(store)?;
        let err = coordinator.run_pass().expect_err("malformed date should fail");
        assert!(matches!(err, RunError::Configuration { .. }));
        Ok(())
    }
}
