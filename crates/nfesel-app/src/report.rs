//! Summary of one selection pass.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use nfesel_config::{WATERMARK_FORMAT, Watermark};
use nfesel_fsops::RunOutcome;

/// What one completed pass did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Start of the copy phase; the next watermark is derived from it.
    pub started_at: DateTime<Local>,
    /// Watermark the pass filtered with.
    pub previous_watermark: Watermark,
    /// Watermark written back to the store.
    pub watermark: Watermark,
    /// Per-directory counters, in configuration order.
    pub outcomes: Vec<RunOutcome>,
    /// Whether the new watermark reached durable storage.
    pub watermark_persisted: bool,
    /// Wall-clock duration of the whole pass.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl RunReport {
    /// Documents copied across every source directory.
    #[must_use]
    pub fn total_copied(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.copied).sum()
    }

    /// Per-file failures across every source directory.
    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.errors).sum()
    }
}

impl Display for RunReport {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            formatter,
            "run started {} (watermark {} -> {}{})",
            self.started_at.format(WATERMARK_FORMAT),
            self.previous_watermark,
            self.watermark,
            if self.watermark_persisted {
                ""
            } else {
                ", not persisted"
            }
        )?;
        for outcome in &self.outcomes {
            writeln!(
                formatter,
                "  {}: copied {} files from {} ({} errors, {} already present, {} not matching)",
                outcome.label,
                outcome.copied,
                outcome.directory.display(),
                outcome.errors,
                outcome.skipped_existing,
                outcome.not_matching,
            )?;
        }
        write!(
            formatter,
            "total: {} copied, {} errors in {} ms",
            self.total_copied(),
            self.total_errors(),
            self.elapsed.as_millis()
        )
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn report() -> RunReport {
        let started_at = Local
            .with_ymd_and_hms(2017, 4, 25, 10, 15, 0)
            .single()
            .expect("unambiguous local time");
        let previous = Watermark::parse("25/04/2017 10:00:00").expect("valid watermark");
        RunReport {
            started_at,
            previous_watermark: previous,
            watermark: previous.advance_to(started_at),
            outcomes: vec![
                RunOutcome {
                    label: "source-directory.gm".into(),
                    directory: PathBuf::from("/in/gm"),
                    considered: 4,
                    copied: 2,
                    errors: 1,
                    skipped_existing: 0,
                    not_matching: 1,
                },
                RunOutcome {
                    label: "source-directory.vw".into(),
                    directory: PathBuf::from("/in/vw"),
                    copied: 3,
                    ..RunOutcome::default()
                },
            ],
            watermark_persisted: false,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn totals_sum_every_directory() {
        let report = report();
        assert_eq!(report.total_copied(), 5);
        assert_eq!(report.total_errors(), 1);
    }

    #[test]
    fn text_rendering_lists_each_directory() {
        let rendered = report().to_string();
        assert!(rendered.starts_with(
            "run started 25/04/2017 10:15:00 (watermark 25/04/2017 10:00:00 -> 25/04/2017 10:15:00, not persisted)"
        ));
        assert!(rendered.contains("source-directory.gm: copied 2 files from /in/gm"));
        assert!(rendered.ends_with("total: 5 copied, 1 errors in 1500 ms"));
    }

    #[test]
    fn json_rendering_uses_watermark_format() -> anyhow::Result<()> {
        let value = serde_json::to_value(report())?;
        assert_eq!(value["watermark"], "25/04/2017 10:15:00");
        assert_eq!(value["elapsed_ms"], 1500);
        assert_eq!(value["watermark_persisted"], false);
        assert_eq!(value["outcomes"][1]["copied"], 3);
        Ok(())
    }
}
