//! Date-partitioned destination leaf (`<root>/<yyyy>/Mês-<MM>/Dia-<dd>`).
//!
//! The leaf is keyed to the date the pass started, not to the files' own
//! dates, and is only created on the first matching document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Destination directory shared by every source directory of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationLeaf {
    path: PathBuf,
    created: bool,
}

impl DestinationLeaf {
    /// Leaf under `root` for `date`.
    #[must_use]
    pub fn for_date(root: &Path, date: NaiveDate) -> Self {
        let path = root
            .join(date.format("%Y").to_string())
            .join(date.format("Mês-%m").to_string())
            .join(date.format("Dia-%d").to_string());
        Self {
            path,
            created: false,
        }
    }

    /// Full path of the leaf directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this pass already created (or confirmed) the directory.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created
    }

    pub(crate) fn ensure(&mut self) -> io::Result<()> {
        if !self.created {
            fs::create_dir_all(&self.path)?;
            self.created = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn leaf_follows_year_month_day_layout() {
        let date = NaiveDate::from_ymd_opt(2017, 4, 5).expect("valid date");
        let leaf = DestinationLeaf::for_date(Path::new("/srv/out"), date);
        assert_eq!(leaf.path(), Path::new("/srv/out/2017/Mês-04/Dia-05"));
        assert!(!leaf.is_created());
    }

    #[test]
    fn ensure_creates_once() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date");
        let mut leaf = DestinationLeaf::for_date(temp.path(), date);
        leaf.ensure()?;
        assert!(leaf.is_created());
        assert!(temp.path().join("2024").join("Mês-12").join("Dia-31").is_dir());
        leaf.ensure()?;
        Ok(())
    }

    #[test]
    fn ensure_reports_blocked_paths() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("2024"), "not a directory")?;
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
        let mut leaf = DestinationLeaf::for_date(temp.path(), date);
        assert!(leaf.ensure().is_err());
        assert!(!leaf.is_created());
        Ok(())
    }
}
