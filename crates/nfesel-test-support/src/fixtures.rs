//! Temporary directory layouts and file helpers.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Destination root plus a number of source directories inside one temp dir.
pub struct SelectorLayout {
    temp: TempDir,
    /// Root of the copy target tree.
    pub destination: PathBuf,
    /// Source directories, named `source-0`, `source-1`, ...
    pub sources: Vec<PathBuf>,
}

impl SelectorLayout {
    /// Create the layout with `source_count` empty source directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directories cannot be created.
    pub fn new(source_count: usize) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("nfesel-")
            .tempdir()
            .context("failed to create temporary layout")?;
        let destination = temp.path().join("destination");
        fs::create_dir_all(&destination)?;
        let mut sources = Vec::with_capacity(source_count);
        for index in 0..source_count {
            let source = temp.path().join(format!("source-{index}"));
            fs::create_dir_all(&source)?;
            sources.push(source);
        }
        Ok(Self {
            temp,
            destination,
            sources,
        })
    }

    /// Root of the temporary layout.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Source directory at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range.
    #[must_use]
    pub fn source(&self, index: usize) -> &Path {
        &self.sources[index]
    }
}

/// Write `contents` to `path` and stamp its modification time.
///
/// # Errors
///
/// Returns an error if the file cannot be written or its time updated.
pub fn write_with_mtime(
    path: &Path,
    contents: impl AsRef<[u8]>,
    modified: SystemTime,
) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    let file = File::options()
        .write(true)
        .open(path)
        .with_context(|| format!("failed to reopen {}", path.display()))?;
    file.set_modified(modified)
        .with_context(|| format!("failed to set mtime on {}", path.display()))?;
    Ok(())
}

/// Instant `secs` seconds before now.
#[must_use]
pub fn seconds_ago(secs: u64) -> SystemTime {
    SystemTime::now()
        .checked_sub(Duration::from_secs(secs))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Names of the regular files directly under `dir`, sorted.
///
/// Returns an empty list when the directory does not exist.
#[must_use]
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
