//! TOML file store.
//!
//! # Design
//! - The document is edited in place with `toml_edit`, so comments, blank
//!   lines, key order and table layout survive the watermark rewrite.
//! - Nested tables and dotted keys flatten to dotted store keys:
//!   `[source-directory]` followed by `gm = '...'` reads as `source-directory.gm`.
//! - Non-string scalars are exposed through their TOML text.
//! - Saves through a temporary sibling file followed by a rename.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, TableLike, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ConfigError, ConfigResult};
use crate::store::ConfigStore;

/// Configuration store persisted as a TOML document.
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
    document: DocumentMut,
    entries: Vec<(String, String)>,
}

impl TomlStore {
    /// Load and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing, unreadable, not valid TOML,
    /// or holds arrays where a single value is expected.
    pub fn load(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::MissingFile { path });
            }
            Err(source) => return Err(ConfigError::io("config.read", path, source)),
        };
        let document = text.parse::<DocumentMut>().map_err(|source| ConfigError::Syntax {
            path: path.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        if let Err(key) = flatten(None, document.as_table(), &mut entries) {
            return Err(ConfigError::UnsupportedValue { path, key });
        }
        debug!(path = %path.display(), entries = entries.len(), "configuration loaded");
        Ok(Self {
            path,
            document,
            entries,
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&mut self, key: &str, value: &str) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(leaf) = segments.pop() else {
            return;
        };

        let mut table: &mut dyn TableLike = self.document.as_table_mut();
        for segment in segments {
            if !table.get(segment).is_some_and(Item::is_table_like) {
                table.insert(segment, toml_edit::table());
            }
            let Some(child) = table.get_mut(segment).and_then(Item::as_table_like_mut) else {
                return;
            };
            table = child;
        }

        let mut replacement = Value::from(value);
        match table.get_mut(leaf) {
            Some(item) => {
                if let Some(existing) = item.as_value() {
                    *replacement.decor_mut() = existing.decor().clone();
                }
                *item = Item::Value(replacement);
            }
            None => {
                table.insert(leaf, Item::Value(replacement));
            }
        }
    }
}

impl ConfigStore for TomlStore {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, current)) if current.as_str() == value => return,
            Some((_, current)) => value.clone_into(current),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self.write_document(key, value);
    }

    fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    fn save(&mut self) -> ConfigResult<()> {
        let rendered = self.document.to_string();
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = self
            .path
            .file_name()
            .map_or(Cow::Borrowed("config.toml"), |name| name.to_string_lossy());
        let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        fs::write(&temp_path, rendered)
            .map_err(|source| ConfigError::io("config.write_temp", &temp_path, source))?;
        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ConfigError::io("config.rename", &self.path, source));
        }
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    fn origin(&self) -> Cow<'_, str> {
        Cow::Owned(format!("\"{}\"", self.path.display()))
    }
}

fn flatten(
    prefix: Option<&str>,
    table: &dyn TableLike,
    entries: &mut Vec<(String, String)>,
) -> Result<(), String> {
    for (key, item) in table.iter() {
        let full = prefix.map_or_else(|| key.to_string(), |prefix| format!("{prefix}.{key}"));
        if let Some(child) = item.as_table_like() {
            flatten(Some(&full), child, entries)?;
            continue;
        }
        let text = match item.as_value() {
            Some(Value::String(text)) => text.value().clone(),
            Some(Value::Integer(number)) => number.value().to_string(),
            Some(Value::Float(number)) => number.value().to_string(),
            Some(Value::Boolean(flag)) => flag.value().to_string(),
            Some(Value::Datetime(stamp)) => stamp.value().to_string(),
            Some(Value::Array(_) | Value::InlineTable(_)) | None => return Err(full),
        };
        entries.push((full, text));
    }
    Ok(())
}
