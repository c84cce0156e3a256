//! Key/value store contract shared by the run coordinator and the loaders.
//!
//! # Design
//! - The store only knows strings; typed parsing lives in `loader.rs`.
//! - Mutations stay in memory until `save` is called.

use std::borrow::Cow;

use crate::error::{ConfigError, ConfigResult};

/// Minimal key/value property store backing the service configuration.
pub trait ConfigStore: Send {
    /// Value currently associated with `key`, if any.
    fn get(&self, key: &str) -> Option<&str>;

    /// Associate `value` with `key`, replacing any previous value in memory.
    fn set(&mut self, key: &str, value: &str);

    /// Every key in the store, in the order it was first defined.
    fn keys(&self) -> Vec<&str>;

    /// Flush the in-memory state to the backing medium.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn save(&mut self) -> ConfigResult<()>;

    /// Human-readable name of the backing medium used in diagnostics.
    fn origin(&self) -> Cow<'_, str>;
}

/// Volatile store used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that sets `key` and returns the store.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Make every subsequent `save` call fail.
    #[must_use]
    pub const fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Number of successful `save` calls so far.
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| existing == key) {
            value.clone_into(&mut entry.1);
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    fn save(&mut self) -> ConfigResult<()> {
        if self.fail_saves {
            return Err(ConfigError::io(
                "memory.save",
                "memory",
                std::io::Error::other("memory store configured to reject saves"),
            ));
        }
        self.saves += 1;
        Ok(())
    }

    fn origin(&self) -> Cow<'_, str> {
        Cow::Borrowed("in-memory configuration")
    }
}
