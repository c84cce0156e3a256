#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! File-backed configuration for the NF-e selector.
//!
//! Layout: `store.rs` (key/value store contract + in-memory store),
//! `toml_store.rs` (TOML file store), `watermark.rs` (minimum file
//! date codec), `model.rs` (property keys and `RunConfiguration`),
//! `validate.rs` (directory validator and aggregated report), `loader.rs`
//! (store -> validated run configuration).

pub mod error;
pub mod loader;
pub mod model;
pub mod store;
pub mod toml_store;
pub mod validate;
pub mod watermark;

pub use error::{ConfigError, ConfigResult};
pub use loader::{RunDraft, load_run_configuration, scan_interval_minutes};
pub use model::{
    DEFAULT_SCAN_INTERVAL_MINUTES, KEY_DESTINATION_DIRECTORY, KEY_MINIMUM_FILE_DATE,
    KEY_SCAN_INTERVAL_MINUTES, KEY_SOURCE_DIRECTORY_PREFIX, KEY_TARGET_IDENTIFIER,
    RunConfiguration, SourceDirectory,
};
pub use store::{ConfigStore, MemoryStore};
pub use toml_store::TomlStore;
pub use validate::{
    DirectoryRole, MIN_IDENTIFIER_DIGITS, ValidationProblem, ValidationReport,
    normalize_identifier, validate_directory,
};
pub use watermark::{WATERMARK_FORMAT, Watermark};
