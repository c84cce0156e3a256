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

//! Selection and copy of carrier NF-e documents from one source directory.
//!
//! Layout: `matcher.rs` (carrier identifier capture), `partition.rs`
//! (date-partitioned destination leaf), `model.rs` (request/outcome types),
//! `service.rs` (`FileSelector`).

pub mod error;
pub mod matcher;
pub mod model;
pub mod partition;
pub mod service;

pub use error::{FsOpsError, FsOpsResult};
pub use matcher::CarrierMatcher;
pub use model::{FileFailure, RunOutcome, SelectionRequest};
pub use partition::DestinationLeaf;
pub use service::{FileSelector, IO_ERROR_TOLERANCE};
