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

//! Binary entrypoint for the NF-e selector.

use std::process::ExitCode;

/// Parses the command line, runs the requested mode and maps the outcome to an exit status.
#[tokio::main]
async fn main() -> ExitCode {
    ExitCode::from(nfesel_app::cli::run().await)
}
