//! Process-level span guard.
//!
//! # Design
//! - Every event emitted while the guard lives carries the process mode and build SHA.
//! - The span is leaked so the guard can be held for the lifetime of `main`.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application-level tracing span for the lifetime of the guard.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", mode = %mode, build_sha = %build_sha()),
        ));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_context_guard_can_be_entered_and_dropped() {
        let guard = GlobalContextGuard::new("once");
        tracing::info!("inside the app span");
        drop(guard);
    }
}
