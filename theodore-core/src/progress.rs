//! User-facing progress reporting, separate from `tracing`'s structured logs
//! (SPEC_FULL.md §10.1: "distinct from the internal tracing spans — a CLI
//! progress bar and a log line serve different audiences").

use crate::types::ProgressEvent;

pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Observer that does nothing, for callers that don't want progress output.
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&self, _event: ProgressEvent) {}
}
