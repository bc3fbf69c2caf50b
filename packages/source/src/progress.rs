//! Progress reporting for the per-feature pipeline loop.
//!
//! [`ProgressCallback`] keeps the pipeline independent of how progress is
//! shown. The CLI plugs in an `indicatif` bar; library callers and tests
//! use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a pipeline run.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of features to process.
    fn set_total(&self, total: u64);

    /// Advances by `delta` processed features.
    fn inc(&self, delta: u64);

    /// Updates the status message.
    fn set_message(&self, msg: String);

    /// Marks the run as finished.
    fn finish(&self, msg: String);
}

/// Ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
