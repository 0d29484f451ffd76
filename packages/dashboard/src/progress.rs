//! Progress reporting for the sequential reload loops.
//!
//! The reload pipeline reports through [`ProgressCallback`] so it stays
//! independent of any terminal. The CLI plugs in `indicatif` bars; tests
//! and scripted runs use [`NullProgress`].

use std::sync::Arc;

/// Receives progress from a long-running reload.
///
/// Implementations must be `Send + Sync` so one instance can be shared
/// behind an `Arc` across await points.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of requests the loop will issue.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` requests.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the loop complete with a final message.
    fn finish(&self, msg: String);

    /// Marks the loop complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
