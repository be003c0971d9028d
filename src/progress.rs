//! Progress-callback trait for per-page render events.
//!
//! Pass an [`Arc<dyn RenderProgressCallback>`] to
//! [`crate::convert::convert_folder`] to receive real-time events as the
//! batch works through each bookmark entry.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log file, or a GUI without
//! the library knowing anything about how the host application communicates.
//! The trait is `Send + Sync` so an implementation can be shared freely, even
//! though the render loop itself is strictly sequential.

use std::sync::Arc;

/// Called by the render batch as it attempts each bookmark entry.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait RenderProgressCallback: Send + Sync {
    /// Called once before the first entry is attempted.
    fn on_batch_start(&self, total_entries: usize) {
        let _ = total_entries;
    }

    /// Called just before navigating to an entry's URL.
    ///
    /// `index` is 1-based, matching the output filename prefix.
    fn on_entry_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an entry's PDF was captured and written.
    fn on_entry_complete(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an entry failed to render.
    fn on_entry_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every entry has been attempted.
    fn on_batch_complete(&self, total_entries: usize, success_count: usize) {
        let _ = (total_entries, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenderProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn RenderProgressCallback>;
