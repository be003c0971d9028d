//! Result types produced by the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::favorites::BookmarkEntry;

/// A successfully rendered page: the intermediate PDF on disk plus the label
/// the merge stage will use for its outline entry.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Path of the single-page PDF inside the scratch directory.
    pub path: PathBuf,
    /// Sanitized source name, used as the outline label.
    pub name: String,
}

/// Outcome of a render batch.
///
/// Invariant: `pages.len() + failed.len()` equals the number of input
/// entries, and `pages` preserves the relative input order of the entries
/// that succeeded.
#[derive(Debug, Default)]
pub struct RenderBatch {
    /// Per-entry successes, in input order.
    pub pages: Vec<RenderedPage>,
    /// Entries whose render attempt failed, in input order.
    pub failed: Vec<BookmarkEntry>,
}

/// Statistics about a completed conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// URL entries found in the requested folder.
    pub total_entries: usize,
    /// Entries rendered to an intermediate PDF.
    pub rendered_pages: usize,
    /// Entries that failed to render.
    pub failed_pages: usize,
    /// Pages written to the merged output document.
    pub merged_pages: usize,
    /// Wall-clock time spent rendering, in milliseconds.
    pub render_duration_ms: u64,
    /// Wall-clock time spent merging, in milliseconds.
    pub merge_duration_ms: u64,
    /// End-to-end wall-clock time, in milliseconds.
    pub total_duration_ms: u64,
}
