//! Error types for the fav2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Fav2PdfError`] — **Fatal**: the conversion cannot proceed at all
//!   (bookmark store missing, folder not found, browser failed to launch,
//!   nothing to merge). Returned as `Err(Fav2PdfError)` from the top-level
//!   `convert_folder` / `list_folders` functions.
//!
//! * [`RenderError`] — **Non-fatal**: a single page failed (navigation
//!   timeout, browser-side error, capture glitch) but all other pages are
//!   fine. Collected into [`crate::output::RenderBatch::failed`] so callers
//!   can inspect partial success rather than losing the whole batch to one
//!   bad URL.
//!
//! The separation keeps the batch contract honest: page-level failures never
//! propagate past the render loop, while store/folder resolution errors abort
//! before a browser process even exists.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the fav2pdf library.
///
/// Page-level failures use [`RenderError`] and are stored in
/// [`crate::output::RenderBatch`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Fav2PdfError {
    // ── Bookmark store errors ─────────────────────────────────────────────
    /// The bookmark store file does not exist at the resolved location.
    #[error("Bookmark store not found: '{path}'\nIs the browser installed, and has it ever been run?")]
    StoreNotFound { path: PathBuf },

    /// The store file exists but its JSON does not match the expected schema.
    #[error("Failed to parse bookmark store '{path}': {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No home directory could be resolved for the platform store lookup.
    #[error("Could not determine the user home directory to locate the bookmark store")]
    HomeDirUnavailable,

    /// The requested folder does not exist anywhere in the tree.
    #[error("Folder '{name}' not found in favorites.\nUse --list-folders to see what is available.")]
    FolderNotFound { name: String },

    // ── Browser errors ────────────────────────────────────────────────────
    /// The Chromium process could not be launched or attached to.
    #[error("Failed to launch browser: {detail}\nIs a Chromium-based browser installed? Use --browser-path to point at one.")]
    BrowserLaunch { detail: String },

    // ── Merge errors ──────────────────────────────────────────────────────
    /// The merge was invoked with zero input pages; no output file is created.
    #[error("No PDF pages to merge; no output was written")]
    NothingToMerge,

    /// Unexpected I/O or PDF-library error during the merge.
    #[error("PDF merge failed: {detail}")]
    MergeFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the merged output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scratch directory for intermediate PDFs could not be created.
    #[error("Failed to create scratch directory: {source}")]
    ScratchDirFailed {
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A configuration file was given but could not be read.
    #[error("Failed to read config file '{path}': {detail}")]
    ConfigRead { path: PathBuf, detail: String },

    /// Builder or config-file validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single bookmark entry.
///
/// Produced by [`crate::pipeline::render::PageRenderer::render_one`] and
/// logged by the batch loop; the entry is recorded in the failed list and the
/// batch continues with the next URL.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The page did not finish loading within the configured timeout.
    #[error("Timeout after {secs}s loading '{url}'")]
    Timeout { url: String, secs: u64 },

    /// The browser reported a navigation error (DNS failure, TLS error, …).
    #[error("Navigation failed for '{url}': {detail}")]
    Navigation { url: String, detail: String },

    /// Navigation succeeded but the PDF capture call failed.
    #[error("PDF capture failed for '{url}': {detail}")]
    Capture { url: String, detail: String },

    /// The captured bytes could not be written to the scratch directory.
    #[error("Failed to write '{path}': {detail}")]
    Write { path: PathBuf, detail: String },
}
