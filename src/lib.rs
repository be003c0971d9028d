//! # fav2pdf
//!
//! Convert a browser favorites folder into a single merged PDF document.
//!
//! ## Why this crate?
//!
//! "Save these twenty tabs for the flight" is a bookmark folder, not a
//! document. This crate turns such a folder into one: each bookmarked URL is
//! captured as a print-quality PDF page through a real browser engine, and
//! the captures are concatenated in folder order, with a PDF outline entry
//! per source page, into a single file you can read, share, or archive.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Bookmarks (JSON store)
//!  │
//!  ├─ 1. Favorites  find the folder by name, flatten to an ordered URL list
//!  ├─ 2. Render     capture each URL via CDP Page.printToPDF (one browser,
//!  │                strictly sequential, per-page failures tolerated)
//!  └─ 3. Merge      concatenate the captures with lopdf, one outline entry
//!                   per source page
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fav2pdf::{convert_folder, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let stats = convert_folder("Research", "output/research.pdf", &config, None).await?;
//!     eprintln!(
//!         "{}/{} pages merged, {} failed",
//!         stats.merged_pages, stats.total_entries, stats.failed_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fav2pdf` binary (clap + anyhow + tracing-subscriber + indicatif + dialoguer) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! fav2pdf = { version = "0.2", default-features = false }
//! ```
//!
//! ## Failure model
//!
//! A page that times out or fails to load is logged, recorded in a
//! `failed_urls.json` side artifact, and skipped; the batch always attempts
//! every entry. Only run-level conditions (store missing, folder unknown,
//! browser won't launch, nothing merged) abort the conversion.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PdfOptions};
pub use convert::{convert_folder, list_folders};
pub use error::{Fav2PdfError, RenderError};
pub use output::{ConversionStats, RenderBatch, RenderedPage};
pub use pipeline::favorites::{
    default_store_path, BookmarkEntry, BookmarkNode, BookmarkTree, FavoritesStore,
};
pub use pipeline::render::{sanitize_filename, PageRenderer};
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
