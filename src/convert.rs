//! Conversion entry points: sequence the three pipeline stages.
//!
//! Stage-level fatal conditions (store or folder resolution) abort before a
//! scratch directory or browser session exists. Page-level failures stay
//! inside the render batch. Merge failures are reported to the caller, but
//! the scratch directory holding the intermediate PDFs is a [`TempDir`],
//! so cleanup is guaranteed on every exit path, success or failure.

use crate::config::ConversionConfig;
use crate::error::Fav2PdfError;
use crate::output::ConversionStats;
use crate::pipeline::{favorites, merge, render::PageRenderer};
use crate::progress::ProgressCallback;

use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Convert every bookmark in the folder named `folder_name` into one merged
/// PDF at `output_path`.
///
/// # Errors
/// Returns `Err` only for run-level failures: missing/malformed store,
/// unknown folder, browser launch failure, or a merge that produced no
/// output. A folder that exists but contains zero URLs is a no-op success
/// with a warning. Individual page failures never fail the run by
/// themselves; they surface in the returned [`ConversionStats`].
pub async fn convert_folder(
    folder_name: &str,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
    progress: Option<ProgressCallback>,
) -> Result<ConversionStats, Fav2PdfError> {
    let total_start = Instant::now();
    let output_path = output_path.as_ref();

    // ── Step 1: Resolve folder to an ordered entry list ──────────────────
    info!("Parsing favorites folder: {}", folder_name);
    let tree = open_store(config)?;
    let folder = tree
        .find_folder(folder_name)
        .ok_or_else(|| Fav2PdfError::FolderNotFound {
            name: folder_name.to_string(),
        })?;
    let entries = folder.flatten();
    info!("Found {} bookmarks in folder '{}'", entries.len(), folder_name);

    if entries.is_empty() {
        warn!("No bookmarks found in the specified folder");
        return Ok(ConversionStats {
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            ..Default::default()
        });
    }

    // ── Step 2: Render each URL into the scratch directory ───────────────
    // The TempDir guard removes the scratch directory and everything in it
    // when this function returns, whatever the outcome.
    let scratch = TempDir::with_prefix("fav2pdf-")
        .map_err(|source| Fav2PdfError::ScratchDirFailed { source })?;

    let render_start = Instant::now();
    let renderer = PageRenderer::launch(config).await?;
    let batch = renderer
        .render_batch(&entries, scratch.path(), progress)
        .await;
    renderer.close().await;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    info!(
        "Rendered {}/{} pages in {}ms",
        batch.pages.len(),
        entries.len(),
        render_duration_ms
    );

    // ── Step 3: Merge the captures into the output document ──────────────
    let merge_start = Instant::now();
    let merged_pages = merge::merge(&batch.pages, output_path, config.add_bookmarks)?;
    let merge_duration_ms = merge_start.elapsed().as_millis() as u64;

    info!("Successfully created: {}", output_path.display());

    Ok(ConversionStats {
        total_entries: entries.len(),
        rendered_pages: batch.pages.len(),
        failed_pages: batch.failed.len(),
        merged_pages,
        render_duration_ms,
        merge_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    })
}

/// List every folder path in the bookmark tree.
///
/// Does not require a browser.
pub fn list_folders(config: &ConversionConfig) -> Result<Vec<String>, Fav2PdfError> {
    Ok(open_store(config)?.folder_paths())
}

fn open_store(config: &ConversionConfig) -> Result<favorites::BookmarkTree, Fav2PdfError> {
    let store_path = match config.store_path {
        Some(ref path) => path.clone(),
        None => favorites::default_store_path()?,
    };
    favorites::FavoritesStore::open(store_path)
}
