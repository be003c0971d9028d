//! Page rendering: drive one Chromium session over CDP and capture each URL
//! as a single-page PDF.
//!
//! ## Why one session for the whole batch?
//!
//! Launching a browser costs seconds; navigating a page costs milliseconds to
//! a few seconds. One browser and one tab are acquired up front and reused
//! serially for every URL; entry N+1 never starts before entry N's attempt
//! has finished. The session is the only long-lived resource in the pipeline,
//! so it gets an explicit acquire ([`PageRenderer::launch`]) and release
//! ([`PageRenderer::close`]); if the renderer is dropped without `close`, the
//! browser child process is killed on drop, so the session is released on
//! every exit path.
//!
//! ## Failure policy
//!
//! A failed page never aborts the batch. Navigation timeouts, browser-level
//! navigation errors, and capture failures all map to a [`RenderError`] that
//! is logged and recorded; the loop continues with the next entry. This is
//! the one real partial-failure contract in the system.

use crate::config::{ConversionConfig, PdfOptions};
use crate::error::{Fav2PdfError, RenderError};
use crate::output::{RenderBatch, RenderedPage};
use crate::pipeline::favorites::BookmarkEntry;
use crate::progress::ProgressCallback;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Name of the diagnostic artifact written next to the per-page PDFs when a
/// batch has failures.
pub const FAILED_URLS_FILE: &str = "failed_urls.json";

/// A scoped browser session that captures pages as PDFs.
pub struct PageRenderer {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    timeout: Duration,
    settle_delay: Duration,
    pdf_options: PdfOptions,
}

impl PageRenderer {
    /// Launch the browser and open the tab reused for the whole batch.
    pub async fn launch(config: &ConversionConfig) -> Result<Self, Fav2PdfError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = config.browser_path {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(|detail| Fav2PdfError::BrowserLaunch {
            detail,
        })?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| Fav2PdfError::BrowserLaunch {
                detail: e.to_string(),
            })?;

        // The CDP message loop must be polled for the session to make
        // progress; it runs until the browser connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Fav2PdfError::BrowserLaunch {
                detail: e.to_string(),
            })?;

        info!(headless = config.headless, "Browser session started");

        Ok(Self {
            browser,
            page,
            handler_task,
            timeout: Duration::from_secs(config.timeout_secs),
            settle_delay: Duration::from_secs(config.settle_delay_secs),
            pdf_options: config.pdf.clone(),
        })
    }

    /// Release the session: close the browser, wait for the child process to
    /// exit, stop the message loop.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close request failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process wait failed: {e}");
        }
        self.handler_task.abort();
        info!("Browser session released");
    }

    /// Navigate to one entry's URL and capture it as a single-page PDF at
    /// `destination`.
    ///
    /// Waits for the document to reach the `complete` ready state (bounded by
    /// the configured timeout), sleeps the settle delay for asynchronous
    /// content, then requests a `Page.printToPDF` capture and writes the
    /// decoded bytes.
    pub async fn render_one(
        &self,
        entry: &BookmarkEntry,
        destination: &Path,
    ) -> Result<(), RenderError> {
        let url = entry.url.as_str();

        let navigation = async {
            self.page.goto(url).await?;
            self.wait_for_ready_state().await
        };
        match tokio::time::timeout(self.timeout, navigation).await {
            Err(_) => {
                return Err(RenderError::Timeout {
                    url: url.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
            Ok(Err(e)) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    detail: e.to_string(),
                });
            }
            Ok(Ok(())) => {}
        }

        // Additional delay for dynamic content.
        tokio::time::sleep(self.settle_delay).await;

        let bytes = self
            .page
            .pdf(print_params(&self.pdf_options))
            .await
            .map_err(|e| RenderError::Capture {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|e| RenderError::Write {
                path: destination.to_path_buf(),
                detail: e.to_string(),
            })?;

        debug!(
            "Captured {} ({} bytes) → {}",
            url,
            bytes.len(),
            destination.display()
        );
        Ok(())
    }

    /// Render every entry in order, one at a time.
    ///
    /// Each entry gets a deterministic filename derived from its 1-based
    /// index and sanitized name. Failures are logged, reported through the
    /// progress callback, and collected; they never halt the batch. When any
    /// entry failed, the failed list is persisted to
    /// `<output_dir>/failed_urls.json` for operator follow-up.
    pub async fn render_batch(
        &self,
        entries: &[BookmarkEntry],
        output_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> RenderBatch {
        let total = entries.len();
        if let Some(ref cb) = progress {
            cb.on_batch_start(total);
        }

        let mut batch = RenderBatch::default();

        for (i, entry) in entries.iter().enumerate() {
            let index = i + 1;
            let name = sanitize_filename(&entry.name);
            let destination = output_dir.join(format!("{index:04}_{name}.pdf"));

            if let Some(ref cb) = progress {
                cb.on_entry_start(index, total, &name);
            }

            match self.render_one(entry, &destination).await {
                Ok(()) => {
                    info!("Converted {}/{}: {}", index, total, entry.name);
                    if let Some(ref cb) = progress {
                        cb.on_entry_complete(index, total, &name);
                    }
                    batch.pages.push(RenderedPage {
                        path: destination,
                        name,
                    });
                }
                Err(e) => {
                    warn!("Failed to convert {} ({}): {}", entry.name, entry.url, e);
                    if let Some(ref cb) = progress {
                        cb.on_entry_error(index, total, &name, &e.to_string());
                    }
                    batch.failed.push(entry.clone());
                }
            }
        }

        info!(
            "Render batch complete: {}/{} successful",
            batch.pages.len(),
            total
        );
        if let Some(ref cb) = progress {
            cb.on_batch_complete(total, batch.pages.len());
        }

        if !batch.failed.is_empty() {
            persist_failed_entries(&batch.failed, output_dir);
        }

        batch
    }

    /// Poll `document.readyState` until the page reports `complete`.
    async fn wait_for_ready_state(&self) -> Result<(), chromiumoxide::error::CdpError> {
        loop {
            let state = self.page.evaluate("document.readyState").await?;
            if state.value().and_then(|v| v.as_str()) == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

/// Write the failed-entry list as a pretty JSON array for later inspection
/// or manual retry. Diagnostic only: a write failure is logged, not raised.
fn persist_failed_entries(failed: &[BookmarkEntry], output_dir: &Path) {
    let path = output_dir.join(FAILED_URLS_FILE);
    match serde_json::to_string_pretty(failed) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                warn!("Could not write {}: {}", path.display(), e);
            } else {
                info!("Recorded {} failed URLs in {}", failed.len(), path.display());
            }
        }
        Err(e) => warn!("Could not serialise failed URLs: {e}"),
    }
}

/// Map the configured print options onto the CDP call parameters.
fn print_params(options: &PdfOptions) -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(options.landscape),
        display_header_footer: Some(options.display_header_footer),
        print_background: Some(options.print_background),
        scale: Some(options.scale),
        paper_width: Some(options.paper_width),
        paper_height: Some(options.paper_height),
        margin_top: Some(options.margin_top),
        margin_bottom: Some(options.margin_bottom),
        margin_left: Some(options.margin_left),
        margin_right: Some(options.margin_right),
        header_template: Some(options.header_template.clone()),
        footer_template: Some(options.footer_template.clone()),
        ..Default::default()
    }
}

/// Make a bookmark name safe to use as a file name.
///
/// Replaces `<>:"/\|?*` with `_`, caps the result at 100 characters, strips
/// trailing dots and spaces, and falls back to `"untitled"` when nothing is
/// left. Idempotent: sanitizing an already-sanitized name is a no-op.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let capped: String = replaced.chars().take(100).collect();
    let trimmed = capped.trim_end_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
