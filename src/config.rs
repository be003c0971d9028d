//! Configuration types for favorites-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`] or loaded from a JSON file with
//! [`ConversionConfig::from_file`]. Keeping every knob in one struct makes it
//! trivial to share configs across components, serialise them for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest. The same defaults back the `serde` attributes, so a
//! partial config file overrides exactly the keys it names.

use crate::error::Fav2PdfError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a favorites-to-PDF conversion run.
///
/// Built via [`ConversionConfig::builder()`], [`ConversionConfig::default()`],
/// or [`ConversionConfig::from_file`].
///
/// # Example
/// ```rust
/// use fav2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .timeout_secs(60)
///     .settle_delay_secs(5)
///     .headless(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Declared for config-file compatibility; rendering is strictly
    /// sequential and this value is never consulted. Default: 1.
    pub parallel_downloads: usize,

    /// Per-page navigation timeout in seconds. Default: 30.
    ///
    /// Bounds only the individual page load; there is no timeout on the
    /// overall batch. A page that exceeds it is recorded as failed and the
    /// batch moves on.
    pub timeout_secs: u64,

    /// Fixed settle delay in seconds after the load state completes. Default: 2.
    ///
    /// Pages routinely keep fetching and laying out content after the `load`
    /// event. The delay gives asynchronous content a chance to appear before
    /// capture; raise it for script-heavy pages, lower it for static ones.
    pub settle_delay_secs: u64,

    /// Run the browser headless. Default: true.
    pub headless: bool,

    /// Add one PDF outline entry per source page to the merged output. Default: true.
    pub add_bookmarks: bool,

    /// Explicit path to a Chromium-based browser executable.
    /// If None, chromiumoxide probes the usual install locations.
    pub browser_path: Option<PathBuf>,

    /// Override the bookmark store location. If None, the platform default
    /// profile path is used.
    pub store_path: Option<PathBuf>,

    /// Print parameters for the per-page PDF capture.
    pub pdf: PdfOptions,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            parallel_downloads: 1,
            timeout_secs: 30,
            settle_delay_secs: 2,
            headless: true,
            add_bookmarks: true,
            browser_path: None,
            store_path: None,
            pdf: PdfOptions::default(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing keys keep their defaults, so `{"timeout_secs": 60}` is a
    /// complete, valid config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Fav2PdfError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Fav2PdfError::ConfigRead {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| Fav2PdfError::ConfigRead {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Fav2PdfError> {
        if self.timeout_secs == 0 {
            return Err(Fav2PdfError::InvalidConfig(
                "timeout_secs must be ≥ 1".into(),
            ));
        }
        if self.pdf.paper_width <= 0.0 || self.pdf.paper_height <= 0.0 {
            return Err(Fav2PdfError::InvalidConfig(format!(
                "paper size must be positive, got {}in × {}in",
                self.pdf.paper_width, self.pdf.paper_height
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn parallel_downloads(mut self, n: usize) -> Self {
        self.config.parallel_downloads = n.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn settle_delay_secs(mut self, secs: u64) -> Self {
        self.config.settle_delay_secs = secs;
        self
    }

    pub fn headless(mut self, v: bool) -> Self {
        self.config.headless = v;
        self
    }

    pub fn add_bookmarks(mut self, v: bool) -> Self {
        self.config.add_bookmarks = v;
        self
    }

    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_path = Some(path.into());
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_path = Some(path.into());
        self
    }

    pub fn pdf(mut self, options: PdfOptions) -> Self {
        self.config.pdf = options;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Fav2PdfError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Print parameters for the CDP `Page.printToPDF` capture.
///
/// Defaults are A4 portrait with 0.4 in margins, background graphics on, and
/// a centred page-number footer. Dimensions are in inches, per the protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub landscape: bool,
    pub display_header_footer: bool,
    pub print_background: bool,
    pub scale: f64,
    /// Paper width in inches. Default: 8.27 (A4).
    pub paper_width: f64,
    /// Paper height in inches. Default: 11.69 (A4).
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// HTML template for the page header. Empty div by default.
    pub header_template: String,
    /// HTML template for the page footer. The `pageNumber` / `totalPages`
    /// class names are substituted by the browser.
    pub footer_template: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            landscape: false,
            display_header_footer: true,
            print_background: true,
            scale: 1.0,
            paper_width: 8.27,
            paper_height: 11.69,
            margin_top: 0.4,
            margin_bottom: 0.4,
            margin_left: 0.4,
            margin_right: 0.4,
            header_template: "<div></div>".to_string(),
            footer_template: concat!(
                "<div style=\"font-size:10px; text-align:center; width:100%;\">",
                "<span class=\"pageNumber\"></span> / <span class=\"totalPages\"></span>",
                "</div>"
            )
            .to_string(),
        }
    }
}
