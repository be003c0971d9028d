//! CLI binary for fav2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Input;
use fav2pdf::{
    convert_folder, list_folders, ConversionConfig, RenderProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Rendering is sequential, so events arrive in
/// order; the map of start times still keeps the bookkeeping robust.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Launching browser…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_entries: usize) {
        self.activate_bar(total_entries);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_entries} bookmarks…"))
        ));
    }

    fn on_entry_start(&self, index: usize, _total: usize, name: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        let short: String = name.chars().take(30).collect();
        self.bar.set_message(short);
    }

    fn on_entry_complete(&self, index: usize, total: usize, name: &str) {
        let elapsed = self.elapsed_secs(index);
        let short: String = name.chars().take(40).collect();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<40}  {}",
            green("✓"),
            index,
            total,
            short,
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_entry_error(&self, index: usize, total: usize, _name: &str, error: &str) {
        let elapsed = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            let mut m: String = error.chars().take(79).collect();
            m.push('\u{2026}');
            m
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_entries: usize, success_count: usize) {
        let failed = total_entries.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages captured successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages captured  ({} failed)",
                if failed == total_entries {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_entries,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a favorites folder to one merged PDF
  fav2pdf --folder Research -o research.pdf

  # See which folders exist first
  fav2pdf --list-folders

  # Watch the browser work (debugging page layouts)
  fav2pdf --folder Research -o research.pdf --no-headless

  # Longer timeout and settle delay for slow, script-heavy pages
  fav2pdf --folder "Reading List" -o reading.pdf -c slow-pages.json

  # Interactive: prompts for folder and output path
  fav2pdf

CONFIG FILE (JSON, all keys optional):
  {
    "timeout_secs": 60,          page-load timeout per URL
    "settle_delay_secs": 5,      extra wait after load for dynamic content
    "headless": true,
    "add_bookmarks": true,       one PDF outline entry per source page
    "parallel_downloads": 1,     accepted, currently unused (sequential)
    "pdf": {
      "paper_width": 8.27,       inches (A4 default)
      "paper_height": 11.69,
      "margin_top": 0.4,
      "landscape": false
    }
  }

BOOKMARK STORE LOCATIONS (read-only):
  Windows   %LOCALAPPDATA%\Microsoft\Edge\User Data\Default\Bookmarks
  macOS     ~/Library/Application Support/Microsoft Edge/Default/Bookmarks
  Linux     ~/.config/microsoft-edge/Default/Bookmarks
  Override with --store or FAV2PDF_STORE.

FAILED PAGES:
  Pages that time out or fail to load are skipped, listed at the end, and
  recorded as failed_urls.json in the scratch directory for the run. The
  conversion succeeds as long as at least one page rendered.
"#;

/// Convert a browser favorites folder into a single merged PDF.
#[derive(Parser, Debug)]
#[command(
    name = "fav2pdf",
    version,
    about = "Convert a browser favorites folder into a single merged PDF",
    long_about = "Capture every bookmarked URL in a favorites folder as a print-quality PDF page \
through a real browser engine, then merge the captures, in folder order and with one outline \
entry per page, into a single document.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Name of the favorites folder to convert.
    #[arg(short, long)]
    folder: Option<String>,

    /// Output PDF file path.
    #[arg(short, long, env = "FAV2PDF_OUTPUT", default_value = "output/combined.pdf")]
    output: PathBuf,

    /// Path to a JSON configuration file overriding default options.
    #[arg(short, long, env = "FAV2PDF_CONFIG")]
    config: Option<PathBuf>,

    /// List all available favorites folders and exit.
    #[arg(short, long)]
    list_folders: bool,

    /// Override the bookmark store file location.
    #[arg(long, env = "FAV2PDF_STORE")]
    store: Option<PathBuf>,

    /// Path to a Chromium-based browser executable.
    #[arg(long, env = "FAV2PDF_BROWSER")]
    browser_path: Option<PathBuf>,

    /// Run the browser in visible mode (not headless).
    #[arg(long)]
    no_headless: bool,

    /// Disable progress bar.
    #[arg(long, env = "FAV2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FAV2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FAV2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = match cli.config {
        Some(ref path) => ConversionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConversionConfig::default(),
    };
    if cli.no_headless {
        config.headless = false;
    }
    if let Some(ref store) = cli.store {
        config.store_path = Some(store.clone());
    }
    if let Some(ref browser) = cli.browser_path {
        config.browser_path = Some(browser.clone());
    }

    // ── List-folders mode ────────────────────────────────────────────────
    if cli.list_folders {
        print_folders(&config)?;
        return Ok(());
    }

    // ── Resolve folder and output, prompting when interactive ────────────
    let (folder, output) = match cli.folder {
        Some(ref folder) => (folder.clone(), cli.output.clone()),
        None => {
            eprintln!("{}", bold("=== Favorites to PDF Converter ===\n"));
            let folders = print_folders(&config)?;
            if folders.is_empty() {
                anyhow::bail!("No favorites folders found");
            }

            let folder: String = Input::new()
                .with_prompt("Folder name to convert")
                .interact_text()
                .context("Failed to read folder name")?;
            let output: String = Input::new()
                .with_prompt("Output PDF path")
                .default(cli.output.display().to_string())
                .interact_text()
                .context("Failed to read output path")?;
            (folder, PathBuf::from(output))
        }
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RenderProgressCallback>)
    } else {
        None
    };

    let stats = convert_folder(&folder, &output, &config, progress)
        .await
        .context("Conversion failed")?;

    if !cli.quiet {
        if stats.total_entries == 0 {
            eprintln!(
                "{} Folder '{}' contains no bookmarks; nothing to do",
                cyan("⚠"),
                folder
            );
        } else {
            eprintln!(
                "{}  {}/{} pages  {}ms  →  {}",
                if stats.failed_pages == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.merged_pages,
                stats.total_entries,
                stats.total_duration_ms,
                bold(&output.display().to_string()),
            );
            if stats.failed_pages > 0 {
                eprintln!(
                    "   {} failed (see failed_urls.json noted in the log)",
                    red(&stats.failed_pages.to_string())
                );
            }
        }
    }

    Ok(())
}

/// Print the available folder paths; returns them for interactive reuse.
fn print_folders(config: &ConversionConfig) -> Result<Vec<String>> {
    let folders = list_folders(config).context("Failed to read favorites folders")?;

    println!("\nAvailable favorites folders:");
    println!("{}", dim(&"-".repeat(40)));
    for folder in &folders {
        println!("  • {folder}");
    }
    println!("{}", dim(&"-".repeat(40)));
    Ok(folders)
}
