//! CLI binary for pdf2assets.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2assets::{
    extract, init_engine, inspect, save_assets, ExtractionConfig, ExtractionOutput,
    ExtractionProgressCallback, ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

/// Terminal progress callback: a live page bar plus per-page log lines.
/// Pages always arrive in order (the scan is strictly sequential), so no
/// out-of-order bookkeeping is needed.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of pages that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_extraction_start` (called once the page count is known).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_extraction_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
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
        self.bar.set_prefix("Scanning");
        self.bar.reset_eta();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Scanning {total_pages} pages for embedded images…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, assets_found: usize) {
        if assets_found > 0 {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total,
                dim(&format!(
                    "{assets_found} image{}",
                    if assets_found == 1 { "" } else { "s" }
                )),
            ));
        }
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_fallback_start(&self, pages: usize) {
        self.bar.set_prefix("Capturing");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "No embedded images found — capturing {pages} page previews…"
            ))
        ));
    }

    fn on_extraction_complete(&self, _total_pages: usize, asset_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} assets extracted",
                green("✔"),
                bold(&asset_count.to_string())
            );
        } else {
            eprintln!(
                "{} {} assets extracted  ({} pages failed)",
                cyan("⚠"),
                bold(&asset_count.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # List the images embedded in a PDF
  pdf2assets brochure.pdf

  # Save them as files
  pdf2assets brochure.pdf -o assets/

  # JSON manifest on stdout (includes data URIs)
  pdf2assets --json brochure.pdf > assets.json

  # Extract from a URL
  pdf2assets https://example.com/catalog.pdf -o assets/

  # Inspect PDF metadata only
  pdf2assets --inspect-only brochure.pdf

  # Only real embedded images — skip full-page previews
  pdf2assets --no-fallback scanned.pdf

  # Higher-resolution previews for an image-free document
  pdf2assets --fallback-scale 3.0 --max-fallback-pages 3 text_only.pdf -o previews/

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium copy
  PDF2ASSETS_OUTPUT_DIR   Default for --output-dir
  PDF2ASSETS_PASSWORD     Default for --password
  (every flag below has a PDF2ASSETS_* twin — see --help per flag)

SETUP:
  pdf2assets needs the pdfium shared library at runtime. It looks for
  PDFIUM_LIB_PATH, then libpdfium.so / libpdfium.dylib / pdfium.dll next to
  the executable or in the working directory, then the system library path.
  Prebuilt binaries: https://github.com/bblanchon/pdfium-binaries
"#;

/// Extract embedded visual assets (logos, photos, charts) from PDF files.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2assets",
    version,
    about = "Extract embedded visual assets (logos, photos, charts) from PDF files",
    long_about = "Extract the images embedded in a PDF document (local file or URL): replay each \
page's bitmap paints, keep the meaningful ones, deduplicate repeats across pages, and fall back \
to full-page previews when a document contains no discrete images.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write extracted assets as image files into this directory.
    #[arg(short, long, env = "PDF2ASSETS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output the full extraction result as JSON (includes data URIs).
    #[arg(long, env = "PDF2ASSETS_JSON")]
    json: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Max pages captured when falling back to full-page previews.
    #[arg(long, env = "PDF2ASSETS_MAX_FALLBACK_PAGES", default_value_t = 5)]
    max_fallback_pages: usize,

    /// Render scale for fallback previews (0.5–4.0).
    #[arg(long, env = "PDF2ASSETS_FALLBACK_SCALE", default_value_t = 1.5)]
    fallback_scale: f32,

    /// Skip full-page previews when no embedded image qualifies.
    #[arg(long, env = "PDF2ASSETS_NO_FALLBACK")]
    no_fallback: bool,

    /// JPEG quality for fallback previews (1–100).
    #[arg(long, env = "PDF2ASSETS_JPEG_QUALITY", default_value_t = 80,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2ASSETS_PASSWORD")]
    password: Option<String>,

    /// Milliseconds to wait between exported files (see --output-dir).
    #[arg(long, env = "PDF2ASSETS_SPACING_MS", default_value_t = 0)]
    spacing_ms: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2ASSETS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PDF2ASSETS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2ASSETS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the asset list.
    #[arg(short, long, env = "PDF2ASSETS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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
        .with_writer(io::stderr)
        .init();

    // ── Fail fast if no pdfium library can be bound ──────────────────────
    init_engine().context("PDF engine unavailable")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar starts as a spinner (no page count yet);
    // `on_extraction_start` resizes it once the document has been opened.
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let mut builder = ExtractionConfig::builder()
        .max_fallback_pages(cli.max_fallback_pages)
        .fallback_scale(cli.fallback_scale)
        .include_full_fallback(!cli.no_fallback)
        .fallback_jpeg_quality(cli.jpeg_quality)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract(&cli.input, &config)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_asset_table(&output)?;
        if !cli.quiet {
            eprintln!(
                "   {} pages scanned, {} failed  —  {}ms total{}",
                dim(&output.stats.scanned_pages.to_string()),
                dim(&output.stats.failed_pages.to_string()),
                output.stats.total_duration_ms,
                if output.stats.fallback_used {
                    "  (fallback previews)"
                } else {
                    ""
                },
            );
        }
    }

    // ── Export files ─────────────────────────────────────────────────────
    if let Some(ref dir) = cli.output_dir {
        let doc_name = pdf2assets::pipeline::input::document_name(&cli.input);
        let paths = save_assets(
            &output.assets,
            dir,
            &doc_name,
            Duration::from_millis(cli.spacing_ms),
        )
        .await
        .context("Failed to export assets")?;

        if !cli.quiet {
            for p in &paths {
                eprintln!("  {} {}", green("✓"), p.display());
            }
            eprintln!(
                "{} {} files written to {}",
                green("✔"),
                bold(&paths.len().to_string()),
                bold(&dir.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Print one line per asset to stdout.
fn print_asset_table(output: &ExtractionOutput) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(
        handle,
        "{:<24} {:>5} {:>11}  {:<8} {:>10}",
        "NAME", "PAGE", "SIZE", "TAG", "DATA"
    )
    .context("Failed to write to stdout")?;

    for asset in &output.assets {
        writeln!(
            handle,
            "{:<24} {:>5} {:>5}x{:<5}  {:<8} {:>7.1} KB",
            asset.display_name,
            asset.source_page,
            asset.width,
            asset.height,
            asset.tag,
            asset.encoded_data.len() as f64 / 1024.0,
        )
        .context("Failed to write to stdout")?;
    }

    Ok(())
}
