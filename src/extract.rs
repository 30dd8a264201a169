//! Eager (full-document) extraction entry points and the scan loop.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: scan the whole document, then return
//! everything at once. It collects every asset and page outcome into memory
//! before returning. Use [`crate::stream::extract_stream`] instead when you
//! want per-page batches as the scan progresses, or want to abandon a large
//! document partway through.
//!
//! ## The scan loop
//!
//! [`run_extraction`] is the single pipeline both the eager and streaming
//! surfaces drive. It walks pages strictly in order, one at a time; a page is
//! never started before the previous one finished or failed. Per-page failures
//! are recorded and skipped, fatal failures abort with no partial results, and
//! when the scan finds nothing the fallback phase captures full-page previews
//! instead.

use crate::assets::{
    AssetTag, DocumentInfo, ExtractedAsset, ExtractionOutput, ExtractionStats, PageAssets,
    PageOutcome,
};
use crate::config::ExtractionConfig;
use crate::error::{ExtractError, PageError};
use crate::pipeline::intercept::{BitmapSink, DedupKey};
use crate::pipeline::raster::{self, PageSource, PdfiumPages};
use crate::pipeline::{encode, engine, input};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract visual assets from a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config` — Extraction configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` on success, even if some pages failed
/// (check `output.stats.failed_pages`) and even if the asset list is empty
/// (fallback disabled, or every fallback capture failed).
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal errors:
/// - File not found / permission denied / not a valid PDF
/// - Document cannot be opened (corrupt, wrong password)
/// - No pdfium library available
/// - The run's [`crate::CancelToken`] was flipped
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Read document metadata ───────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_status("Initializing PDF engine...");
    }
    let metadata = raster::document_info(&pdf_path, config.password.as_deref()).await?;
    info!("PDF has {} pages", metadata.page_count);

    // ── Step 3: Scan pages (blocking phase) ──────────────────────────────
    let scan_start = Instant::now();
    let cfg = config.clone();
    let scan = tokio::task::spawn_blocking(move || scan_blocking(&pdf_path, &cfg, None))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))??;
    let scan_duration_ms = scan_start.elapsed().as_millis() as u64;

    // `resolved` owns any downloaded temp file; it may only be dropped now
    // that the blocking phase is done with the path.
    drop(resolved);

    // ── Step 4: Assemble output ──────────────────────────────────────────
    let failed = scan.pages.iter().filter(|p| p.error.is_some()).count();
    let stats = ExtractionStats {
        total_pages: scan.total_pages,
        scanned_pages: scan.total_pages - failed,
        failed_pages: failed,
        asset_count: scan.assets.len(),
        fallback_used: scan.fallback_used,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        scan_duration_ms,
    };

    info!(
        "Extraction complete: {} assets from {} pages in {}ms",
        stats.asset_count, stats.total_pages, stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        assets: scan.assets,
        pages: scan.pages,
        metadata,
        stats,
    })
}

/// Extract visual assets from PDF bytes in memory.
///
/// This avoids the need for the caller to create a temporary file. Internally
/// the library writes `bytes` to a managed [`tempfile`] and cleans it up
/// automatically on return or panic.
///
/// This is the recommended API when PDF data comes from an upload, a
/// database, or an in-memory buffer rather than a file on disk.
///
/// # Example
/// ```rust,no_run
/// use pdf2assets::{extract_from_bytes, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("brochure.pdf")?;
/// let config = ExtractionConfig::default();
/// let output = extract_from_bytes(&bytes, &config).await?;
/// println!("{} assets found", output.assets.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config).await
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Read document metadata without scanning any page.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentInfo, ExtractError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    raster::document_info(resolved.path(), None).await
}

// ── The blocking scan ────────────────────────────────────────────────────

/// What [`run_extraction`] hands back to the orchestrators.
#[derive(Debug)]
pub(crate) struct ScanResult {
    pub(crate) assets: Vec<ExtractedAsset>,
    pub(crate) pages: Vec<PageOutcome>,
    pub(crate) total_pages: usize,
    pub(crate) fallback_used: bool,
}

/// Open the document and run the full scan + fallback over it.
///
/// One blocking call covers both phases so the document is opened exactly
/// once per run. Must be called from `spawn_blocking`; pdfium is CPU-bound
/// and not async-safe.
pub(crate) fn scan_blocking(
    pdf_path: &Path,
    config: &ExtractionConfig,
    emit: Option<&mut dyn FnMut(PageAssets)>,
) -> Result<ScanResult, ExtractError> {
    let pdfium = engine::bind()?;
    let document = raster::open_document(&pdfium, pdf_path, config.password.as_deref())?;
    let source = PdfiumPages::new(&document);
    run_extraction(&source, config, emit)
}

/// The scan-then-fallback pipeline over any [`PageSource`].
///
/// Pages are processed strictly sequentially. A page that fails contributes
/// zero assets and the loop continues; only document-level problems (or
/// cancellation) abort the run. If the scan ends with an empty asset list and
/// fallback is enabled, up to `max_fallback_pages` full-page previews are
/// captured instead — no size filter, no dedup, tagged
/// [`AssetTag::Other`]. Fallback never runs when the scan found anything.
///
/// `emit` receives one [`PageAssets`] batch per processed page (and per
/// fallback capture), in page order, for the streaming surface.
pub(crate) fn run_extraction(
    source: &dyn PageSource,
    config: &ExtractionConfig,
    mut emit: Option<&mut dyn FnMut(PageAssets)>,
) -> Result<ScanResult, ExtractError> {
    let total_pages = source.page_count();
    info!("Scanning {} pages for embedded images", total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(total_pages);
    }

    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut assets: Vec<ExtractedAsset> = Vec::new();
    let mut pages: Vec<PageOutcome> = Vec::with_capacity(total_pages);

    for page_num in 1..=total_pages {
        if config.cancel.is_cancelled() {
            info!("Extraction cancelled at page {}", page_num);
            return Err(ExtractError::Cancelled);
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_status(&format!("Scanning page {} of {}...", page_num, total_pages));
            cb.on_page_start(page_num, total_pages);
        }

        let before = assets.len();
        let walk_result = {
            let mut sink = BitmapSink::new(page_num, &mut seen, &mut assets);
            source.walk_bitmaps(page_num, &mut |event| sink.observe(event))
        };

        match walk_result {
            Ok(()) => {
                let found = assets.len() - before;
                debug!("Page {}: {} assets after filter and dedup", page_num, found);
                pages.push(PageOutcome {
                    page_num,
                    assets_found: found,
                    error: None,
                });
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, total_pages, found);
                }
                if let Some(cb) = emit.as_mut() {
                    cb(PageAssets {
                        page_num,
                        total_pages,
                        assets: assets[before..].to_vec(),
                        fallback: false,
                        error: None,
                    });
                }
            }
            Err(e) => {
                warn!("Page {} failed, continuing: {}", page_num, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, e.to_string());
                }
                if let Some(cb) = emit.as_mut() {
                    cb(PageAssets {
                        page_num,
                        total_pages,
                        assets: Vec::new(),
                        fallback: false,
                        error: Some(e.clone()),
                    });
                }
                pages.push(PageOutcome {
                    page_num,
                    assets_found: 0,
                    error: Some(e),
                });
            }
        }
    }

    let fallback_used = assets.is_empty() && config.include_full_fallback && total_pages > 0;
    if fallback_used {
        let capture_count = total_pages.min(config.max_fallback_pages);
        info!(
            "No embedded images passed the filter; capturing {} page previews",
            capture_count
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_fallback_start(capture_count);
            cb.on_status(&format!(
                "No embedded images found. Capturing {} page previews...",
                capture_count
            ));
        }

        for page_num in 1..=capture_count {
            if config.cancel.is_cancelled() {
                info!("Extraction cancelled during fallback at page {}", page_num);
                return Err(ExtractError::Cancelled);
            }

            let captured = source
                .capture_page(page_num, config.fallback_scale)
                .and_then(|img| {
                    encode::encode_jpeg(&img, config.fallback_jpeg_quality)
                        .map(|encoded| (img.width(), img.height(), encoded))
                        .map_err(|e| PageError::CaptureFailed {
                            page: page_num,
                            detail: e.to_string(),
                        })
                });

            match captured {
                Ok((width, height, encoded)) => {
                    let asset = ExtractedAsset::new(
                        format!("page-{}-full", page_num),
                        encoded.data_uri,
                        page_num,
                        width,
                        height,
                        AssetTag::Other,
                    );
                    if let Some(cb) = emit.as_mut() {
                        cb(PageAssets {
                            page_num,
                            total_pages,
                            assets: vec![asset.clone()],
                            fallback: true,
                            error: None,
                        });
                    }
                    assets.push(asset);
                }
                Err(e) => {
                    // A broken page yields fewer previews, never a failed run.
                    warn!("Fallback capture for page {} failed: {}", page_num, e);
                    if let Some(cb) = emit.as_mut() {
                        cb(PageAssets {
                            page_num,
                            total_pages,
                            assets: Vec::new(),
                            fallback: true,
                            error: Some(e),
                        });
                    }
                }
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        if fallback_used {
            cb.on_status(&format!(
                "Complete! Captured {} page previews.",
                assets.len()
            ));
        } else {
            cb.on_status(&format!("Complete! Found {} unique images.", assets.len()));
        }
        cb.on_extraction_complete(total_pages, assets.len());
    }

    Ok(ScanResult {
        assets,
        pages,
        total_pages,
        fallback_used,
    })
}
