//! Streaming extraction API: emit each page's assets as the scan reaches it.
//!
//! ## Why stream?
//!
//! Large documents take a while to scan, and a gallery UI wants to show the
//! first images immediately. [`extract_stream`] yields one [`PageAssets`]
//! batch per page, in page order, as the blocking scan progresses — followed
//! by fallback-capture batches if the scan found nothing. Dropping the stream
//! cancels the run at the next page boundary, so abandoning a 300-page
//! document costs at most one more page of work.
//!
//! Unlike the eager [`crate::extract::extract`], which returns only after the
//! whole document is processed, the stream carries no aggregate
//! [`crate::ExtractionStats`]; callers that need totals can fold the batches
//! themselves.

use crate::assets::PageAssets;
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extract;
use crate::pipeline::input::{self, ResolvedInput};
use std::io::Write;
use std::path::Path;
use std::pin::Pin;
use tempfile::NamedTempFile;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-page asset batches.
///
/// Items arrive in page order. A fatal mid-scan failure (corrupt document,
/// missing pdfium library) arrives as a single `Err` item and ends the
/// stream; per-page failures ride inside [`PageAssets::error`] and the stream
/// continues.
pub type AssetStream = Pin<Box<dyn Stream<Item = Result<PageAssets, ExtractError>> + Send>>;

/// Extract visual assets from a PDF file or URL, streaming per-page batches.
///
/// # Returns
/// - `Ok(AssetStream)` — batches in page order, fallback batches last
/// - `Err(ExtractError)` — fatal error before the scan started (file not
///   found, not a PDF, download failed)
///
/// # Example
/// ```rust,no_run
/// use pdf2assets::{extract_stream, ExtractionConfig};
/// use tokio_stream::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let mut stream = extract_stream("catalog.pdf", &config).await?;
/// while let Some(batch) = stream.next().await {
///     let batch = batch?;
///     println!("page {}: {} assets", batch.page_num, batch.assets.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_stream(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<AssetStream, ExtractError> {
    let input_str = input_str.as_ref();
    info!("Starting streaming extraction: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    Ok(spawn_scan(ScanGuard::Resolved(resolved), config.clone()))
}

/// Streaming equivalent of [`crate::extract::extract_from_bytes`].
///
/// The bytes are written to a managed temp file which stays alive inside the
/// scanning task until the scan finishes, so the stream may be consumed at
/// any pace.
pub async fn extract_stream_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<AssetStream, ExtractError> {
    let mut tmp = NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    Ok(spawn_scan(ScanGuard::Bytes(tmp), config.clone()))
}

/// Keeps the backing file alive for the duration of the blocking scan.
enum ScanGuard {
    Resolved(ResolvedInput),
    Bytes(NamedTempFile),
}

impl ScanGuard {
    fn path(&self) -> &Path {
        match self {
            ScanGuard::Resolved(r) => r.path(),
            ScanGuard::Bytes(t) => t.path(),
        }
    }
}

fn spawn_scan(guard: ScanGuard, config: ExtractionConfig) -> AssetStream {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<PageAssets, ExtractError>>(16);

    tokio::task::spawn_blocking(move || {
        let cancel = config.cancel.clone();
        let sender = tx.clone();
        let mut emit = move |batch: PageAssets| {
            // A closed channel means nobody is listening any more; stop the
            // scan at the next page boundary instead of grinding through the
            // rest of the document.
            if sender.blocking_send(Ok(batch)).is_err() {
                cancel.cancel();
            }
        };

        if let Err(e) = extract::scan_blocking(guard.path(), &config, Some(&mut emit)) {
            warn!("Streaming extraction ended early: {}", e);
            let _ = tx.blocking_send(Err(e));
        }
        // `guard` drops here, after the scan is done with the path.
    });

    Box::pin(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_fails_before_a_stream_exists() {
        let err = extract_stream("/definitely/not/here.pdf", &ExtractionConfig::default())
            .await
            .err()
            .expect("resolution must fail");
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn asset_stream_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AssetStream>();
    }
}
