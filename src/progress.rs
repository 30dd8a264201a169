//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline scans each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, a status label,
//! or a terminal progress bar without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` because
//! events fire from the blocking extraction thread, not the caller's task.
//!
//! Structured events (`on_page_start` and friends) carry numbers for progress
//! bars; [`on_status`](ExtractionProgressCallback::on_status) carries the
//! ready-made human-readable line ("Scanning page 3 of 12...") for hosts that
//! just want to display text.
//!
//! # Example
//!
//! ```rust
//! use pdf2assets::{ExtractionProgressCallback, ExtractionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, assets_found: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("Page {}/{} done ({} assets)", page_num, total_pages, assets_found);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// Implementations must be `Send + Sync` (events fire from a blocking worker
/// thread). All methods have default no-op implementations so callers only
/// override what they care about.
///
/// Events for one run always arrive in page order; the pipeline never
/// processes two pages at once.
pub trait ExtractionProgressCallback: Send + Sync {
    /// A human-readable status line, updated at page granularity.
    ///
    /// Suitable for direct display: "Initializing PDF engine...",
    /// "Scanning page 3 of 12...", "Complete! Found 7 unique images."
    fn on_status(&self, status: &str) {
        let _ = status;
    }

    /// Called once when the page count is known, before any page is scanned.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page's bitmap paints are replayed.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page was scanned without error.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages
    /// * `assets_found`: assets this page contributed (after filter + dedup)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, assets_found: usize) {
        let _ = (page_num, total_pages, assets_found);
    }

    /// Called when a single page fails; the run continues with the next page.
    ///
    /// Takes an owned `String` so `Arc<dyn ExtractionProgressCallback>` can
    /// move into `tokio::spawn` without tripping the HRTB "Send is not
    /// general enough" compiler error a borrowed parameter causes.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages
    /// * `error`: human-readable error description
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: String) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once if the scan found nothing and full-page captures begin.
    ///
    /// # Arguments
    /// * `pages`: number of pages that will be captured
    fn on_fallback_start(&self, pages: usize) {
        let _ = pages;
    }

    /// Called once after the run finishes, fallback included.
    ///
    /// # Arguments
    /// * `total_pages`: total pages in the document
    /// * `asset_count`: assets in the final list
    fn on_extraction_complete(&self, total_pages: usize, asset_count: usize) {
        let _ = (total_pages, asset_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        statuses: Arc<AtomicUsize>,
        starts: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        fallback_pages: Arc<AtomicUsize>,
        final_count: Arc<AtomicUsize>,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_status(&self, _status: &str) {
            self.statuses.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_start(&self, _page_num: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _assets_found: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _total_pages: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_fallback_start(&self, pages: usize) {
            self.fallback_pages.store(pages, Ordering::SeqCst);
        }

        fn on_extraction_complete(&self, _total_pages: usize, asset_count: usize) {
            self.final_count.store(asset_count, Ordering::SeqCst);
        }
    }

    fn tracker() -> TrackingCallback {
        TrackingCallback {
            statuses: Arc::new(AtomicUsize::new(0)),
            starts: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            fallback_pages: Arc::new(AtomicUsize::new(0)),
            final_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_status("Scanning page 1 of 5...");
        cb.on_extraction_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 2);
        cb.on_page_error(2, 5, "some error".to_string());
        cb.on_fallback_start(5);
        cb.on_extraction_complete(5, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = tracker();

        t.on_status("Initializing PDF engine...");
        t.on_page_start(1, 3);
        t.on_page_complete(1, 3, 2);
        t.on_page_start(2, 3);
        t.on_page_complete(2, 3, 0);
        t.on_page_start(3, 3);
        t.on_page_error(3, 3, "object tree truncated".to_string());

        assert_eq!(t.statuses.load(Ordering::SeqCst), 1);
        assert_eq!(t.starts.load(Ordering::SeqCst), 3);
        assert_eq!(t.completes.load(Ordering::SeqCst), 2);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);

        t.on_fallback_start(3);
        assert_eq!(t.fallback_pages.load(Ordering::SeqCst), 3);

        t.on_extraction_complete(3, 3);
        assert_eq!(t.final_count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ExtractionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_extraction_start(10);
        cb.on_page_start(1, 10);
        cb.on_page_complete(1, 10, 1);
    }
}
