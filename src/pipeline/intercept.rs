//! The interception side channel: filter, dedup and materialise paints.
//!
//! One [`BitmapSink`] lives for exactly one page. It receives every
//! [`PaintEvent`] the replay observes, applies the size filter, encodes
//! survivors to PNG, suppresses repeats across the whole run, and appends
//! the accepted ones to the run's asset list. Each step is best-effort per
//! bitmap: anything that goes wrong with one event is logged at `debug!`
//! and the walk continues untouched.

use crate::assets::{AssetTag, ExtractedAsset};
use crate::pipeline::encode;
use crate::pipeline::raster::PaintEvent;
use std::collections::HashSet;
use tracing::debug;

/// Exclusive lower bound for both edges of an accepted bitmap.
///
/// Bitmaps must be strictly wider AND taller than this. The floor excludes
/// glyph fragments, rule lines and UI icons; genuinely small logos are a
/// known false negative. A crate constant rather than configuration: the
/// filter is a pure function and its answer for a given size never changes.
pub const MIN_BITMAP_EDGE: u32 = 64;

/// Accept or reject a bitmap on dimensions alone.
pub fn accept_dimensions(width: u32, height: u32) -> bool {
    width > MIN_BITMAP_EDGE && height > MIN_BITMAP_EDGE
}

/// Cheap structural fingerprint: `(width, height, base64 payload length)`.
///
/// Deliberately weak. Two different images with identical dimensions and
/// coincidentally equal encoded length collide, and the first one wins.
/// That trade buys dedup at zero hashing cost; the behaviour is documented
/// and pinned by tests, so do not quietly strengthen this to a content hash.
pub type DedupKey = (u32, u32, usize);

/// Per-page interceptor: filters, encodes, dedups, accumulates.
///
/// `seen` and `assets` belong to the run and outlive the sink; the per-page
/// asset index restarts at 1 with each new sink.
pub(crate) struct BitmapSink<'run> {
    page_num: usize,
    accepted_on_page: usize,
    seen: &'run mut HashSet<DedupKey>,
    assets: &'run mut Vec<ExtractedAsset>,
}

impl<'run> BitmapSink<'run> {
    pub(crate) fn new(
        page_num: usize,
        seen: &'run mut HashSet<DedupKey>,
        assets: &'run mut Vec<ExtractedAsset>,
    ) -> Self {
        Self {
            page_num,
            accepted_on_page: 0,
            seen,
            assets,
        }
    }

    /// Inspect one observed paint. Never fails; rejected or broken events
    /// simply leave no trace beyond a debug line.
    pub(crate) fn observe(&mut self, event: PaintEvent) {
        if !accept_dimensions(event.width, event.height) {
            debug!(
                "Page {}: skipping {}x{} bitmap (below {} px floor)",
                self.page_num, event.width, event.height, MIN_BITMAP_EDGE
            );
            return;
        }

        let Some(pixels) = event.pixels else {
            debug!(
                "Page {}: {}x{} bitmap has no readable pixels, skipping",
                self.page_num, event.width, event.height
            );
            return;
        };

        let encoded = match encode::encode_png(&pixels) {
            Ok(encoded) => encoded,
            Err(e) => {
                debug!(
                    "Page {}: failed to encode {}x{} bitmap: {}",
                    self.page_num, event.width, event.height, e
                );
                return;
            }
        };

        let key: DedupKey = (event.width, event.height, encoded.payload_len);
        if !self.seen.insert(key) {
            debug!(
                "Page {}: duplicate {}x{} bitmap (key {:?}), keeping first occurrence",
                self.page_num, event.width, event.height, key
            );
            return;
        }

        self.accepted_on_page += 1;
        let display_name = format!("page-{}-image-{}", self.page_num, self.accepted_on_page);
        self.assets.push(ExtractedAsset::new(
            display_name,
            encoded.data_uri,
            self.page_num,
            event.width,
            event.height,
            AssetTag::Product,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn paint(w: u32, h: u32, shade: u8) -> PaintEvent {
        PaintEvent {
            width: w,
            height: h,
            pixels: Some(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                w,
                h,
                Rgba([shade, shade, shade, 255]),
            ))),
        }
    }

    #[test]
    fn filter_is_exclusive_at_the_floor() {
        assert!(!accept_dimensions(64, 64));
        assert!(!accept_dimensions(65, 64));
        assert!(!accept_dimensions(64, 65));
        assert!(accept_dimensions(65, 65));
        assert!(!accept_dimensions(0, 0));
        assert!(accept_dimensions(800, 600));
    }

    #[test]
    fn filter_is_pure() {
        for _ in 0..3 {
            assert!(accept_dimensions(100, 100));
            assert!(!accept_dimensions(10, 100));
        }
    }

    #[test]
    fn sink_accepts_and_names_qualifying_bitmaps() {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();
        let mut sink = BitmapSink::new(3, &mut seen, &mut assets);

        sink.observe(paint(200, 150, 10));
        sink.observe(paint(300, 200, 20));

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].display_name, "page-3-image-1");
        assert_eq!(assets[1].display_name, "page-3-image-2");
        assert_eq!(assets[0].source_page, 3);
        assert_eq!(assets[0].tag, AssetTag::Product);
        assert_eq!((assets[0].width, assets[0].height), (200, 150));
        assert!(assets[0].encoded_data.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn sink_rejects_undersized_bitmaps() {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();
        let mut sink = BitmapSink::new(1, &mut seen, &mut assets);

        sink.observe(paint(10, 10, 0));
        sink.observe(paint(64, 64, 0));
        sink.observe(paint(800, 40, 0));

        assert!(assets.is_empty());
        assert!(seen.is_empty(), "rejected bitmaps must not claim dedup keys");
    }

    #[test]
    fn sink_skips_events_without_pixels() {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();
        let mut sink = BitmapSink::new(1, &mut seen, &mut assets);

        sink.observe(PaintEvent::missing());
        // malformed source: dimensions claim a real bitmap, pixels absent
        sink.observe(PaintEvent {
            width: 500,
            height: 500,
            pixels: None,
        });

        assert!(assets.is_empty());
    }

    #[test]
    fn duplicate_keys_keep_only_the_first_occurrence() {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();
        let mut sink = BitmapSink::new(1, &mut seen, &mut assets);

        sink.observe(paint(200, 200, 50));
        sink.observe(paint(200, 200, 50));
        sink.observe(paint(200, 200, 50));

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].display_name, "page-1-image-1");
    }

    #[test]
    fn per_page_index_does_not_advance_on_duplicates() {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();
        let mut sink = BitmapSink::new(2, &mut seen, &mut assets);

        sink.observe(paint(200, 200, 50));
        sink.observe(paint(200, 200, 50)); // duplicate
        sink.observe(paint(400, 300, 50)); // distinct dimensions

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].display_name, "page-2-image-2");
    }

    #[test]
    fn dedup_set_spans_sinks_from_different_pages() {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();

        BitmapSink::new(1, &mut seen, &mut assets).observe(paint(200, 200, 50));
        BitmapSink::new(2, &mut seen, &mut assets).observe(paint(200, 200, 50));

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].source_page, 1);
    }
}
