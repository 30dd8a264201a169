//! Output data model: extracted assets and run-level results.
//!
//! Everything here is plain serde-friendly data. The pipeline creates an
//! [`ExtractedAsset`] once and never mutates it afterwards, so callers can
//! hold, clone, serialize and re-import assets freely.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Semantic role of an extracted asset in downstream layout tooling.
///
/// The pipeline itself only ever assigns [`AssetTag::Product`] (embedded
/// sub-images) or [`AssetTag::Other`] (fallback page captures); the richer
/// vocabulary exists so consumers can re-tag assets without inventing their
/// own enum. `DoNotUse` marks an asset a human reviewer rejected; the
/// pipeline never creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetTag {
    Hero,
    #[default]
    Product,
    Lifestyle,
    Logo,
    Chart,
    Icon,
    Other,
    DoNotUse,
}

impl AssetTag {
    /// The serialized snake_case name, e.g. `"do_not_use"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetTag::Hero => "hero",
            AssetTag::Product => "product",
            AssetTag::Lifestyle => "lifestyle",
            AssetTag::Logo => "logo",
            AssetTag::Chart => "chart",
            AssetTag::Icon => "icon",
            AssetTag::Other => "other",
            AssetTag::DoNotUse => "do_not_use",
        }
    }
}

impl std::fmt::Display for AssetTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One visual asset lifted out of a document.
///
/// Self-contained: `encoded_data` is a `data:<mime>;base64,` URI, so an asset
/// can be displayed, stored or shipped without any reference back to the
/// source PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedAsset {
    /// Unique id (UUID v4), minted at creation.
    pub id: String,

    /// Complete data URI: `image/png` for embedded sub-images,
    /// `image/jpeg` for fallback page captures.
    pub encoded_data: String,

    /// Human-readable name: `page-<i>-image-<k>` for the k-th accepted
    /// sub-image on page i (k restarts at 1 on every page), or
    /// `page-<i>-full` for a fallback capture.
    pub display_name: String,

    /// 1-based page number the asset came from.
    pub source_page: usize,

    /// Pixel width of the decoded image.
    pub width: u32,

    /// Pixel height of the decoded image.
    pub height: u32,

    /// Semantic tag. Defaults to `product`; never `do_not_use` at creation.
    pub tag: AssetTag,
}

impl ExtractedAsset {
    /// Mint a new asset with a fresh UUID.
    pub(crate) fn new(
        display_name: String,
        encoded_data: String,
        source_page: usize,
        width: u32,
        height: u32,
        tag: AssetTag,
    ) -> Self {
        debug_assert!(tag != AssetTag::DoNotUse, "assets are never born rejected");
        Self {
            id: Uuid::new_v4().to_string(),
            encoded_data,
            display_name,
            source_page,
            width,
            height,
            tag,
        }
    }

    /// The MIME type embedded in the data URI, e.g. `"image/png"`.
    pub fn mime_type(&self) -> &str {
        self.encoded_data
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or("")
    }
}

/// Per-page record of how the scan phase went.
///
/// One entry per document page, in page order, regardless of how many assets
/// the page produced. Fallback captures do not add entries; they are a
/// document-level recovery, not a page outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    /// 1-based page number.
    pub page_num: usize,
    /// Assets this page contributed (after filter and dedup).
    pub assets_found: usize,
    /// The page-level failure, if the page could not be scanned.
    pub error: Option<PageError>,
}

/// One page's batch of results, as yielded by the streaming API.
///
/// Scan batches arrive in page order, one per page. When the fallback engages
/// (the scan found nothing) a second run of batches follows with `fallback`
/// set, one per captured page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAssets {
    /// 1-based page number this batch came from.
    pub page_num: usize,
    /// Total pages in the document, for progress arithmetic.
    pub total_pages: usize,
    /// Assets this page contributed (after filter and dedup). Empty when the
    /// page had no qualifying images or failed.
    pub assets: Vec<ExtractedAsset>,
    /// True for fallback full-page capture batches.
    pub fallback: bool,
    /// The page-level failure, if the page could not be processed.
    pub error: Option<PageError>,
}

/// Aggregate statistics for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    /// Pages whose scan completed without a page-level error.
    pub scanned_pages: usize,
    pub failed_pages: usize,
    pub asset_count: usize,
    /// Whether full-page fallback captures were taken.
    pub fallback_used: bool,
    pub total_duration_ms: u64,
    /// Time spent inside the blocking scan (and fallback) phase.
    pub scan_duration_ms: u64,
}

/// Document metadata read from the PDF info dictionary.
///
/// Empty strings are normalized to `None`; pdfium reports missing tags as
/// empty rather than absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Everything an extraction run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Ordered asset list: scan results in (page, paint) order, or fallback
    /// captures in page order when the scan found nothing.
    pub assets: Vec<ExtractedAsset>,
    /// One outcome per document page, in page order.
    pub pages: Vec<PageOutcome>,
    pub metadata: DocumentInfo,
    pub stats: ExtractionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&AssetTag::Hero).unwrap(), "\"hero\"");
        assert_eq!(
            serde_json::to_string(&AssetTag::DoNotUse).unwrap(),
            "\"do_not_use\""
        );
        let tag: AssetTag = serde_json::from_str("\"lifestyle\"").unwrap();
        assert_eq!(tag, AssetTag::Lifestyle);
    }

    #[test]
    fn tag_defaults_to_product() {
        assert_eq!(AssetTag::default(), AssetTag::Product);
        assert_eq!(AssetTag::default().as_str(), "product");
    }

    #[test]
    fn as_str_matches_serde_for_every_variant() {
        for tag in [
            AssetTag::Hero,
            AssetTag::Product,
            AssetTag::Lifestyle,
            AssetTag::Logo,
            AssetTag::Chart,
            AssetTag::Icon,
            AssetTag::Other,
            AssetTag::DoNotUse,
        ] {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
        }
    }

    #[test]
    fn new_assets_get_unique_ids() {
        let a = ExtractedAsset::new(
            "page-1-image-1".into(),
            "data:image/png;base64,AAAA".into(),
            1,
            100,
            100,
            AssetTag::Product,
        );
        let b = ExtractedAsset::new(
            "page-1-image-2".into(),
            "data:image/png;base64,BBBB".into(),
            1,
            100,
            100,
            AssetTag::Product,
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn mime_type_parses_the_data_uri() {
        let png = ExtractedAsset::new(
            "page-1-image-1".into(),
            "data:image/png;base64,AAAA".into(),
            1,
            80,
            80,
            AssetTag::Product,
        );
        assert_eq!(png.mime_type(), "image/png");

        let jpeg = ExtractedAsset::new(
            "page-2-full".into(),
            "data:image/jpeg;base64,BBBB".into(),
            2,
            900,
            1200,
            AssetTag::Other,
        );
        assert_eq!(jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn asset_roundtrips_through_json() {
        let asset = ExtractedAsset::new(
            "page-3-image-2".into(),
            "data:image/png;base64,CCCC".into(),
            3,
            640,
            480,
            AssetTag::Product,
        );
        let json = serde_json::to_string(&asset).unwrap();
        assert!(json.contains("\"tag\":\"product\""));
        let back: ExtractedAsset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.display_name, "page-3-image-2");
        assert_eq!(back.source_page, 3);
        assert_eq!(back.width, 640);
    }
}
