//! # pdf2assets
//!
//! Extract the embedded visual assets (logos, photos, charts) from PDF
//! documents.
//!
//! ## Why this crate?
//!
//! Marketing PDFs carry their best imagery buried in page content streams.
//! Rendering pages and cropping screenshots loses resolution and picks up
//! surrounding text; this crate instead replays each page's bitmap paints and
//! lifts the embedded images exactly as the renderer holds them, filtering
//! out glyph fragments and rule lines, suppressing repeats across pages, and
//! falling back to full-page previews when a document contains no discrete
//! images at all.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Replay     walk each page's bitmap paints via pdfium (spawn_blocking)
//!  ├─ 3. Filter     keep bitmaps strictly larger than 64 px on both edges
//!  ├─ 4. Dedup      cheap (width, height, encoded length) fingerprint,
//!  │                first occurrence wins
//!  ├─ 5. Fallback   full-page JPEG previews when nothing qualified
//!  └─ 6. Output     data-URI assets + per-page outcomes + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2assets::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = extract("brochure.pdf", &config).await?;
//!     for asset in &output.assets {
//!         println!("{}  {}x{}  page {}", asset.display_name, asset.width,
//!             asset.height, asset.source_page);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2assets` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2assets = { version = "0.1", default-features = false }
//! ```
//!
//! ## The pdfium engine
//!
//! pdfium is a native shared library located at runtime: `PDFIUM_LIB_PATH`,
//! then next to the executable, then the working directory, then the system
//! library path. Call [`init_engine`] once at startup to fail fast with a
//! clear message when no copy can be found.
//!
//! ## Known limitation: the dedup fingerprint
//!
//! Duplicate suppression keys on `(width, height, encoded length)` — cheap,
//! and deliberately not a content hash. Two different images with identical
//! dimensions and coincidentally equal encoded length collide, and only the
//! first is kept. Tests pin this behaviour; strengthening the key would
//! change observable output for existing consumers.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assets;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assets::{
    AssetTag, DocumentInfo, ExtractedAsset, ExtractionOutput, ExtractionStats, PageAssets,
    PageOutcome,
};
pub use config::{CancelToken, ExtractionConfig, ExtractionConfigBuilder};
pub use error::{ExtractError, PageError};
pub use export::{
    decode_data_uri, save_assets, suggested_filename, DecodedAsset, DEFAULT_EXPORT_SPACING,
};
pub use extract::{extract, extract_from_bytes, extract_sync, inspect};
pub use pipeline::engine::init_engine;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_stream, extract_stream_from_bytes, AssetStream};
