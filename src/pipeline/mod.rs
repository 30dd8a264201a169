//! Pipeline stages for visual-asset extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages. The loop that drives them lives in [`crate::extract`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ raster ──▶ intercept ──▶ encode
//! (URL/path) (replay     (filter,     (data
//!             paints)     dedup)       URIs)
//! ```
//!
//! 1. [`input`]: canonicalise the user-supplied path or URL to a local file
//!    and validate the PDF magic bytes
//! 2. [`engine`]: locate and bind the native pdfium library (env override,
//!    beside the executable, working directory, system)
//! 3. [`raster`]: open documents, replay each page's bitmap paints, capture
//!    full pages for fallback; always called from `spawn_blocking` because
//!    pdfium is not async-safe
//! 4. [`intercept`]: the side channel observing every paint: size filter,
//!    first-wins dedup, asset accumulation
//! 5. [`encode`]: wrap pixels as `data:image/...;base64,` URIs (lossless PNG
//!    for sub-images, JPEG for page captures)

pub mod encode;
pub mod engine;
pub mod input;
pub mod intercept;
pub mod raster;
