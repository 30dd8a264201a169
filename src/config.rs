//! Configuration types for a visual-asset extraction run.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2assets::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .max_fallback_pages(3)
///     .fallback_scale(2.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Maximum number of pages captured when the fallback engages. Minimum: 1. Default: 5.
    ///
    /// A document with no discrete images still deserves a visual preview,
    /// but capturing every page of a 200-page manual produces megabytes
    /// nobody asked for. Five pages covers the cover, hero spread and opening
    /// content of typical marketing material. To skip fallback captures
    /// entirely use [`include_full_fallback`](Self::include_full_fallback),
    /// not a zero cap.
    pub max_fallback_pages: usize,

    /// Render scale for fallback full-page captures. Range: 0.5–4.0. Default: 1.5.
    ///
    /// Full-page captures stand in for missing product shots, so they are
    /// taken above 1:1 to stay legible when cropped or zoomed. 1.5 keeps a
    /// US-Letter page near 900 × 1200 px. Raise it for print-resolution
    /// previews at the cost of memory and encode time.
    pub fallback_scale: f32,

    /// Capture full-page previews when no embedded image passes the size filter. Default: true.
    ///
    /// Set false to receive an empty asset list instead. Useful when the
    /// caller only wants discrete sub-images and renders its own previews.
    pub include_full_fallback: bool,

    /// JPEG quality for fallback captures. Range: 1–100. Default: 80.
    ///
    /// Page previews are continuous-tone screenshots, so JPEG at quality 80
    /// lands several times smaller than lossless PNG with no visible loss.
    /// Embedded sub-images always use PNG and ignore this knob.
    pub fallback_jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Observer for page-granularity progress. Default: None.
    ///
    /// Invoked synchronously from the extraction thread, so implementations
    /// should return quickly and must not block. See
    /// [`crate::progress::ExtractionProgressCallback`].
    pub progress_callback: Option<ProgressCallback>,

    /// Cooperative cancellation flag, checked at every page boundary.
    /// Default: a fresh, un-cancelled token.
    ///
    /// Clone the token before starting the run and flip it from any thread;
    /// the run returns [`ExtractError::Cancelled`] at the next page boundary
    /// and yields no partial results.
    pub cancel: CancelToken,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_fallback_pages: 5,
            fallback_scale: 1.5,
            include_full_fallback: true,
            fallback_jpeg_quality: 80,
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
            cancel: CancelToken::new(),
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("max_fallback_pages", &self.max_fallback_pages)
            .field("fallback_scale", &self.fallback_scale)
            .field("include_full_fallback", &self.include_full_fallback)
            .field("fallback_jpeg_quality", &self.fallback_jpeg_quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn max_fallback_pages(mut self, n: usize) -> Self {
        self.config.max_fallback_pages = n.max(1);
        self
    }

    pub fn fallback_scale(mut self, scale: f32) -> Self {
        self.config.fallback_scale = scale.clamp(0.5, 4.0);
        self
    }

    pub fn include_full_fallback(mut self, v: bool) -> Self {
        self.config.include_full_fallback = v;
        self
    }

    pub fn fallback_jpeg_quality(mut self, q: u8) -> Self {
        self.config.fallback_jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.config.cancel = token;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !c.fallback_scale.is_finite() || c.fallback_scale < 0.5 || c.fallback_scale > 4.0 {
            return Err(ExtractError::InvalidConfig(format!(
                "Fallback scale must be 0.5–4.0, got {}",
                c.fallback_scale
            )));
        }
        if c.fallback_jpeg_quality == 0 || c.fallback_jpeg_quality > 100 {
            return Err(ExtractError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.fallback_jpeg_quality
            )));
        }
        if c.max_fallback_pages == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_fallback_pages must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Cancellation ───────────────────────────────────────────────────────────

/// Cooperative cancellation flag for an extraction run.
///
/// Cloning is cheap (one `Arc`); all clones share the same flag. The
/// extraction loop checks the token at every page boundary in both the scan
/// phase and the fallback phase, so cancellation latency is at most one page
/// of work.
///
/// ```rust
/// use pdf2assets::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; safe from any thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractionConfig::default();
        assert_eq!(c.max_fallback_pages, 5);
        assert_eq!(c.fallback_scale, 1.5);
        assert!(c.include_full_fallback);
        assert_eq!(c.fallback_jpeg_quality, 80);
        assert_eq!(c.download_timeout_secs, 120);
        assert!(c.progress_callback.is_none());
        assert!(!c.cancel.is_cancelled());
    }

    #[test]
    fn setters_clamp_out_of_range_values() {
        let c = ExtractionConfig::builder()
            .max_fallback_pages(0)
            .fallback_scale(10.0)
            .fallback_jpeg_quality(0)
            .build()
            .unwrap();
        assert_eq!(c.max_fallback_pages, 1);
        assert_eq!(c.fallback_scale, 4.0);
        assert_eq!(c.fallback_jpeg_quality, 1);

        let c = ExtractionConfig::builder()
            .fallback_jpeg_quality(200)
            .build()
            .unwrap();
        assert_eq!(c.fallback_jpeg_quality, 100);
    }

    #[test]
    fn build_rejects_nan_scale() {
        // clamp() propagates NaN, so validation has to catch it.
        let err = ExtractionConfig::builder()
            .fallback_scale(f32::NAN)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Fallback scale"));
    }

    #[test]
    fn cancel_token_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
        // idempotent
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn debug_impl_redacts_password_and_callback() {
        let c = ExtractionConfig::builder()
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{:?}", c);
        assert!(dbg.contains("max_fallback_pages"));
        assert!(dbg.contains("<redacted>"));
        assert!(!dbg.contains("hunter2"));
    }
}
