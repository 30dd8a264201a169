//! Error types for the pdf2assets library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`]: **Fatal**. The run cannot proceed at all (bad input
//!   file, wrong password, no pdfium library). Returned as
//!   `Err(ExtractError)` from the top-level `extract*` functions, with no
//!   partial results.
//!
//! * [`PageError`]: **Non-fatal**. A single page failed (render glitch,
//!   broken page object tree) but all other pages are fine. Stored inside
//!   [`crate::assets::PageOutcome`] so callers can inspect partial success
//!   rather than losing the whole document to one bad page.
//!
//! A third failure class never becomes a value at all: a single bitmap that
//! cannot be inspected is logged at `debug!` level and skipped, and the page
//! walk continues. One bad image never fails a page.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2assets library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::assets::PageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to a pdfium library: {0}\n\n\
No usable PDFium build was found. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place the platform library (libpdfium.so, libpdfium.dylib or pdfium.dll)\n\
    next to the executable or in the working directory.\n\
  • Install pdfium as a system library.\n"
    )]
    EngineBindingFailed(String),

    // ── Export errors ─────────────────────────────────────────────────────
    /// Could not create or write an exported asset file.
    #[error("Failed to write asset file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An asset payload was not a decodable `data:<mime>;base64,` URI.
    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Control flow ──────────────────────────────────────────────────────
    /// The run's cancel token was flipped; no partial results are returned.
    #[error("Extraction cancelled")]
    Cancelled,

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::assets::PageOutcome`] when a page fails. The overall
/// extraction continues; a run only fails as a whole for [`ExtractError`]
/// reasons.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page could not be loaded or its object tree could not be walked.
    #[error("Page {page}: render failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// A fallback full-page capture failed to render or encode.
    #[error("Page {page}: fallback capture failed: {detail}")]
    CaptureFailed { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display_includes_magic() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("report.docx"),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("report.docx"), "got: {msg}");
        assert!(msg.contains("80"), "magic bytes missing: {msg}");
    }

    #[test]
    fn wrong_password_display() {
        let e = ExtractError::WrongPassword {
            path: PathBuf::from("locked.pdf"),
        };
        assert!(e.to_string().contains("locked.pdf"));
    }

    #[test]
    fn engine_binding_display_mentions_env_override() {
        let e = ExtractError::EngineBindingFailed("dlopen failed".into());
        let msg = e.to_string();
        assert!(msg.contains("dlopen failed"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn cancelled_display() {
        assert_eq!(ExtractError::Cancelled.to_string(), "Extraction cancelled");
    }

    #[test]
    fn page_error_display_includes_page_number() {
        let e = PageError::RenderFailed {
            page: 7,
            detail: "object tree truncated".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 7"));
        assert!(msg.contains("object tree truncated"));
    }

    #[test]
    fn page_error_roundtrips_through_serde() {
        let e = PageError::CaptureFailed {
            page: 2,
            detail: "bitmap allocation failed".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: PageError = serde_json::from_str(&json).unwrap();
        assert!(back.to_string().contains("Page 2"));
    }
}
