//! pdfium binding: locate and load the native library.
//!
//! pdfium ships as a platform shared library, not a Rust crate, so the first
//! thing every run has to do is find a copy. The search order:
//!
//! 1. `PDFIUM_LIB_PATH` env var, pointing at the library file itself.
//! 2. The platform library name (`libpdfium.so`, `libpdfium.dylib`,
//!    `pdfium.dll`) next to the current executable.
//! 3. The same name in the working directory.
//! 4. The system library path.
//!
//! ## One-time initialization
//!
//! Hosts should call [`init_engine`] once at startup: it performs the search,
//! caches the outcome in a process-wide `OnceLock`, and lets the host fail
//! fast with a clear message instead of deep inside the first extraction.
//! The extraction phases still bind their own short-lived [`Pdfium`] handles
//! (the dynamic loader caches the library after the first bind, so repeat
//! binds are cheap), which keeps every pdfium handle scoped to one blocking
//! call rather than living in global mutable state.

use crate::error::ExtractError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

static ENGINE_CHECK: OnceLock<Result<(), String>> = OnceLock::new();

/// Verify once that a pdfium library can be bound.
///
/// The first call performs the full search; later calls return the cached
/// outcome. A failure here means every extraction would fail with
/// [`ExtractError::EngineBindingFailed`], so call this at startup.
pub fn init_engine() -> Result<(), ExtractError> {
    ENGINE_CHECK
        .get_or_init(|| try_bind().map(|_| ()))
        .clone()
        .map_err(ExtractError::EngineBindingFailed)
}

/// Bind a fresh `Pdfium` handle for one blocking phase.
pub(crate) fn bind() -> Result<Pdfium, ExtractError> {
    try_bind().map_err(ExtractError::EngineBindingFailed)
}

fn try_bind() -> Result<Pdfium, String> {
    // Explicit override wins and is not silently fallen through: a user who
    // set PDFIUM_LIB_PATH wants that copy or an error about it.
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path);
        return Pdfium::bind_to_library(&path)
            .map(Pdfium::new)
            .map_err(|e| format!("PDFIUM_LIB_PATH='{}': {:?}", path, e));
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(dir));
        }
    }
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    for candidate in &candidates {
        if let Ok(bindings) = Pdfium::bind_to_library(candidate) {
            debug!("Bound pdfium from {}", candidate.display());
            return Ok(Pdfium::new(bindings));
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            format!(
                "no system pdfium ({:?}); also tried {}",
                e,
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
}
