//! Asset export: suggested filenames, data-URI decoding, paced bulk save.
//!
//! An [`crate::ExtractedAsset`] is already self-contained (its payload is a
//! data URI), so "export" is mostly bookkeeping: derive a stable filename
//! from the source document and the asset's display name, decode the URI
//! back to raw bytes, and write files with a small delay between them.
//! The delay exists because some host environments throttle or block rapid
//! sequential file hand-offs; it is a usability measure, not a correctness
//! requirement, and callers writing to a local disk can pass
//! `Duration::ZERO`.

use crate::assets::ExtractedAsset;
use crate::error::ExtractError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default delay between items in [`save_assets`].
pub const DEFAULT_EXPORT_SPACING: Duration = Duration::from_millis(300);

/// A data URI decoded back into raw bytes.
#[derive(Debug, Clone)]
pub struct DecodedAsset {
    /// MIME type from the URI header, e.g. `"image/png"`.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Suggest an export filename for an asset.
///
/// `document_name` is the source document's file name (see
/// [`crate::pipeline::input::document_name`]); a trailing `.pdf` is stripped
/// case-insensitively. The extension follows the asset's MIME type, and
/// anything outside `[A-Za-z0-9_-]` is replaced with `_` so the result is
/// safe on every common filesystem.
///
/// ```rust
/// use pdf2assets::suggested_filename;
/// # use pdf2assets::{AssetTag, ExtractedAsset};
/// # let asset = pdf2assets::ExtractedAsset {
/// #     id: "x".into(),
/// #     encoded_data: "data:image/png;base64,AAAA".into(),
/// #     display_name: "page-1-image-1".into(),
/// #     source_page: 1,
/// #     width: 100,
/// #     height: 100,
/// #     tag: AssetTag::Product,
/// # };
/// assert_eq!(
///     suggested_filename(&asset, "Spring Catalog.PDF"),
///     "Spring_Catalog_page-1-image-1.png"
/// );
/// ```
pub fn suggested_filename(asset: &ExtractedAsset, document_name: &str) -> String {
    let stem = strip_pdf_extension(document_name);
    let ext = match asset.mime_type() {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        _ => "bin",
    };
    format!("{}_{}.{}", sanitize(stem), sanitize(&asset.display_name), ext)
}

/// Decode a `data:<mime>;base64,<payload>` URI back to raw bytes.
pub fn decode_data_uri(uri: &str) -> Result<DecodedAsset, ExtractError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ExtractError::MalformedDataUri("missing 'data:' prefix".into()))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| ExtractError::MalformedDataUri("missing ';base64,' marker".into()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ExtractError::MalformedDataUri(format!("invalid base64: {e}")))?;
    Ok(DecodedAsset {
        mime_type: mime.to_string(),
        bytes,
    })
}

/// Write every asset into `output_dir`, one file at a time.
///
/// `spacing` is the delay inserted *between* items — never after the last, so
/// a single asset exports with no delay at all. Returns the written paths in
/// asset order.
///
/// # Errors
/// [`ExtractError::OutputWriteFailed`] if the directory cannot be created or
/// a file cannot be written; [`ExtractError::MalformedDataUri`] if an asset's
/// payload does not decode. The first failure aborts the export.
pub async fn save_assets(
    assets: &[ExtractedAsset],
    output_dir: impl AsRef<Path>,
    document_name: &str,
    spacing: Duration,
) -> Result<Vec<PathBuf>, ExtractError> {
    let dir = output_dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(assets.len());
    for (i, asset) in assets.iter().enumerate() {
        if i > 0 && !spacing.is_zero() {
            tokio::time::sleep(spacing).await;
        }

        let decoded = decode_data_uri(&asset.encoded_data)?;
        let path = dir.join(suggested_filename(asset, document_name));
        tokio::fs::write(&path, &decoded.bytes)
            .await
            .map_err(|e| ExtractError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        debug!("Wrote {} ({} bytes)", path.display(), decoded.bytes.len());
        written.push(path);
    }

    info!("Exported {} assets to {}", written.len(), dir.display());
    Ok(written)
}

fn strip_pdf_extension(name: &str) -> &str {
    let n = name.len();
    if n >= 4 {
        if let Some(tail) = name.get(n - 4..) {
            if tail.eq_ignore_ascii_case(".pdf") {
                return &name[..n - 4];
            }
        }
    }
    name
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetTag;
    use crate::pipeline::encode;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png_asset(name: &str, shade: u8) -> ExtractedAsset {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            8,
            Rgba([shade, shade, shade, 255]),
        ));
        let encoded = encode::encode_png(&img).unwrap();
        ExtractedAsset::new(name.to_string(), encoded.data_uri, 1, 8, 8, AssetTag::Product)
    }

    #[test]
    fn filenames_strip_pdf_suffix_case_insensitively() {
        let asset = png_asset("page-1-image-1", 0);
        assert_eq!(
            suggested_filename(&asset, "catalog.pdf"),
            "catalog_page-1-image-1.png"
        );
        assert_eq!(
            suggested_filename(&asset, "CATALOG.PDF"),
            "CATALOG_page-1-image-1.png"
        );
        assert_eq!(
            suggested_filename(&asset, "notes.txt"),
            "notes_txt_page-1-image-1.png"
        );
    }

    #[test]
    fn filenames_sanitize_awkward_characters() {
        let asset = png_asset("page-1-image-1", 0);
        assert_eq!(
            suggested_filename(&asset, "Spring Catalog (final).pdf"),
            "Spring_Catalog__final__page-1-image-1.png"
        );
    }

    #[test]
    fn jpeg_assets_get_a_jpg_extension() {
        let mut asset = png_asset("page-2-full", 0);
        asset.encoded_data = "data:image/jpeg;base64,AAAA".into();
        assert_eq!(
            suggested_filename(&asset, "doc.pdf"),
            "doc_page-2-full.jpg"
        );
    }

    #[test]
    fn decode_roundtrips_an_encoded_image() {
        let asset = png_asset("page-1-image-1", 128);
        let decoded = decode_data_uri(&asset.encoded_data).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        let back = image::load_from_memory(&decoded.bytes).unwrap();
        assert_eq!((back.width(), back.height()), (8, 8));
    }

    #[test]
    fn decode_rejects_malformed_uris() {
        assert!(matches!(
            decode_data_uri("image/png;base64,AAAA"),
            Err(ExtractError::MalformedDataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png,AAAA"),
            Err(ExtractError::MalformedDataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,not base64!"),
            Err(ExtractError::MalformedDataUri(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn save_spaces_items_but_not_the_tail() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![
            png_asset("page-1-image-1", 10),
            png_asset("page-1-image-2", 20),
            png_asset("page-2-image-1", 30),
        ];

        let before = tokio::time::Instant::now();
        let paths = save_assets(&assets, dir.path(), "catalog.pdf", DEFAULT_EXPORT_SPACING)
            .await
            .unwrap();

        // two gaps for three items, none after the last
        assert_eq!(before.elapsed(), Duration::from_millis(600));
        assert_eq!(paths.len(), 3);
        for p in &paths {
            assert!(p.exists(), "missing {}", p.display());
        }
        assert!(paths[0].ends_with("catalog_page-1-image-1.png"));
    }

    #[tokio::test]
    async fn save_with_zero_spacing_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![png_asset("page-1-image-1", 1), png_asset("page-1-image-2", 2)];

        let paths = save_assets(&assets, dir.path(), "doc.pdf", Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(paths.len(), 2);
        let bytes = std::fs::read(&paths[1]).unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[tokio::test]
    async fn unwritable_target_maps_to_output_write_failed() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // a file where the directory should be
        let err = save_assets(
            &[png_asset("page-1-image-1", 1)],
            file.path(),
            "doc.pdf",
            Duration::ZERO,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::OutputWriteFailed { .. }));
    }
}
