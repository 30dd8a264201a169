//! Image encoding: `DynamicImage` → self-contained base64 data URI.
//!
//! Embedded sub-images are encoded as PNG: the bitmap is lifted exactly as
//! the renderer holds it, and lossless encoding keeps logos and line art
//! crisp. Fallback page captures are continuous-tone screenshots, so they are
//! encoded as JPEG at a configurable quality instead; the size difference is
//! typically 4-6x for no visible loss.
//!
//! The base64 payload length doubles as the cheap content fingerprint the
//! deduplicator keys on, so it is reported alongside the URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

const PNG_PREFIX: &str = "data:image/png;base64,";
const JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// A data URI plus the facts the pipeline needs about it.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Complete `data:<mime>;base64,<payload>` string.
    pub data_uri: String,
    /// Length of the base64 payload (not the whole URI).
    pub payload_len: usize,
    pub mime_type: &'static str,
}

/// Encode an observed bitmap as a lossless PNG data URI.
pub fn encode_png(img: &DynamicImage) -> Result<EncodedImage, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded {}x{} PNG → {} bytes base64", img.width(), img.height(), b64.len());

    Ok(EncodedImage {
        payload_len: b64.len(),
        data_uri: format!("{PNG_PREFIX}{b64}"),
        mime_type: "image/png",
    })
}

/// Encode a full-page capture as a JPEG data URI at the given quality (1-100).
///
/// pdfium rasters carry an alpha channel; JPEG does not, so the image is
/// flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<EncodedImage, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    encoder.encode_image(&rgb)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} JPEG q{} → {} bytes base64",
        img.width(),
        img.height(),
        quality,
        b64.len()
    );

    Ok(EncodedImage {
        payload_len: b64.len(),
        data_uri: format!("{JPEG_PREFIX}{b64}"),
        mime_type: "image/jpeg",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn png_uri_has_prefix_and_valid_payload() {
        let encoded = encode_png(&solid(10, 10)).expect("encode should succeed");
        assert!(encoded.data_uri.starts_with(PNG_PREFIX));
        assert_eq!(encoded.mime_type, "image/png");
        assert_eq!(
            encoded.payload_len,
            encoded.data_uri.len() - PNG_PREFIX.len()
        );

        let payload = &encoded.data_uri[PNG_PREFIX.len()..];
        let bytes = STANDARD.decode(payload).expect("valid base64");
        let back = image::load_from_memory(&bytes).expect("valid PNG");
        assert_eq!((back.width(), back.height()), (10, 10));
    }

    #[test]
    fn jpeg_uri_decodes_with_original_dimensions() {
        let encoded = encode_jpeg(&solid(32, 48), 80).expect("encode should succeed");
        assert!(encoded.data_uri.starts_with(JPEG_PREFIX));
        assert_eq!(encoded.mime_type, "image/jpeg");

        let payload = &encoded.data_uri[JPEG_PREFIX.len()..];
        let bytes = STANDARD.decode(payload).expect("valid base64");
        let back = image::load_from_memory(&bytes).expect("valid JPEG");
        assert_eq!((back.width(), back.height()), (32, 48));
    }

    #[test]
    fn identical_images_encode_to_identical_payload_lengths() {
        let a = encode_png(&solid(100, 100)).unwrap();
        let b = encode_png(&solid(100, 100)).unwrap();
        assert_eq!(a.payload_len, b.payload_len);
        assert_eq!(a.data_uri, b.data_uri);
    }
}
