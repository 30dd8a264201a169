//! Document access: bitmap-paint replay, fallback capture, metadata.
//!
//! ## The `PageSource` seam
//!
//! The scan loop in [`crate::extract`] is written against [`PageSource`], not
//! against pdfium directly. The trait is exactly the contract the pipeline
//! needs from a rendering library: a page count, a way to replay one page's
//! bitmap paints in paint order, and a way to rasterise a full page. Any
//! implementation honouring it is substitutable; the unit tests drive the
//! loop with a scripted source and never load a native library.
//!
//! ## How replay observes paints
//!
//! pdfium exposes a page's display list as page objects. Iterating them and
//! materialising each image object visits every bitmap paint in paint order,
//! exactly as the renderer would apply them. Inspection happens on the live
//! object before the walk advances and never mutates page content, so the
//! page's rendered output is unaffected.

use crate::assets::DocumentInfo;
use crate::error::{ExtractError, PageError};
use crate::pipeline::engine;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// One observed bitmap paint during page replay.
///
/// `width`/`height` come from the materialised pixels. A bitmap whose pixel
/// data cannot be read degrades to `0 × 0` with `pixels: None`, which the
/// size filter always rejects; a broken image never aborts its page.
pub struct PaintEvent {
    pub width: u32,
    pub height: u32,
    pub pixels: Option<DynamicImage>,
}

impl PaintEvent {
    /// The degenerate event for a bitmap that could not be materialised.
    pub fn missing() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: None,
        }
    }
}

/// Everything the scan loop needs from an open document.
///
/// Page numbers are 1-based throughout, matching asset names and progress
/// events.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Replay page `page_num`'s bitmap paints in paint order, invoking `sink`
    /// once per paint. The sink sees each event before the walk advances.
    fn walk_bitmaps(
        &self,
        page_num: usize,
        sink: &mut dyn FnMut(PaintEvent),
    ) -> Result<(), PageError>;

    /// Rasterise the whole page at `scale` (1.0 = natural page size).
    fn capture_page(&self, page_num: usize, scale: f32) -> Result<DynamicImage, PageError>;
}

/// Open a document, mapping pdfium's failure modes onto the error taxonomy.
pub(crate) fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// The pdfium-backed [`PageSource`].
pub(crate) struct PdfiumPages<'a, 'b> {
    document: &'a PdfDocument<'b>,
}

impl<'a, 'b> PdfiumPages<'a, 'b> {
    pub(crate) fn new(document: &'a PdfDocument<'b>) -> Self {
        Self { document }
    }
}

impl PageSource for PdfiumPages<'_, '_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn walk_bitmaps(
        &self,
        page_num: usize,
        sink: &mut dyn FnMut(PaintEvent),
    ) -> Result<(), PageError> {
        let pages = self.document.pages();
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| PageError::RenderFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        for object in page.objects().iter() {
            if let Some(image_object) = object.as_image_object() {
                let event = match image_object.get_processed_image(self.document) {
                    Ok(img) => PaintEvent {
                        width: img.width(),
                        height: img.height(),
                        pixels: Some(img),
                    },
                    Err(e) => {
                        debug!(
                            "Page {}: bitmap pixels unavailable ({:?}), emitting 0x0",
                            page_num, e
                        );
                        PaintEvent::missing()
                    }
                };
                sink(event);
            }
        }

        Ok(())
    }

    fn capture_page(&self, page_num: usize, scale: f32) -> Result<DynamicImage, PageError> {
        let pages = self.document.pages();
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| PageError::CaptureFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| PageError::CaptureFailed {
                    page: page_num,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Captured page {} at {:.2}x → {}x{} px",
            page_num,
            scale,
            image.width(),
            image.height()
        );

        Ok(image)
    }
}

/// Extract document metadata without scanning any page.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
pub async fn document_info(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentInfo, ExtractError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || document_info_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| ExtractError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
fn document_info_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentInfo, ExtractError> {
    let pdfium = engine::bind()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    let info = DocumentInfo {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    };

    info!("PDF metadata read: {} pages", info.page_count);

    Ok(info)
}
