//! The export pipeline - single documents, multi-document batches, saved
//! records.
//!
//! Every export hands back completed in-memory bytes before any I/O begins;
//! uploading or printing them is the caller's asynchronous problem. Page
//! encoding targets PNG first and falls back to JPEG (lower fidelity) if PNG
//! encoding fails; only when both fail does the export surface a terminal
//! error.

use base64::Engine;
use formink_core::{Document, SavedExportRecord};
use image::ImageEncoder;
use tracing::{debug, info, warn};

use crate::compositor::{CompositeOptions, Compositor};
use crate::error::{RenderError, RenderResult};

/// Density factor for single-document exports: 2x the intrinsic resolution,
/// for parity with high-density displays.
pub const EXPORT_DENSITY_FACTOR: f64 = 2.0;

/// Minimum number of qualifying documents for a batch export.
pub const BATCH_MIN_DOCUMENTS: usize = 2;

/// JPEG quality used by the fallback encoder.
const FALLBACK_JPEG_QUALITY: u8 = 85;

/// One page of a multi-document export, sized to its own document's output
/// dimensions.
#[derive(Debug, Clone)]
pub struct Page {
    /// The source document's form name.
    pub name: String,
    /// Encoded raster bytes (PNG, or JPEG after a fallback).
    pub bytes: Vec<u8>,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Export one document at [`EXPORT_DENSITY_FACTOR`], returning encoded
/// raster bytes.
///
/// # Errors
///
/// Returns [`RenderError::Core`] if the document is not ready, or
/// [`RenderError::ExportFailed`] if both encoders fail.
pub fn export_single(document: &Document, base: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
    let compositor = Compositor::new(CompositeOptions {
        density: EXPORT_DENSITY_FACTOR,
        target_max: None,
    });
    let surface = compositor.composite(document, base)?;
    let bytes = encode_with_fallback(&surface)?;
    info!(
        form = %document.form_name,
        width = surface.width(),
        height = surface.height(),
        bytes = bytes.len(),
        "single-document export complete",
    );
    Ok(bytes)
}

/// Export a batch of documents as pages, skipping documents with an empty
/// overlay.
///
/// Returns an empty vec - not an error - when fewer than `min_count`
/// documents qualify; the caller decides whether that counts as a failure.
/// Pages keep their own documents' output dimensions; there is no
/// cross-document normalization.
///
/// # Errors
///
/// Returns a renderer error if any qualifying document fails to composite
/// or encode.
pub fn export_batch(
    documents: &[(&Document, &tiny_skia::Pixmap)],
    min_count: usize,
    target_max: Option<(u32, u32)>,
) -> RenderResult<Vec<Page>> {
    let qualifying: Vec<_> = documents
        .iter()
        .filter(|(doc, _)| !doc.annotations.is_empty())
        .collect();

    if qualifying.len() < min_count {
        debug!(
            qualifying = qualifying.len(),
            min_count, "batch export below minimum; returning empty",
        );
        return Ok(Vec::new());
    }

    let compositor = Compositor::new(CompositeOptions {
        density: 1.0,
        target_max,
    });

    let mut pages = Vec::with_capacity(qualifying.len());
    for (document, base) in qualifying {
        let surface = compositor.composite(document, base)?;
        pages.push(Page {
            name: document.form_name.clone(),
            bytes: encode_with_fallback(&surface)?,
            width: surface.width(),
            height: surface.height(),
        });
    }
    info!(pages = pages.len(), "batch export complete");
    Ok(pages)
}

/// Build a saved-export record from encoded raster bytes (base64 payload for
/// the external key-value store).
#[must_use]
pub fn saved_record(name: &str, timestamp_ms: u64, bytes: &[u8]) -> SavedExportRecord {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    SavedExportRecord::new(name, timestamp_ms, encoded)
}

/// Encode a surface as PNG, falling back to JPEG if PNG encoding fails.
///
/// # Errors
///
/// Returns [`RenderError::ExportFailed`] only when both encoders fail.
pub fn encode_with_fallback(surface: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
    match surface.encode_png() {
        Ok(bytes) => Ok(bytes),
        Err(png_err) => {
            warn!(error = %png_err, "PNG encoding failed; falling back to JPEG");
            encode_jpeg(surface).map_err(|jpeg_err| {
                RenderError::ExportFailed(format!(
                    "PNG failed ({png_err}), JPEG fallback failed ({jpeg_err})"
                ))
            })
        }
    }
}

/// Encode a premultiplied surface as JPEG over a white background.
fn encode_jpeg(surface: &tiny_skia::Pixmap) -> Result<Vec<u8>, image::ImageError> {
    let (width, height) = (surface.width(), surface.height());
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pixel in surface.data().chunks_exact(4) {
        // Premultiplied source over opaque white: c + (255 - a).
        let inverse = 255 - u16::from(pixel[3]);
        for &channel in &pixel[..3] {
            rgb.push(u8::try_from((u16::from(channel) + inverse).min(255)).unwrap_or(u8::MAX));
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, FALLBACK_JPEG_QUALITY);
    encoder.write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formink_core::{BaseImageRef, ContentPoint, MAX_SAVED_RECORDS};

    fn white_base(w: u32, h: u32) -> tiny_skia::Pixmap {
        let mut pixmap = tiny_skia::Pixmap::new(w, h).expect("pixmap");
        pixmap.fill(tiny_skia::Color::WHITE);
        pixmap
    }

    fn annotated_document(name: &str, w: u32, h: u32) -> Document {
        let mut doc = Document::new(name, BaseImageRef::resolved("form.png", w, h));
        let handle = doc
            .annotations
            .begin_stroke("#0000ff", 2.0, ContentPoint::new(2.0, 2.0));
        doc.annotations
            .extend_stroke(handle, ContentPoint::new(10.0, 10.0))
            .expect("extend");
        doc
    }

    #[test]
    fn test_export_single_is_png_at_double_density() {
        let doc = annotated_document("intake", 40, 30);
        let bytes = export_single(&doc, &white_base(40, 30)).expect("export");
        assert_eq!(&bytes[0..4], &[137, 80, 78, 71]);

        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!(
            (decoded.width(), decoded.height()),
            (80, 60),
            "export renders at 2x intrinsic resolution"
        );
    }

    #[test]
    fn test_batch_below_minimum_returns_empty() {
        let empty = Document::new("a", BaseImageRef::resolved("a.png", 20, 20));
        let full = annotated_document("b", 20, 20);
        let base = white_base(20, 20);

        let pages = export_batch(&[(&empty, &base), (&full, &base)], BATCH_MIN_DOCUMENTS, None)
            .expect("batch");
        assert!(pages.is_empty());
    }

    #[test]
    fn test_batch_with_enough_qualifying_documents() {
        let a = annotated_document("a", 20, 20);
        let b = annotated_document("b", 40, 10);
        let base_a = white_base(20, 20);
        let base_b = white_base(40, 10);

        let pages = export_batch(
            &[(&a, &base_a), (&b, &base_b)],
            BATCH_MIN_DOCUMENTS,
            None,
        )
        .expect("batch");

        assert_eq!(pages.len(), 2);
        // Pages keep their own dimensions.
        assert_eq!((pages[0].width, pages[0].height), (20, 20));
        assert_eq!((pages[1].width, pages[1].height), (40, 10));
        assert_eq!(pages[0].name, "a");
        assert_eq!(pages[1].name, "b");
    }

    #[test]
    fn test_batch_skips_empty_overlays() {
        let empty = Document::new("empty", BaseImageRef::resolved("e.png", 20, 20));
        let a = annotated_document("a", 20, 20);
        let b = annotated_document("b", 20, 20);
        let base = white_base(20, 20);

        let pages = export_batch(
            &[(&empty, &base), (&a, &base), (&b, &base)],
            BATCH_MIN_DOCUMENTS,
            None,
        )
        .expect("batch");
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.name != "empty"));
    }

    #[test]
    fn test_saved_record_is_base64() {
        let record = saved_record("intake", 1_700_000_000_000, &[1, 2, 3, 4]);
        assert_eq!(record.name, "intake");
        assert_eq!(record.encoded_image, "AQIDBA==");
    }

    #[test]
    fn test_record_log_rolls_over() {
        let mut log = formink_core::RecordLog::new();
        for i in 0..7_u64 {
            log.push(saved_record("intake", i, b"png"));
        }
        assert_eq!(log.len(), MAX_SAVED_RECORDS);
    }

    #[test]
    fn test_jpeg_fallback_encoder_produces_jpeg() {
        let jpeg = encode_jpeg(&white_base(16, 16)).expect("jpeg");
        assert_eq!(jpeg[0], 0xFF);
        assert_eq!(jpeg[1], 0xD8);
    }
}
