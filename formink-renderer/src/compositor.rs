//! The compositor - base image plus annotation layer into one export raster.
//!
//! The export surface is always built at the base image's intrinsic
//! resolution (times an optional density factor), never at the on-screen
//! display size, so exports are sharp regardless of how small the viewer
//! was. An optional maximum size caps the output by uniform downscale;
//! output is never upscaled past native resolution by the cap.

use formink_core::Document;
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};
use crate::layer;

/// Options for compositing a document.
#[derive(Debug, Clone, Copy)]
pub struct CompositeOptions {
    /// Density factor applied to the intrinsic resolution (e.g. 2.0 for a
    /// high-density export).
    pub density: f64,
    /// Optional output cap `(max_w, max_h)` in pixels, compared against the
    /// output surface after the density factor is applied. Downscale only.
    pub target_max: Option<(u32, u32)>,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            density: 1.0,
            target_max: None,
        }
    }
}

/// Decode base image bytes (PNG, JPEG, ...) into a premultiplied pixmap.
///
/// # Errors
///
/// Returns [`RenderError::InvalidImage`] if the bytes are not a decodable
/// image, or [`RenderError::Surface`] if the pixmap cannot be built.
pub fn decode_base_image(bytes: &[u8]) -> RenderResult<tiny_skia::Pixmap> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| RenderError::InvalidImage(e.to_string()))?
        .to_rgba8();
    let (w, h) = decoded.dimensions();

    let mut data = decoded.into_raw();
    for pixel in data.chunks_exact_mut(4) {
        let alpha = u16::from(pixel[3]);
        for channel in &mut pixel[..3] {
            *channel = u8::try_from(u16::from(*channel) * alpha / 255).unwrap_or(u8::MAX);
        }
    }

    let size = tiny_skia::IntSize::from_wh(w, h)
        .ok_or_else(|| RenderError::InvalidImage(format!("zero-sized image {w}x{h}")))?;
    tiny_skia::Pixmap::from_vec(data, size)
        .ok_or_else(|| RenderError::Surface(format!("base image pixmap {w}x{h}")))
}

/// Composites documents into export rasters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor {
    options: CompositeOptions,
}

impl Compositor {
    /// Create a compositor with the given options.
    #[must_use]
    pub fn new(options: CompositeOptions) -> Self {
        Self { options }
    }

    /// Create a compositor with default options (native resolution, no cap).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CompositeOptions::default())
    }

    /// Merge the document's base image and annotation overlay into one
    /// raster at intrinsic resolution, applying the density factor and the
    /// optional downscale cap.
    ///
    /// The annotation layer is rendered from content-space vector data on
    /// every call; nothing was baked at authoring time, so a viewport that
    /// resized since authoring has no effect here.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Core`] if the document is not ready, or a
    /// renderer error if a surface cannot be built.
    pub fn composite(
        &self,
        document: &Document,
        base: &tiny_skia::Pixmap,
    ) -> RenderResult<tiny_skia::Pixmap> {
        let (content_w, content_h) = document.content_size()?;

        if (base.width(), base.height()) != (content_w, content_h) {
            warn!(
                form = %document.form_name,
                base_w = base.width(),
                base_h = base.height(),
                content_w,
                content_h,
                "base image resolution differs from intrinsic size; scaling to intrinsic",
            );
        }

        let px_w = scaled_dim(content_w, self.options.density);
        let px_h = scaled_dim(content_h, self.options.density);
        let mut surface = tiny_skia::Pixmap::new(px_w, px_h)
            .ok_or_else(|| RenderError::Surface(format!("export surface {px_w}x{px_h}")))?;

        draw_scaled(&mut surface, base);

        let overlay = layer::render_annotations(
            &document.annotations,
            content_w,
            content_h,
            self.options.density,
        )?;
        surface.draw_pixmap(
            0,
            0,
            overlay.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            None,
        );

        match self.downscale_ratio(px_w, px_h) {
            Some(ratio) => {
                let out = downscale(&surface, ratio)?;
                debug!(
                    form = %document.form_name,
                    width = out.width(),
                    height = out.height(),
                    "composited with downscale cap",
                );
                Ok(out)
            }
            None => Ok(surface),
        }
    }

    /// The uniform downscale ratio demanded by the cap, if the output
    /// surface exceeds it. Never above 1.0 (no upscaling).
    fn downscale_ratio(&self, surface_w: u32, surface_h: u32) -> Option<f64> {
        let (max_w, max_h) = self.options.target_max?;
        if surface_w <= max_w && surface_h <= max_h {
            return None;
        }
        let ratio = (f64::from(max_w) / f64::from(surface_w))
            .min(f64::from(max_h) / f64::from(surface_h));
        Some(ratio.min(1.0))
    }
}

/// Draw `src` scaled to exactly fill `dst`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn draw_scaled(dst: &mut tiny_skia::Pixmap, src: &tiny_skia::Pixmap) {
    let sx = dst.width() as f32 / src.width() as f32;
    let sy = dst.height() as f32 / src.height() as f32;
    dst.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &tiny_skia::PixmapPaint {
            quality: tiny_skia::FilterQuality::Bilinear,
            ..tiny_skia::PixmapPaint::default()
        },
        tiny_skia::Transform::from_scale(sx, sy),
        None,
    );
}

/// Uniformly downscale a surface by `ratio` (< 1.0).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn downscale(surface: &tiny_skia::Pixmap, ratio: f64) -> RenderResult<tiny_skia::Pixmap> {
    let out_w = ((f64::from(surface.width()) * ratio).round() as u32).max(1);
    let out_h = ((f64::from(surface.height()) * ratio).round() as u32).max(1);
    let mut out = tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| RenderError::Surface(format!("downscale surface {out_w}x{out_h}")))?;
    draw_scaled(&mut out, surface);
    Ok(out)
}

/// A dimension scaled by the density factor, kept at least one pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_dim(dim: u32, density: f64) -> u32 {
    ((f64::from(dim) * density).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formink_core::{BaseImageRef, ContentPoint, Document};

    fn white_base(w: u32, h: u32) -> tiny_skia::Pixmap {
        let mut pixmap = tiny_skia::Pixmap::new(w, h).expect("pixmap");
        pixmap.fill(tiny_skia::Color::WHITE);
        pixmap
    }

    fn annotated_document(w: u32, h: u32) -> Document {
        let mut doc = Document::new("intake", BaseImageRef::resolved("intake.png", w, h));
        let handle = doc
            .annotations
            .begin_stroke("#ff0000", 4.0, ContentPoint::new(5.0, 5.0));
        doc.annotations
            .extend_stroke(handle, ContentPoint::new(f64::from(w) - 5.0, f64::from(h) - 5.0))
            .expect("extend");
        doc
    }

    #[test]
    fn test_composite_at_native_resolution() {
        let doc = annotated_document(64, 48);
        let base = white_base(64, 48);
        let out = Compositor::with_defaults()
            .composite(&doc, &base)
            .expect("composite");
        assert_eq!((out.width(), out.height()), (64, 48));
        // The red stroke left non-white pixels.
        assert!(out.data().chunks_exact(4).any(|p| p[0] != p[1]));
    }

    #[test]
    fn test_density_factor_scales_output() {
        let doc = annotated_document(64, 48);
        let base = white_base(64, 48);
        let compositor = Compositor::new(CompositeOptions {
            density: 2.0,
            target_max: None,
        });
        let out = compositor.composite(&doc, &base).expect("composite");
        assert_eq!((out.width(), out.height()), (128, 96));
    }

    #[test]
    fn test_cap_downscales_preserving_aspect() {
        let doc = annotated_document(200, 100);
        let base = white_base(200, 100);
        let compositor = Compositor::new(CompositeOptions {
            density: 1.0,
            target_max: Some((100, 100)),
        });
        let out = compositor.composite(&doc, &base).expect("composite");
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn test_cap_bounds_density_scaled_output() {
        // The cap applies to what actually comes out, so a density factor
        // cannot push the result past it.
        let doc = annotated_document(200, 100);
        let base = white_base(200, 100);
        let compositor = Compositor::new(CompositeOptions {
            density: 2.0,
            target_max: Some((100, 100)),
        });
        let out = compositor.composite(&doc, &base).expect("composite");
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn test_cap_never_upscales() {
        let doc = annotated_document(64, 48);
        let base = white_base(64, 48);
        let compositor = Compositor::new(CompositeOptions {
            density: 1.0,
            target_max: Some((4096, 4096)),
        });
        let out = compositor.composite(&doc, &base).expect("composite");
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn test_unready_document_is_rejected() {
        let doc = Document::new("intake", BaseImageRef::pending("intake.png"));
        let base = white_base(10, 10);
        let err = Compositor::with_defaults().composite(&doc, &base);
        assert!(matches!(err, Err(RenderError::Core(_))));
    }

    #[test]
    fn test_mismatched_base_is_scaled_to_intrinsic() {
        // Intrinsic size is authoritative; a half-resolution base is scaled
        // up to it rather than shifting annotation alignment.
        let doc = annotated_document(64, 48);
        let base = white_base(32, 24);
        let out = Compositor::with_defaults()
            .composite(&doc, &base)
            .expect("composite");
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn test_decode_base_image_round_trip() {
        let img = image::RgbaImage::from_pixel(12, 8, image::Rgba([10, 20, 30, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png)
            .expect("encode");

        let pixmap = decode_base_image(&bytes.into_inner()).expect("decode");
        assert_eq!((pixmap.width(), pixmap.height()), (12, 8));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_base_image(b"not an image"),
            Err(RenderError::InvalidImage(_))
        ));
    }
}
