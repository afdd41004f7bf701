//! Annotation layer rendering.
//!
//! Replays an [`AnnotationList`] onto a transparent raster surface through an
//! SVG intermediate rasterized by resvg/tiny-skia. Stateless and idempotent:
//! the same list always produces the same pixels, which is what lets the
//! operation-log history strategy restore state by full replay.
//!
//! Strokes are drawn with midpoint quadratic smoothing between retained
//! input samples, so frame-gated sampling (which drops excess pointer
//! samples) does not produce visible faceting.

use std::fmt::Write;

use formink_core::{Annotation, AnnotationList, Stroke};

use crate::error::{RenderError, RenderResult};

/// Build the SVG for an annotation layer.
///
/// The SVG pixel size is the content size times `density`; the `viewBox`
/// stays in content coordinates, so annotation coordinates are used as
/// authored and the rasterizer applies the uniform scale.
#[must_use]
pub fn annotation_layer_svg(
    list: &AnnotationList,
    content_w: u32,
    content_h: u32,
    density: f64,
) -> String {
    let px_w = scaled_dim(content_w, density);
    let px_h = scaled_dim(content_h, density);

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{px_w}\" height=\"{px_h}\" viewBox=\"0 0 {content_w} {content_h}\">",
    );

    for item in list.items() {
        match item {
            Annotation::Stroke(stroke) => write_stroke(&mut svg, stroke),
            Annotation::Text(text) => {
                let escaped = escape_xml(&text.value);
                let escaped_color = escape_xml(&text.color);
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{escaped_color}\" font-family=\"sans-serif\">{escaped}</text>",
                    text.position.x, text.position.y, text.font_size,
                );
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Rasterize an annotation list at content resolution times `density`.
///
/// # Errors
///
/// Returns [`RenderError::Layer`] if the layer SVG fails to parse, or
/// [`RenderError::Surface`] if the target pixmap cannot be allocated.
pub fn render_annotations(
    list: &AnnotationList,
    content_w: u32,
    content_h: u32,
    density: f64,
) -> RenderResult<tiny_skia::Pixmap> {
    let svg = annotation_layer_svg(list, content_w, content_h, density);

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(&svg, &opt)
        .map_err(|e| RenderError::Layer(format!("SVG parsing failed: {e}")))?;

    let px_w = scaled_dim(content_w, density);
    let px_h = scaled_dim(content_h, density);
    let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h).ok_or_else(|| {
        RenderError::Surface(format!("annotation layer pixmap {px_w}x{px_h}"))
    })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// A dimension scaled by the density factor, kept at least one pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_dim(dim: u32, density: f64) -> u32 {
    ((f64::from(dim) * density).round() as u32).max(1)
}

/// Write one stroke as an SVG element.
fn write_stroke(svg: &mut String, stroke: &Stroke) {
    // The model rejects point-less strokes at its boundaries; if one reaches
    // the renderer anyway there is nothing to draw.
    if stroke.points.is_empty() {
        return;
    }

    let escaped_color = escape_xml(&stroke.color);

    // A single retained sample renders as a dot of the stroke's width.
    if let [only] = stroke.points.as_slice() {
        let _ = write!(
            svg,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{escaped_color}\"/>",
            only.x,
            only.y,
            stroke.width / 2.0,
        );
        return;
    }

    let _ = write!(
        svg,
        "<path d=\"{}\" fill=\"none\" stroke=\"{escaped_color}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
        stroke_path_data(stroke),
        stroke.width,
    );
}

/// Path data with midpoint quadratic smoothing: each interior sample becomes
/// the control point of a quadratic segment ending at the midpoint to the
/// next sample.
fn stroke_path_data(stroke: &Stroke) -> String {
    let points = &stroke.points;
    let mut d = String::with_capacity(points.len() * 16);
    let _ = write!(d, "M{} {}", points[0].x, points[0].y);

    if points.len() == 2 {
        let _ = write!(d, " L{} {}", points[1].x, points[1].y);
        return d;
    }

    for i in 1..points.len() - 1 {
        let mid = points[i].midpoint(points[i + 1]);
        let _ = write!(d, " Q{} {} {} {}", points[i].x, points[i].y, mid.x, mid.y);
    }
    let last = points[points.len() - 1];
    let _ = write!(d, " L{} {}", last.x, last.y);
    d
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
