//! Geometry primitives - points, distances, rectangles, text metrics.
//!
//! Points are tagged with the coordinate space they live in. A
//! [`DisplayPoint`] comes from on-screen pointer events and depends on the
//! viewport; a [`ContentPoint`] lives on the base image's native pixel grid.
//! Crossing between the two requires a
//! [`ViewTransform`](crate::transform::ViewTransform), so accidental mixing
//! is a type error rather than a misaligned export.

use serde::{Deserialize, Serialize};

/// A point in display space (on-screen pixels, viewport-dependent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    /// X position in display pixels.
    pub x: f64,
    /// Y position in display pixels.
    pub y: f64,
}

impl DisplayPoint {
    /// Create a display-space point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in content space (the base image's native pixel grid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentPoint {
    /// X position in content pixels.
    pub x: f64,
    /// Y position in content pixels.
    pub y: f64,
}

impl ContentPoint {
    /// Create a content-space point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another content-space point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between this point and another.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// An axis-aligned rectangle in content space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (may be zero for empty text).
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether a content-space point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: ContentPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Grow the rectangle by `amount` on all four sides.
    #[must_use]
    pub fn inflate(&self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }
}

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE_EM: f64 = 0.6;

/// Line height as a fraction of the font size.
const LINE_HEIGHT_EM: f64 = 1.2;

/// Approximate rendered width of a text value, in content pixels.
///
/// Real glyph metrics are not available in the core; 0.6 em per character is
/// close enough for erase hit boxes on sans-serif annotation text.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_width(value: &str, font_size: f64) -> f64 {
    value.chars().count() as f64 * font_size * GLYPH_ADVANCE_EM
}

/// Line height for a given font size, in content pixels.
#[must_use]
pub fn line_height(font_size: f64) -> f64 {
    font_size * LINE_HEIGHT_EM
}
