//! Mapping between display space and content space.
//!
//! The viewer shows the base image with "contain" fitting: a uniform scale of
//! `min(viewport_w / content_w, viewport_h / content_h)`, centered in the
//! viewport. Pointer events arrive in display space; everything the model
//! stores is in content space, so the transform is applied exactly once, at
//! input time.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geometry::{ContentPoint, DisplayPoint};

/// An invertible display-to-content mapping (uniform scale + offset).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Display pixels per content pixel.
    scale: f64,
    /// Horizontal centering offset, in display pixels.
    offset_x: f64,
    /// Vertical centering offset, in display pixels.
    offset_y: f64,
}

impl ViewTransform {
    /// The identity transform (display space == content space).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Build the "contain" fit of a content area into a viewport: uniform
    /// scale, centered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransform`] if either dimension of the
    /// viewport or the content area is not strictly positive, or not finite.
    pub fn contain(
        viewport_w: f64,
        viewport_h: f64,
        content_w: f64,
        content_h: f64,
    ) -> CoreResult<Self> {
        for (label, v) in [
            ("viewport width", viewport_w),
            ("viewport height", viewport_h),
            ("content width", content_w),
            ("content height", content_h),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CoreError::InvalidTransform(format!("{label} = {v}")));
            }
        }

        let scale = (viewport_w / content_w).min(viewport_h / content_h);
        Ok(Self {
            scale,
            offset_x: (viewport_w - content_w * scale) / 2.0,
            offset_y: (viewport_h - content_h * scale) / 2.0,
        })
    }

    /// Display pixels per content pixel.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Map a display-space point into content space.
    #[must_use]
    pub fn to_content(&self, p: DisplayPoint) -> ContentPoint {
        ContentPoint::new(
            (p.x - self.offset_x) / self.scale,
            (p.y - self.offset_y) / self.scale,
        )
    }

    /// Map a content-space point into display space. Exact inverse of
    /// [`Self::to_content`] up to floating-point rounding.
    #[must_use]
    pub fn to_display(&self, p: ContentPoint) -> DisplayPoint {
        DisplayPoint::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }
}
