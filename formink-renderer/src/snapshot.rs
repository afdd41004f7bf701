//! Raster-snapshot history support.
//!
//! The raster-snapshot strategy commits bitmap copies of the composited
//! surface instead of structured annotation state. Restoring redraws the
//! base image and blits the snapshot back - no replay of annotation
//! semantics, which means annotations are pixels, not editable data, after a
//! restore. That lossiness is the strategy's documented tradeoff: it can
//! also carry raster-only provenance (e.g. a previously exported page used
//! as the background) that the operation log cannot reproduce.

use formink_core::{History, HistoryStrategy};

use crate::compositor::draw_scaled;
use crate::error::{RenderError, RenderResult};

/// An opaque bitmap copy of a composited surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    width: u32,
    height: u32,
    /// Premultiplied RGBA pixels.
    data: Vec<u8>,
}

impl RasterSnapshot {
    /// Capture the current surface.
    #[must_use]
    pub fn capture(surface: &tiny_skia::Pixmap) -> Self {
        Self {
            width: surface.width(),
            height: surface.height(),
            data: surface.data().to_vec(),
        }
    }

    /// Snapshot width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Snapshot height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Restore this snapshot over a freshly drawn base image.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if a surface cannot be rebuilt from
    /// the snapshot.
    pub fn restore(&self, base: &tiny_skia::Pixmap) -> RenderResult<tiny_skia::Pixmap> {
        let mut surface = tiny_skia::Pixmap::new(self.width, self.height).ok_or_else(|| {
            RenderError::Surface(format!("restore surface {}x{}", self.width, self.height))
        })?;

        // Redraw the base first: a snapshot with transparent regions must
        // not leave stale pixels visible through them.
        draw_scaled(&mut surface, base);

        let size = tiny_skia::IntSize::from_wh(self.width, self.height).ok_or_else(|| {
            RenderError::Surface(format!("snapshot size {}x{}", self.width, self.height))
        })?;
        let snapshot = tiny_skia::Pixmap::from_vec(self.data.clone(), size).ok_or_else(|| {
            RenderError::Surface("snapshot pixel buffer does not match its size".to_string())
        })?;

        surface.draw_pixmap(
            0,
            0,
            snapshot.as_ref(),
            &tiny_skia::PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            None,
        );
        Ok(surface)
    }
}

/// A history stack for the raster-snapshot strategy, bounded at
/// [`formink_core::RASTER_HISTORY_DEPTH`].
#[must_use]
pub fn snapshot_history() -> History<RasterSnapshot> {
    History::for_strategy(HistoryStrategy::RasterSnapshot)
}
