//! The eraser engine - pure annotation-list rewriting.
//!
//! Erasing never mutates in place. [`erase`] takes the current list plus an
//! erase circle and produces a rewritten list; the caller installs it via
//! [`AnnotationList::replace_all`]. Strokes are split around erased points,
//! text items are removed when the erase center lands in their hit box, and
//! an erase that changes nothing reports `changed = false` so the caller can
//! skip the history commit.

use std::sync::Arc;

use crate::annotation::{Annotation, AnnotationList, Stroke};
use crate::geometry::{self, ContentPoint, Rect};

/// Result of an erase pass over an annotation list.
#[derive(Debug, Clone)]
pub struct EraseOutcome {
    /// The rewritten items. Untouched items are carried by reference.
    pub items: Vec<Annotation>,
    /// Whether the rewritten list differs structurally from the input.
    pub changed: bool,
}

/// Rewrite `list` as if a circular eraser of `radius` were applied at
/// `center` (both in content space).
///
/// A stroke point is hit when its distance to `center` is `<= radius`
/// (boundary inclusive). Surviving points are partitioned into maximal
/// consecutive runs; a run of a single point cannot render a visible line
/// and is dropped. A stroke with no hits at all keeps its original
/// allocation (observable via [`Arc::ptr_eq`]), so an erase far from
/// everything causes no re-render churn.
#[must_use]
pub fn erase(list: &AnnotationList, center: ContentPoint, radius: f64) -> EraseOutcome {
    let mut items = Vec::with_capacity(list.len());
    let mut changed = false;

    for item in list.items() {
        match item {
            Annotation::Stroke(stroke) => {
                if erase_stroke(stroke, center, radius, &mut items) {
                    changed = true;
                }
            }
            Annotation::Text(text) => {
                let hit_box = Rect::new(
                    text.position.x,
                    text.position.y - geometry::line_height(text.font_size),
                    geometry::text_width(&text.value, text.font_size),
                    geometry::line_height(text.font_size),
                )
                .inflate(radius);

                if hit_box.contains(center) {
                    changed = true;
                } else {
                    items.push(item.clone());
                }
            }
        }
    }

    EraseOutcome { items, changed }
}

/// Split one stroke around the erase circle, pushing survivors onto `out`.
/// Returns whether the stroke was affected.
fn erase_stroke(
    stroke: &Arc<Stroke>,
    center: ContentPoint,
    radius: f64,
    out: &mut Vec<Annotation>,
) -> bool {
    let mut runs: Vec<Vec<ContentPoint>> = Vec::new();
    let mut current: Vec<ContentPoint> = Vec::new();

    for &point in &stroke.points {
        if point.distance(center) <= radius {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(point);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    // Fast path: a single run covering every original point means nothing was
    // hit. Keep the original allocation.
    if runs.len() == 1 && runs[0].len() == stroke.points.len() {
        out.push(Annotation::Stroke(Arc::clone(stroke)));
        return false;
    }

    for run in runs {
        if run.len() >= 2 {
            out.push(Annotation::Stroke(Arc::new(Stroke {
                color: stroke.color.clone(),
                width: stroke.width,
                points: run,
            })));
        }
        // A lone surviving point is dropped: it cannot render a visible line.
    }
    true
}
