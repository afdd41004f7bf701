//! The annotation model - strokes and text items over a base image.
//!
//! An [`AnnotationList`] is an ordered sequence; insertion order is z-order
//! (later items draw on top). Items are wrapped in [`Arc`] so the eraser can
//! keep untouched strokes by reference instead of copying them, and so
//! operation-log history snapshots stay cheap.
//!
//! The only operation that removes items is [`AnnotationList::replace_all`],
//! which installs a rewritten list atomically. Everything else appends, which
//! keeps mutation auditable for the operation-log history strategy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geometry::ContentPoint;

/// A freehand stroke: an ordered point sequence with constant color/width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Stroke color as a hex string (e.g. `#1a1a1a`).
    pub color: String,
    /// Stroke width in content pixels.
    pub width: f64,
    /// Point sequence in content space. Always non-empty.
    pub points: Vec<ContentPoint>,
}

/// A text annotation anchored at the top-left of its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Anchor position in content space.
    pub position: ContentPoint,
    /// Text color as a hex string.
    pub color: String,
    /// Font size in content pixels.
    pub font_size: f64,
    /// The text itself.
    pub value: String,
}

/// One item in an annotation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    /// A freehand stroke.
    #[serde(rename = "path")]
    Stroke(Arc<Stroke>),
    /// A text item.
    Text(Arc<TextAnnotation>),
}

/// Handle to a stroke being extended during a pointer drag.
///
/// Only valid against the list that issued it, and only until the next
/// [`AnnotationList::replace_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeHandle(usize);

/// An ordered list of annotations over one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationList {
    items: Vec<Annotation>,
}

impl AnnotationList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new stroke at `start` and return a handle for extending it.
    pub fn begin_stroke(&mut self, color: &str, width: f64, start: ContentPoint) -> StrokeHandle {
        self.items.push(Annotation::Stroke(Arc::new(Stroke {
            color: color.to_string(),
            width,
            points: vec![start],
        })));
        StrokeHandle(self.items.len() - 1)
    }

    /// Append a point to a stroke begun with [`Self::begin_stroke`].
    ///
    /// Every reported input sample is retained as-is; any downsampling
    /// happens upstream of the model.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StaleStrokeHandle`] if the handle does not refer
    /// to a stroke in this list (e.g. after `replace_all`).
    pub fn extend_stroke(&mut self, handle: StrokeHandle, point: ContentPoint) -> CoreResult<()> {
        match self.items.get_mut(handle.0) {
            Some(Annotation::Stroke(stroke)) => {
                // The stroke is still uniquely owned during its drag, so this
                // does not copy.
                Arc::make_mut(stroke).points.push(point);
                Ok(())
            }
            _ => Err(CoreError::StaleStrokeHandle(handle.0)),
        }
    }

    /// Append a text annotation.
    pub fn append_text(
        &mut self,
        position: ContentPoint,
        color: &str,
        font_size: f64,
        value: &str,
    ) {
        self.items.push(Annotation::Text(Arc::new(TextAnnotation {
            position,
            color: color.to_string(),
            font_size,
            value: value.to_string(),
        })));
    }

    /// Atomically install a rewritten item list (the eraser's output).
    ///
    /// This is the only removal path; outstanding stroke handles become
    /// stale.
    pub fn replace_all(&mut self, items: Vec<Annotation>) {
        self.items = items;
    }

    /// The items in z-order (first item is drawn first).
    #[must_use]
    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    /// Number of annotations in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the list has no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize the list to JSON (the per-form cache payload).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Serialization)
    }

    /// Deserialize a list from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails, or
    /// [`CoreError::InvalidAnnotation`] if the payload violates the model
    /// invariant that every stroke has at least one point.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let list: Self = serde_json::from_str(json).map_err(CoreError::Serialization)?;
        for item in &list.items {
            if let Annotation::Stroke(stroke) = item {
                if stroke.points.is_empty() {
                    return Err(CoreError::InvalidAnnotation(
                        "stroke with empty point sequence".to_string(),
                    ));
                }
            }
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_extend_stroke() {
        let mut list = AnnotationList::new();
        let handle = list.begin_stroke("#ff0000", 3.0, ContentPoint::new(1.0, 1.0));
        list.extend_stroke(handle, ContentPoint::new(2.0, 2.0))
            .expect("extend");
        list.extend_stroke(handle, ContentPoint::new(3.0, 3.0))
            .expect("extend");

        assert_eq!(list.len(), 1);
        let Annotation::Stroke(stroke) = &list.items()[0] else {
            panic!("expected a stroke");
        };
        assert_eq!(stroke.points.len(), 3);
        assert_eq!(stroke.color, "#ff0000");
    }

    #[test]
    fn test_stale_handle_after_replace_all() {
        let mut list = AnnotationList::new();
        let handle = list.begin_stroke("#000000", 2.0, ContentPoint::new(0.0, 0.0));
        list.replace_all(Vec::new());
        assert!(list.extend_stroke(handle, ContentPoint::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_handle_pointing_at_text_is_stale() {
        let mut list = AnnotationList::new();
        let handle = list.begin_stroke("#000000", 2.0, ContentPoint::new(0.0, 0.0));
        list.replace_all(Vec::new());
        list.append_text(ContentPoint::new(5.0, 5.0), "#000000", 16.0, "note");
        assert!(list.extend_stroke(handle, ContentPoint::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_insertion_order_is_z_order() {
        let mut list = AnnotationList::new();
        list.begin_stroke("#111111", 1.0, ContentPoint::new(0.0, 0.0));
        list.append_text(ContentPoint::new(10.0, 10.0), "#222222", 16.0, "on top");

        assert!(matches!(list.items()[0], Annotation::Stroke(_)));
        assert!(matches!(list.items()[1], Annotation::Text(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let mut list = AnnotationList::new();
        let handle = list.begin_stroke("#00ff00", 4.0, ContentPoint::new(10.0, 20.0));
        list.extend_stroke(handle, ContentPoint::new(30.0, 40.0))
            .expect("extend");
        list.append_text(ContentPoint::new(100.0, 50.0), "#0000ff", 25.0, "Rx");

        let json = list.to_json().expect("serialize");
        assert!(json.contains("\"type\":\"path\""));
        assert!(json.contains("\"type\":\"text\""));

        let restored = AnnotationList::from_json(&json).expect("deserialize");
        assert_eq!(restored, list);
    }

    #[test]
    fn test_from_json_rejects_stroke_with_no_points() {
        let json = r##"{"items":[{"type":"path","color":"#000000","width":3.0,"points":[]}]}"##;
        assert!(matches!(
            AnnotationList::from_json(json),
            Err(CoreError::InvalidAnnotation(_))
        ));
    }

    #[test]
    fn test_from_json_accepts_single_point_stroke() {
        let json =
            r##"{"items":[{"type":"path","color":"#000000","width":3.0,"points":[{"x":1.0,"y":2.0}]}]}"##;
        let list = AnnotationList::from_json(json).expect("deserialize");
        assert_eq!(list.len(), 1);
    }
}
