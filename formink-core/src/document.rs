//! The active document: one scanned form plus its annotation overlay.

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationList;
use crate::error::{CoreError, CoreResult};
use crate::history::HistoryStrategy;
use crate::transform::ViewTransform;

/// An opaque reference to a base image, plus its intrinsic pixel size once
/// the external asset resolver has loaded it.
///
/// Until the intrinsic size is known the owning document is degraded:
/// coordinate transforms and exports are rejected with
/// [`CoreError::DocumentNotReady`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseImageRef {
    /// Opaque asset handle (URI, bundle key, ...), meaningful only to the
    /// external resolver.
    pub handle: String,
    /// Native pixel dimensions, known after a successful load.
    intrinsic: Option<(u32, u32)>,
}

impl BaseImageRef {
    /// Reference an image whose load has not completed.
    #[must_use]
    pub fn pending(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            intrinsic: None,
        }
    }

    /// Reference an image with a known intrinsic size.
    #[must_use]
    pub fn resolved(handle: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            handle: handle.into(),
            intrinsic: Some((width, height)),
        }
    }

    /// Record the intrinsic size after a (re)load succeeds.
    pub fn mark_resolved(&mut self, width: u32, height: u32) {
        self.intrinsic = Some((width, height));
    }

    /// The intrinsic pixel size, if the image has loaded.
    #[must_use]
    pub fn intrinsic_size(&self) -> Option<(u32, u32)> {
        self.intrinsic
    }
}

/// One form being annotated: base image, overlay, history strategy choice.
///
/// The document is created when a form is selected and discarded when the
/// user switches forms; the per-form annotation cache that survives the
/// switch is an external collaborator and only sees [`AnnotationList`] JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The form this document annotates (also the per-form cache key).
    pub form_name: String,
    /// The base image and its intrinsic size.
    pub base_image: BaseImageRef,
    /// The annotation overlay, in content space.
    pub annotations: AnnotationList,
    /// Which history strategy this document uses, fixed at creation.
    pub strategy: HistoryStrategy,
}

impl Document {
    /// Create a document with an empty overlay and the default
    /// (operation-log) history strategy.
    #[must_use]
    pub fn new(form_name: impl Into<String>, base_image: BaseImageRef) -> Self {
        Self {
            form_name: form_name.into(),
            base_image,
            annotations: AnnotationList::new(),
            strategy: HistoryStrategy::default(),
        }
    }

    /// Select the history strategy (builder style).
    #[must_use]
    pub fn with_strategy(mut self, strategy: HistoryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Install annotations restored from the external per-form cache.
    #[must_use]
    pub fn with_annotations(mut self, annotations: AnnotationList) -> Self {
        self.annotations = annotations;
        self
    }

    /// Whether the base image has loaded and the document can transform
    /// coordinates and export.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.base_image.intrinsic_size().is_some()
    }

    /// The content-space size (the base image's intrinsic resolution).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentNotReady`] while the base image load is
    /// outstanding or failed.
    pub fn content_size(&self) -> CoreResult<(u32, u32)> {
        self.base_image
            .intrinsic_size()
            .ok_or_else(|| CoreError::DocumentNotReady(self.base_image.handle.clone()))
    }

    /// The "contain" fit of this document's content into a viewer region.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentNotReady`] if the base image has not
    /// loaded, or [`CoreError::InvalidTransform`] for a degenerate viewport.
    pub fn fit_transform(&self, viewport_w: f64, viewport_h: f64) -> CoreResult<ViewTransform> {
        let (w, h) = self.content_size()?;
        ViewTransform::contain(viewport_w, viewport_h, f64::from(w), f64::from(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_document_is_not_ready() {
        let doc = Document::new("intake-form", BaseImageRef::pending("assets/intake.png"));
        assert!(!doc.is_ready());
        assert!(matches!(
            doc.content_size(),
            Err(CoreError::DocumentNotReady(_))
        ));
        assert!(doc.fit_transform(800.0, 600.0).is_err());
    }

    #[test]
    fn test_resolving_makes_document_ready() {
        let mut doc = Document::new("intake-form", BaseImageRef::pending("assets/intake.png"));
        doc.base_image.mark_resolved(2480, 3508);
        assert!(doc.is_ready());
        assert_eq!(doc.content_size().expect("size"), (2480, 3508));
        doc.fit_transform(800.0, 600.0).expect("transform");
    }

    #[test]
    fn test_default_strategy_is_operation_log() {
        let doc = Document::new("billing", BaseImageRef::resolved("assets/billing.png", 100, 100));
        assert_eq!(doc.strategy, HistoryStrategy::OperationLog);

        let raster = Document::new("billing", BaseImageRef::resolved("assets/billing.png", 1, 1))
            .with_strategy(HistoryStrategy::RasterSnapshot);
        assert_eq!(raster.strategy, HistoryStrategy::RasterSnapshot);
    }
}
