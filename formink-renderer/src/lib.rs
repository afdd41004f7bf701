//! # Formink Renderer
//!
//! Raster side of the formink annotation engine: annotation layer replay,
//! base-image compositing, and the export pipeline. The export path always
//! works at the base image's intrinsic resolution, independent of the live
//! display, so a form annotated in a small viewer still exports sharp.
//!
//! Built on the resvg/tiny-skia rasterization pipeline with the `image`
//! crate for base-image decoding and the JPEG fallback encoder.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod error;
pub mod export;
pub mod layer;
pub mod snapshot;

pub use compositor::{decode_base_image, CompositeOptions, Compositor};
pub use error::{RenderError, RenderResult};
pub use export::{
    export_batch, export_single, saved_record, Page, BATCH_MIN_DOCUMENTS, EXPORT_DENSITY_FACTOR,
};
pub use layer::{annotation_layer_svg, render_annotations};
pub use snapshot::{snapshot_history, RasterSnapshot};
