//! # Formink Core
//!
//! Annotation engine for scanned forms: the data model, eraser geometry,
//! undo/redo history and coordinate transforms behind a freehand drawing
//! overlay. Pure logic - rasterization lives in `formink-renderer`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                formink-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Annotation Model │  Eraser Engine          │
//! │  - Strokes        │  - Hit testing          │
//! │  - Text items     │  - Stroke splitting     │
//! │  - Z-ordered list │  - Pure rewriting       │
//! ├─────────────────────────────────────────────┤
//! │  History Manager  │  Coordinate Spaces      │
//! │  - Operation log  │  - Display vs content   │
//! │  - Raster bound   │  - Contain fitting      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod annotation;
pub mod document;
pub mod error;
pub mod eraser;
pub mod event;
pub mod geometry;
pub mod history;
pub mod records;
pub mod session;
pub mod transform;

pub use annotation::{Annotation, AnnotationList, Stroke, StrokeHandle, TextAnnotation};
pub use document::{BaseImageRef, Document};
pub use error::{CoreError, CoreResult};
pub use eraser::{erase, EraseOutcome};
pub use event::{PointerEvent, ToolConfig, ToolKind};
pub use geometry::{ContentPoint, DisplayPoint, Rect};
pub use history::{History, HistoryStrategy, RASTER_HISTORY_DEPTH};
pub use records::{RecordId, RecordLog, SavedExportRecord, MAX_SAVED_RECORDS};
pub use session::{Session, SessionPhase};
pub use transform::ViewTransform;

/// Formink core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
