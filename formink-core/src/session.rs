//! The interactive annotation session - an explicit state machine.
//!
//! One session wraps one ready [`Document`] plus the live view transform,
//! tool configuration and operation-log history. Pointer events drive the
//! `idle -> drawing/erasing -> idle` cycle; every completed interaction
//! commits exactly one history entry, and an erase drag that changed nothing
//! commits none.
//!
//! Move samples are frame-gated: at most one sample is processed per
//! rendered frame ([`Session::frame_tick`] opens the gate), excess samples
//! are dropped rather than queued so drag latency stays bounded. The
//! renderer smooths between retained samples, so the drop is not visible.

use tracing::{debug, trace};

use crate::annotation::{AnnotationList, StrokeHandle};
use crate::document::Document;
use crate::error::CoreResult;
use crate::eraser;
use crate::event::{PointerEvent, ToolConfig, ToolKind};
use crate::geometry::{ContentPoint, DisplayPoint};
use crate::history::History;
use crate::transform::ViewTransform;

/// Externally observable interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No pointer interaction in progress.
    Idle,
    /// A pen drag is appending stroke points.
    Drawing,
    /// An eraser drag is rewriting the list.
    Erasing,
}

/// Interaction state, atomically bounded by pointer-down .. pointer-up.
#[derive(Debug)]
enum DragState {
    Idle,
    Drawing { handle: StrokeHandle },
    Erasing { changed: bool },
}

/// An interactive annotation session over one document.
#[derive(Debug)]
pub struct Session {
    document: Document,
    transform: ViewTransform,
    tool: ToolConfig,
    history: History<AnnotationList>,
    drag: DragState,
    pending_text: Option<ContentPoint>,
    frame_gate_open: bool,
}

impl Session {
    /// Start a session over a ready document, fitting it into the given
    /// viewer region. The document's current annotations become the history
    /// baseline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentNotReady`](crate::CoreError::DocumentNotReady)
    /// if the base image has not loaded, or
    /// [`CoreError::InvalidTransform`](crate::CoreError::InvalidTransform)
    /// for a degenerate viewport.
    pub fn new(document: Document, viewport_w: f64, viewport_h: f64) -> CoreResult<Self> {
        let transform = document.fit_transform(viewport_w, viewport_h)?;
        let mut history = History::new();
        history.commit(document.annotations.clone());
        Ok(Self {
            document,
            transform,
            tool: ToolConfig::default(),
            history,
            drag: DragState::Idle,
            pending_text: None,
            frame_gate_open: true,
        })
    }

    /// The document under annotation.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The current annotation overlay.
    #[must_use]
    pub fn annotations(&self) -> &AnnotationList {
        &self.document.annotations
    }

    /// The active display-to-content transform.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// The current tool configuration.
    #[must_use]
    pub fn tool(&self) -> &ToolConfig {
        &self.tool
    }

    /// Replace the tool configuration. Switching away from the text tool
    /// drops any pending text anchor.
    pub fn set_tool(&mut self, tool: ToolConfig) {
        if tool.tool != ToolKind::Text {
            self.pending_text = None;
        }
        self.tool = tool;
    }

    /// The current interaction phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.drag {
            DragState::Idle => SessionPhase::Idle,
            DragState::Drawing { .. } => SessionPhase::Drawing,
            DragState::Erasing { .. } => SessionPhase::Erasing,
        }
    }

    /// Refit the document after the viewer region resized. Annotations are
    /// stored in content space, so nothing is re-projected here; only new
    /// input is affected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransform`](crate::CoreError::InvalidTransform)
    /// for a degenerate viewport.
    pub fn set_viewport(&mut self, viewport_w: f64, viewport_h: f64) -> CoreResult<()> {
        self.transform = self.document.fit_transform(viewport_w, viewport_h)?;
        Ok(())
    }

    /// Mark the start of a rendered frame, re-opening the move-sample gate.
    pub fn frame_tick(&mut self) {
        self.frame_gate_open = true;
    }

    /// Feed one pointer event through the state machine.
    ///
    /// # Errors
    ///
    /// Propagates model errors; with correct call ordering these do not
    /// occur.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> CoreResult<()> {
        match event {
            PointerEvent::Down { position } => {
                // A down while a drag is open means the up was lost; close
                // the old interaction first.
                self.finish_interaction();
                self.frame_gate_open = false;
                self.begin_interaction(position)
            }
            PointerEvent::Move { position } => {
                if matches!(self.drag, DragState::Idle) {
                    return Ok(());
                }
                if !self.frame_gate_open {
                    trace!("move sample dropped (frame gate closed)");
                    return Ok(());
                }
                self.frame_gate_open = false;
                self.continue_interaction(position)
            }
            // A cancelled drag keeps its partial stroke; there is no
            // rollback, so up and cancel commit identically.
            PointerEvent::Up | PointerEvent::Cancel => {
                self.finish_interaction();
                Ok(())
            }
        }
    }

    /// The content-space anchor recorded by the last text-tool pointer-down,
    /// if one is waiting for a value.
    #[must_use]
    pub fn pending_text_anchor(&self) -> Option<ContentPoint> {
        self.pending_text
    }

    /// Commit the pending text anchor with the value the external UI
    /// collected. Returns whether a text annotation was committed.
    ///
    /// An empty value commits nothing and keeps the anchor, so the UI can
    /// re-prompt without another pointer-down.
    pub fn commit_pending_text(&mut self, value: &str) -> bool {
        let Some(position) = self.pending_text else {
            return false;
        };
        if value.is_empty() {
            return false;
        }
        self.pending_text = None;
        self.append_text_at(position, value);
        true
    }

    /// Place a text annotation at a display position and commit it,
    /// bypassing the pointer-down anchor (e.g. programmatic placement).
    ///
    /// Empty values are ignored. The value itself comes from the external
    /// UI; the session only anchors and commits it.
    pub fn insert_text(&mut self, at: DisplayPoint, value: &str) {
        if value.is_empty() {
            return;
        }
        let position = self.transform.to_content(at);
        self.append_text_at(position, value);
    }

    fn append_text_at(&mut self, position: ContentPoint, value: &str) {
        self.document.annotations.append_text(
            position,
            &self.tool.color,
            self.tool.font_size,
            value,
        );
        self.commit();
        debug!(form = %self.document.form_name, "text annotation committed");
    }

    /// Undo one step. Returns whether the overlay changed.
    pub fn undo(&mut self) -> bool {
        if let Some(list) = self.history.undo() {
            self.document.annotations = list.clone();
            true
        } else {
            false
        }
    }

    /// Redo one step. Returns whether the overlay changed.
    pub fn redo(&mut self) -> bool {
        if let Some(list) = self.history.redo() {
            self.document.annotations = list.clone();
            true
        } else {
            false
        }
    }

    /// Number of history snapshots currently held (baseline included).
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn begin_interaction(&mut self, position: DisplayPoint) -> CoreResult<()> {
        let point = self.transform.to_content(position);
        match self.tool.tool {
            ToolKind::Pen => {
                let handle = self.document.annotations.begin_stroke(
                    &self.tool.color,
                    self.tool.stroke_width,
                    point,
                );
                self.drag = DragState::Drawing { handle };
            }
            ToolKind::Erase => {
                let changed = self.apply_erase(point);
                self.drag = DragState::Erasing { changed };
            }
            // Text placement is not a drag: the down event only anchors
            // where the value will land once the UI collects it.
            ToolKind::Text => {
                self.pending_text = Some(point);
                trace!("text anchor recorded");
            }
        }
        Ok(())
    }

    fn continue_interaction(&mut self, position: DisplayPoint) -> CoreResult<()> {
        let point = self.transform.to_content(position);
        match self.drag {
            DragState::Drawing { handle } => {
                self.document.annotations.extend_stroke(handle, point)?;
            }
            DragState::Erasing { ref mut changed } => {
                let hit = eraser::erase(&self.document.annotations, point, self.tool.erase_radius);
                if hit.changed {
                    self.document.annotations.replace_all(hit.items);
                    *changed = true;
                }
            }
            DragState::Idle => {}
        }
        Ok(())
    }

    /// Close the open interaction, committing one history entry if the
    /// overlay changed.
    fn finish_interaction(&mut self) {
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Drawing { .. } => {
                self.commit();
                debug!(form = %self.document.form_name, "stroke committed");
            }
            DragState::Erasing { changed } => {
                if changed {
                    self.commit();
                    debug!(form = %self.document.form_name, "erase committed");
                }
            }
            DragState::Idle => {}
        }
    }

    fn apply_erase(&mut self, point: ContentPoint) -> bool {
        let hit = eraser::erase(&self.document.annotations, point, self.tool.erase_radius);
        if hit.changed {
            self.document.annotations.replace_all(hit.items);
        }
        hit.changed
    }

    fn commit(&mut self) {
        self.history.commit(self.document.annotations.clone());
    }
}
