//! Pointer events and tool configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::DisplayPoint;

/// The active annotation tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Freehand pen.
    #[default]
    Pen,
    /// Text placement.
    Text,
    /// Circular eraser.
    Erase,
}

/// Tool configuration - a plain value, owned by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Active tool.
    pub tool: ToolKind,
    /// Pen/text color as a hex string.
    pub color: String,
    /// Pen stroke width in content pixels.
    pub stroke_width: f64,
    /// Eraser radius in content pixels.
    pub erase_radius: f64,
    /// Text font size in content pixels.
    pub font_size: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: "#1a1a1a".to_string(),
            stroke_width: 3.0,
            erase_radius: 12.0,
            font_size: 16.0,
        }
    }
}

/// A pointer event in display coordinates (mouse or touch-equivalent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    /// Pointer pressed; begins an interaction.
    Down {
        /// Position in display space.
        position: DisplayPoint,
    },
    /// Pointer dragged while pressed.
    Move {
        /// Position in display space.
        position: DisplayPoint,
    },
    /// Pointer released; ends the interaction.
    Up,
    /// Interaction aborted by the platform (e.g. palm rejection). The work
    /// done so far is kept, not rolled back.
    Cancel,
}
