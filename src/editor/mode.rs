//! Editor modes as a single tagged value.
//!
//! View, vertex-edit and move are variants of one enum, so at most one is
//! ever active. Draw and removal exist only inside vertex-edit and vanish
//! with it.

use super::draw::DrawTool;

/// Sub-tool active while in vertex-edit.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VertexTool {
    /// Dragging vertices of existing zones
    #[default]
    Select,
    /// Placing vertices of a new zone
    Draw(DrawTool),
    /// Clicking a zone deletes it
    Remove,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorMode {
    /// Read-only, zones colored by status
    #[default]
    View,
    VertexEdit(VertexTool),
    /// Whole-zone drag translation
    Move,
}

impl EditorMode {
    pub fn is_view(&self) -> bool {
        matches!(self, EditorMode::View)
    }

    pub fn is_vertex_edit(&self) -> bool {
        matches!(self, EditorMode::VertexEdit(_))
    }

    pub fn is_move(&self) -> bool {
        matches!(self, EditorMode::Move)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, EditorMode::VertexEdit(VertexTool::Draw(_)))
    }

    pub fn is_removing(&self) -> bool {
        matches!(self, EditorMode::VertexEdit(VertexTool::Remove))
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorMode::View => "view",
            EditorMode::VertexEdit(VertexTool::Select) => "vertex-edit",
            EditorMode::VertexEdit(VertexTool::Draw(_)) => "vertex-edit/draw",
            EditorMode::VertexEdit(VertexTool::Remove) => "vertex-edit/remove",
            EditorMode::Move => "move",
        }
    }

    /// Instruction line shown under the map.
    pub fn helper_text(&self) -> Option<&'static str> {
        match self {
            EditorMode::View => None,
            EditorMode::VertexEdit(VertexTool::Select) => Some("Drag corner points to edit zones."),
            EditorMode::VertexEdit(VertexTool::Draw(_)) => Some(
                "Draw a new zone by clicking points on the map. Complete by clicking the first point again.",
            ),
            EditorMode::VertexEdit(VertexTool::Remove) => Some("Click on a zone to remove it."),
            EditorMode::Move => Some("Drag polygons to move them (must stay inside boundary)."),
        }
    }
}
