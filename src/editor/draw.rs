//! Free-hand polygon draw tool.
//!
//! Vertices are placed one click at a time. Clicking back onto the first
//! vertex (within a small tolerance) closes the ring; an explicit finish
//! gesture closes it too.

use crate::geo_utils::within_meters;
use crate::LatLng;

/// Result of placing a draw vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawStep {
    /// Vertex appended; `count` vertices placed so far
    Placed { count: usize },
    /// Click repeated the previous vertex and was dropped
    Ignored,
    /// Click landed on the first vertex: the ring is complete
    Closed(Vec<LatLng>),
}

/// In-progress drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTool {
    vertices: Vec<LatLng>,
    close_tolerance_meters: f64,
}

impl DrawTool {
    pub fn new(close_tolerance_meters: f64) -> Self {
        Self {
            vertices: Vec::new(),
            close_tolerance_meters,
        }
    }

    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    pub fn place(&mut self, point: LatLng) -> DrawStep {
        if self.vertices.last() == Some(&point) {
            return DrawStep::Ignored;
        }

        if self.vertices.len() >= 3 {
            let first = self.vertices[0];
            if first == point || within_meters(&first, &point, self.close_tolerance_meters) {
                return DrawStep::Closed(std::mem::take(&mut self.vertices));
            }
        }

        self.vertices.push(point);
        DrawStep::Placed {
            count: self.vertices.len(),
        }
    }

    /// Explicit close gesture: hand over whatever has been placed.
    pub fn finish(&mut self) -> Vec<LatLng> {
        std::mem::take(&mut self.vertices)
    }
}
