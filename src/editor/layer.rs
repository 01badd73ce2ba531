//! Map session: the ephemeral view geometry owned by the mapping widget.
//!
//! Layers are rendered from the zone store (push-based). While the user
//! drags, the toolkit mutates a layer's live geometry; nothing flows back to
//! the store until the controller commits at drag-end. Reverting a rejected
//! edit is just re-rendering the layer from the store.

use log::{debug, info};

use super::mode::EditorMode;
use crate::{CampusBoundary, LatLng, OptionExt, Result, Ring, Zone, ZoneError, ZoneId};

/// Path styling for a rendered polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneStyle {
    pub color: &'static str,
    pub weight: u8,
    pub fill_opacity: f32,
    pub dash_array: Option<&'static str>,
}

impl ZoneStyle {
    /// Style for a zone in the given mode.
    pub fn for_zone(zone: &Zone, mode: &EditorMode) -> Self {
        match mode {
            EditorMode::View => Self {
                color: zone.status.color(),
                weight: 2,
                fill_opacity: 0.2,
                dash_array: None,
            },
            EditorMode::VertexEdit(_) => Self {
                color: "#f97316",
                weight: 2,
                fill_opacity: 0.1,
                dash_array: None,
            },
            EditorMode::Move => Self {
                color: "#6366f1",
                weight: 3,
                fill_opacity: 0.2,
                dash_array: None,
            },
        }
    }

    /// Dashed green outline for the campus boundary.
    pub fn boundary() -> Self {
        Self {
            color: "#22c55e",
            weight: 2,
            fill_opacity: 0.05,
            dash_array: Some("6 6"),
        }
    }
}

/// One zone as drawn on the map.
#[derive(Debug, Clone)]
pub struct ZoneLayer {
    pub zone_id: ZoneId,
    /// Tooltip text (zone name)
    pub tooltip: String,
    pub style: ZoneStyle,
    /// Vertex handles are shown and draggable
    pub vertices_editable: bool,
    /// Whole polygon can be dragged
    pub draggable: bool,
    geometry: Vec<LatLng>,
    committed: Ring,
}

impl ZoneLayer {
    fn from_zone(zone: &Zone, mode: &EditorMode) -> Self {
        Self {
            zone_id: zone.id.clone(),
            tooltip: zone.name.clone(),
            style: ZoneStyle::for_zone(zone, mode),
            vertices_editable: matches!(mode, EditorMode::VertexEdit(super::VertexTool::Select)),
            draggable: mode.is_move(),
            geometry: zone.coords.points().to_vec(),
            committed: zone.coords.clone(),
        }
    }

    /// Geometry currently shown, including uncommitted drag changes.
    pub fn geometry(&self) -> &[LatLng] {
        &self.geometry
    }

    /// Whether the shown geometry differs from the last committed ring.
    pub fn is_modified(&self) -> bool {
        self.geometry[..] != self.committed.points()[..]
    }
}

/// Owned map resource for one mounted editor.
///
/// Acquired with [`MapSession::open`] when the map mounts and released when
/// dropped on unmount. Nothing about it is global.
#[derive(Debug)]
pub struct MapSession {
    center: LatLng,
    zoom: u8,
    layers: Vec<ZoneLayer>,
    boundary: Option<Vec<LatLng>>,
}

impl MapSession {
    pub fn open(center: LatLng, zoom: u8) -> Self {
        info!(
            "[MapSession] Opened at ({:.6}, {:.6}) zoom {}",
            center.lat, center.lng, zoom
        );
        Self {
            center,
            zoom,
            layers: Vec::new(),
            boundary: None,
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Re-center the map (campus changed).
    pub fn recenter(&mut self, center: LatLng) {
        self.center = center;
    }

    pub fn layers(&self) -> &[ZoneLayer] {
        &self.layers
    }

    pub fn layer(&self, zone_id: &ZoneId) -> Option<&ZoneLayer> {
        self.layers.iter().find(|l| &l.zone_id == zone_id)
    }

    fn layer_mut(&mut self, zone_id: &ZoneId) -> Result<&mut ZoneLayer> {
        self.layers
            .iter_mut()
            .find(|l| &l.zone_id == zone_id)
            .ok_or_not_found(zone_id.as_str())
    }

    /// Boundary ring as drawn, with its style.
    pub fn boundary(&self) -> Option<(&[LatLng], ZoneStyle)> {
        self.boundary
            .as_deref()
            .map(|ring| (ring, ZoneStyle::boundary()))
    }

    pub fn set_boundary(&mut self, boundary: Option<&CampusBoundary>) {
        self.boundary = boundary.map(|b| b.ring().to_vec());
    }

    /// Rebuild every layer from the store for the given mode.
    pub fn render(&mut self, zones: &[Zone], mode: &EditorMode) {
        self.layers = zones.iter().map(|z| ZoneLayer::from_zone(z, mode)).collect();
        debug!(
            "[MapSession] Rendered {} layers in {} mode",
            self.layers.len(),
            mode.name()
        );
    }

    /// Re-render one layer from its committed zone, discarding live changes.
    pub fn render_zone(&mut self, zone: &Zone, mode: &EditorMode) {
        let layer = ZoneLayer::from_zone(zone, mode);
        match self.layers.iter_mut().find(|l| l.zone_id == zone.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    /// Record that the layer's live geometry is now the committed ring.
    pub(crate) fn mark_committed(&mut self, zone_id: &ZoneId, ring: Ring) -> Result<()> {
        let layer = self.layer_mut(zone_id)?;
        layer.geometry = ring.points().to_vec();
        layer.committed = ring;
        Ok(())
    }

    pub fn remove_layer(&mut self, zone_id: &ZoneId) {
        self.layers.retain(|l| &l.zone_id != zone_id);
    }

    /// Toolkit: a vertex handle was dragged to a new position.
    pub fn move_vertex(&mut self, zone_id: &ZoneId, index: usize, to: LatLng) -> Result<()> {
        let layer = self.layer_mut(zone_id)?;
        if !layer.vertices_editable {
            return Err(ZoneError::InvalidMode(format!(
                "vertices of zone '{}' are not editable",
                zone_id
            )));
        }
        let len = layer.geometry.len();
        let vertex = layer.geometry.get_mut(index).ok_or_else(|| {
            ZoneError::InvalidCoordinates {
                zone_id: zone_id.to_string(),
                message: format!("vertex index {} out of range (ring has {})", index, len),
            }
        })?;
        *vertex = to;
        Ok(())
    }

    /// Toolkit: the whole polygon was dragged by a degree offset.
    pub fn translate(&mut self, zone_id: &ZoneId, d_lat: f64, d_lng: f64) -> Result<()> {
        let layer = self.layer_mut(zone_id)?;
        if !layer.draggable {
            return Err(ZoneError::InvalidMode(format!(
                "zone '{}' is not draggable",
                zone_id
            )));
        }
        for p in layer.geometry.iter_mut() {
            *p = p.offset(d_lat, d_lng);
        }
        Ok(())
    }

    /// Live geometry of a layer (what the user currently sees).
    pub fn live_ring(&self, zone_id: &ZoneId) -> Option<&[LatLng]> {
        self.layer(zone_id).map(|l| l.geometry())
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        info!("[MapSession] Released {} layers", self.layers.len());
    }
}
