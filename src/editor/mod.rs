//! # Zone Editor Controller
//!
//! Mediates between the editor modes, the map session's live geometry and
//! the zone store.
//!
//! ## Commit protocol
//!
//! On drag-end (vertex drag or whole-zone move) the controller:
//! 1. reads the proposed ring from the layer's live geometry,
//! 2. tests every vertex against the campus boundary,
//! 3. commits the ring to the store when all pass, leaving the layer as drawn,
//! 4. otherwise re-renders the layer from the store's last committed ring
//!    and queues a containment notification. The store is not touched.
//!
//! The check runs once per completed mutation, never per drag frame.
//! Nothing here talks to the network.

mod draw;
mod layer;
mod mode;

pub use draw::{DrawStep, DrawTool};
pub use layer::{MapSession, ZoneLayer, ZoneStyle};
pub use mode::{EditorMode, VertexTool};

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info, warn};

use crate::geo_utils::{first_outside, has_self_intersection};
use crate::sync::SaveSummary;
use crate::{
    CampusBoundary, EditorConfig, LatLng, OptionExt, Result, Ring, Zone, ZoneError, ZoneId,
    ZoneStore,
};

// ============================================================================
// Outcomes and Notifications
// ============================================================================

/// Why a proposed shape was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Vertex at this index lies outside the campus boundary
    OutsideBoundary { vertex: usize },
    SelfIntersecting,
    /// Fewer than 3 distinct vertices
    TooFewPoints,
    TooManyVertices { count: usize, max: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::OutsideBoundary { vertex } => {
                write!(f, "vertex {} is outside the campus boundary", vertex)
            }
            RejectReason::SelfIntersecting => write!(f, "outline crosses itself"),
            RejectReason::TooFewPoints => write!(f, "a zone needs at least 3 points"),
            RejectReason::TooManyVertices { count, max } => {
                write!(f, "{} points drawn, at most {} allowed", count, max)
            }
        }
    }
}

/// Result of committing a vertex edit or move.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// New ring stored
    Committed(Ring),
    /// Shape refused; layer restored to the last committed ring
    Reverted(RejectReason),
    /// Live geometry equals the stored ring
    Unchanged,
}

/// Result of a draw interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawProgress {
    Placed { count: usize },
    Ignored,
    Created(ZoneId),
    Rejected(RejectReason),
}

/// Non-blocking user-facing messages (toasts).
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// An edit or move was reverted
    ContainmentViolation { zone_id: ZoneId, reason: RejectReason },
    /// A drawn shape was discarded
    DrawRejected(RejectReason),
    ZoneCreated { zone_id: ZoneId, name: String },
    ZoneRemoved { zone_id: ZoneId, name: String },
    NoChanges,
    Saved(SaveSummary),
    SaveFailed(String),
    ZonesReset,
    PaddingUpdated(u32),
    PaddingFailed(String),
    /// A server refresh replaced unsaved local edits
    UnsavedEditsDiscarded,
    /// A server refresh was held back to protect unsaved edits
    RefreshDeferred,
    /// A held-back refresh was applied after a save or reset
    RefreshApplied,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notification::ContainmentViolation { .. }
                | Notification::DrawRejected(_)
                | Notification::SaveFailed(_)
                | Notification::PaddingFailed(_)
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::ContainmentViolation { reason, .. } => match reason {
                RejectReason::OutsideBoundary { .. } => {
                    write!(f, "Zone must stay within campus boundary")
                }
                other => write!(f, "Edit reverted: {}", other),
            },
            Notification::DrawRejected(reason) => match reason {
                RejectReason::OutsideBoundary { .. } => {
                    write!(f, "New zone must be within campus boundary")
                }
                other => write!(f, "New zone discarded: {}", other),
            },
            Notification::ZoneCreated { name, .. } => write!(f, "{} created", name),
            Notification::ZoneRemoved { name, .. } => write!(f, "{} removed", name),
            Notification::NoChanges => write!(f, "No changes detected"),
            Notification::Saved(summary) => write!(f, "{}", summary),
            Notification::SaveFailed(message) => write!(f, "Failed to save zones: {}", message),
            Notification::ZonesReset => write!(f, "Zones reset to original state"),
            Notification::PaddingUpdated(meters) => {
                write!(f, "Campus boundary updated to {} meters!", meters)
            }
            Notification::PaddingFailed(message) => {
                write!(f, "Failed to update boundary: {}", message)
            }
            Notification::UnsavedEditsDiscarded => write!(
                f,
                "Waste map has been updated with new scan results; unsaved zone edits were discarded"
            ),
            Notification::RefreshDeferred => write!(
                f,
                "New scan results are available. Save or reset your zone edits to load them"
            ),
            Notification::RefreshApplied => {
                write!(f, "Waste map has been updated with new scan results!")
            }
        }
    }
}

/// Keyboard input the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
}

// ============================================================================
// Controller
// ============================================================================

/// Interactive editor state machine.
#[derive(Debug)]
pub struct EditorController {
    mode: EditorMode,
    session: MapSession,
    notifications: VecDeque<Notification>,
    close_tolerance_meters: f64,
    max_vertices: usize,
}

impl EditorController {
    pub fn new(session: MapSession, config: &EditorConfig) -> Self {
        Self {
            mode: EditorMode::View,
            session,
            notifications: VecDeque::new(),
            close_tolerance_meters: config.draw_close_tolerance_meters,
            max_vertices: config.max_vertices,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn session(&self) -> &MapSession {
        &self.session
    }

    pub fn helper_text(&self) -> Option<&'static str> {
        self.mode.helper_text()
    }

    /// Vertices placed so far by an in-progress drawing.
    pub fn draft(&self) -> &[LatLng] {
        match &self.mode {
            EditorMode::VertexEdit(VertexTool::Draw(tool)) => tool.vertices(),
            _ => &[],
        }
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    pub(crate) fn notify(&mut self, notification: Notification) {
        debug!("[ZoneEditor] Notify: {}", notification);
        self.notifications.push_back(notification);
    }

    /// Take all queued notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Re-render every layer from the store (after load, reset or refresh).
    pub fn refresh(&mut self, store: &ZoneStore) {
        self.session.render(store.zones(), &self.mode);
    }

    pub fn set_boundary(&mut self, boundary: Option<&CampusBoundary>) {
        self.session.set_boundary(boundary);
    }

    pub fn recenter(&mut self, center: LatLng) {
        self.session.recenter(center);
    }

    // ------------------------------------------------------------------------
    // Mode transitions
    // ------------------------------------------------------------------------

    fn transition(&mut self, next: EditorMode, store: &ZoneStore) {
        if self.mode != next {
            info!(
                "[ZoneEditor] Mode {} -> {}",
                self.mode.name(),
                next.name()
            );
        }
        self.mode = next;
        // Any uncommitted drag geometry from the previous mode is dropped here.
        self.session.render(store.zones(), &self.mode);
    }

    /// Enter vertex-edit (leaving move if active). Requires a boundary.
    pub fn enter_vertex_edit(
        &mut self,
        store: &ZoneStore,
        boundary: Option<&CampusBoundary>,
    ) -> Result<()> {
        if boundary.is_none() {
            return Err(ZoneError::BoundaryUnavailable(
                "cannot edit zones before the campus boundary is known".to_string(),
            ));
        }
        if !self.mode.is_vertex_edit() {
            self.transition(EditorMode::VertexEdit(VertexTool::Select), store);
        }
        Ok(())
    }

    /// Enter move (leaving vertex-edit if active). Requires a boundary.
    pub fn enter_move(&mut self, store: &ZoneStore, boundary: Option<&CampusBoundary>) -> Result<()> {
        if boundary.is_none() {
            return Err(ZoneError::BoundaryUnavailable(
                "cannot move zones before the campus boundary is known".to_string(),
            ));
        }
        if !self.mode.is_move() {
            self.transition(EditorMode::Move, store);
        }
        Ok(())
    }

    /// Return to view, cancelling any drawing or removal in progress.
    pub fn exit_to_view(&mut self, store: &ZoneStore) {
        if !self.mode.is_view() {
            self.transition(EditorMode::View, store);
        }
    }

    /// "Edit Zones" / "Exit Edit" button.
    pub fn toggle_vertex_edit(
        &mut self,
        store: &ZoneStore,
        boundary: Option<&CampusBoundary>,
    ) -> Result<()> {
        if self.mode.is_vertex_edit() {
            self.exit_to_view(store);
            Ok(())
        } else {
            self.enter_vertex_edit(store, boundary)
        }
    }

    /// "Move" button.
    pub fn toggle_move(&mut self, store: &ZoneStore, boundary: Option<&CampusBoundary>) -> Result<()> {
        if self.mode.is_move() {
            self.exit_to_view(store);
            Ok(())
        } else {
            self.enter_move(store, boundary)
        }
    }

    /// Returns true when the key was handled.
    pub fn handle_key(&mut self, key: EditorKey, store: &ZoneStore) -> bool {
        match key {
            EditorKey::Escape => {
                self.exit_to_view(store);
                true
            }
        }
    }

    fn require_vertex_edit(&self, action: &str) -> Result<()> {
        if self.mode.is_vertex_edit() {
            Ok(())
        } else {
            Err(ZoneError::InvalidMode(format!(
                "{} requires vertex-edit mode (currently {})",
                action,
                self.mode.name()
            )))
        }
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    fn require_drawing(&self) -> Result<()> {
        if self.mode.is_drawing() {
            Ok(())
        } else {
            Err(ZoneError::InvalidMode(format!(
                "no drawing in progress (currently {})",
                self.mode.name()
            )))
        }
    }

    /// "+ Add Zone": start free-hand drawing.
    pub fn start_drawing(&mut self, store: &ZoneStore) -> Result<()> {
        self.require_vertex_edit("drawing")?;
        let tool = DrawTool::new(self.close_tolerance_meters);
        self.transition(EditorMode::VertexEdit(VertexTool::Draw(tool)), store);
        Ok(())
    }

    /// Abandon the drawing and go back to vertex selection.
    pub fn cancel_drawing(&mut self, store: &ZoneStore) {
        if self.mode.is_drawing() {
            self.transition(EditorMode::VertexEdit(VertexTool::Select), store);
        }
    }

    /// Place one vertex of the drawing. Clicking the first vertex again
    /// completes the zone.
    pub fn place_draw_vertex(
        &mut self,
        store: &mut ZoneStore,
        boundary: &CampusBoundary,
        point: LatLng,
    ) -> Result<DrawProgress> {
        self.require_drawing()?;
        if !point.is_valid() {
            return Err(ZoneError::InvalidCoordinates {
                zone_id: "draft".to_string(),
                message: format!("({}, {})", point.lat, point.lng),
            });
        }

        let step = match &mut self.mode {
            EditorMode::VertexEdit(VertexTool::Draw(tool)) => tool.place(point),
            _ => DrawStep::Ignored,
        };
        match step {
            DrawStep::Placed { count } => Ok(DrawProgress::Placed { count }),
            DrawStep::Ignored => Ok(DrawProgress::Ignored),
            DrawStep::Closed(vertices) => self.complete_drawing(store, boundary, vertices),
        }
    }

    /// Explicit close gesture for the current drawing.
    pub fn finish_drawing(
        &mut self,
        store: &mut ZoneStore,
        boundary: &CampusBoundary,
    ) -> Result<DrawProgress> {
        self.require_drawing()?;
        let vertices = match &mut self.mode {
            EditorMode::VertexEdit(VertexTool::Draw(tool)) => tool.finish(),
            _ => Vec::new(),
        };
        self.complete_drawing(store, boundary, vertices)
    }

    fn complete_drawing(
        &mut self,
        store: &mut ZoneStore,
        boundary: &CampusBoundary,
        vertices: Vec<LatLng>,
    ) -> Result<DrawProgress> {
        // The draw tool switches off once a shape is completed, accepted or not.
        self.mode = EditorMode::VertexEdit(VertexTool::Select);

        let count = vertices.len();
        let verdict = match proposed_ring(vertices) {
            Err(reason) => Err(reason),
            Ok(ring) if ring.len() > self.max_vertices => Err(RejectReason::TooManyVertices {
                count: ring.len(),
                max: self.max_vertices,
            }),
            Ok(ring) => match validate_shape(&ring, boundary) {
                Some(reason) => Err(reason),
                None => Ok(ring),
            },
        };

        let ring = match verdict {
            Ok(ring) => ring,
            Err(reason) => {
                warn!(
                    "[ZoneEditor] Discarded drawn zone ({} points): {}",
                    count, reason
                );
                self.session.render(store.zones(), &self.mode);
                self.notify(Notification::DrawRejected(reason.clone()));
                return Ok(DrawProgress::Rejected(reason));
            }
        };

        let zone = Zone::new(store.next_default_name(), ring);
        let (zone_id, name) = (zone.id.clone(), zone.name.clone());
        store.add_zone(zone)?;
        info!(
            "[ZoneEditor] Created {} ({}) with {} points",
            name, zone_id, count
        );
        self.session.render(store.zones(), &self.mode);
        self.notify(Notification::ZoneCreated {
            zone_id: zone_id.clone(),
            name,
        });
        Ok(DrawProgress::Created(zone_id))
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    /// "- Remove Zone": clicking a zone now deletes it.
    pub fn enable_removal(&mut self, store: &ZoneStore) -> Result<()> {
        self.require_vertex_edit("removal")?;
        self.transition(EditorMode::VertexEdit(VertexTool::Remove), store);
        Ok(())
    }

    pub fn disable_removal(&mut self, store: &ZoneStore) {
        if self.mode.is_removing() {
            self.transition(EditorMode::VertexEdit(VertexTool::Select), store);
        }
    }

    /// A zone's layer was clicked while removal is armed: delete it.
    pub fn remove_zone(&mut self, store: &mut ZoneStore, zone_id: &ZoneId) -> Result<Zone> {
        if !self.mode.is_removing() {
            return Err(ZoneError::InvalidMode(format!(
                "removal is not armed (currently {})",
                self.mode.name()
            )));
        }
        let removed = store.remove_zone(zone_id)?;
        self.session.remove_layer(zone_id);
        info!("[ZoneEditor] Removed {} ({})", removed.name, removed.id);
        self.notify(Notification::ZoneRemoved {
            zone_id: removed.id.clone(),
            name: removed.name.clone(),
        });
        Ok(removed)
    }

    /// Map click while removal is armed: delete the topmost zone under the point.
    pub fn click_to_remove(&mut self, store: &mut ZoneStore, point: LatLng) -> Result<Option<Zone>> {
        if !self.mode.is_removing() {
            return Err(ZoneError::InvalidMode(format!(
                "removal is not armed (currently {})",
                self.mode.name()
            )));
        }
        let Some(zone_id) = store.zone_at(&point).map(|z| z.id.clone()) else {
            return Ok(None);
        };
        self.remove_zone(store, &zone_id).map(Some)
    }

    // ------------------------------------------------------------------------
    // Vertex edit and move
    // ------------------------------------------------------------------------

    /// Toolkit: a vertex handle is being dragged.
    pub fn drag_vertex(&mut self, zone_id: &ZoneId, index: usize, to: LatLng) -> Result<()> {
        if !matches!(self.mode, EditorMode::VertexEdit(VertexTool::Select)) {
            return Err(ZoneError::InvalidMode(format!(
                "vertex drag requires vertex-edit selection (currently {})",
                self.mode.name()
            )));
        }
        self.session.move_vertex(zone_id, index, to)
    }

    /// Vertex drag ended: validate and commit or revert.
    pub fn finish_vertex_edit(
        &mut self,
        store: &mut ZoneStore,
        boundary: &CampusBoundary,
        zone_id: &ZoneId,
    ) -> Result<MutationOutcome> {
        self.require_vertex_edit("vertex edit")?;
        self.commit_live_geometry(store, boundary, zone_id)
    }

    /// Toolkit: a whole zone is being dragged by a degree offset.
    pub fn drag_zone(&mut self, zone_id: &ZoneId, d_lat: f64, d_lng: f64) -> Result<()> {
        if !self.mode.is_move() {
            return Err(ZoneError::InvalidMode(format!(
                "zone drag requires move mode (currently {})",
                self.mode.name()
            )));
        }
        self.session.translate(zone_id, d_lat, d_lng)
    }

    /// Zone drag ended: validate and commit or revert to the pre-drag ring.
    pub fn finish_move(
        &mut self,
        store: &mut ZoneStore,
        boundary: &CampusBoundary,
        zone_id: &ZoneId,
    ) -> Result<MutationOutcome> {
        if !self.mode.is_move() {
            return Err(ZoneError::InvalidMode(format!(
                "move commit requires move mode (currently {})",
                self.mode.name()
            )));
        }
        self.commit_live_geometry(store, boundary, zone_id)
    }

    fn commit_live_geometry(
        &mut self,
        store: &mut ZoneStore,
        boundary: &CampusBoundary,
        zone_id: &ZoneId,
    ) -> Result<MutationOutcome> {
        let committed = store.get(zone_id).ok_or_not_found(zone_id.as_str())?.clone();
        let live = self
            .session
            .live_ring(zone_id)
            .ok_or_not_found(zone_id.as_str())?
            .to_vec();

        let proposed = match proposed_ring(live) {
            Ok(ring) => ring,
            Err(reason) => return Ok(self.revert(&committed, reason)),
        };
        if proposed == committed.coords {
            return Ok(MutationOutcome::Unchanged);
        }
        if let Some(reason) = validate_shape(&proposed, boundary) {
            return Ok(self.revert(&committed, reason));
        }

        store.update_zone_coords(zone_id, proposed.clone())?;
        self.session.mark_committed(zone_id, proposed.clone())?;
        debug!(
            "[ZoneEditor] Committed {} points for {} in {} mode",
            proposed.len(),
            zone_id,
            self.mode.name()
        );
        Ok(MutationOutcome::Committed(proposed))
    }

    fn revert(&mut self, committed: &Zone, reason: RejectReason) -> MutationOutcome {
        warn!(
            "[ZoneEditor] Reverted {} ({}): {}",
            committed.name, committed.id, reason
        );
        self.session.render_zone(committed, &self.mode);
        self.notify(Notification::ContainmentViolation {
            zone_id: committed.id.clone(),
            reason: reason.clone(),
        });
        MutationOutcome::Reverted(reason)
    }
}

/// Ring from toolkit vertices. A vertex off the globe (e.g. dragged past a
/// pole) can never be inside the campus, so it is reported as outside.
fn proposed_ring(points: Vec<LatLng>) -> std::result::Result<Ring, RejectReason> {
    if let Some(vertex) = points.iter().position(|p| !p.is_valid()) {
        return Err(RejectReason::OutsideBoundary { vertex });
    }
    Ring::from_points(points).ok_or(RejectReason::TooFewPoints)
}

/// Shape checks shared by commits and drawings: containment first, then
/// self-intersection.
fn validate_shape(ring: &Ring, boundary: &CampusBoundary) -> Option<RejectReason> {
    if let Some(vertex) = first_outside(ring.points(), boundary.ring()) {
        return Some(RejectReason::OutsideBoundary { vertex });
    }
    if has_self_intersection(ring.points()) {
        return Some(RejectReason::SelfIntersecting);
    }
    None
}
