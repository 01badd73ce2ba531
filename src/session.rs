//! # Campus Editor
//!
//! One mounted zone editor: the zone store, the boundary engine, the editor
//! controller (which owns the map session) and the sync engine.
//!
//! Network results are turned into notifications here; the controller
//! itself never touches the backend. Saves take `&mut self`, so a second
//! save cannot start while one is outstanding.

use log::{info, warn};

use crate::backend::ZoneBackend;
use crate::editor::{DrawProgress, EditorController, EditorKey, MapSession, MutationOutcome};
use crate::sync::{SaveOutcome, SyncEngine};
use crate::wire::Campus;
use crate::{
    BoundaryEngine, CampusBoundary, EditorConfig, EditorMode, LatLng, Notification,
    PollConflictPolicy, Result, Zone, ZoneId, ZoneStore,
};

/// Initial map zoom when the editor mounts.
pub const DEFAULT_ZOOM: u8 = 18;

/// What happened to a server-side zone refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollApplyOutcome {
    /// Store and baseline replaced; nothing local was pending
    Applied,
    /// Store and baseline replaced over unsaved edits
    AppliedDiscardingEdits,
    /// Refresh held back because local edits are pending
    Deferred,
}

pub struct CampusEditor<B> {
    config: EditorConfig,
    store: ZoneStore,
    boundary: BoundaryEngine,
    controller: EditorController,
    sync: SyncEngine<B>,

    // Latest server zone set held back by DeferWhileDirty
    deferred_refresh: Option<Vec<Zone>>,
}

impl<B: ZoneBackend> CampusEditor<B> {
    /// Mount an editor centered on `center` (typically the user's location
    /// or a provisional campus center).
    pub fn new(backend: B, config: EditorConfig, center: LatLng) -> Result<Self> {
        config.validate()?;
        let session = MapSession::open(center, DEFAULT_ZOOM);
        Ok(Self {
            boundary: BoundaryEngine::new(&config),
            controller: EditorController::new(session, &config),
            store: ZoneStore::new(),
            sync: SyncEngine::new(backend),
            deferred_refresh: None,
            config,
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &ZoneStore {
        &self.store
    }

    pub fn zones(&self) -> &[Zone] {
        self.store.zones()
    }

    pub fn sync(&self) -> &SyncEngine<B> {
        &self.sync
    }

    pub fn campus(&self) -> Option<&Campus> {
        self.sync.campus()
    }

    pub fn boundary(&self) -> Option<&CampusBoundary> {
        self.boundary.boundary()
    }

    pub fn boundary_engine(&self) -> &BoundaryEngine {
        &self.boundary
    }

    pub fn controller(&self) -> &EditorController {
        &self.controller
    }

    pub fn mode(&self) -> &EditorMode {
        self.controller.mode()
    }

    pub fn session(&self) -> &MapSession {
        self.controller.session()
    }

    pub fn helper_text(&self) -> Option<&'static str> {
        self.controller.helper_text()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.controller.drain_notifications()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.sync.has_unsaved_changes(&self.store)
    }

    /// A server refresh is waiting for the local edits to be saved or reset.
    pub fn has_deferred_refresh(&self) -> bool {
        self.deferred_refresh.is_some()
    }

    /// Zones with a vertex outside the current boundary, e.g. after the
    /// padding shrank. Reported only; nothing is moved.
    pub fn zones_outside_boundary(&self) -> Vec<ZoneId> {
        let Some(boundary) = self.boundary.boundary() else {
            return Vec::new();
        };
        self.store
            .zones()
            .iter()
            .filter(|z| !boundary.contains_ring(&z.coords))
            .map(|z| z.id.clone())
            .collect()
    }

    fn current_boundary(&self) -> Result<CampusBoundary> {
        self.boundary.require_boundary().copied()
    }

    fn sync_boundary_layer(&mut self) {
        self.controller.set_boundary(self.boundary.boundary());
    }

    // ------------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------------

    /// Initial fetch. A failure is returned to the caller as a blocking
    /// error; the editor keeps whatever it held before.
    pub async fn load(&mut self) -> Result<()> {
        let campus = self.sync.load(&mut self.store).await?;
        self.deferred_refresh = None;

        self.boundary.set_campus(
            campus.center_latitude,
            campus.center_longitude,
            campus.campus_area_sq_meters,
        );
        self.boundary.set_saved_padding(
            campus
                .boundary_padding_meters
                .unwrap_or(self.config.default_padding_meters),
        );
        if self.boundary.boundary().is_none() {
            warn!(
                "[CampusEditor] Campus {} has no usable area; editing disabled",
                campus.public_id
            );
        }

        self.controller.recenter(campus.center());
        self.controller.exit_to_view(&self.store);
        self.controller.refresh(&self.store);
        self.sync_boundary_layer();
        Ok(())
    }

    /// Save all zones if anything changed. The outcome is also queued as a
    /// notification. A held-back server refresh is applied afterwards.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let outcome = match self.sync.save_zones(&self.store).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.controller.notify(Notification::SaveFailed(e.to_string()));
                return Err(e);
            }
        };

        match outcome {
            SaveOutcome::NoChanges => {
                self.controller.notify(Notification::NoChanges);
                self.apply_deferred_refresh()?;
            }
            SaveOutcome::Saved(summary) => {
                self.controller.notify(Notification::Saved(summary));
                // The held set predates our shapes; keep only its statuses.
                if let Some(server) = self.deferred_refresh.take() {
                    self.sync.adopt_statuses(&mut self.store, &server)?;
                    self.controller.refresh(&self.store);
                    info!("[CampusEditor] Applied deferred server statuses after save");
                    self.controller.notify(Notification::RefreshApplied);
                }
            }
        }
        Ok(outcome)
    }

    /// Restore the baseline and return to view. A held-back server refresh
    /// replaces the baseline once the local edits are gone.
    pub fn reset(&mut self) -> Result<()> {
        self.sync.reset_zones(&mut self.store)?;
        self.controller.exit_to_view(&self.store);
        self.controller.refresh(&self.store);
        self.controller.notify(Notification::ZonesReset);
        self.apply_deferred_refresh()
    }

    fn apply_deferred_refresh(&mut self) -> Result<()> {
        let Some(zones) = self.deferred_refresh.take() else {
            return Ok(());
        };
        self.sync.replace_from_server(&mut self.store, zones)?;
        self.controller.refresh(&self.store);
        info!("[CampusEditor] Applied deferred server refresh");
        self.controller.notify(Notification::RefreshApplied);
        Ok(())
    }

    /// Preview a padding value (clamped to the slider range).
    pub fn set_pending_padding(&mut self, meters: u32) -> u32 {
        let applied = self.boundary.set_pending_padding(meters);
        self.sync_boundary_layer();
        applied
    }

    /// Persist the previewed padding and adopt the server's echo.
    pub async fn save_padding(&mut self) -> Result<u32> {
        let requested = self.boundary.pending_padding();
        match self.sync.save_padding(requested).await {
            Ok(applied) => {
                self.boundary.set_saved_padding(applied);
                self.sync_boundary_layer();
                self.controller.notify(Notification::PaddingUpdated(applied));
                Ok(applied)
            }
            Err(e) => {
                self.controller.notify(Notification::PaddingFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Apply a zone set fetched outside a load, such as after scan processing.
    pub fn apply_polled_zones(&mut self, zones: Vec<Zone>) -> Result<PollApplyOutcome> {
        let dirty = self.has_unsaved_changes();
        if dirty && self.config.poll_conflict_policy == PollConflictPolicy::DeferWhileDirty {
            info!("[CampusEditor] Server refresh deferred: unsaved zone edits");
            self.deferred_refresh = Some(zones);
            self.controller.notify(Notification::RefreshDeferred);
            return Ok(PollApplyOutcome::Deferred);
        }

        self.sync.replace_from_server(&mut self.store, zones)?;
        self.deferred_refresh = None;
        self.controller.refresh(&self.store);
        if dirty {
            warn!("[CampusEditor] Server refresh discarded unsaved zone edits");
            self.controller.notify(Notification::UnsavedEditsDiscarded);
            Ok(PollApplyOutcome::AppliedDiscardingEdits)
        } else {
            Ok(PollApplyOutcome::Applied)
        }
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    pub fn toggle_vertex_edit(&mut self) -> Result<()> {
        self.controller
            .toggle_vertex_edit(&self.store, self.boundary.boundary())
    }

    pub fn toggle_move(&mut self) -> Result<()> {
        self.controller.toggle_move(&self.store, self.boundary.boundary())
    }

    pub fn enter_vertex_edit(&mut self) -> Result<()> {
        self.controller
            .enter_vertex_edit(&self.store, self.boundary.boundary())
    }

    pub fn enter_move(&mut self) -> Result<()> {
        self.controller.enter_move(&self.store, self.boundary.boundary())
    }

    pub fn exit_to_view(&mut self) {
        self.controller.exit_to_view(&self.store);
    }

    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        self.controller.handle_key(key, &self.store)
    }

    pub fn start_drawing(&mut self) -> Result<()> {
        self.controller.start_drawing(&self.store)
    }

    pub fn cancel_drawing(&mut self) {
        self.controller.cancel_drawing(&self.store);
    }

    pub fn place_draw_vertex(&mut self, point: LatLng) -> Result<DrawProgress> {
        let boundary = self.current_boundary()?;
        self.controller
            .place_draw_vertex(&mut self.store, &boundary, point)
    }

    pub fn finish_drawing(&mut self) -> Result<DrawProgress> {
        let boundary = self.current_boundary()?;
        self.controller.finish_drawing(&mut self.store, &boundary)
    }

    pub fn enable_removal(&mut self) -> Result<()> {
        self.controller.enable_removal(&self.store)
    }

    pub fn disable_removal(&mut self) {
        self.controller.disable_removal(&self.store);
    }

    pub fn remove_zone(&mut self, zone_id: &ZoneId) -> Result<Zone> {
        self.controller.remove_zone(&mut self.store, zone_id)
    }

    pub fn click_to_remove(&mut self, point: LatLng) -> Result<Option<Zone>> {
        self.controller.click_to_remove(&mut self.store, point)
    }

    pub fn drag_vertex(&mut self, zone_id: &ZoneId, index: usize, to: LatLng) -> Result<()> {
        self.controller.drag_vertex(zone_id, index, to)
    }

    pub fn finish_vertex_edit(&mut self, zone_id: &ZoneId) -> Result<MutationOutcome> {
        let boundary = self.current_boundary()?;
        self.controller
            .finish_vertex_edit(&mut self.store, &boundary, zone_id)
    }

    pub fn drag_zone(&mut self, zone_id: &ZoneId, d_lat: f64, d_lng: f64) -> Result<()> {
        self.controller.drag_zone(zone_id, d_lat, d_lng)
    }

    pub fn finish_move(&mut self, zone_id: &ZoneId) -> Result<MutationOutcome> {
        let boundary = self.current_boundary()?;
        self.controller.finish_move(&mut self.store, &boundary, zone_id)
    }

    pub fn rename_zone(&mut self, zone_id: &ZoneId, name: impl Into<String>) -> Result<()> {
        self.store.rename_zone(zone_id, name)?;
        self.controller.refresh(&self.store);
        Ok(())
    }
}

#[cfg(feature = "http")]
mod scans {
    use super::*;
    use crate::scan::{PollOutcome, ScanMonitor};
    use crate::wire::{ScanJob, ScanResult};
    use crate::HttpBackend;

    impl CampusEditor<HttpBackend> {
        /// Editor backed by the zones API at `config.api_base`.
        pub fn connect(config: EditorConfig, token: Option<String>, center: LatLng) -> Result<Self> {
            let backend = HttpBackend::new(&config, token)?;
            Self::new(backend, config, center)
        }
    }

    impl<B: ZoneBackend> CampusEditor<B> {
        pub async fn submit_scans(
            &self,
            monitor: &ScanMonitor,
            images: Vec<(String, Vec<u8>)>,
        ) -> Result<Vec<ScanJob>> {
            monitor
                .submit_scans(self.sync.backend(), self.store.zones(), images)
                .await
        }

        /// Poll until server zone statuses change, then apply the refresh
        /// under the configured conflict policy. `None` when polling timed out.
        ///
        /// Polls are compared against the last server state (the baseline),
        /// never the live store, so unsaved local edits do not count as a
        /// status change.
        pub async fn watch_scans(
            &mut self,
            monitor: &ScanMonitor,
        ) -> Result<Option<(PollApplyOutcome, Vec<ScanResult>)>> {
            let before = self.sync.baseline().clone();
            match monitor
                .poll_for_status_change(self.sync.backend(), before.zones())
                .await
            {
                PollOutcome::Updated { zones, results } => {
                    let applied = self.apply_polled_zones(zones)?;
                    Ok(Some((applied, results)))
                }
                PollOutcome::TimedOut => Ok(None),
            }
        }
    }
}
