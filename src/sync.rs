//! # Sync Engine
//!
//! Keeps the zone store in step with the backend:
//! - `load`: fetch profile and zones together, set store and baseline
//! - `save_zones`: diff against the baseline, bulk-replace the full set,
//!   then adopt the current zones as the new baseline
//! - `reset_zones`: copy the baseline back into the store
//! - `save_padding`: persist the boundary padding, adopting the server's value
//!
//! The baseline is owned here and replaced only after a successful load or
//! save. A failed save leaves both the store and the baseline untouched so
//! the user can retry.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::ZoneBackend;
use crate::wire::{zones_from_wire, Campus, WireZone};
use crate::{Result, Zone, ZoneError, ZoneId, ZoneStatus, ZoneStore};

// ============================================================================
// Baseline and Diff
// ============================================================================

/// Snapshot of the zone set at the last successful load or save.
#[derive(Debug, Clone, Default)]
pub struct SyncBaseline {
    zones: Arc<Vec<Zone>>,
}

impl SyncBaseline {
    fn capture(store: &ZoneStore) -> Self {
        Self {
            zones: store.snapshot(),
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Changes between the live zones and the baseline, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneDiff {
    /// In the store, not in the baseline
    pub created: Vec<ZoneId>,
    /// In both, with a different ring
    pub modified: Vec<ZoneId>,
    /// In the baseline, not in the store
    pub deleted: Vec<ZoneId>,
    /// In both, with a different name
    pub renamed: Vec<ZoneId>,
}

impl ZoneDiff {
    pub fn compute(current: &[Zone], baseline: &[Zone]) -> Self {
        let before: HashMap<&ZoneId, &Zone> = baseline.iter().map(|z| (&z.id, z)).collect();
        let now: HashSet<&ZoneId> = current.iter().map(|z| &z.id).collect();

        let mut diff = ZoneDiff::default();
        for zone in current {
            match before.get(&zone.id) {
                None => diff.created.push(zone.id.clone()),
                Some(old) => {
                    // Ring equality short-circuits on shared storage.
                    if old.coords != zone.coords {
                        diff.modified.push(zone.id.clone());
                    }
                    if old.name != zone.name {
                        diff.renamed.push(zone.id.clone());
                    }
                }
            }
        }
        diff.deleted = baseline
            .iter()
            .filter(|z| !now.contains(&z.id))
            .map(|z| z.id.clone())
            .collect();
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
    }

    pub fn summary(&self) -> SaveSummary {
        SaveSummary {
            created: self.created.len(),
            modified: self.modified.len(),
            deleted: self.deleted.len(),
            renamed: self.renamed.len(),
        }
    }
}

/// Counts reported back to the user after a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub created: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: usize,
}

impl fmt::Display for SaveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn plural(n: usize) -> &'static str {
            if n == 1 {
                ""
            } else {
                "s"
            }
        }

        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("{} new zone{} created.", self.created, plural(self.created)));
        }
        if self.modified > 0 {
            parts.push(format!("{} zone{} updated.", self.modified, plural(self.modified)));
        }
        if self.deleted > 0 {
            parts.push(format!("{} zone{} deleted.", self.deleted, plural(self.deleted)));
        }
        if self.renamed > 0 {
            parts.push(format!("{} zone{} renamed.", self.renamed, plural(self.renamed)));
        }

        if parts.is_empty() {
            write!(f, "Zones saved successfully!")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Empty diff; nothing was sent
    NoChanges,
    Saved(SaveSummary),
}

/// `current` with each zone's status replaced by the server's, matched by id.
/// Zones the server does not know keep their status.
fn merge_statuses(current: &[Zone], server: &[Zone]) -> Vec<Zone> {
    let statuses: HashMap<&ZoneId, &ZoneStatus> =
        server.iter().map(|z| (&z.id, &z.status)).collect();
    current
        .iter()
        .map(|zone| match statuses.get(&zone.id) {
            Some(&status) => zone.clone().with_status(status.clone()),
            None => zone.clone(),
        })
        .collect()
}

// ============================================================================
// Engine
// ============================================================================

pub struct SyncEngine<B> {
    backend: B,
    baseline: SyncBaseline,
    campus: Option<Campus>,
}

impl<B: ZoneBackend> SyncEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            baseline: SyncBaseline::default(),
            campus: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn baseline(&self) -> &SyncBaseline {
        &self.baseline
    }

    /// Campus from the last successful load.
    pub fn campus(&self) -> Option<&Campus> {
        self.campus.as_ref()
    }

    fn campus_id(&self) -> Result<&str> {
        self.campus
            .as_ref()
            .map(|c| c.public_id.as_str())
            .ok_or_else(|| ZoneError::InvalidMode("no campus loaded".to_string()))
    }

    pub fn diff(&self, store: &ZoneStore) -> ZoneDiff {
        ZoneDiff::compute(store.zones(), self.baseline.zones())
    }

    pub fn has_unsaved_changes(&self, store: &ZoneStore) -> bool {
        !self.diff(store).is_empty()
    }

    /// Fetch profile and zones concurrently; on success the store and the
    /// baseline both hold the fetched set.
    ///
    /// Any malformed zone fails the whole load and leaves the store as it was.
    pub async fn load(&mut self, store: &mut ZoneStore) -> Result<Campus> {
        let (profile, wire_zones) =
            futures::try_join!(self.backend.fetch_profile(), self.backend.fetch_zones())?;

        let campus = profile.require_campus()?.clone();
        let zones = zones_from_wire(wire_zones)?;
        store.replace_all(zones)?;
        self.baseline = SyncBaseline::capture(store);

        info!(
            "[SyncEngine] Loaded {} zones for campus {} ({})",
            store.len(),
            campus.name,
            campus.public_id
        );
        self.campus = Some(campus.clone());
        Ok(campus)
    }

    /// Submit the full zone set if anything changed since the baseline.
    pub async fn save_zones(&mut self, store: &ZoneStore) -> Result<SaveOutcome> {
        let diff = self.diff(store);
        if diff.is_empty() {
            debug!("[SyncEngine] Save skipped: no changes");
            return Ok(SaveOutcome::NoChanges);
        }

        let campus_id = self.campus_id()?.to_string();
        let payload: Vec<WireZone> = store
            .zones()
            .iter()
            .map(|z| WireZone::from_zone(z, &campus_id))
            .collect();
        let summary = diff.summary();

        info!(
            "[SyncEngine] Saving {} zones to campus {} ({})",
            payload.len(),
            campus_id,
            summary
        );
        if let Err(e) = self.backend.replace_zones(&campus_id, &payload).await {
            warn!("[SyncEngine] Save failed: {}", e);
            return Err(e);
        }

        self.baseline = SyncBaseline::capture(store);
        Ok(SaveOutcome::Saved(summary))
    }

    /// Discard in-session edits. Local only; calling it twice is the same
    /// as calling it once.
    pub fn reset_zones(&self, store: &mut ZoneStore) -> Result<()> {
        store.replace_all(self.baseline.zones().to_vec())?;
        info!("[SyncEngine] Reset {} zones to baseline", store.len());
        Ok(())
    }

    /// Persist the padding; the server's echoed value wins.
    pub async fn save_padding(&mut self, meters: u32) -> Result<u32> {
        let applied = self.backend.update_padding(meters).await?;
        if applied != meters {
            info!(
                "[SyncEngine] Server adjusted padding {}m -> {}m",
                meters, applied
            );
        }
        if let Some(campus) = self.campus.as_mut() {
            campus.boundary_padding_meters = Some(applied);
        }
        Ok(applied)
    }

    /// Adopt a server-side zone set as both live state and baseline.
    pub fn replace_from_server(&mut self, store: &mut ZoneStore, zones: Vec<Zone>) -> Result<()> {
        store.replace_all(zones)?;
        self.baseline = SyncBaseline::capture(store);
        Ok(())
    }

    /// Take zone statuses from a server zone set while keeping the current
    /// geometry and names. Used after a save made a held refresh stale: the
    /// server already holds our shapes, but its statuses are newer. The
    /// merged set becomes both store and baseline.
    pub fn adopt_statuses(&mut self, store: &mut ZoneStore, server: &[Zone]) -> Result<()> {
        let merged = merge_statuses(store.zones(), server);
        self.replace_from_server(store, merged)?;
        debug!("[SyncEngine] Adopted server statuses for {} zones", store.len());
        Ok(())
    }
}
