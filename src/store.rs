//! # Zone Store
//!
//! Authoritative client-side zone state. Every operation replaces the whole
//! collection (copy-on-write) and produces new rings rather than mutating
//! stored ones, so snapshots handed out earlier never change underneath
//! their holders.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo_utils::point_in_polygon;
use crate::{LatLng, OptionExt, Result, Ring, ZoneError};

// ============================================================================
// Zone Types
// ============================================================================

/// Stable zone identity: server `public_id`, or a client-generated UUID for
/// zones drawn in this session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh client-side identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Waste status reported by the backend. Only used for display color.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneStatus {
    #[default]
    Green,
    Yellow,
    Red,
    Other(String),
}

impl ZoneStatus {
    /// Display color for view mode.
    pub fn color(&self) -> &'static str {
        match self {
            ZoneStatus::Red => "#ef4444",
            ZoneStatus::Yellow => "#f59e0b",
            _ => "#38bdf8",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ZoneStatus::Green => "Green",
            ZoneStatus::Yellow => "Yellow",
            ZoneStatus::Red => "Red",
            ZoneStatus::Other(s) => s,
        }
    }
}

impl From<String> for ZoneStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Green" => ZoneStatus::Green,
            "Yellow" => ZoneStatus::Yellow,
            "Red" => ZoneStatus::Red,
            _ => ZoneStatus::Other(s),
        }
    }
}

impl From<ZoneStatus> for String {
    fn from(status: ZoneStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A named polygonal region inside the campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub coords: Ring,
    pub status: ZoneStatus,
}

impl Zone {
    /// New zone with a client-generated id and default status.
    pub fn new(name: impl Into<String>, coords: Ring) -> Self {
        Self {
            id: ZoneId::generate(),
            name: name.into(),
            coords,
            status: ZoneStatus::default(),
        }
    }

    pub fn with_id(mut self, id: ZoneId) -> Self {
        self.id = id;
        self
    }

    pub fn with_status(mut self, status: ZoneStatus) -> Self {
        self.status = status;
        self
    }
}

/// Zone bounds wrapper for R-tree hit testing
#[derive(Debug, Clone)]
struct ZoneEnvelope {
    index: usize,
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

// ============================================================================
// Zone Store
// ============================================================================

/// The live zone collection.
#[derive(Debug, Clone, Default)]
pub struct ZoneStore {
    zones: Arc<Vec<Zone>>,
    revision: u64,

    // Rebuilt on every commit; shared by clones of the same revision
    spatial_index: Arc<RTree<ZoneEnvelope>>,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from zones, rejecting duplicate ids.
    pub fn from_zones(zones: Vec<Zone>) -> Result<Self> {
        let mut store = Self::new();
        store.replace_all(zones)?;
        Ok(store)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Cheap handle to the current collection; unaffected by later edits.
    pub fn snapshot(&self) -> Arc<Vec<Zone>> {
        Arc::clone(&self.zones)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Incremented on every successful change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.get(id).is_some()
    }

    /// Add a zone; its id must not already be present.
    pub fn add_zone(&mut self, zone: Zone) -> Result<()> {
        if self.contains(&zone.id) {
            return Err(ZoneError::DuplicateZone(zone.id.to_string()));
        }
        let mut next = Vec::with_capacity(self.zones.len() + 1);
        next.extend(self.zones.iter().cloned());
        next.push(zone);
        self.commit(next);
        Ok(())
    }

    /// Replace a zone's ring.
    pub fn update_zone_coords(&mut self, id: &ZoneId, coords: Ring) -> Result<()> {
        self.map_zone(id, |zone| Zone {
            coords: coords.clone(),
            ..zone.clone()
        })
    }

    pub fn rename_zone(&mut self, id: &ZoneId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.map_zone(id, |zone| Zone {
            name: name.clone(),
            ..zone.clone()
        })
    }

    /// Remove a zone, returning it.
    pub fn remove_zone(&mut self, id: &ZoneId) -> Result<Zone> {
        let removed = self.get(id).cloned().ok_or_not_found(id.as_str())?;
        let next: Vec<Zone> = self.zones.iter().filter(|z| &z.id != id).cloned().collect();
        self.commit(next);
        Ok(removed)
    }

    /// Replace the whole collection, rejecting duplicate ids.
    pub fn replace_all(&mut self, zones: Vec<Zone>) -> Result<()> {
        let mut seen = HashSet::with_capacity(zones.len());
        for zone in &zones {
            if !seen.insert(&zone.id) {
                return Err(ZoneError::DuplicateZone(zone.id.to_string()));
            }
        }
        self.commit(zones);
        Ok(())
    }

    /// Topmost zone (most recently added) whose ring contains the point.
    pub fn zone_at(&self, point: &LatLng) -> Option<&Zone> {
        let search = AABB::from_point([point.lng, point.lat]);
        self.spatial_index
            .locate_in_envelope_intersecting(&search)
            .map(|env| env.index)
            .filter(|&i| point_in_polygon(point, self.zones[i].coords.points()))
            .max()
            .map(|i| &self.zones[i])
    }

    /// Default name for a newly drawn zone: "Zone N" with N one past the
    /// zone count, skipping numbers already taken.
    pub fn next_default_name(&self) -> String {
        let mut n = self.zones.len() + 1;
        loop {
            let candidate = format!("Zone {}", n);
            if !self.zones.iter().any(|z| z.name == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn map_zone(&mut self, id: &ZoneId, f: impl Fn(&Zone) -> Zone) -> Result<()> {
        if !self.contains(id) {
            return Err(ZoneError::ZoneNotFound(id.to_string()));
        }
        let next: Vec<Zone> = self
            .zones
            .iter()
            .map(|z| if &z.id == id { f(z) } else { z.clone() })
            .collect();
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, zones: Vec<Zone>) {
        self.spatial_index = Arc::new(build_spatial_index(&zones));
        self.zones = Arc::new(zones);
        self.revision += 1;
    }
}

fn build_spatial_index(zones: &[Zone]) -> RTree<ZoneEnvelope> {
    let envelopes: Vec<ZoneEnvelope> = zones
        .iter()
        .enumerate()
        .map(|(index, zone)| {
            let b = zone.coords.bounds();
            ZoneEnvelope {
                index,
                min_lat: b.min_lat,
                max_lat: b.max_lat,
                min_lng: b.min_lng,
                max_lng: b.max_lng,
            }
        })
        .collect();
    RTree::bulk_load(envelopes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(lat: f64, lng: f64, size: f64) -> Ring {
        Ring::from_points(vec![
            LatLng::new(lat, lng),
            LatLng::new(lat, lng + size),
            LatLng::new(lat + size, lng + size),
            LatLng::new(lat + size, lng),
        ])
        .unwrap()
    }

    fn zone(id: &str, name: &str, r: Ring) -> Zone {
        Zone::new(name, r).with_id(ZoneId::from(id))
    }

    #[test]
    fn test_add_and_duplicate() {
        let mut store = ZoneStore::new();
        store.add_zone(zone("a", "Zone 1", ring(0.0, 0.0, 1.0))).unwrap();
        let err = store.add_zone(zone("a", "Zone 2", ring(2.0, 2.0, 1.0)));
        assert!(matches!(err, Err(ZoneError::DuplicateZone(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_copy_on_write_snapshots() {
        let mut store = ZoneStore::new();
        store.add_zone(zone("a", "Zone 1", ring(0.0, 0.0, 1.0))).unwrap();
        let before = store.snapshot();

        let moved = ring(0.5, 0.5, 1.0);
        store.update_zone_coords(&ZoneId::from("a"), moved.clone()).unwrap();

        assert_eq!(before[0].coords, ring(0.0, 0.0, 1.0), "snapshot unchanged");
        assert!(store.get(&ZoneId::from("a")).unwrap().coords.ptr_eq(&moved));
    }

    #[test]
    fn test_rename_and_remove() {
        let mut store = ZoneStore::new();
        store.add_zone(zone("a", "Zone 1", ring(0.0, 0.0, 1.0))).unwrap();
        store.add_zone(zone("b", "Zone 2", ring(2.0, 2.0, 1.0))).unwrap();

        store.rename_zone(&ZoneId::from("b"), "Canteen").unwrap();
        assert_eq!(store.get(&ZoneId::from("b")).unwrap().name, "Canteen");

        let removed = store.remove_zone(&ZoneId::from("a")).unwrap();
        assert_eq!(removed.name, "Zone 1");
        assert_eq!(store.len(), 1);
        assert!(matches!(
            store.remove_zone(&ZoneId::from("a")),
            Err(ZoneError::ZoneNotFound(_))
        ));
        assert!(store.rename_zone(&ZoneId::from("zzz"), "x").is_err());
    }

    #[test]
    fn test_replace_all_rejects_duplicates() {
        let mut store = ZoneStore::new();
        let zones = vec![
            zone("a", "Zone 1", ring(0.0, 0.0, 1.0)),
            zone("a", "Zone 2", ring(2.0, 2.0, 1.0)),
        ];
        assert!(store.replace_all(zones).is_err());
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_zone_at_prefers_topmost() {
        let mut store = ZoneStore::new();
        store.add_zone(zone("below", "Zone 1", ring(0.0, 0.0, 2.0))).unwrap();
        store.add_zone(zone("above", "Zone 2", ring(1.0, 1.0, 2.0))).unwrap();

        let hit = store.zone_at(&LatLng::new(1.5, 1.5)).unwrap();
        assert_eq!(hit.id, ZoneId::from("above"));
        let hit = store.zone_at(&LatLng::new(0.5, 0.5)).unwrap();
        assert_eq!(hit.id, ZoneId::from("below"));
        assert!(store.zone_at(&LatLng::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_zone_at_tracks_edits() {
        let mut store = ZoneStore::new();
        store.add_zone(zone("a", "Zone 1", ring(0.0, 0.0, 1.0))).unwrap();
        store.add_zone(zone("b", "Zone 2", ring(5.0, 5.0, 1.0))).unwrap();
        assert_eq!(store.zone_at(&LatLng::new(0.5, 0.5)).unwrap().id, ZoneId::from("a"));

        store.update_zone_coords(&ZoneId::from("a"), ring(3.0, 3.0, 1.0)).unwrap();
        assert!(store.zone_at(&LatLng::new(0.5, 0.5)).is_none());
        assert_eq!(store.zone_at(&LatLng::new(3.5, 3.5)).unwrap().id, ZoneId::from("a"));

        let stale = store.clone();
        store.remove_zone(&ZoneId::from("b")).unwrap();
        assert!(store.zone_at(&LatLng::new(5.5, 5.5)).is_none());
        assert_eq!(stale.zone_at(&LatLng::new(5.5, 5.5)).unwrap().id, ZoneId::from("b"));

        // Bounding-box hit outside the triangle
        let tri = Ring::from_points(vec![
            LatLng::new(10.0, 10.0),
            LatLng::new(10.0, 12.0),
            LatLng::new(12.0, 10.0),
        ])
        .unwrap();
        store.add_zone(zone("t", "Zone 3", tri)).unwrap();
        assert!(store.zone_at(&LatLng::new(11.8, 11.8)).is_none());
        assert_eq!(store.zone_at(&LatLng::new(10.5, 10.5)).unwrap().id, ZoneId::from("t"));
    }

    #[test]
    fn test_next_default_name_skips_taken() {
        let mut store = ZoneStore::new();
        assert_eq!(store.next_default_name(), "Zone 1");
        store.add_zone(zone("a", "Zone 2", ring(0.0, 0.0, 1.0))).unwrap();
        assert_eq!(store.next_default_name(), "Zone 3");
    }

    #[test]
    fn test_status_parsing_and_colors() {
        assert_eq!(ZoneStatus::from("Red".to_string()), ZoneStatus::Red);
        assert_eq!(ZoneStatus::from("Red".to_string()).color(), "#ef4444");
        assert_eq!(ZoneStatus::Yellow.color(), "#f59e0b");
        let other = ZoneStatus::from("Unknown".to_string());
        assert_eq!(other.color(), "#38bdf8");
        assert_eq!(String::from(other), "Unknown");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ZoneId::generate();
        let b = ZoneId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
