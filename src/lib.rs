//! # Campus Zones
//!
//! Client-side engine for editing named waste-monitoring zones inside a
//! campus boundary, and for keeping them in sync with the zones API.
//!
//! This library provides:
//! - Geo math for boundary derivation and point-in-polygon containment
//! - A copy-on-write zone store with spatial hit-testing
//! - An interactive editor controller (view / vertex-edit / move) that
//!   enforces boundary containment on every committed mutation
//! - A sync engine that diffs against the last-synced baseline and performs
//!   bulk saves, resets and padding updates
//!
//! ## Features
//!
//! - **`http`** (default) - Enable the reqwest-backed zones API client and scan polling
//!
//! ## Quick Start
//!
//! ```rust
//! use campus_zones::{compute_boundary, LatLng, Ring, ZoneStore, Zone};
//!
//! let boundary = compute_boundary(22.61, 88.38, 10_000.0, 100.0);
//! let ring = Ring::from_points(vec![
//!     LatLng::new(22.6101, 88.3801),
//!     LatLng::new(22.6102, 88.3801),
//!     LatLng::new(22.6102, 88.3803),
//! ])
//! .unwrap();
//! assert!(boundary.contains_ring(&ring));
//!
//! let mut store = ZoneStore::new();
//! store.add_zone(Zone::new("Zone 1", ring)).unwrap();
//! assert_eq!(store.len(), 1);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, ZoneError};

// Editor and client configuration
pub mod config;
pub use config::{EditorConfig, PollConflictPolicy};

// Geographic utilities (meters/degrees, containment, ring helpers)
pub mod geo_utils;
pub use geo_utils::{meters_to_degrees, point_in_polygon};

// Campus boundary derivation
pub mod boundary;
pub use boundary::{compute_boundary, BoundaryEngine, CampusBoundary};

// Authoritative zone state
pub mod store;
pub use store::{Zone, ZoneId, ZoneStatus, ZoneStore};

// Interactive editor controller (modes, map session, draw tool)
pub mod editor;
pub use editor::{
    DrawProgress, EditorController, EditorKey, EditorMode, MapSession, MutationOutcome,
    Notification, RejectReason, VertexTool, ZoneLayer, ZoneStyle,
};

// Wire formats for the zones API
pub mod wire;
pub use wire::{Campus, GeoPolygon, MapZone, ScanJob, ScanResult, UserProfile, WireZone};

// Backend operations consumed by the sync engine
pub mod backend;
pub use backend::{ScanUpload, ZoneBackend};

// Diff, save, reset and padding synchronization
pub mod sync;
pub use sync::{SaveOutcome, SaveSummary, SyncBaseline, SyncEngine, ZoneDiff};

// One mounted editor: store + boundary + controller + sync
pub mod session;
pub use session::{CampusEditor, PollApplyOutcome};

// HTTP client for the zones API
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::HttpBackend;

// Scan submission and status polling
#[cfg(feature = "http")]
pub mod scan;
#[cfg(feature = "http")]
pub use scan::{PollOutcome, ScanMonitor};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in internal (latitude, longitude) order.
///
/// # Example
/// ```
/// use campus_zones::LatLng;
/// let point = LatLng::new(22.61, 88.38); // Kolkata
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Offset this point by a degree delta.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }
}

/// Bounding box for a ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lng = min_lng.min(p.lng);
            max_lng = max_lng.max(p.lng);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// An open polygon ring: at least 3 vertices, no explicit closing point,
/// no two consecutive identical vertices.
///
/// Rings are immutable and cheaply cloneable. Every edit produces a new
/// ring, so two rings that share storage are known to be identical without
/// a pointwise comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<LatLng>", into = "Vec<LatLng>")]
pub struct Ring(Arc<[LatLng]>);

impl Ring {
    /// Minimum number of distinct vertices in a ring.
    pub const MIN_POINTS: usize = 3;

    /// Build a ring from raw vertices.
    ///
    /// A trailing point equal to the first is dropped, as are consecutive
    /// duplicates. Returns `None` if fewer than 3 valid vertices remain.
    ///
    /// # Example
    /// ```
    /// use campus_zones::{LatLng, Ring};
    ///
    /// let closed = vec![
    ///     LatLng::new(0.0, 0.0),
    ///     LatLng::new(0.0, 1.0),
    ///     LatLng::new(1.0, 1.0),
    ///     LatLng::new(0.0, 0.0),
    /// ];
    /// let ring = Ring::from_points(closed).unwrap();
    /// assert_eq!(ring.len(), 3);
    /// ```
    pub fn from_points(points: Vec<LatLng>) -> Option<Self> {
        if points.iter().any(|p| !p.is_valid()) {
            return None;
        }

        let mut deduped: Vec<LatLng> = Vec::with_capacity(points.len());
        for p in points {
            if deduped.last() != Some(&p) {
                deduped.push(p);
            }
        }
        while deduped.len() > 1 && deduped.first() == deduped.last() {
            deduped.pop();
        }

        if deduped.len() < Self::MIN_POINTS {
            return None;
        }
        Some(Self(deduped.into()))
    }

    /// Vertices in order, without the closing point.
    pub fn points(&self) -> &[LatLng] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when both rings share the same storage.
    pub fn ptr_eq(&self, other: &Ring) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Vertices with the first point repeated at the end.
    pub fn to_closed(&self) -> Vec<LatLng> {
        let mut closed = self.0.to_vec();
        closed.push(self.0[0]);
        closed
    }

    /// Return a new ring with every vertex shifted by the same degree delta.
    pub fn translated(&self, d_lat: f64, d_lng: f64) -> Ring {
        Ring(self.0.iter().map(|p| p.offset(d_lat, d_lng)).collect())
    }

    /// Bounding box of the ring.
    pub fn bounds(&self) -> Bounds {
        // A ring is never empty, so bounds always exist.
        Bounds::from_points(&self.0).unwrap_or(Bounds {
            min_lat: 0.0,
            max_lat: 0.0,
            min_lng: 0.0,
            max_lng: 0.0,
        })
    }
}

impl PartialEq for Ring {
    /// Pointwise comparison, including length.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0[..] == other.0[..]
    }
}

impl TryFrom<Vec<LatLng>> for Ring {
    type Error = ZoneError;

    fn try_from(points: Vec<LatLng>) -> Result<Self> {
        let count = points.len();
        Ring::from_points(points).ok_or_insufficient_points("ring", count, Ring::MIN_POINTS)
    }
}

impl From<Ring> for Vec<LatLng> {
    fn from(ring: Ring) -> Self {
        ring.0.to_vec()
    }
}
