//! # Campus Boundary
//!
//! Derives the containment polygon every zone must stay inside from the
//! campus center, its footprint area and a user-adjustable padding.
//!
//! The footprint is treated as a square of side `sqrt(area)`; the padded
//! side is `side + padding` meters on both axes, converted to degrees at the
//! campus latitude.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{all_inside, meters_to_degrees, point_in_polygon};
use crate::{Bounds, EditorConfig, LatLng, Result, Ring, ZoneError};

/// Closed boundary ring: 4 corners (NW, NE, SE, SW) plus the first corner repeated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampusBoundary {
    ring: [LatLng; 5],
}

impl CampusBoundary {
    /// The 5-point closed ring.
    pub fn ring(&self) -> &[LatLng] {
        &self.ring
    }

    /// The 4 distinct corners.
    pub fn corners(&self) -> &[LatLng] {
        &self.ring[..4]
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_lat: self.ring[2].lat,
            max_lat: self.ring[0].lat,
            min_lng: self.ring[0].lng,
            max_lng: self.ring[1].lng,
        }
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        point_in_polygon(point, &self.ring)
    }

    /// True when every vertex of the ring is inside the boundary.
    pub fn contains_ring(&self, ring: &Ring) -> bool {
        all_inside(ring.points(), &self.ring)
    }
}

/// Compute the campus boundary ring.
///
/// Pure and deterministic: identical inputs give identical rings.
///
/// # Example
/// ```
/// use campus_zones::compute_boundary;
/// let boundary = compute_boundary(22.61, 88.38, 10_000.0, 100.0);
/// assert_eq!(boundary.ring().len(), 5);
/// assert_eq!(boundary.ring()[0], boundary.ring()[4]);
/// ```
pub fn compute_boundary(
    center_lat: f64,
    center_lng: f64,
    area_sq_meters: f64,
    padding_meters: f64,
) -> CampusBoundary {
    let side = area_sq_meters.sqrt() + padding_meters;
    let (d_lat, d_lng) = meters_to_degrees(center_lat, side, side);
    let (half_lat, half_lng) = (d_lat / 2.0, d_lng / 2.0);

    let nw = LatLng::new(center_lat + half_lat, center_lng - half_lng);
    let ne = LatLng::new(center_lat + half_lat, center_lng + half_lng);
    let se = LatLng::new(center_lat - half_lat, center_lng + half_lng);
    let sw = LatLng::new(center_lat - half_lat, center_lng - half_lng);

    CampusBoundary {
        ring: [nw, ne, se, sw, nw],
    }
}

/// Campus geometry the boundary is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Footprint {
    center_lat: f64,
    center_lng: f64,
    area_sq_meters: f64,
}

type InputKey = (u64, u64, u64, u32);

/// Holds boundary inputs and re-derives the ring whenever one changes.
///
/// Padding has two values: the one last saved to (and echoed by) the
/// backend, and a pending value the user is previewing. The boundary always
/// reflects the pending value.
#[derive(Debug, Clone)]
pub struct BoundaryEngine {
    footprint: Option<Footprint>,
    saved_padding: u32,
    pending_padding: u32,
    min_padding: u32,
    max_padding: u32,
    cached: Option<(InputKey, CampusBoundary)>,
}

impl BoundaryEngine {
    pub fn new(config: &EditorConfig) -> Self {
        let padding = config.clamp_padding(config.default_padding_meters);
        Self {
            footprint: None,
            saved_padding: padding,
            pending_padding: padding,
            min_padding: config.min_padding_meters,
            max_padding: config.max_padding_meters,
            cached: None,
        }
    }

    /// Set the campus center and footprint area.
    ///
    /// A missing, non-finite or non-positive area leaves the boundary unavailable.
    pub fn set_campus(&mut self, center_lat: f64, center_lng: f64, area_sq_meters: Option<f64>) {
        self.footprint = match area_sq_meters {
            Some(area)
                if area.is_finite()
                    && area > 0.0
                    && center_lat.is_finite()
                    && center_lng.is_finite()
                    && center_lat.abs() < 90.0 =>
            {
                Some(Footprint {
                    center_lat,
                    center_lng,
                    area_sq_meters: area,
                })
            }
            _ => None,
        };
        self.recompute();
    }

    /// Adopt the padding the backend reports as saved; also resets the preview.
    pub fn set_saved_padding(&mut self, meters: u32) {
        self.saved_padding = meters;
        self.pending_padding = meters;
        self.recompute();
    }

    /// Preview a new padding, clamped into the configured range. Returns the applied value.
    pub fn set_pending_padding(&mut self, meters: u32) -> u32 {
        self.pending_padding = meters.clamp(self.min_padding, self.max_padding);
        self.recompute();
        self.pending_padding
    }

    pub fn pending_padding(&self) -> u32 {
        self.pending_padding
    }

    pub fn saved_padding(&self) -> u32 {
        self.saved_padding
    }

    /// Whether the previewed padding differs from the saved one.
    pub fn has_pending_padding(&self) -> bool {
        self.pending_padding != self.saved_padding
    }

    /// Drop the preview and return to the saved padding.
    pub fn discard_pending_padding(&mut self) {
        self.pending_padding = self.saved_padding;
        self.recompute();
    }

    pub fn boundary(&self) -> Option<&CampusBoundary> {
        self.cached.as_ref().map(|(_, boundary)| boundary)
    }

    /// Current boundary, or an error when no campus footprint is known.
    pub fn require_boundary(&self) -> Result<&CampusBoundary> {
        self.boundary().ok_or_else(|| {
            ZoneError::BoundaryUnavailable("campus center or area not loaded".to_string())
        })
    }

    fn recompute(&mut self) {
        let Some(fp) = self.footprint else {
            self.cached = None;
            return;
        };

        let key = (
            fp.center_lat.to_bits(),
            fp.center_lng.to_bits(),
            fp.area_sq_meters.to_bits(),
            self.pending_padding,
        );
        if matches!(self.cached, Some((cached_key, _)) if cached_key == key) {
            return;
        }

        let boundary = compute_boundary(
            fp.center_lat,
            fp.center_lng,
            fp.area_sq_meters,
            self.pending_padding as f64,
        );
        debug!(
            "[BoundaryEngine] Recomputed boundary: center=({:.6}, {:.6}) area={:.0}m² padding={}m",
            fp.center_lat, fp.center_lng, fp.area_sq_meters, self.pending_padding
        );
        self.cached = Some((key, boundary));
    }
}
