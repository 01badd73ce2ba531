//! Geographic utilities: meter/degree conversion, containment and ring checks.
//!
//! All functions work on internal (lat, lng) coordinates.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};

use crate::LatLng;

/// Meters per degree of latitude (mean value, also used as the equatorial
/// base for longitude).
pub const METERS_PER_DEGREE: f64 = 111_132.0;

/// Convert a north-south and east-west distance in meters into degree deltas
/// at the given latitude.
///
/// Longitude degrees shrink with `cos(latitude)`; at `±90°` the east-west
/// result is infinite, so callers must not pass polar latitudes.
///
/// # Example
/// ```
/// use campus_zones::meters_to_degrees;
/// let (d_lat, d_lng) = meters_to_degrees(0.0, 111_132.0, 111_132.0);
/// assert!((d_lat - 1.0).abs() < 1e-12);
/// assert!((d_lng - 1.0).abs() < 1e-12);
/// ```
pub fn meters_to_degrees(center_lat: f64, meters_north_south: f64, meters_east_west: f64) -> (f64, f64) {
    let deg_lat = meters_north_south / METERS_PER_DEGREE;
    let deg_lng = meters_east_west / (METERS_PER_DEGREE * center_lat.to_radians().cos());
    (deg_lat, deg_lng)
}

/// Even-odd ray casting test.
///
/// The ring may be open or closed. Points exactly on an edge follow the
/// half-open rule of the crossing test: edges on the minimum-latitude and
/// minimum-longitude sides of an axis-aligned box count as inside, edges on
/// the maximum sides as outside. Rings with fewer than 3 points give an
/// unspecified answer; callers validate ring size first.
pub fn point_in_polygon(point: &LatLng, ring: &[LatLng]) -> bool {
    let (lat, lng) = (point.lat, point.lng);
    let mut inside = false;

    let mut j = ring.len().wrapping_sub(1);
    for (i, pi) in ring.iter().enumerate() {
        let pj = &ring[j];
        let crosses = (pi.lat > lat) != (pj.lat > lat)
            && lng < (pj.lng - pi.lng) * (lat - pi.lat) / (pj.lat - pi.lat) + pi.lng;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// True when every vertex of `points` lies inside `ring`.
pub fn all_inside(points: &[LatLng], ring: &[LatLng]) -> bool {
    points.iter().all(|p| point_in_polygon(p, ring))
}

/// Index of the first vertex of `points` outside `ring`, if any.
pub fn first_outside(points: &[LatLng], ring: &[LatLng]) -> Option<usize> {
    points.iter().position(|p| !point_in_polygon(p, ring))
}

/// Whether two points are within `meters` of each other (local planar approximation).
pub fn within_meters(a: &LatLng, b: &LatLng, meters: f64) -> bool {
    let (d_lat, d_lng) = meters_to_degrees(a.lat, meters, meters);
    let dy = (a.lat - b.lat) / d_lat;
    let dx = (a.lng - b.lng) / d_lng;
    if !dx.is_finite() || !dy.is_finite() {
        return a == b;
    }
    dx * dx + dy * dy <= 1.0
}

fn edge(points: &[LatLng], i: usize) -> Line<f64> {
    let a = points[i];
    let b = points[(i + 1) % points.len()];
    Line::new(Coord { x: a.lng, y: a.lat }, Coord { x: b.lng, y: b.lat })
}

/// Check an open ring for self-intersection.
///
/// Adjacent edges may touch at their shared vertex but must not overlap;
/// non-adjacent edges must not touch at all.
pub fn has_self_intersection(points: &[LatLng]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a = edge(points, i);
        for j in (i + 1)..n {
            let b = edge(points, j);
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(a, b) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::Collinear { intersection }) if adjacent => {
                    if intersection.start != intersection.end {
                        return true;
                    }
                }
                Some(_) => return true,
            }
        }
    }

    false
}
