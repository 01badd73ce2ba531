//! Wire formats for the zones API.
//!
//! Zones travel as GeoJSON-flavored polygons: one outer ring in
//! (longitude, latitude) order, explicitly closed by repeating the first
//! point. Internally rings are open and (latitude, longitude). Every load
//! and save crosses this boundary through the conversions here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LatLng, OptionExt, Result, Ring, Zone, ZoneError, ZoneId, ZoneStatus};

const POLYGON_TYPE: &str = "Polygon";

// ============================================================================
// Geometry
// ============================================================================

/// `{ type: "Polygon", coordinates: [[[lon, lat], ...]] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl GeoPolygon {
    /// Close the ring and swap to (lon, lat).
    pub fn from_ring(ring: &Ring) -> Self {
        let outer = ring
            .to_closed()
            .into_iter()
            .map(|p| [p.lng, p.lat])
            .collect();
        Self {
            kind: POLYGON_TYPE.to_string(),
            coordinates: vec![outer],
        }
    }

    /// Swap back to (lat, lon) and drop the closing point.
    ///
    /// Fails when the outer ring is missing or has too few distinct points
    /// after the closing point is removed.
    pub fn to_ring(&self, zone_id: &str) -> Result<Ring> {
        if self.kind != POLYGON_TYPE {
            return Err(ZoneError::MalformedResponse(format!(
                "zone '{}' geometry type is '{}', expected '{}'",
                zone_id, self.kind, POLYGON_TYPE
            )));
        }
        let outer = self
            .coordinates
            .first()
            .ok_or_malformed(&format!("zone '{}' geometry has no outer ring", zone_id))?;

        let mut points: Vec<LatLng> = outer.iter().map(|[lng, lat]| LatLng::new(*lat, *lng)).collect();
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(ZoneError::InvalidCoordinates {
                zone_id: zone_id.to_string(),
                message: format!("({}, {})", bad.lat, bad.lng),
            });
        }
        // Only a true closing duplicate is dropped; an unclosed ring keeps its last point.
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        let count = points.len();
        Ring::from_points(points).ok_or_insufficient_points(zone_id, count, Ring::MIN_POINTS)
    }
}

// ============================================================================
// Zones
// ============================================================================

/// Zone as returned by `GET /api/zones/map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapZone {
    pub public_id: String,
    /// Display name
    #[serde(alias = "name")]
    pub zone_code: String,
    #[serde(default)]
    pub geo_boundary: Option<GeoPolygon>,
    #[serde(default)]
    pub current_status: Option<String>,
}

impl MapZone {
    pub fn into_zone(self) -> Result<Zone> {
        let geometry = self.geo_boundary.as_ref().ok_or_malformed(&format!(
            "zone '{}' is missing geo_boundary",
            self.public_id
        ))?;
        let coords = geometry.to_ring(&self.public_id)?;
        Ok(Zone {
            id: ZoneId::new(self.public_id),
            name: self.zone_code,
            coords,
            status: self.current_status.map(ZoneStatus::from).unwrap_or_default(),
        })
    }

    pub fn from_zone(zone: &Zone) -> Self {
        Self {
            public_id: zone.id.to_string(),
            zone_code: zone.name.clone(),
            geo_boundary: Some(GeoPolygon::from_ring(&zone.coords)),
            current_status: Some(zone.status.as_str().to_string()),
        }
    }
}

/// Convert a whole fetched zone list, failing on the first malformed entry.
pub fn zones_from_wire(zones: Vec<MapZone>) -> Result<Vec<Zone>> {
    zones.into_iter().map(MapZone::into_zone).collect()
}

/// Zone as submitted to `PUT /api/zones/bulk/{campus_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireZone {
    pub public_id: String,
    pub name: String,
    pub campus_id: String,
    pub geo_boundary: GeoPolygon,
}

impl WireZone {
    pub fn from_zone(zone: &Zone, campus_id: &str) -> Self {
        Self {
            public_id: zone.id.to_string(),
            name: zone.name.clone(),
            campus_id: campus_id.to_string(),
            geo_boundary: GeoPolygon::from_ring(&zone.coords),
        }
    }
}

// ============================================================================
// Campus and profile
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campus {
    #[serde(alias = "id")]
    pub public_id: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub center_latitude: f64,
    pub center_longitude: f64,
    #[serde(default)]
    pub campus_area_sq_meters: Option<f64>,
    /// Saved padding; absent on campuses that never stored one
    #[serde(default)]
    pub boundary_padding_meters: Option<u32>,
}

impl Campus {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center_latitude, self.center_longitude)
    }
}

/// `GET /api/users/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub campus: Option<Campus>,
}

impl UserProfile {
    pub fn require_campus(&self) -> Result<&Campus> {
        self.campus
            .as_ref()
            .ok_or_malformed("user profile has no campus")
    }
}

/// Body of `PUT /api/campuses/boundary-padding`, and its echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingUpdate {
    pub boundary_padding: u32,
}

/// Error body the server sends with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// `detail` as text; validation errors arrive as arrays of objects.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Scans
// ============================================================================

/// Response to a scan upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One processed scan from `GET /api/scans/results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub image_url: String,
    pub zone_code: String,
    pub waste_volume_estimate: f64,
    pub processed_at: DateTime<Utc>,
}
