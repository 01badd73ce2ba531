//! Scan submission and status polling.
//!
//! Uploaded images are tagged with a random point inside a randomly chosen
//! zone. The server recomputes zone statuses asynchronously, so after an
//! upload the monitor re-fetches zones and scan results on a fixed interval
//! until some zone's status changes or the timeout elapses. Poll errors are
//! logged and polling continues.

use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::backend::{ScanUpload, ZoneBackend};
use crate::geo_utils::point_in_polygon;
use crate::wire::{zones_from_wire, ScanJob, ScanResult};
use crate::{EditorConfig, LatLng, Result, Zone, ZoneError, ZoneStatus};

// Rejection-sampling attempts before falling back to a bounding-box point
const MAX_SAMPLE_ATTEMPTS: usize = 64;

/// How a polling session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Some zone status changed; carries the fresh server state
    Updated {
        zones: Vec<Zone>,
        results: Vec<ScanResult>,
    },
    /// Timeout elapsed without a status change
    TimedOut,
}

/// Random point inside a zone's ring.
///
/// Samples the bounding box and keeps the first hit; a ring too thin to hit
/// falls back to the last bounding-box sample.
pub fn random_point_in_zone<R: Rng>(rng: &mut R, zone: &Zone) -> LatLng {
    let b = zone.coords.bounds();
    let mut sample = || {
        LatLng::new(
            b.min_lat + rng.random::<f64>() * (b.max_lat - b.min_lat),
            b.min_lng + rng.random::<f64>() * (b.max_lng - b.min_lng),
        )
    };

    let mut point = sample();
    for _ in 1..MAX_SAMPLE_ATTEMPTS {
        if point_in_polygon(&point, zone.coords.points()) {
            break;
        }
        point = sample();
    }
    point
}

fn statuses(zones: &[Zone]) -> Vec<ZoneStatus> {
    zones.iter().map(|z| z.status.clone()).collect()
}

/// Drives scan uploads and the follow-up status polling.
#[derive(Debug, Clone)]
pub struct ScanMonitor {
    interval: Duration,
    timeout: Duration,
}

impl ScanMonitor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            timeout: config.poll_timeout(),
        }
    }

    /// Tag each image with a point inside a random zone and upload them all
    /// concurrently.
    pub async fn submit_scans<B: ZoneBackend + ?Sized>(
        &self,
        backend: &B,
        zones: &[Zone],
        images: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<ScanJob>> {
        if zones.is_empty() {
            return Err(ZoneError::InvalidMode(
                "campus zones not loaded; cannot assign scan coordinates".to_string(),
            ));
        }

        let uploads: Vec<ScanUpload> = {
            let mut rng = StdRng::from_os_rng();
            images
                .into_iter()
                .map(|(file_name, bytes)| {
                    let zone = &zones[rng.random_range(0..zones.len())];
                    let point = random_point_in_zone(&mut rng, zone);
                    debug!(
                        "[ScanMonitor] {} tagged inside {} at ({:.6}, {:.6})",
                        file_name, zone.name, point.lat, point.lng
                    );
                    ScanUpload {
                        file_name,
                        bytes,
                        latitude: point.lat,
                        longitude: point.lng,
                    }
                })
                .collect()
        };

        info!("[ScanMonitor] Uploading {} images", uploads.len());
        futures::future::try_join_all(uploads.into_iter().map(|u| backend.submit_scan(u))).await
    }

    /// Poll until any zone status differs from `before` or the timeout elapses.
    pub async fn poll_for_status_change<B: ZoneBackend + ?Sized>(
        &self,
        backend: &B,
        before: &[Zone],
    ) -> PollOutcome {
        let initial = statuses(before);
        let deadline = Instant::now() + self.timeout;
        let mut attempt = 0u32;

        loop {
            tokio::time::sleep(self.interval).await;
            if Instant::now() > deadline {
                break;
            }
            attempt += 1;

            let polled =
                futures::try_join!(backend.fetch_zones(), backend.fetch_scan_results());
            let (wire_zones, results) = match polled {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("[ScanMonitor] Poll {} failed: {}", attempt, e);
                    continue;
                }
            };
            let zones = match zones_from_wire(wire_zones) {
                Ok(zones) => zones,
                Err(e) => {
                    warn!("[ScanMonitor] Poll {} returned bad zones: {}", attempt, e);
                    continue;
                }
            };

            if statuses(&zones) != initial {
                info!(
                    "[ScanMonitor] Zone statuses changed after {} polls ({} results)",
                    attempt,
                    results.len()
                );
                return PollOutcome::Updated { zones, results };
            }
            debug!("[ScanMonitor] Poll {}: no status change", attempt);
        }

        info!(
            "[ScanMonitor] No zone status change within {:?}",
            self.timeout
        );
        PollOutcome::TimedOut
    }
}
