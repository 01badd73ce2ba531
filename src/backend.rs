//! Backend operations the sync engine and scan monitor consume.
//!
//! [`crate::HttpBackend`] is the production implementation; tests drive the
//! engine with in-memory fakes.

use crate::wire::{MapZone, ScanJob, ScanResult, UserProfile, WireZone};
use crate::Result;

/// One image queued for scan processing, tagged with where it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub latitude: f64,
    pub longitude: f64,
}

/// The zones API as seen by the client.
///
/// Every call carries the caller's credentials; an implementation without
/// them fails with [`crate::ZoneError::Unauthenticated`].
#[async_trait::async_trait]
pub trait ZoneBackend: Send + Sync {
    /// Current user, with the campus embedded.
    async fn fetch_profile(&self) -> Result<UserProfile>;

    /// All zones of the authenticated user's campus.
    async fn fetch_zones(&self) -> Result<Vec<MapZone>>;

    /// Replace the campus's zones with exactly this set.
    async fn replace_zones(&self, campus_id: &str, zones: &[WireZone]) -> Result<()>;

    /// Store a new boundary padding; returns the value the server applied.
    async fn update_padding(&self, meters: u32) -> Result<u32>;

    async fn submit_scan(&self, upload: ScanUpload) -> Result<ScanJob>;

    async fn fetch_scan_results(&self) -> Result<Vec<ScanResult>>;
}
