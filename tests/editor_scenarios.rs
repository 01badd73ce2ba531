//! End-to-end editor scenarios against an in-memory zones API.

use std::sync::Mutex;
use std::time::Duration;

use campus_zones::wire::{zones_from_wire, GeoPolygon};
use campus_zones::{
    compute_boundary, Campus, CampusEditor, DrawProgress, EditorConfig, EditorKey, LatLng,
    MapZone, MutationOutcome, Notification, PollApplyOutcome, PollConflictPolicy, Ring,
    SaveOutcome, SaveSummary, ScanJob, ScanMonitor, ScanResult, ScanUpload, UserProfile,
    WireZone, Zone, ZoneBackend, ZoneError, ZoneId, ZoneStatus,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LAT: f64 = 22.61;
const LNG: f64 = 88.38;
const STEP: f64 = 0.0002;

// ============================================================================
// Fake backend
// ============================================================================

#[derive(Default)]
struct FakeState {
    campus: Option<Campus>,
    zones: Vec<MapZone>,
    /// Zone lists served by successive `fetch_zones` calls after the first
    poll_script: Vec<Vec<MapZone>>,
    scan_results: Vec<ScanResult>,
    calls: Vec<&'static str>,
    saved: Vec<Vec<WireZone>>,
    uploads: Vec<ScanUpload>,
    fail_saves: bool,
    padding_cap: Option<u32>,
}

#[derive(Default)]
struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    fn with_zones(zones: &[Zone]) -> Self {
        Self::with_campus(campus(Some(10_000.0)), zones)
    }

    fn with_campus(campus: Campus, zones: &[Zone]) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.campus = Some(campus);
            state.zones = zones.iter().map(MapZone::from_zone).collect();
        }
        backend
    }

    fn calls(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    fn last_saved(&self) -> Option<Vec<WireZone>> {
        self.state.lock().unwrap().saved.last().cloned()
    }
}

#[async_trait::async_trait]
impl ZoneBackend for FakeBackend {
    async fn fetch_profile(&self) -> campus_zones::Result<UserProfile> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("fetch_profile");
        Ok(UserProfile {
            name: Some("Operator".to_string()),
            email: Some("ops@example.edu".to_string()),
            is_email_verified: true,
            campus: state.campus.clone(),
        })
    }

    async fn fetch_zones(&self) -> campus_zones::Result<Vec<MapZone>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("fetch_zones");
        if !state.poll_script.is_empty() && state.calls.iter().filter(|c| **c == "fetch_zones").count() > 1 {
            let next = state.poll_script.remove(0);
            state.zones = next;
        }
        Ok(state.zones.clone())
    }

    async fn replace_zones(&self, _campus_id: &str, zones: &[WireZone]) -> campus_zones::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("replace_zones");
        if state.fail_saves {
            return Err(ZoneError::http(Some(500), "database unavailable"));
        }
        state.saved.push(zones.to_vec());
        Ok(())
    }

    async fn update_padding(&self, meters: u32) -> campus_zones::Result<u32> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("update_padding");
        Ok(state.padding_cap.map_or(meters, |cap| meters.min(cap)))
    }

    async fn submit_scan(&self, upload: ScanUpload) -> campus_zones::Result<ScanJob> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("submit_scan");
        state.uploads.push(upload);
        Ok(ScanJob {
            job_id: Some(format!("job-{}", state.uploads.len())),
            status: Some("queued".to_string()),
            message: None,
        })
    }

    async fn fetch_scan_results(&self) -> campus_zones::Result<Vec<ScanResult>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("fetch_scan_results");
        Ok(state.scan_results.clone())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn campus(area: Option<f64>) -> Campus {
    Campus {
        public_id: "campus-1".to_string(),
        name: "Main Campus".to_string(),
        city: Some("Kolkata".to_string()),
        state: Some("West Bengal".to_string()),
        center_latitude: LAT,
        center_longitude: LNG,
        campus_area_sq_meters: area,
        boundary_padding_meters: Some(100),
    }
}

fn square(lat: f64, lng: f64, size: f64) -> Ring {
    Ring::from_points(vec![
        LatLng::new(lat, lng),
        LatLng::new(lat, lng + size),
        LatLng::new(lat + size, lng + size),
        LatLng::new(lat + size, lng),
    ])
    .unwrap()
}

fn zone(id: &str, name: &str, lat: f64, lng: f64) -> Zone {
    Zone::new(name, square(lat, lng, STEP)).with_id(ZoneId::from(id))
}

fn abc() -> Vec<Zone> {
    vec![
        zone("a", "Zone A", LAT, LNG),
        zone("b", "Zone B", LAT - 2.0 * STEP, LNG),
        zone("c", "Zone C", LAT, LNG - 2.0 * STEP),
    ]
}

async fn loaded(backend: FakeBackend) -> CampusEditor<FakeBackend> {
    loaded_with(backend, EditorConfig::default()).await
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn loaded_with(backend: FakeBackend, config: EditorConfig) -> CampusEditor<FakeBackend> {
    init_logging();
    let mut editor = CampusEditor::new(backend, config, LatLng::new(LAT, LNG)).unwrap();
    editor.load().await.unwrap();
    editor
}

fn assert_all_inside(editor: &CampusEditor<FakeBackend>) {
    let boundary = editor.boundary().unwrap();
    for z in editor.zones() {
        assert!(boundary.contains_ring(&z.coords), "{} escaped the boundary", z.id);
    }
}

// ============================================================================
// Load
// ============================================================================

#[tokio::test]
async fn test_load_sets_store_and_baseline() {
    let editor = loaded(FakeBackend::with_zones(&abc())).await;

    assert_eq!(editor.zones().len(), 3);
    assert_eq!(editor.sync().baseline().zones(), editor.zones());
    assert!(!editor.has_unsaved_changes());
    assert!(editor.mode().is_view());
    assert_eq!(editor.session().layers().len(), 3);
    assert!(editor.session().boundary().is_some());
    assert_eq!(editor.campus().unwrap().public_id, "campus-1");
    assert_eq!(editor.sync().backend().calls("fetch_profile"), 1);
}

#[tokio::test]
async fn test_load_fails_fast_on_missing_geometry() {
    let backend = FakeBackend::with_zones(&abc());
    backend.state.lock().unwrap().zones[1].geo_boundary = None;

    let mut editor = CampusEditor::new(backend, EditorConfig::default(), LatLng::new(LAT, LNG)).unwrap();
    let err = editor.load().await.unwrap_err();
    assert!(matches!(err, ZoneError::MalformedResponse(_)));
    assert!(editor.zones().is_empty());
}

#[tokio::test]
async fn test_campus_without_area_cannot_be_edited() {
    let backend = FakeBackend::with_campus(campus(None), &abc());
    let mut editor = loaded(backend).await;

    assert!(editor.boundary().is_none());
    assert!(matches!(
        editor.enter_vertex_edit(),
        Err(ZoneError::BoundaryUnavailable(_))
    ));
    assert!(editor.toggle_move().is_err());
    assert!(editor.mode().is_view());
}

// ============================================================================
// Save and reset
// ============================================================================

#[tokio::test]
async fn test_noop_save_makes_no_network_call() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;

    assert_eq!(editor.save().await.unwrap(), SaveOutcome::NoChanges);
    assert_eq!(editor.sync().backend().calls("replace_zones"), 0);
    let notes = editor.drain_notifications();
    assert_eq!(notes, vec![Notification::NoChanges]);
    assert_eq!(notes[0].to_string(), "No changes detected");
}

#[tokio::test]
async fn test_save_reports_created_modified_deleted() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    let (a, c) = (ZoneId::from("a"), ZoneId::from("c"));

    // A': move
    editor.enter_move().unwrap();
    editor.drag_zone(&a, STEP / 2.0, 0.0).unwrap();
    assert!(matches!(editor.finish_move(&a).unwrap(), MutationOutcome::Committed(_)));

    // C: remove
    editor.enter_vertex_edit().unwrap();
    editor.enable_removal().unwrap();
    editor.remove_zone(&c).unwrap();
    editor.disable_removal();

    // D: draw
    editor.start_drawing().unwrap();
    let base = LatLng::new(LAT + 2.0 * STEP, LNG + 2.0 * STEP);
    for p in [base, base.offset(0.0, STEP), base.offset(STEP, STEP)] {
        editor.place_draw_vertex(p).unwrap();
    }
    let DrawProgress::Created(d) = editor.place_draw_vertex(base).unwrap() else {
        panic!("drawing did not complete");
    };
    editor.drain_notifications();

    let outcome = editor.save().await.unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Saved(SaveSummary {
            created: 1,
            modified: 1,
            deleted: 1,
            renamed: 0,
        })
    );
    assert_eq!(
        editor.drain_notifications()[0].to_string(),
        "1 new zone created. 1 zone updated. 1 zone deleted."
    );

    // Full set submitted, closed and in (lon, lat) order
    let payload = editor.sync().backend().last_saved().unwrap();
    let ids: Vec<&str> = payload.iter().map(|w| w.public_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", d.as_str()]);
    let outer = &payload[1].geo_boundary.coordinates[0];
    assert_eq!(outer.len(), 5);
    assert_eq!(outer.first(), outer.last());
    assert_eq!(outer[0], [LNG, LAT - 2.0 * STEP]);
    assert!(payload.iter().all(|w| w.campus_id == "campus-1"));

    // Baseline adopted: a second save is a no-op
    assert!(!editor.has_unsaved_changes());
    assert_eq!(editor.save().await.unwrap(), SaveOutcome::NoChanges);
    assert_eq!(editor.sync().backend().calls("replace_zones"), 1);
}

#[tokio::test]
async fn test_failed_save_keeps_state_for_retry() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    editor.rename_zone(&ZoneId::from("b"), "Library").unwrap();
    editor.sync().backend().state.lock().unwrap().fail_saves = true;

    let err = editor.save().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(editor.has_unsaved_changes());
    assert_eq!(editor.sync().baseline().zones()[1].name, "Zone B");
    assert_eq!(
        editor.drain_notifications(),
        vec![Notification::SaveFailed(err.to_string())]
    );

    editor.sync().backend().state.lock().unwrap().fail_saves = false;
    let outcome = editor.save().await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved(s) if s.renamed == 1));
    assert_eq!(editor.sync().baseline().zones()[1].name, "Library");
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    let a = ZoneId::from("a");

    editor.enter_vertex_edit().unwrap();
    editor.drag_vertex(&a, 0, LatLng::new(LAT - STEP / 2.0, LNG)).unwrap();
    editor.finish_vertex_edit(&a).unwrap();
    editor.enable_removal().unwrap();
    editor.remove_zone(&ZoneId::from("b")).unwrap();
    assert!(editor.has_unsaved_changes());

    editor.reset().unwrap();
    let once: Vec<Zone> = editor.zones().to_vec();
    editor.reset().unwrap();

    assert_eq!(editor.zones(), &once[..]);
    assert_eq!(editor.zones(), editor.sync().baseline().zones());
    assert!(editor.mode().is_view());
    assert_eq!(editor.session().layers().len(), 3);
    assert_eq!(editor.sync().backend().calls("replace_zones"), 0);
    assert!(editor
        .drain_notifications()
        .iter()
        .any(|n| n.to_string() == "Zones reset to original state"));
}

// ============================================================================
// Containment
// ============================================================================

#[tokio::test]
async fn test_random_mutations_never_escape_boundary() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    let ids: Vec<ZoneId> = editor.zones().iter().map(|z| z.id.clone()).collect();
    let mut rng = StdRng::seed_from_u64(42);

    for round in 0..200 {
        let id = &ids[rng.random_range(0..ids.len())];
        if round % 2 == 0 {
            editor.enter_move().unwrap();
            let d_lat = rng.random_range(-0.002..0.002);
            let d_lng = rng.random_range(-0.002..0.002);
            editor.drag_zone(id, d_lat, d_lng).unwrap();
            editor.finish_move(id).unwrap();
        } else {
            editor.enter_vertex_edit().unwrap();
            let to = LatLng::new(
                LAT + rng.random_range(-0.002..0.002),
                LNG + rng.random_range(-0.002..0.002),
            );
            editor.drag_vertex(id, rng.random_range(0..4), to).unwrap();
            editor.finish_vertex_edit(id).unwrap();
        }
        assert_all_inside(&editor);
    }
}

#[tokio::test]
async fn test_move_outside_reverts_to_pre_drag_ring() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    let a = ZoneId::from("a");
    let before = editor.store().get(&a).unwrap().coords.clone();

    editor.enter_move().unwrap();
    editor.drag_zone(&a, 0.01, 0.0).unwrap();
    let outcome = editor.finish_move(&a).unwrap();

    assert!(matches!(outcome, MutationOutcome::Reverted(_)));
    assert_eq!(editor.store().get(&a).unwrap().coords, before);
    assert_eq!(editor.session().live_ring(&a).unwrap(), before.points());
    assert_eq!(
        editor.drain_notifications()[0].to_string(),
        "Zone must stay within campus boundary"
    );
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_escape_always_returns_to_view() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    editor.enter_vertex_edit().unwrap();
    editor.start_drawing().unwrap();
    editor.place_draw_vertex(LatLng::new(LAT, LNG)).unwrap();

    assert!(editor.handle_key(EditorKey::Escape));
    assert!(editor.mode().is_view());
    assert!(editor.controller().draft().is_empty());

    editor.enter_move().unwrap();
    editor.handle_key(EditorKey::Escape);
    assert!(editor.mode().is_view());
}

// ============================================================================
// Boundary and padding
// ============================================================================

#[test]
fn test_kolkata_boundary() {
    let ring = compute_boundary(22.61, 88.38, 10_000.0, 100.0);
    let points = ring.ring();
    assert_eq!(points.len(), 5);
    assert_eq!(points[0], points[4]);

    // 200 m north-south
    let lat_span = points[0].lat - points[2].lat;
    assert!((lat_span * 111_132.0 - 200.0).abs() < 1e-6);
    assert_eq!(ring, compute_boundary(22.61, 88.38, 10_000.0, 100.0));
}

#[tokio::test]
async fn test_padding_adopts_server_value() {
    let backend = FakeBackend::with_zones(&abc());
    backend.state.lock().unwrap().padding_cap = Some(250);
    let mut editor = loaded(backend).await;

    assert_eq!(editor.set_pending_padding(1_000), 300);
    assert!(editor.boundary_engine().has_pending_padding());

    let applied = editor.save_padding().await.unwrap();
    assert_eq!(applied, 250);
    assert_eq!(editor.boundary_engine().saved_padding(), 250);
    assert!(!editor.boundary_engine().has_pending_padding());
    assert_eq!(editor.campus().unwrap().boundary_padding_meters, Some(250));
    assert_eq!(
        editor.boundary(),
        Some(&compute_boundary(LAT, LNG, 10_000.0, 250.0))
    );
    assert_eq!(
        editor.drain_notifications(),
        vec![Notification::PaddingUpdated(250)]
    );
}

#[tokio::test]
async fn test_shrinking_padding_reports_stranded_zones() {
    let far = zone("far", "Far", LAT + 0.0006, LNG);
    let mut editor = loaded(FakeBackend::with_zones(&[far])).await;
    assert!(editor.zones_outside_boundary().is_empty());

    editor.set_pending_padding(50);
    assert_eq!(editor.zones_outside_boundary(), vec![ZoneId::from("far")]);
}

// ============================================================================
// Server refresh
// ============================================================================

fn with_status(zones: &[Zone], status: ZoneStatus) -> Vec<Zone> {
    zones
        .iter()
        .cloned()
        .map(|z| z.with_status(status.clone()))
        .collect()
}

#[tokio::test]
async fn test_refresh_deferred_while_dirty() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    editor.rename_zone(&ZoneId::from("a"), "Canteen").unwrap();

    let outcome = editor
        .apply_polled_zones(with_status(&abc(), ZoneStatus::Red))
        .unwrap();
    assert_eq!(outcome, PollApplyOutcome::Deferred);
    assert_eq!(editor.zones()[0].name, "Canteen");
    assert_eq!(editor.drain_notifications(), vec![Notification::RefreshDeferred]);
}

#[tokio::test]
async fn test_deferred_refresh_applied_after_reset() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    editor.rename_zone(&ZoneId::from("a"), "Canteen").unwrap();
    let outcome = editor
        .apply_polled_zones(with_status(&abc(), ZoneStatus::Red))
        .unwrap();
    assert_eq!(outcome, PollApplyOutcome::Deferred);
    assert!(editor.has_deferred_refresh());
    editor.drain_notifications();

    editor.reset().unwrap();

    assert!(!editor.has_deferred_refresh());
    assert_eq!(editor.zones()[0].name, "Zone A");
    assert!(editor.zones().iter().all(|z| z.status == ZoneStatus::Red));
    assert_eq!(editor.zones(), editor.sync().baseline().zones());
    assert!(!editor.has_unsaved_changes());
    assert_eq!(
        editor.drain_notifications(),
        vec![Notification::ZonesReset, Notification::RefreshApplied]
    );
}

#[tokio::test]
async fn test_deferred_refresh_keeps_saved_edits() {
    let mut editor = loaded(FakeBackend::with_zones(&abc())).await;
    editor.rename_zone(&ZoneId::from("a"), "Canteen").unwrap();
    editor
        .apply_polled_zones(with_status(&abc(), ZoneStatus::Red))
        .unwrap();
    editor.drain_notifications();

    let outcome = editor.save().await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Saved(s) if s.renamed == 1));
    assert!(!editor.has_deferred_refresh());
    assert_eq!(editor.zones()[0].name, "Canteen");
    assert!(editor.zones().iter().all(|z| z.status == ZoneStatus::Red));
    assert!(!editor.has_unsaved_changes());
    assert!(editor
        .sync()
        .baseline()
        .zones()
        .iter()
        .all(|z| z.status == ZoneStatus::Red));
    let notes = editor.drain_notifications();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1], Notification::RefreshApplied);
    // Adopting statuses needs no extra fetch
    assert_eq!(editor.sync().backend().calls("fetch_zones"), 1);
}

#[tokio::test]
async fn test_refresh_overwrite_warns() {
    let config = EditorConfig::default().with_poll_conflict_policy(PollConflictPolicy::Overwrite);
    let mut editor = loaded_with(FakeBackend::with_zones(&abc()), config).await;
    editor.rename_zone(&ZoneId::from("a"), "Canteen").unwrap();

    let outcome = editor
        .apply_polled_zones(with_status(&abc(), ZoneStatus::Red))
        .unwrap();
    assert_eq!(outcome, PollApplyOutcome::AppliedDiscardingEdits);
    assert_eq!(editor.zones()[0].name, "Zone A");
    assert_eq!(editor.zones()[0].status, ZoneStatus::Red);
    assert!(!editor.has_unsaved_changes());
    assert_eq!(
        editor.drain_notifications(),
        vec![Notification::UnsavedEditsDiscarded]
    );
}

#[tokio::test(start_paused = true)]
async fn test_scan_cycle_applies_new_statuses() {
    let backend = FakeBackend::with_zones(&abc());
    {
        let mut state = backend.state.lock().unwrap();
        let unchanged: Vec<MapZone> = abc().iter().map(MapZone::from_zone).collect();
        let changed: Vec<MapZone> = with_status(&abc(), ZoneStatus::Yellow)
            .iter()
            .map(MapZone::from_zone)
            .collect();
        state.poll_script = vec![unchanged, changed];
    }
    let config = EditorConfig::default().with_poll_timing(10, 300);
    let mut editor = loaded_with(backend, config.clone()).await;
    let monitor = ScanMonitor::new(&config);

    let jobs = editor
        .submit_scans(
            &monitor,
            vec![("a.jpg".to_string(), vec![1, 2, 3]), ("b.jpg".to_string(), vec![4])],
        )
        .await
        .unwrap();
    assert_eq!(jobs.len(), 2);
    {
        let state = editor.sync().backend().state.lock().unwrap();
        for upload in &state.uploads {
            let p = LatLng::new(upload.latitude, upload.longitude);
            assert!(
                editor.zones().iter().any(|z| campus_zones::point_in_polygon(&p, z.coords.points())),
                "{} tagged outside every zone",
                upload.file_name
            );
        }
    }

    let (applied, _results) = editor.watch_scans(&monitor).await.unwrap().unwrap();
    assert_eq!(applied, PollApplyOutcome::Applied);
    assert!(editor.zones().iter().all(|z| z.status == ZoneStatus::Yellow));
    // Initial load plus two polls
    assert_eq!(editor.sync().backend().calls("fetch_zones"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_scan_polling_times_out() {
    let config = EditorConfig::default().with_poll_timing(10, 60);
    let mut editor = loaded_with(FakeBackend::with_zones(&abc()), config.clone()).await;
    let monitor = ScanMonitor::new(&config);

    let started = tokio::time::Instant::now();
    assert!(editor.watch_scans(&monitor).await.unwrap().is_none());
    assert!(started.elapsed() >= Duration::from_secs(60));
    assert_eq!(editor.sync().backend().calls("fetch_zones"), 1 + 6);
}

#[tokio::test(start_paused = true)]
async fn test_unsaved_drawing_is_not_a_status_change() {
    let config = EditorConfig::default().with_poll_timing(10, 30);
    let mut editor = loaded_with(FakeBackend::with_zones(&abc()), config.clone()).await;
    let monitor = ScanMonitor::new(&config);

    editor.enter_vertex_edit().unwrap();
    editor.start_drawing().unwrap();
    let base = LatLng::new(LAT + 2.0 * STEP, LNG + 2.0 * STEP);
    for p in [base, base.offset(0.0, STEP), base.offset(STEP, STEP), base] {
        editor.place_draw_vertex(p).unwrap();
    }
    assert_eq!(editor.zones().len(), 4);
    editor.drain_notifications();

    assert!(editor.watch_scans(&monitor).await.unwrap().is_none());
    assert_eq!(editor.sync().backend().calls("fetch_zones"), 1 + 3);
    assert!(editor.drain_notifications().is_empty());
    assert!(!editor.has_deferred_refresh());
    assert_eq!(editor.zones().len(), 4);
    assert!(editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_submit_requires_zones() {
    let editor = loaded(FakeBackend::with_zones(&[])).await;
    let monitor = ScanMonitor::new(editor.config());
    assert!(editor
        .submit_scans(&monitor, vec![("a.jpg".to_string(), vec![0])])
        .await
        .is_err());
}

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn test_ring_survives_wire_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    for n in 3..12 {
        let points: Vec<LatLng> = (0..n)
            .map(|_| LatLng::new(rng.random_range(-80.0..80.0), rng.random_range(-179.0..179.0)))
            .collect();
        let ring = Ring::from_points(points).unwrap();
        let back = GeoPolygon::from_ring(&ring).to_ring("z").unwrap();
        assert_eq!(back.points(), ring.points());
    }
}

#[test]
fn test_fetched_zones_convert_in_order() {
    let wire: Vec<MapZone> = abc().iter().map(MapZone::from_zone).collect();
    let zones = zones_from_wire(wire).unwrap();
    assert_eq!(zones, abc());
}
