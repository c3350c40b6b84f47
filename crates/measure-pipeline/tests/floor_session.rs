//! Session-level tests against a synthetic floor.
//!
//! The camera sits 0.5 m above a horizontal floor; taps below the horizon
//! resolve to floor points, so horizontal grids between them should recover
//! the floor height.

use measure_core::{synthetic, PinholeIntrinsics, Pt2, ViewSize};
use measure_pipeline::{MeasureConfig, MeasureSession, MeasurementReport, TapResult};

const CAMERA_HEIGHT: f64 = 0.5;

fn floor_session(config: MeasureConfig) -> MeasureSession {
    let frame = synthetic::floor(320, 240, &config.intrinsics, CAMERA_HEIGHT).unwrap();
    let mut session = MeasureSession::new(config).unwrap();
    session.set_frame(frame);
    session
}

fn measure(session: &mut MeasureSession, a: Pt2, b: Pt2) -> MeasurementReport {
    session.tap_view(a).unwrap();
    match session.tap_view(b).unwrap() {
        TapResult::Measured(report) => *report,
        other => panic!("expected a measurement, got {other:?}"),
    }
}

#[test]
fn floor_points_and_grid_lie_on_the_floor() {
    let mut session = floor_session(MeasureConfig::default());
    let report = measure(&mut session, Pt2::new(120.0, 185.0), Pt2::new(200.0, 185.0));

    for p in [report.start.position, report.end.position] {
        assert!((p.y - CAMERA_HEIGHT).abs() < 2e-3, "p={p}");
    }

    let grid = report.grid.expect("grid enabled by default");
    assert_eq!(grid.cells.len(), 100);
    let sampled: Vec<_> = grid.cells.iter().filter(|c| c.depth.is_some()).collect();
    assert!(!sampled.is_empty());
    for cell in sampled {
        assert!((cell.position.y - CAMERA_HEIGHT).abs() < 1e-2, "{cell:?}");
    }
}

#[test]
fn screen_grid_covers_taps_below_the_horizon() {
    let mut session = floor_session(MeasureConfig::default());
    let report = measure(&mut session, Pt2::new(40.0, 150.0), Pt2::new(280.0, 230.0));

    let screen = report.screen_grid.expect("depth pair has a screen grid");
    assert_eq!(screen.len(), 100);
    assert!(screen.iter().all(|c| (0.0..=1.0).contains(&c.hue)));
}

#[test]
fn screen_grid_skips_cells_without_depth() {
    let config = MeasureConfig::default();
    let floor = synthetic::floor(320, 240, &config.intrinsics, CAMERA_HEIGHT).unwrap();
    let mut session = MeasureSession::new(config).unwrap();
    // Cell (0, 1) of a grid from (150, 130) to (170, 230) sits at (150, 140).
    session.set_frame(synthetic::with_hole(floor, 150, 140));

    // Above the horizon there is no floor to hit.
    session.tap_view(Pt2::new(150.0, 100.0)).unwrap_err();
    assert!(session.pair().is_empty());

    let report = measure(&mut session, Pt2::new(150.0, 130.0), Pt2::new(170.0, 230.0));
    let screen = report.screen_grid.unwrap();
    assert_eq!(screen.len(), 99);
    assert!(screen.iter().all(|c| c.view != Pt2::new(150.0, 140.0)));
}

#[test]
fn point_cloud_is_generated_when_enabled() {
    let mut config = MeasureConfig::default();
    config.point_cloud.enabled = true;
    config.point_cloud.spacing = 0.01;
    let mut session = floor_session(config);
    let report = measure(&mut session, Pt2::new(150.0, 200.0), Pt2::new(170.0, 200.0));

    let cloud = report.point_cloud.expect("cloud enabled");
    let n = (report.distance / 0.01).trunc() as usize + 1;
    assert_eq!(cloud.per_side, n);
    assert_eq!(cloud.points.len(), n * n);
}

#[test]
fn scaled_view_truncates_into_texture() {
    let config = MeasureConfig {
        view: ViewSize::new(640.0, 480.0),
        intrinsics: PinholeIntrinsics::default(),
        ..MeasureConfig::default()
    };
    let mut session = floor_session(config);
    // (321, 401) -> texture (160.5, 200.5) -> (160, 200)
    let report = measure(&mut session, Pt2::new(321.0, 401.0), Pt2::new(341.0, 401.0));
    let expected = measure_core::resolve_pixel(
        session.frame().unwrap(),
        &PinholeIntrinsics::default(),
        160,
        200,
    )
    .unwrap();
    assert_eq!(report.start.position, expected.point);
}

#[test]
fn report_serializes_to_json() {
    let mut session = floor_session(MeasureConfig::default());
    let report = measure(&mut session, Pt2::new(120.0, 200.0), Pt2::new(200.0, 200.0));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"source\":\"depth\""));
    assert!(!json.contains("point_cloud"));
    let back: MeasurementReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.distance, report.distance);
    assert_eq!(back.label, report.label);
}
