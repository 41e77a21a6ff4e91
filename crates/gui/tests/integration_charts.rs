//! Integration tests for the chart pipelines.
//!
//! Tests end-to-end: CSV text -> records -> chart group -> headless scene.

use std::path::PathBuf;

use stockwalk_lib::chart::{DataSource, Geometry, PartRole};
use stockwalk_lib::fixtures::*;
use stockwalk_lib::harness::TestHarness;
use stockwalk_lib::validation::validate_group;

fn bar_heights(h: &TestHarness) -> Vec<f32> {
    h.bar_group()
        .unwrap()
        .parts_with(PartRole::Bar)
        .map(|p| match p.geometry {
            Geometry::Box { height, .. } => height,
            _ => panic!("bar is not a box"),
        })
        .collect()
}

#[tokio::test]
async fn test_sample_dataset_end_to_end() {
    let mut h = TestHarness::new();
    h.mount_charts().await;

    assert_eq!(h.node_count(), 2);
    let diag = h.diagnostics();
    assert_eq!(diag.count_matching("Parsed 5 rows of stock data for bar graph."), 1);
    assert_eq!(diag.count_matching("Parsed 5 rows of stock data for line graph."), 1);
    assert_eq!(diag.count_matching("Bar graph initialization complete."), 1);
    assert_eq!(diag.count_matching("3D Line Graph initialization complete."), 1);

    let bar = h.bar_group().unwrap();
    assert_eq!(bar.count(PartRole::Bar), 5);
    assert_eq!(bar.count(PartRole::Label), 5);
    assert_eq!(bar.count(PartRole::Axis), 2);
    let errors = validate_group(&bar.tessellate());
    assert!(errors.is_empty(), "bar mesh errors: {:?}", errors);

    let line = h.line_group().unwrap();
    assert_eq!(line.count(PartRole::Marker), 5);
    assert_eq!(line.count(PartRole::Connector), 5);
    assert_eq!(line.count(PartRole::Polyline), 1);
    let errors = validate_group(&line.tessellate());
    assert!(errors.is_empty(), "line mesh errors: {:?}", errors);
}

#[tokio::test]
async fn test_groups_are_placed_side_by_side() {
    let mut h = TestHarness::new();
    h.mount_charts().await;

    assert_eq!(h.bar_group().unwrap().position.x, -100.0);
    assert_eq!(h.line_group().unwrap().position.x, 100.0);
}

#[tokio::test]
async fn test_gain_loss_bars() {
    let mut h = TestHarness::with_source(inline_source(&gain_loss_rows()));
    h.mount_charts().await;

    let heights = bar_heights(&h);
    assert!((heights[0] - 100.0).abs() < 1e-4);
    assert!((heights[1] - 0.1).abs() < 1e-6);

    let colors: Vec<[f32; 3]> = h
        .bar_group()
        .unwrap()
        .parts_with(PartRole::Bar)
        .map(|p| p.material.color)
        .collect();
    assert_eq!(colors, vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
}

#[tokio::test]
async fn test_malformed_row_skipped_in_bars_kept_in_line() {
    let mut h = TestHarness::with_source(inline_source(&rows_with_malformed()));
    h.mount_charts().await;

    let bar = h.bar_group().unwrap();
    assert_eq!(bar.count(PartRole::Bar), 2);
    // the skipped row keeps its slot
    let xs: Vec<f32> = bar.parts_with(PartRole::Bar).map(|p| p.position.x).collect();
    assert_eq!(xs, vec![0.0, 6.0]);

    // open is ignored by the line chart
    assert_eq!(h.line_group().unwrap().count(PartRole::Marker), 3);
    assert_eq!(
        h.diagnostics()
            .count_matching("Parsed 3 rows of stock data for bar graph."),
        1
    );
}

#[tokio::test]
async fn test_flat_series_stays_finite() {
    let mut h = TestHarness::with_source(inline_source(&flat_rows(4, 50.0)));
    h.mount_charts().await;

    for height in bar_heights(&h) {
        assert!((height - 0.1).abs() < 1e-6);
    }
    for marker in h.line_group().unwrap().parts_with(PartRole::Marker) {
        assert!(marker.position.is_finite());
        assert_eq!(marker.position.y, 0.0);
    }
}

#[tokio::test]
async fn test_header_only_dataset_builds_axes() {
    let mut h = TestHarness::with_source(DataSource::Inline("date,open,close\n".into()));
    h.mount_charts().await;

    let bar = h.bar_group().unwrap();
    assert_eq!(bar.count(PartRole::Bar), 0);
    assert_eq!(bar.count(PartRole::Axis), 2);
    let line = h.line_group().unwrap();
    assert_eq!(line.count(PartRole::Marker), 0);
    assert_eq!(line.count(PartRole::Polyline), 0);
}

#[tokio::test]
async fn test_missing_file_reports_error_and_attaches_nothing() {
    let path = PathBuf::from("definitely/not/here/prices.csv");
    let mut h = TestHarness::with_source(DataSource::Path(path));
    h.mount_charts().await;

    assert_eq!(h.node_count(), 0);
    let diag = h.diagnostics();
    assert_eq!(diag.count_matching("Error during bar graph initialization"), 1);
    assert_eq!(diag.count_matching("Error during line graph initialization"), 1);
    assert_eq!(diag.count_matching("initialization complete"), 0);
}

#[tokio::test]
async fn test_missing_column_reports_error() {
    let mut h = TestHarness::with_source(DataSource::Inline("date,open\nd1,10\n".into()));
    h.mount_charts().await;

    assert_eq!(h.node_count(), 0);
    assert_eq!(h.diagnostics().count_matching("missing required column `close`"), 2);
}

#[tokio::test]
async fn test_mount_unmount_twice_leaks_nothing() {
    let mut h = TestHarness::new();

    for _ in 0..2 {
        h.mount_charts().await;
        assert_eq!(h.node_count(), 2);
        let live = h.live_resources();
        assert!(live > 0);

        assert_eq!(h.unmount_charts(), live);
        assert_eq!(h.node_count(), 0);
        assert_eq!(h.live_resources(), 0);
    }

    // already released
    assert_eq!(h.unmount_charts(), 0);
}

#[tokio::test]
async fn test_remount_replaces_group() {
    let mut h = TestHarness::new();
    h.mount_charts().await;
    let first = h.bar().node().unwrap();

    h.mount_charts().await;
    let second = h.bar().node().unwrap();

    assert_ne!(first, second);
    assert_eq!(h.node_count(), 2);
}

#[tokio::test]
async fn test_unmount_before_build_lands_discards_it() {
    let mut h = TestHarness::new();

    h.start_charts();
    assert_eq!(h.bar().pending(), 1);
    assert_eq!(h.line().pending(), 1);
    assert_eq!(h.unmount_charts(), 0);

    h.settle_charts().await;

    assert_eq!(h.bar().pending(), 0);
    assert!(h.bar().node().is_none());
    assert!(h.line().node().is_none());
    assert_eq!(h.node_count(), 0);
    assert_eq!(h.diagnostics().count_matching("initialization complete"), 0);
}

#[tokio::test]
async fn test_file_source_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("stockwalk-{}.csv", uuid::Uuid::new_v4()));
    std::fs::write(&path, SAMPLE_CSV).unwrap();

    let mut h = TestHarness::with_source(DataSource::parse(path.to_str().unwrap()));
    h.mount_charts().await;
    std::fs::remove_file(&path).ok();

    assert_eq!(h.node_count(), 2);
    assert_eq!(h.bar_group().unwrap().count(PartRole::Bar), 5);
}
