//! Integration tests for TestHarness and the pieces it wires together.

use stockwalk_lib::chart::{Geometry, PartRole};
use stockwalk_lib::harness::TestHarness;
use stockwalk_lib::host::{InputEvent, SceneHost};
use stockwalk_lib::state::AppSettings;
use stockwalk_lib::validation::MeshValidator;

#[test]
fn test_harness_starts_bound_and_idle() {
    let h = TestHarness::new();
    assert!(h.controller().is_bound());
    assert!(!h.controller().is_locked());
    assert_eq!(h.node_count(), 0);
    assert_eq!(h.position().y, 50.0);
}

#[test]
fn test_lock_round_trip_through_scene() {
    let mut h = TestHarness::new();
    h.lock();
    assert!(h.scene.is_captured());
    assert!(h.controller().is_locked());

    h.unlock();
    assert!(!h.scene.is_captured());
    assert!(!h.controller().is_locked());
}

#[test]
fn test_repeated_capture_requests_publish_once() {
    let mut h = TestHarness::new();
    let events = h.scene.input().subscribe();

    h.scene.request_pointer_capture();
    h.scene.request_pointer_capture();

    assert_eq!(events.drain(), vec![InputEvent::PointerLockChanged(true)]);
}

#[tokio::test]
async fn test_bar_meshes_validate() {
    let mut h = TestHarness::new();
    h.mount_charts().await;

    let meshes = h.bar_group().unwrap().tessellate();
    let lit = MeshValidator::new(&meshes.lit);
    let errors = lit.validate_all();
    assert!(errors.is_empty(), "Validation errors: {:?}", errors);
    // 5 bars, 12 triangles each
    assert_eq!(lit.triangle_count(), 60);
    assert!(lit.has_color([0.0, 1.0, 0.0]));
    assert!(lit.has_color([1.0, 0.0, 0.0]));

    assert_eq!(meshes.labels.len(), 5);
    for label in &meshes.labels {
        assert!(label.texture.coverage() > 0);
    }
}

#[tokio::test]
async fn test_tallest_bar_spans_full_range() {
    let mut h = TestHarness::new();
    h.mount_charts().await;

    let tallest = h
        .bar_group()
        .unwrap()
        .parts_with(PartRole::Bar)
        .filter_map(|p| match p.geometry {
            Geometry::Box { height, .. } => Some(height),
            _ => None,
        })
        .fold(0.0_f32, f32::max);
    assert!((tallest - 100.0).abs() < 1e-3);
}

#[test]
fn test_settings_file_round_trip() {
    let path = std::env::temp_dir().join(format!("stockwalk-settings-{}.json", uuid::Uuid::new_v4()));
    let mut settings = AppSettings::default();
    settings.data.source = "https://example.com/prices.csv".into();
    settings.movement.jump_impulse = 500.0;

    settings.save_to(&path).unwrap();
    let loaded = AppSettings::load_from(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, settings);
}
