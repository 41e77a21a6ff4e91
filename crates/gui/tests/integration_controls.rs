//! Integration tests for first-person movement through the headless harness.

use stockwalk_lib::chart::DataSource;
use stockwalk_lib::controls::MovementParams;
use stockwalk_lib::fixtures::SAMPLE_CSV;
use stockwalk_lib::harness::TestHarness;
use stockwalk_lib::host::{KeyCode, SceneHost};

const FRAME: f32 = 1.0 / 60.0;

fn landed() -> TestHarness {
    let mut h = TestHarness::new();
    h.lock();
    // fall from the initial eye height of 50
    h.tick_n(120, FRAME);
    assert_eq!(h.position().y, 10.0);
    h
}

#[test]
fn test_waiting_until_camera_exists() {
    let mut h = TestHarness::unbound(DataSource::Inline(SAMPLE_CSV.into()));

    assert!(!h.bind(false));
    assert!(!h.bind(false));
    assert_eq!(
        h.diagnostics()
            .count_matching("Camera not initialized. PlayerControls waiting..."),
        1
    );

    assert!(h.bind(true));
    assert_eq!(h.diagnostics().count_matching("Player controls initialized."), 1);
}

#[test]
fn test_no_motion_while_unlocked() {
    let mut h = TestHarness::new();
    let start = h.position();

    h.press(KeyCode::KeyW);
    h.move_pointer(50.0, 20.0);
    h.tick_n(30, FRAME);

    assert_eq!(h.position(), start);
    assert_eq!(h.camera.yaw, 0.0);
    assert_eq!(h.camera.pitch, 0.0);
}

#[test]
fn test_falls_to_floor_and_can_jump() {
    let mut h = landed();
    assert!(h.state().can_jump);

    h.press(KeyCode::Space);
    assert!(!h.state().can_jump);
    assert_eq!(h.state().velocity.y, 350.0);

    h.tick(FRAME);
    assert!(h.position().y > 10.0);

    // a second press mid-air does nothing
    h.release(KeyCode::Space);
    h.press(KeyCode::Space);
    assert!(h.state().velocity.y < 350.0);

    h.tick_n(240, FRAME);
    assert_eq!(h.position().y, 10.0);
    assert!(h.state().can_jump);
}

#[test]
fn test_walk_forward_and_strafe() {
    let mut h = landed();
    let start = h.position();

    h.press(KeyCode::KeyW);
    h.tick_n(30, FRAME);
    let after_forward = h.position();
    assert!(after_forward.z < start.z);
    assert!((after_forward.x - start.x).abs() < 1e-3);

    h.release(KeyCode::KeyW);
    h.press(KeyCode::ArrowRight);
    h.tick_n(30, FRAME);
    assert!(h.position().x > after_forward.x);
}

#[test]
fn test_velocity_decays_after_release() {
    let mut h = landed();
    h.press(KeyCode::KeyS);
    h.tick_n(30, FRAME);
    let moving = h.state().velocity.z.abs();
    assert!(moving > 0.0);

    h.release(KeyCode::KeyS);
    h.tick_n(60, FRAME);
    assert!(h.state().velocity.z.abs() < moving * 0.01);
}

#[test]
fn test_long_frame_is_clamped() {
    let mut h = TestHarness::new();
    h.lock();

    // one 5 s frame integrates as 0.1 s: 50 - 980 * 0.1 * 0.1
    h.tick(5.0);
    assert!((h.position().y - 40.2).abs() < 1e-3);
}

#[test]
fn test_pointer_look_only_while_locked() {
    let mut h = TestHarness::new();
    h.lock();
    h.move_pointer(100.0, 0.0);
    assert!((h.camera.yaw + 0.2).abs() < 1e-6);

    h.unlock();
    h.move_pointer(100.0, 0.0);
    assert!((h.camera.yaw + 0.2).abs() < 1e-6);
}

#[test]
fn test_custom_params() {
    let mut h = TestHarness::new();
    h.set_params(MovementParams {
        floor_height: 30.0,
        ..MovementParams::default()
    });
    h.lock();
    h.tick_n(120, FRAME);
    assert_eq!(h.position().y, 30.0);
}

#[test]
fn test_teardown_stops_updates() {
    let mut h = TestHarness::new();
    assert_eq!(h.scene.input().subscriber_count(), 1);
    assert_eq!(h.scene.frames().subscriber_count(), 1);

    h.lock();
    h.teardown();
    assert!(!h.controller().is_bound());
    assert_eq!(h.scene.input().subscriber_count(), 0);
    assert_eq!(h.scene.frames().subscriber_count(), 0);

    let start = h.position();
    h.tick_n(10, FRAME);
    assert_eq!(h.position(), start);
}
