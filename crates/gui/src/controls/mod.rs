//! First-person movement controller.
//!
//! Subscribes to the host's input surface and frame scheduler, latches key
//! state, turns pointer motion into look rotation and integrates walking
//! physics once per frame tick.

pub mod physics;

pub use physics::{integrate, Direction, MovementParams, PlayerState};

use std::time::Instant;

use crate::diagnostics::Diagnostics;
use crate::host::{FrameScheduler, FrameTick, InputEvent, InputSurface, KeyCode, Subscription};
use crate::viewport::camera::{CameraRig, FirstPersonCamera, LOOK_SENSITIVITY};

/// Called with the new lock state whenever pointer capture changes
pub type LockListener = Box<dyn FnMut(bool)>;

pub struct MovementController {
    params: MovementParams,
    state: PlayerState,
    diagnostics: Diagnostics,
    on_lock: Option<LockListener>,
    input: Option<Subscription<InputEvent>>,
    frames: Option<Subscription<FrameTick>>,
    prev_time: Option<Instant>,
    waiting_reported: bool,
}

impl MovementController {
    pub fn new(params: MovementParams, diagnostics: Diagnostics) -> Self {
        Self {
            params,
            state: PlayerState::default(),
            diagnostics,
            on_lock: None,
            input: None,
            frames: None,
            prev_time: None,
            waiting_reported: false,
        }
    }

    pub fn with_lock_listener(mut self, listener: impl FnMut(bool) + 'static) -> Self {
        self.on_lock = Some(Box::new(listener));
        self
    }

    /// Subscribe to input and frames once a camera exists. Without one the
    /// controller stays idle and reports that it is waiting (once); call
    /// again on a later frame.
    pub fn try_bind(
        &mut self,
        camera: Option<&FirstPersonCamera>,
        input: &InputSurface,
        frames: &FrameScheduler,
    ) -> bool {
        if self.is_bound() {
            return true;
        }
        if camera.is_none() {
            if !self.waiting_reported {
                self.diagnostics
                    .report("Camera not initialized. PlayerControls waiting...");
                self.waiting_reported = true;
            }
            return false;
        }

        self.input = Some(input.subscribe());
        self.frames = Some(frames.subscribe());
        self.prev_time = None;
        self.diagnostics.report("Player controls initialized.");
        true
    }

    pub fn is_bound(&self) -> bool {
        self.input.is_some() && self.frames.is_some()
    }

    /// Drain queued input, then queued frame ticks
    pub fn update(&mut self, rig: &mut dyn CameraRig) {
        let events = self.input.as_ref().map(Subscription::drain).unwrap_or_default();
        for event in events {
            self.handle_event(event, rig);
        }
        let ticks = self.frames.as_ref().map(Subscription::drain).unwrap_or_default();
        for tick in ticks {
            self.on_frame(tick.now, rig);
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, rig: &mut dyn CameraRig) {
        match event {
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp(key) => self.key_up(key),
            InputEvent::PointerMotion { dx, dy } => {
                if self.state.look_locked {
                    let k = LOOK_SENSITIVITY * self.params.pointer_speed;
                    rig.look(-dx * k, -dy * k);
                }
            }
            InputEvent::PointerLockChanged(locked) => {
                if self.state.look_locked != locked {
                    tracing::debug!(locked, "pointer lock changed");
                }
                self.state.look_locked = locked;
                if let Some(listener) = self.on_lock.as_mut() {
                    listener(locked);
                }
            }
        }
    }

    pub fn key_down(&mut self, key: KeyCode) {
        if let Some(direction) = direction_for(key) {
            self.state.set_latch(direction, true);
        } else if key == KeyCode::Space {
            self.state.jump(self.params.jump_impulse);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        if let Some(direction) = direction_for(key) {
            self.state.set_latch(direction, false);
        }
    }

    /// Integrate one frame. The clock advances on every tick, so a long
    /// unlocked pause does not turn into one huge step.
    pub fn on_frame(&mut self, now: Instant, rig: &mut dyn CameraRig) {
        let dt = self
            .prev_time
            .map_or(0.0, |prev| now.saturating_duration_since(prev).as_secs_f32());
        self.prev_time = Some(now);
        integrate(&mut self.state, rig, &self.params, dt);
    }

    /// Drop the input and frame subscriptions
    pub fn teardown(&mut self) {
        let was_bound = self.is_bound();
        self.input = None;
        self.frames = None;
        self.prev_time = None;
        if was_bound {
            tracing::debug!("player controls torn down");
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.look_locked
    }

    pub fn params(&self) -> &MovementParams {
        &self.params
    }

    pub fn set_params(&mut self, params: MovementParams) {
        self.params = params;
    }
}

fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::ArrowUp | KeyCode::KeyW => Some(Direction::Forward),
        KeyCode::ArrowDown | KeyCode::KeyS => Some(Direction::Backward),
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(Direction::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;

    fn camera() -> FirstPersonCamera {
        FirstPersonCamera::new(Vec3::new(0.0, 50.0, 100.0), 75.0, 0.1, 1000.0)
    }

    #[test]
    fn test_waiting_is_reported_once() {
        let diag = Diagnostics::new();
        let input = InputSurface::new();
        let frames = FrameScheduler::new();
        let mut c = MovementController::new(MovementParams::default(), diag.clone());

        assert!(!c.try_bind(None, &input, &frames));
        assert!(!c.try_bind(None, &input, &frames));
        assert_eq!(diag.count_matching("PlayerControls waiting"), 1);

        let cam = camera();
        assert!(c.try_bind(Some(&cam), &input, &frames));
        assert!(c.try_bind(Some(&cam), &input, &frames));
        assert_eq!(diag.count_matching("Player controls initialized."), 1);
        assert_eq!(input.subscriber_count(), 1);
        assert_eq!(frames.subscriber_count(), 1);
    }

    #[test]
    fn test_latches_are_idempotent() {
        let mut c = MovementController::new(MovementParams::default(), Diagnostics::new());
        c.key_down(KeyCode::KeyW);
        c.key_down(KeyCode::ArrowUp);
        assert!(c.state().move_forward);
        c.key_up(KeyCode::ArrowUp);
        assert!(!c.state().move_forward);
        c.key_up(KeyCode::KeyW);
        assert!(!c.state().move_forward);
        c.key_down(KeyCode::KeyA);
        c.key_down(KeyCode::ArrowRight);
        assert!(c.state().move_left && c.state().move_right);
        c.key_down(KeyCode::Other);
        assert!(!c.state().move_backward);
    }

    #[test]
    fn test_space_jumps_only_when_grounded() {
        let mut c = MovementController::new(MovementParams::default(), Diagnostics::new());
        c.key_down(KeyCode::Space);
        assert_eq!(c.state().velocity.y, 0.0);
        c.state_mut().can_jump = true;
        c.key_down(KeyCode::Space);
        c.key_down(KeyCode::Space);
        assert_eq!(c.state().velocity.y, 350.0);
    }

    #[test]
    fn test_pointer_motion_only_while_locked() {
        let mut c = MovementController::new(MovementParams::default(), Diagnostics::new());
        let mut cam = camera();
        c.handle_event(InputEvent::PointerMotion { dx: 100.0, dy: 0.0 }, &mut cam);
        assert_eq!(cam.yaw, 0.0);

        c.handle_event(InputEvent::PointerLockChanged(true), &mut cam);
        c.handle_event(InputEvent::PointerMotion { dx: 100.0, dy: 0.0 }, &mut cam);
        assert!((cam.yaw + 0.2).abs() < 1e-6);
        c.handle_event(InputEvent::PointerMotion { dx: 0.0, dy: 10_000.0 }, &mut cam);
        assert!((cam.pitch + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_lock_listener_is_notified() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut c = MovementController::new(MovementParams::default(), Diagnostics::new())
            .with_lock_listener(move |locked| sink.borrow_mut().push(locked));
        let mut cam = camera();
        c.handle_event(InputEvent::PointerLockChanged(true), &mut cam);
        c.handle_event(InputEvent::PointerLockChanged(false), &mut cam);
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!c.is_locked());
    }

    #[test]
    fn test_update_drains_events_then_ticks() {
        let input = InputSurface::new();
        let frames = FrameScheduler::new();
        let mut c = MovementController::new(MovementParams::default(), Diagnostics::new());
        let mut cam = camera();
        c.try_bind(Some(&cam), &input, &frames);

        let t0 = Instant::now();
        frames.publish(FrameTick { now: t0 });
        input.publish(InputEvent::PointerLockChanged(true));
        frames.publish(FrameTick {
            now: t0 + std::time::Duration::from_millis(16),
        });
        c.update(&mut cam);

        assert!(c.is_locked());
        assert!(cam.position.y < 50.0);
    }

    #[test]
    fn test_teardown_releases_subscriptions() {
        let input = InputSurface::new();
        let frames = FrameScheduler::new();
        let mut c = MovementController::new(MovementParams::default(), Diagnostics::new());
        c.try_bind(Some(&camera()), &input, &frames);
        c.teardown();
        c.teardown();
        assert!(!c.is_bound());
        assert_eq!(input.subscriber_count(), 0);
        assert_eq!(frames.subscriber_count(), 0);
    }
}
