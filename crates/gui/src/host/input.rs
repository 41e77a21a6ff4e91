//! Events delivered to the movement controller by the scene host.

use std::time::Instant;

use super::channel::Channel;

/// Physical keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    Space,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// Raw pointer movement in pixels, unaffected by cursor clamping
    PointerMotion { dx: f32, dy: f32 },
    /// Exclusive pointer capture was acquired (`true`) or lost (`false`)
    PointerLockChanged(bool),
}

/// One tick of the host's frame loop, stamped with a monotonic clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub now: Instant,
}

/// Keyboard, pointer and lock notifications
pub type InputSurface = Channel<InputEvent>;

/// Per-frame registrations
pub type FrameScheduler = Channel<FrameTick>;
