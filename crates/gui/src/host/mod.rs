//! Scene host contract shared by the GL viewport and the headless test scene.

mod channel;
mod headless;
mod input;

pub use channel::{Channel, Subscription};
pub use headless::HeadlessScene;
pub use input::{FrameScheduler, FrameTick, InputEvent, InputSurface, KeyCode};

use crate::chart::VisualGroup;

/// Handle to a group attached to a scene host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.to_string();
        f.write_str(&s[..8])
    }
}

/// What the chart pipelines and the movement controller need from the
/// surrounding application.
pub trait SceneHost {
    /// Take ownership of a group and add it to the scene
    fn attach(&mut self, group: VisualGroup) -> NodeId;

    /// Remove a group from the scene and hand it back for disposal
    fn detach(&mut self, id: NodeId) -> Option<VisualGroup>;

    /// Number of attached groups
    fn node_count(&self) -> usize;

    /// Render surface size in logical pixels
    fn viewport_size(&self) -> [f32; 2];

    /// Ask for exclusive pointer capture. The host publishes
    /// `InputEvent::PointerLockChanged(true)` once it is granted.
    fn request_pointer_capture(&mut self);

    /// Give up pointer capture, publishing `PointerLockChanged(false)`
    fn release_pointer_capture(&mut self);

    fn input(&self) -> &InputSurface;

    fn frames(&self) -> &FrameScheduler;
}
