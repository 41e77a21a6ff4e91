//! In-memory scene host used by the test harness.

use std::collections::BTreeMap;
use std::time::Instant;

use super::{FrameScheduler, FrameTick, InputEvent, InputSurface, NodeId, SceneHost};
use crate::chart::VisualGroup;

/// Scene host without a window: keeps attached groups in a map and routes
/// pointer capture requests straight back as lock notifications.
pub struct HeadlessScene {
    nodes: BTreeMap<NodeId, VisualGroup>,
    viewport: [f32; 2],
    captured: bool,
    input: InputSurface,
    frames: FrameScheduler,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            viewport: [1280.0, 720.0],
            captured: false,
            input: InputSurface::new(),
            frames: FrameScheduler::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&VisualGroup> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &VisualGroup)> {
        self.nodes.iter()
    }

    /// Geometry, material and texture resources held by attached groups
    pub fn live_resources(&self) -> usize {
        self.nodes.values().map(|g| g.resource_count()).sum()
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Simulate a window resize
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = [width, height];
    }

    /// Publish a frame tick at `now`
    pub fn tick(&self, now: Instant) {
        self.frames.publish(FrameTick { now });
    }
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for HeadlessScene {
    fn attach(&mut self, group: VisualGroup) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, group);
        id
    }

    fn detach(&mut self, id: NodeId) -> Option<VisualGroup> {
        self.nodes.remove(&id)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn viewport_size(&self) -> [f32; 2] {
        self.viewport
    }

    fn request_pointer_capture(&mut self) {
        if !self.captured {
            self.captured = true;
            self.input.publish(InputEvent::PointerLockChanged(true));
        }
    }

    fn release_pointer_capture(&mut self) {
        if self.captured {
            self.captured = false;
            self.input.publish(InputEvent::PointerLockChanged(false));
        }
    }

    fn input(&self) -> &InputSurface {
        &self.input
    }

    fn frames(&self) -> &FrameScheduler {
        &self.frames
    }
}
