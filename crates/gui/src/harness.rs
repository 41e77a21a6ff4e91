//! Headless test harness: a [`HeadlessScene`] with a camera, the movement
//! controller and both chart pipelines, driven by a synthetic clock.

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::chart::{ChartPipeline, ChartSpec, DataSource, VisualGroup};
use crate::controls::{MovementController, MovementParams, PlayerState};
use crate::diagnostics::Diagnostics;
use crate::fixtures::SAMPLE_CSV;
use crate::host::{HeadlessScene, InputEvent, KeyCode, SceneHost};
use crate::state::AppSettings;
use crate::viewport::camera::FirstPersonCamera;

/// Headless test harness: manages scene, camera, controller and charts
pub struct TestHarness {
    pub scene: HeadlessScene,
    pub camera: FirstPersonCamera,
    controller: MovementController,
    diagnostics: Diagnostics,
    bar: ChartPipeline,
    line: ChartPipeline,
    clock: Instant,
}

impl TestHarness {
    /// Harness over the built-in sample dataset, controller bound and primed
    pub fn new() -> Self {
        Self::with_source(DataSource::Inline(SAMPLE_CSV.to_string()))
    }

    pub fn with_source(source: DataSource) -> Self {
        let mut h = Self::unbound(source);
        h.bind(true);
        h
    }

    /// Controller not yet subscribed to the scene
    pub fn unbound(source: DataSource) -> Self {
        let settings = AppSettings::default();
        let diagnostics = Diagnostics::new();
        let eye = Vec3::from(settings.viewport.eye);
        Self {
            scene: HeadlessScene::new(),
            camera: FirstPersonCamera::new(
                eye,
                settings.viewport.fov,
                settings.viewport.near,
                settings.viewport.far,
            ),
            controller: MovementController::new(settings.movement, diagnostics.clone()),
            bar: ChartPipeline::new(
                ChartSpec::bar(),
                source.clone(),
                settings.charts.bar,
                diagnostics.clone(),
            ),
            line: ChartPipeline::new(
                ChartSpec::line(),
                source,
                settings.charts.line,
                diagnostics.clone(),
            ),
            diagnostics,
            clock: Instant::now(),
        }
    }

    // ── Controller ────────────────────────────────────────────

    /// Try to bind the controller; `with_camera = false` simulates a host
    /// whose camera is not ready yet. A successful bind is followed by a
    /// priming tick so the first real tick has a time base.
    pub fn bind(&mut self, with_camera: bool) -> bool {
        let camera = with_camera.then_some(&self.camera);
        let bound = self
            .controller
            .try_bind(camera, self.scene.input(), self.scene.frames());
        if bound {
            self.scene.tick(self.clock);
            self.pump();
        }
        bound
    }

    pub fn set_params(&mut self, params: MovementParams) {
        self.controller.set_params(params);
    }

    pub fn press(&mut self, key: KeyCode) {
        self.scene.input().publish(InputEvent::KeyDown(key));
        self.pump();
    }

    pub fn release(&mut self, key: KeyCode) {
        self.scene.input().publish(InputEvent::KeyUp(key));
        self.pump();
    }

    pub fn move_pointer(&mut self, dx: f32, dy: f32) {
        self.scene
            .input()
            .publish(InputEvent::PointerMotion { dx, dy });
        self.pump();
    }

    pub fn lock(&mut self) {
        self.scene.request_pointer_capture();
        self.pump();
    }

    pub fn unlock(&mut self) {
        self.scene.release_pointer_capture();
        self.pump();
    }

    /// Advance the clock by `dt` seconds and run one frame
    pub fn tick(&mut self, dt: f32) {
        self.clock += Duration::from_secs_f32(dt);
        self.scene.tick(self.clock);
        self.pump();
    }

    pub fn tick_n(&mut self, n: usize, dt: f32) {
        for _ in 0..n {
            self.tick(dt);
        }
    }

    /// Deliver queued input and frames, then apply finished chart builds
    pub fn pump(&mut self) {
        self.controller.update(&mut self.camera);
        self.bar.poll(&mut self.scene);
        self.line.poll(&mut self.scene);
    }

    pub fn teardown(&mut self) {
        self.controller.teardown();
    }

    // ── Charts ────────────────────────────────────────────────

    /// Mount both charts and wait for their builds to land
    pub async fn mount_charts(&mut self) {
        self.start_charts();
        self.settle_charts().await;
    }

    /// Start both builds without waiting for them
    pub fn start_charts(&mut self) {
        let rt = tokio::runtime::Handle::current();
        self.bar.mount(&mut self.scene, &rt);
        self.line.mount(&mut self.scene, &rt);
    }

    /// Apply or discard every build still in flight
    pub async fn settle_charts(&mut self) {
        self.bar.settle(&mut self.scene).await;
        self.line.settle(&mut self.scene).await;
    }

    /// Returns the number of released resources
    pub fn unmount_charts(&mut self) -> usize {
        self.bar.unmount(&mut self.scene) + self.line.unmount(&mut self.scene)
    }

    pub fn bar(&self) -> &ChartPipeline {
        &self.bar
    }

    pub fn bar_mut(&mut self) -> &mut ChartPipeline {
        &mut self.bar
    }

    pub fn line(&self) -> &ChartPipeline {
        &self.line
    }

    pub fn bar_group(&self) -> Option<&VisualGroup> {
        self.bar.node().and_then(|id| self.scene.node(id))
    }

    pub fn line_group(&self) -> Option<&VisualGroup> {
        self.line.node().and_then(|id| self.scene.node(id))
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn state(&self) -> &PlayerState {
        self.controller.state()
    }

    pub fn controller(&self) -> &MovementController {
        &self.controller
    }

    pub fn position(&self) -> Vec3 {
        self.camera.position
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn node_count(&self) -> usize {
        self.scene.node_count()
    }

    pub fn live_resources(&self) -> usize {
        self.scene.live_resources()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_harness_is_bound_and_idle() {
        let h = TestHarness::new();
        assert!(h.controller().is_bound());
        assert!(!h.state().look_locked);
        assert_eq!(h.node_count(), 0);
        assert_eq!(h.diagnostics().lines(), vec!["Player controls initialized.".to_string()]);
    }

    #[test]
    fn test_unlocked_ticks_do_nothing() {
        let mut h = TestHarness::new();
        h.press(KeyCode::KeyW);
        h.tick_n(10, 0.016);
        assert_eq!(h.position(), Vec3::new(0.0, 50.0, 100.0));
        assert_eq!(h.state().velocity, Vec3::ZERO);
    }

    #[test]
    fn test_lock_then_settle_on_floor() {
        let mut h = TestHarness::new();
        h.lock();
        h.tick_n(120, 0.016);
        assert_eq!(h.position().y, 10.0);
        assert!(h.state().can_jump);
    }

    #[test]
    fn test_teardown_drops_subscriptions() {
        let mut h = TestHarness::new();
        h.teardown();
        assert_eq!(h.scene.input().subscriber_count(), 0);
        assert_eq!(h.scene.frames().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_mount_and_unmount_charts() {
        let mut h = TestHarness::new();
        h.mount_charts().await;
        assert_eq!(h.node_count(), 2);
        assert_eq!(h.bar_group().unwrap().count(crate::chart::PartRole::Bar), 5);
        assert!(h.unmount_charts() > 0);
        assert_eq!(h.node_count(), 0);
        assert_eq!(h.live_resources(), 0);
    }
}
