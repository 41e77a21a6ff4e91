//! 3D viewport panel with OpenGL rendering

mod fallback;
mod gl_renderer;
pub use stockwalk_lib::viewport::{camera, mesh};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use egui::Ui;
use glam::Vec3;

use stockwalk_lib::chart::{GroupMeshes, VisualGroup};
use stockwalk_lib::host::{FrameScheduler, InputEvent, InputSurface, NodeId, SceneHost};
use stockwalk_lib::state::ViewportSettings;

use camera::FirstPersonCamera;
use gl_renderer::GlRenderer;

/// 3D viewport panel: the desktop scene host
pub struct ViewportPanel {
    /// Created on the first frame that has a render surface
    camera: Option<FirstPersonCamera>,
    settings: ViewportSettings,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// Attached groups, handed back on detach
    groups: HashMap<NodeId, VisualGroup>,
    /// Tessellated groups shared with the paint callback
    meshes: HashMap<NodeId, Arc<GroupMeshes>>,
    /// Bumped whenever `meshes` changes
    version: u64,
    size: [f32; 2],
    captured: bool,
    /// Cursor grab change waiting to be sent to the window
    pending_grab: Option<bool>,
    input: InputSurface,
    frames: FrameScheduler,
}

impl ViewportPanel {
    pub fn new(settings: ViewportSettings) -> Self {
        Self {
            camera: None,
            settings,
            gl_renderer: None,
            groups: HashMap::new(),
            meshes: HashMap::new(),
            version: 0,
            size: [0.0, 0.0],
            captured: false,
            pending_grab: None,
            input: InputSurface::new(),
            frames: FrameScheduler::new(),
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("OpenGL renderer unavailable: {e}"),
        }
    }

    pub fn has_gl(&self) -> bool {
        self.gl_renderer.is_some()
    }

    pub fn camera(&self) -> Option<&FirstPersonCamera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut FirstPersonCamera> {
        self.camera.as_mut()
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn show(&mut self, ui: &mut Ui) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());

        let size = [rect.width(), rect.height()];
        if size != self.size {
            tracing::debug!(width = size[0], height = size[1], "viewport resized");
            self.size = size;
        }

        if self.camera.is_none() && rect.width() > 0.0 && rect.height() > 0.0 {
            self.camera = Some(FirstPersonCamera::new(
                Vec3::from(self.settings.eye),
                self.settings.fov,
                self.settings.near,
                self.settings.far,
            ));
            tracing::info!("camera created at {:?}", self.settings.eye);
        }

        self.apply_pending_grab(ui.ctx());

        if !ui.is_rect_visible(rect) {
            return;
        }

        let Some(camera) = self.camera else {
            return;
        };

        // ── GL rendering ────────────────────────────────────────
        if self.gl_renderer.is_some() {
            self.render_gl(ui, rect, &camera);
        } else {
            fallback::paint_viewport(ui, rect, &camera, self.meshes.values());
        }
    }

    /// Send the cursor grab/visibility change requested through the scene
    /// host API to the window
    fn apply_pending_grab(&mut self, ctx: &egui::Context) {
        if let Some(grab) = self.pending_grab.take() {
            let mode = if grab {
                grab_mode()
            } else {
                egui::viewport::CursorGrab::None
            };
            ctx.send_viewport_cmd(egui::ViewportCommand::CursorGrab(mode));
            ctx.send_viewport_cmd(egui::ViewportCommand::CursorVisible(!grab));
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect, camera: &FirstPersonCamera) {
        let Some(gl_renderer) = &self.gl_renderer else {
            return;
        };

        let renderer_clone = gl_renderer.clone();
        let aspect = rect.width() / rect.height().max(1.0);
        let view_proj = camera.view_projection(aspect);
        let eye = camera.position;
        let meshes = self.meshes.clone();
        let version = self.version;
        let bg_color = self.settings.background_color;
        let ground_size = self.settings.ground_size;
        let ground_color = self.settings.ground_color;

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer_clone.lock() {
                    if let Err(e) = r.update_ground(gl, ground_size, ground_color) {
                        tracing::error!("failed to upload ground plane: {e}");
                    }
                    if let Err(e) = r.sync_nodes(gl, &meshes, version) {
                        tracing::error!("failed to upload chart meshes: {e}");
                    }
                    r.paint(
                        gl,
                        &gl_renderer::RenderParams {
                            viewport,
                            view_proj,
                            eye,
                            bg_color,
                        },
                    );
                }
            })),
        };

        ui.painter().add(callback);
    }

    /// Free GPU resources; called once on exit
    pub fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.gl_renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }
}

impl SceneHost for ViewportPanel {
    fn attach(&mut self, group: VisualGroup) -> NodeId {
        let id = NodeId::new();
        self.meshes.insert(id, Arc::new(group.tessellate()));
        self.groups.insert(id, group);
        self.version += 1;
        tracing::debug!(node = %id, "group attached");
        id
    }

    fn detach(&mut self, id: NodeId) -> Option<VisualGroup> {
        let group = self.groups.remove(&id)?;
        self.meshes.remove(&id);
        self.version += 1;
        tracing::debug!(node = %id, "group detached");
        Some(group)
    }

    fn node_count(&self) -> usize {
        self.groups.len()
    }

    fn viewport_size(&self) -> [f32; 2] {
        self.size
    }

    fn request_pointer_capture(&mut self) {
        if !self.captured {
            self.captured = true;
            self.pending_grab = Some(true);
            self.input.publish(InputEvent::PointerLockChanged(true));
        }
    }

    fn release_pointer_capture(&mut self) {
        if self.captured {
            self.captured = false;
            self.pending_grab = Some(false);
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

/// Grab mode used while the pointer is captured. winit cannot lock the
/// cursor on Windows or X11, so those confine it to the window instead.
/// Look input reads raw mouse motion and works under either mode.
fn grab_mode() -> egui::viewport::CursorGrab {
    if cfg!(any(target_os = "windows", all(unix, not(target_os = "macos")))) {
        egui::viewport::CursorGrab::Confined
    } else {
        egui::viewport::CursorGrab::Locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_mode_matches_platform() {
        let mode = grab_mode();
        if cfg!(target_os = "macos") {
            assert_eq!(mode, egui::viewport::CursorGrab::Locked);
        } else if cfg!(any(target_os = "windows", unix)) {
            assert_eq!(mode, egui::viewport::CursorGrab::Confined);
        }
    }
}
