//! Main application module

mod keyboard;
mod styles;

use std::time::Instant;

use eframe::egui;

use stockwalk_lib::chart::{ChartPipeline, ChartSpec, DataSource};
use stockwalk_lib::controls::MovementController;
use stockwalk_lib::host::{FrameTick, SceneHost};
use stockwalk_lib::i18n::set_lang;
use stockwalk_lib::state::{AppSettings, AppState};

use crate::ui::overlay::{self, HudInfo};
use crate::viewport::ViewportPanel;

/// Main application
pub struct StockWalkApp {
    state: AppState,
    viewport: ViewportPanel,
    controller: MovementController,
    bar: ChartPipeline,
    line: ChartPipeline,
    /// Runs dataset loads; `None` if it could not be started
    rt: Option<tokio::runtime::Runtime>,
    /// Editable data source shown in the debug panel
    source_input: String,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl StockWalkApp {
    pub fn new(cc: &eframe::CreationContext<'_>, data_override: Option<String>) -> Self {
        let state = AppState::new(AppSettings::load());
        let settings = &state.settings;
        set_lang(settings.ui.language);

        // Apply initial styles with font size from settings
        styles::configure_styles(&cc.egui_ctx, settings.ui.font_size);

        let mut viewport = ViewportPanel::new(settings.viewport.clone());

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let controller = MovementController::new(settings.movement, state.diagnostics.clone())
            .with_lock_listener(state.lock.listener());

        // --data wins for this session but is not written back to settings
        let (source_input, source) = match data_override {
            Some(input) => {
                let source = DataSource::parse(&input);
                (input, source)
            }
            None => (settings.data.source.clone(), settings.data.data_source()),
        };
        tracing::info!("chart data source: {}", source.describe());

        let bar = ChartPipeline::new(
            ChartSpec::bar(),
            source.clone(),
            settings.charts.bar,
            state.diagnostics.clone(),
        );
        let line = ChartPipeline::new(
            ChartSpec::line(),
            source,
            settings.charts.line,
            state.diagnostics.clone(),
        );

        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => Some(rt),
            Err(e) => {
                state
                    .diagnostics
                    .report_error(format!("Async runtime unavailable: {e}"));
                None
            }
        };

        let last_font_size = settings.ui.font_size;

        let mut app = Self {
            state,
            viewport,
            controller,
            bar,
            line,
            rt,
            source_input,
            last_font_size,
        };
        app.mount_charts();
        app
    }

    /// Start (or restart) both chart builds
    fn mount_charts(&mut self) {
        let Some(rt) = &self.rt else {
            return;
        };
        let handle = rt.handle().clone();
        self.bar.mount(&mut self.viewport, &handle);
        self.line.mount(&mut self.viewport, &handle);
    }

    /// Reload both charts from the source typed into the debug panel
    fn reload_charts(&mut self) {
        if self.state.settings.data.source != self.source_input {
            self.state.settings.data.source = self.source_input.clone();
            self.state.settings_dirty = true;
        }
        let source = self.state.settings.data.data_source();
        tracing::info!("reloading charts from {}", source.describe());
        self.bar.set_source(source.clone());
        self.line.set_source(source);
        self.mount_charts();
    }

    fn hud_info(&self) -> HudInfo {
        HudInfo {
            position: self.viewport.camera().map(|c| c.position),
            velocity: self.controller.state().velocity,
            has_gl: self.viewport.has_gl(),
            loading: self.bar.pending() + self.line.pending() > 0,
        }
    }
}

impl eframe::App for StockWalkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        // ── Input and movement ───────────────────────────────
        keyboard::forward_input(ctx, &mut self.viewport);
        self.viewport.frames().publish(FrameTick {
            now: Instant::now(),
        });
        self.controller.try_bind(
            self.viewport.camera(),
            self.viewport.input(),
            self.viewport.frames(),
        );
        if let Some(camera) = self.viewport.camera_mut() {
            self.controller.update(camera);
        }

        // ── Finished chart builds ────────────────────────────
        self.bar.poll(&mut self.viewport);
        self.line.poll(&mut self.viewport);

        // ── Central viewport ─────────────────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui);
            });

        // ── Overlay ──────────────────────────────────────────
        if !self.state.lock.get() && overlay::show_blocker(ctx) {
            self.viewport.request_pointer_capture();
        }

        if self.state.settings.ui.show_debug {
            let info = self.hud_info();
            let action = overlay::show_debug_panel(ctx, &mut self.state, &mut self.source_input, &info);
            if action.reload {
                self.reload_charts();
            }
        }

        if self.state.settings_dirty {
            self.state.settings.save();
            self.state.settings_dirty = false;
        }

        // Walking physics needs a steady frame clock
        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        self.controller.teardown();
        let released = self.bar.unmount(&mut self.viewport) + self.line.unmount(&mut self.viewport);
        tracing::debug!(released, "charts released on exit");
        if let Some(gl) = gl {
            self.viewport.destroy_gl(gl);
        }
        self.state.settings.save();
    }
}
