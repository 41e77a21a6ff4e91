//! Click-to-play blocker and the diagnostic log panel drawn over the scene

use egui::{Align2, Color32, FontId, Id, Order, RichText};
use glam::Vec3;

use stockwalk_lib::i18n::{set_lang, t, Lang};
use stockwalk_lib::state::AppState;

const PANEL_WIDTH: f32 = 300.0;
const PANEL_MAX_HEIGHT: f32 = 300.0;
const BANNER_SIZE: f32 = 36.0;

/// Live readouts for the debug panel
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    /// `None` until the camera exists
    pub position: Option<Vec3>,
    pub velocity: Vec3,
    pub has_gl: bool,
    /// A chart build is still in flight
    pub loading: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PanelAction {
    pub reload: bool,
}

/// Full-screen dimmed blocker shown while the pointer is free.
/// Returns true when it was clicked.
pub fn show_blocker(ctx: &egui::Context) -> bool {
    let screen = ctx.screen_rect();
    egui::Area::new(Id::new("click_to_play"))
        .fixed_pos(screen.min)
        .order(Order::Foreground)
        .show(ctx, |ui| {
            let response = ui.allocate_rect(screen, egui::Sense::click());
            let painter = ui.painter();
            painter.rect_filled(screen, 0.0, Color32::from_rgba_unmultiplied(0, 0, 0, 128));

            let center = screen.center();
            painter.text(
                center,
                Align2::CENTER_BOTTOM,
                t("overlay.click_to_play"),
                FontId::proportional(BANNER_SIZE),
                Color32::WHITE,
            );

            let mut y = center.y + 12.0;
            for key in ["overlay.move", "overlay.jump", "overlay.look", "overlay.release"] {
                painter.text(
                    egui::pos2(center.x, y),
                    Align2::CENTER_TOP,
                    t(key),
                    FontId::proportional(16.0),
                    Color32::WHITE,
                );
                y += 22.0;
            }

            if response.clicked() {
                tracing::debug!("click to play");
            }
            response.clicked()
        })
        .inner
}

/// Top-left panel with the diagnostic log, live readouts, the data source
/// and language selection
pub fn show_debug_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    source_input: &mut String,
    info: &HudInfo,
) -> PanelAction {
    let mut action = PanelAction::default();

    egui::Window::new(t("debug.title"))
        .id(Id::new("debug_panel"))
        .anchor(Align2::LEFT_TOP, [10.0, 10.0])
        .order(Order::Tooltip)
        .default_width(PANEL_WIDTH)
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.set_width(PANEL_WIDTH);

            egui::ScrollArea::vertical()
                .max_height(PANEL_MAX_HEIGHT)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in state.diagnostics.lines() {
                        let error = line_is_error(&line);
                        let text = RichText::new(line).monospace();
                        if error {
                            ui.label(text.color(Color32::from_rgb(255, 110, 110)));
                        } else {
                            ui.label(text);
                        }
                    }
                });

            ui.separator();

            // ── Readouts ─────────────────────────────────────
            if let Some(p) = info.position {
                ui.monospace(format!(
                    "{}: {:7.1} {:7.1} {:7.1}",
                    t("debug.position"),
                    p.x,
                    p.y,
                    p.z
                ));
            }
            let v = info.velocity;
            ui.monospace(format!(
                "{}: {:7.1} {:7.1} {:7.1}",
                t("debug.velocity"),
                v.x,
                v.y,
                v.z
            ));
            if !info.has_gl {
                ui.colored_label(Color32::from_rgb(200, 120, 120), t("debug.gl_unavailable"));
            }
            if info.loading {
                ui.weak(t("debug.loading"));
            }

            ui.separator();

            // ── Data source ──────────────────────────────────
            ui.horizontal(|ui| {
                ui.label(t("debug.source"));
                ui.add(egui::TextEdit::singleline(source_input).desired_width(f32::INFINITY));
            });
            if ui.button(t("debug.reload")).clicked() {
                action.reload = true;
            }

            // ── Language ─────────────────────────────────────
            let current = state.settings.ui.language;
            egui::ComboBox::from_label(t("debug.language"))
                .selected_text(current.label())
                .show_ui(ui, |ui| {
                    for lang in Lang::all() {
                        ui.selectable_value(&mut state.settings.ui.language, *lang, lang.label());
                    }
                });
            if state.settings.ui.language != current {
                set_lang(state.settings.ui.language);
                state.settings_dirty = true;
            }
        });

    action
}

fn line_is_error(line: &str) -> bool {
    line.starts_with("Error")
}
