//! Keyboard and pointer forwarding from egui into the scene host

use eframe::egui;

use stockwalk_lib::host::{InputEvent, KeyCode, SceneHost};

use crate::viewport::ViewportPanel;

/// Translate this frame's egui events into the viewport's input surface.
/// Escape and focus loss release pointer capture. Key presses are held
/// back while a text field has focus.
pub fn forward_input(ctx: &egui::Context, viewport: &mut ViewportPanel) {
    let events = ctx.input(|i| i.events.clone());
    let typing = ctx.wants_keyboard_input();
    let mut release = false;

    for event in events {
        match event {
            egui::Event::Key {
                key,
                physical_key,
                pressed,
                repeat,
                ..
            } => {
                let code = map_key(physical_key.unwrap_or(key));
                if code == KeyCode::Escape && pressed {
                    release = true;
                }
                if code == KeyCode::Other || repeat || (pressed && typing) {
                    continue;
                }
                let event = if pressed {
                    InputEvent::KeyDown(code)
                } else {
                    InputEvent::KeyUp(code)
                };
                viewport.input().publish(event);
            }
            egui::Event::MouseMoved(delta) => {
                if viewport.is_captured() {
                    viewport.input().publish(InputEvent::PointerMotion {
                        dx: delta.x,
                        dy: delta.y,
                    });
                }
            }
            egui::Event::WindowFocused(false) => release = true,
            _ => {}
        }
    }

    if release {
        viewport.release_pointer_capture();
    }
}

/// Map an egui key to the physical key codes the controller understands
pub fn map_key(key: egui::Key) -> KeyCode {
    match key {
        egui::Key::ArrowUp => KeyCode::ArrowUp,
        egui::Key::ArrowDown => KeyCode::ArrowDown,
        egui::Key::ArrowLeft => KeyCode::ArrowLeft,
        egui::Key::ArrowRight => KeyCode::ArrowRight,
        egui::Key::W => KeyCode::KeyW,
        egui::Key::A => KeyCode::KeyA,
        egui::Key::S => KeyCode::KeyS,
        egui::Key::D => KeyCode::KeyD,
        egui::Key::Space => KeyCode::Space,
        egui::Key::Escape => KeyCode::Escape,
        _ => KeyCode::Other,
    }
}
