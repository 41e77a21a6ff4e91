// Library crate: exposes the testable core (charts, controls, scene host
// contract, settings) for integration tests and the headless harness.
// Window, GL rendering and egui panels stay in the binary crate.

pub mod chart;
pub mod controls;
pub mod diagnostics;
pub mod fixtures;
pub mod harness;
pub mod host;
pub mod i18n;
pub mod state;
pub mod validation;

/// Camera and CPU-side mesh types shared with the renderer.
/// The GL renderer and panel stay in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod mesh;
}
