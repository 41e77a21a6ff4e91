pub mod settings;

use std::cell::Cell;
use std::rc::Rc;

pub use settings::{AppSettings, ChartSettings, DataSettings, UiSettings, ViewportSettings};

use crate::diagnostics::Diagnostics;

/// Shared "pointer is captured" flag, written by the controller's lock
/// listener and read by the overlay.
#[derive(Clone, Default)]
pub struct LockIndicator(Rc<Cell<bool>>);

impl LockIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, locked: bool) {
        self.0.set(locked);
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    /// Listener suitable for `MovementController::with_lock_listener`
    pub fn listener(&self) -> impl FnMut(bool) + 'static {
        let flag = self.clone();
        move |locked| flag.set(locked)
    }
}

/// Combined application state
pub struct AppState {
    pub settings: AppSettings,
    pub diagnostics: Diagnostics,
    pub lock: LockIndicator,
    /// Settings changed since the last save
    pub settings_dirty: bool,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            diagnostics: Diagnostics::new(),
            lock: LockIndicator::new(),
            settings_dirty: false,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_listener_writes_shared_flag() {
        let lock = LockIndicator::new();
        let mut listener = lock.listener();
        listener(true);
        assert!(lock.get());
        listener(false);
        assert!(!lock.get());
    }
}
