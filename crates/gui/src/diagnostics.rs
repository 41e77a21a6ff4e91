//! Append-only diagnostic log shown in the on-screen debug panel.
//!
//! Every line is mirrored to `tracing` so headless runs keep the same trail.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the diagnostic log. Clones append to the same buffer.
#[derive(Clone, Default)]
pub struct Diagnostics {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a status line
    pub fn report(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{line}");
        self.lines.borrow_mut().push(line);
    }

    /// Append a failure line
    pub fn report_error(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::error!("{line}");
        self.lines.borrow_mut().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// The whole log, one entry per line
    pub fn text(&self) -> String {
        let lines = self.lines.borrow();
        let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines.iter() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// Number of lines containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.lines.borrow().iter().filter(|l| l.contains(needle)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer_in_order() {
        let a = Diagnostics::new();
        let b = a.clone();
        a.report("first");
        b.report_error("second");
        assert_eq!(a.lines(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(b.text(), "first\nsecond\n");
    }

    #[test]
    fn test_count_matching() {
        let d = Diagnostics::new();
        d.report("Bar graph initialization complete.");
        d.report("Player controls initialized.");
        assert_eq!(d.count_matching("initializ"), 2);
        assert_eq!(d.count_matching("Error"), 0);
        assert_eq!(d.len(), 2);
        assert!(!d.is_empty());
    }
}
