//! Shared event log for ordering claims.

use std::cell::RefCell;
use std::rc::Rc;

use ensayo_core::SpecOutcome;

/// Ordered record of events pushed by hooks and bodies.
///
/// Clones share the log, so one handle can be moved into many closures
/// and read back after the run.
#[derive(Debug, Clone, Default)]
pub struct Events(Rc<RefCell<Vec<String>>>);

impl Events {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event`.
    pub fn push(&self, event: &str) {
        self.0.borrow_mut().push(event.to_string());
    }

    /// Body that records `event` and succeeds.
    pub fn ok(&self, event: &str) -> impl Fn() -> SpecOutcome + 'static {
        let events = self.clone();
        let event = event.to_string();
        move || {
            events.push(&event);
            Ok(())
        }
    }

    /// Snapshot of the events so far.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Forgets every event.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}
