//! Effect - Side-effecting observer.

use std::cell::RefCell;
use std::rc::Rc;

use super::runtime::{self, NodeId};

/// A running effect. Effects keep running until [`Effect::stop`] is called;
/// dropping the handle does not stop them.
#[must_use = "an effect runs until stopped; keep the handle to stop it"]
pub struct Effect {
    id: NodeId,
}

/// Run `f` now and again whenever anything it read changes.
pub fn effect(f: impl FnMut() + 'static) -> Effect {
    let f: Rc<RefCell<dyn FnMut()>> = Rc::new(RefCell::new(f));
    Effect { id: runtime::create_effect(f) }
}

impl Effect {
    /// Stop the effect and release its dependencies.
    pub fn stop(self) {
        runtime::dispose(self.id);
    }

    /// Convert into a boxed teardown callback.
    pub fn into_cleanup(self) -> Box<dyn FnOnce()> {
        Box::new(move || self.stop())
    }
}
