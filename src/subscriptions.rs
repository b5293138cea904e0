//! Teardown lists.

use std::cell::RefCell;

use crate::reactive::Effect;

/// Cleanup callback run on destroy.
pub type Cleanup = Box<dyn FnOnce()>;

/// Ordered teardown callbacks, drained exactly once.
///
/// Callbacks run in the order they were added. Anything added after the
/// list was drained runs immediately.
#[derive(Default)]
pub struct Subscriptions {
    callbacks: RefCell<Vec<Cleanup>>,
    drained: std::cell::Cell<bool>,
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("pending", &self.callbacks.borrow().len())
            .field("drained", &self.drained.get())
            .finish()
    }
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, cleanup: impl FnOnce() + 'static) {
        if self.drained.get() {
            cleanup();
            return;
        }
        self.callbacks.borrow_mut().push(Box::new(cleanup));
    }

    /// Stop `effect` on teardown.
    pub fn add_effect(&self, effect: Effect) {
        self.add(move || effect.stop());
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    pub fn is_drained(&self) -> bool {
        self.drained.get()
    }

    /// Run every callback. Returns false if already drained.
    pub fn drain(&self) -> bool {
        if self.drained.replace(true) {
            return false;
        }
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
        true
    }
}
