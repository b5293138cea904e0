//! Cursor requests.
//!
//! Elements with a `cursor` property request it while hovered; the host
//! shows the most recent live request.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reactive::{signal, Signal};

struct Registry {
    requests: RefCell<Vec<(u64, String)>>,
    next_owner: Cell<u64>,
    current: Signal<Option<String>>,
}

/// Shared cursor request stack.
#[derive(Clone)]
pub struct CursorRegistry {
    inner: Rc<Registry>,
}

impl Default for CursorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CursorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorRegistry").field("current", &self.inner.current.peek()).finish()
    }
}

impl CursorRegistry {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Registry {
                requests: RefCell::new(Vec::new()),
                next_owner: Cell::new(0),
                current: signal(None),
            }),
        }
    }

    /// Fresh owner id for [`CursorRegistry::request`].
    pub fn owner(&self) -> u64 {
        let id = self.inner.next_owner.get();
        self.inner.next_owner.set(id + 1);
        id
    }

    /// Request `cursor`, replacing any earlier request of `owner`.
    pub fn request(&self, owner: u64, cursor: impl Into<String>) {
        {
            let mut requests = self.inner.requests.borrow_mut();
            requests.retain(|(id, _)| *id != owner);
            requests.push((owner, cursor.into()));
        }
        self.sync();
    }

    pub fn release(&self, owner: u64) {
        self.inner.requests.borrow_mut().retain(|(id, _)| *id != owner);
        self.sync();
    }

    /// Cursor the host should show; `None` means the default.
    pub fn current(&self) -> Signal<Option<String>> {
        self.inner.current.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.borrow().len()
    }

    fn sync(&self) {
        let top = self.inner.requests.borrow().last().map(|(_, cursor)| cursor.clone());
        self.inner.current.set(top);
    }
}
