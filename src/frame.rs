//! Per-frame callbacks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Per-frame callback, receives the frame delta in seconds.
pub type FrameHook = Rc<dyn Fn(f32)>;

/// Token returned by [`FrameHooks::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHookId(u64);

#[derive(Default)]
struct Registry {
    hooks: RefCell<Vec<(FrameHookId, FrameHook)>>,
    next_id: Cell<u64>,
}

/// Shared registry of frame hooks, run in registration order.
#[derive(Clone, Default)]
pub struct FrameHooks {
    inner: Rc<Registry>,
}

impl std::fmt::Debug for FrameHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHooks").field("len", &self.len()).finish()
    }
}

impl FrameHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, hook: impl Fn(f32) + 'static) -> FrameHookId {
        let id = FrameHookId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.hooks.borrow_mut().push((id, Rc::new(hook)));
        id
    }

    /// Remove one hook. Returns false for unknown or already removed ids.
    pub fn unregister(&self, id: FrameHookId) -> bool {
        let mut hooks = self.inner.hooks.borrow_mut();
        match hooks.iter().position(|(hook_id, _)| *hook_id == id) {
            Some(index) => {
                hooks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.hooks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.hooks.borrow().is_empty()
    }

    /// Run every hook registered before this call.
    ///
    /// Hooks may register or unregister hooks; the change applies from the
    /// next frame.
    pub fn run(&self, delta: f32) {
        let hooks: Vec<FrameHook> = self.inner.hooks.borrow().iter().map(|(_, hook)| hook.clone()).collect();
        for hook in hooks {
            hook(delta);
        }
    }
}
