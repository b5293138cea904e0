//! Layout scheduler - coalesces pass requests into one pass per frame.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::node::{LayoutNode, NodeInner};

#[derive(Default)]
struct SchedulerState {
    pending: RefCell<Option<Weak<NodeInner>>>,
    requests: Cell<usize>,
}

/// Records at most one pending root; [`LayoutScheduler::run_pending`] runs
/// it on the frame tick.
#[derive(Clone, Default)]
pub struct LayoutScheduler {
    state: Rc<SchedulerState>,
}

impl std::fmt::Debug for LayoutScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutScheduler")
            .field("pending", &self.has_pending())
            .field("requests", &self.state.requests.get())
            .finish()
    }
}

impl LayoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn request(&self, root: Weak<NodeInner>) {
        self.state.requests.set(self.state.requests.get() + 1);
        *self.state.pending.borrow_mut() = Some(root);
    }

    pub fn has_pending(&self) -> bool {
        self.state.pending.borrow().is_some()
    }

    /// Total requests since creation, coalesced or not.
    pub fn request_count(&self) -> usize {
        self.state.requests.get()
    }

    /// Run the pending pass, if its root is still alive. Returns whether a
    /// pass ran.
    pub fn run_pending(&self) -> bool {
        let Some(pending) = self.state.pending.borrow_mut().take() else { return false };
        let Some(inner) = pending.upgrade() else { return false };

        let root = LayoutNode { inner };
        if !root.is_alive() {
            trace!(target: "spark_spatial::layout", "pending root destroyed, skipping pass");
            return false;
        }
        if let Err(err) = root.calculate_layout() {
            warn!(target: "spark_spatial::layout", %err, "layout pass failed");
            return false;
        }
        true
    }
}
