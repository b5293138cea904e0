//! Signal - Writable reactive cell.

use std::marker::PhantomData;
use std::rc::Rc;

use super::runtime::{self, eq_any, NodeId};

/// Owns one arena node; the node is disposed when the last handle drops.
pub(crate) struct NodeHandle(pub(crate) NodeId);

impl Drop for NodeHandle {
    fn drop(&mut self) {
        runtime::dispose(self.0);
    }
}

/// A writable reactive value.
///
/// `get()` inside a derived or effect registers a dependency; `set()` with a
/// value that differs (`PartialEq`) invalidates every dependent.
pub struct Signal<T> {
    handle: Rc<NodeHandle>,
    _marker: PhantomData<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self { handle: self.handle.clone(), _marker: PhantomData }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signal").field(&self.handle.0).finish()
    }
}

/// Create a new signal.
pub fn signal<T: PartialEq + 'static>(value: T) -> Signal<T> {
    let id = runtime::create_source(Box::new(value), eq_any::<T>);
    Signal { handle: Rc::new(NodeHandle(id)), _marker: PhantomData }
}

impl<T: 'static> Signal<T> {
    /// Read the value by reference (tracked).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::read(self.handle.0, true, |value| f(downcast(value)))
    }

    /// Read the value by reference without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::read(self.handle.0, false, |value| f(downcast(value)))
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        runtime::write(self.handle.0, Box::new(value));
    }

    /// Whether two handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Get the current value (tracked).
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without creating a dependency.
    pub fn peek(&self) -> T {
        self.with_untracked(T::clone)
    }

    /// Modify the value in place; dependents are notified if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.peek();
        f(&mut value);
        self.set(value);
    }
}

pub(crate) fn downcast<T: 'static>(value: &dyn std::any::Any) -> &T {
    value
        .downcast_ref::<T>()
        .unwrap_or_else(|| panic!("reactive node holds a value of another type"))
}
