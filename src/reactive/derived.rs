//! Derived - Lazily recomputed reactive value.

use std::marker::PhantomData;
use std::rc::Rc;

use super::runtime::{self, eq_any};
use super::signal::{downcast, NodeHandle};

/// A computed value that re-evaluates lazily when one of the signals or
/// deriveds it read during its last evaluation changes.
pub struct Derived<T> {
    handle: Rc<NodeHandle>,
    _marker: PhantomData<T>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self { handle: self.handle.clone(), _marker: PhantomData }
    }
}

impl<T> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Derived").field(&self.handle.0).finish()
    }
}

/// Create a derived value. The computation does not run until first read.
pub fn derived<T, F>(compute: F) -> Derived<T>
where
    T: PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    let id = runtime::create_derived(
        Rc::new(move || Box::new(compute()) as runtime::AnyValue),
        eq_any::<T>,
    );
    Derived { handle: Rc::new(NodeHandle(id)), _marker: PhantomData }
}

impl<T: 'static> Derived<T> {
    /// Read the value by reference (tracked).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::read(self.handle.0, true, |value| f(downcast(value)))
    }

    /// Read the value by reference without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::read(self.handle.0, false, |value| f(downcast(value)))
    }
}

impl<T: Clone + 'static> Derived<T> {
    /// Get the current value (tracked).
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without creating a dependency.
    pub fn peek(&self) -> T {
        self.with_untracked(T::clone)
    }
}
