//! Reactive Graph - Signals, deriveds and effects.
//!
//! A fine-grained reactive core in the spirit of spark-signals:
//!
//! - [`Signal`] - writable cell
//! - [`Derived`] - lazily recomputed value with automatic dependency tracking
//! - [`effect`] - observer that re-runs when what it read changes
//! - [`batch`] - coalesce writes so observers run once
//!
//! The graph is an arena of nodes addressed by generational index, local to
//! the current thread. Nothing here is `Send`; the UI runs on one thread.

mod derived;
mod effect;
mod runtime;
mod signal;

pub use derived::{derived, Derived};
pub use effect::{effect, Effect};
pub use runtime::{batch, is_tracking, live_node_count, untrack};
pub use signal::{signal, Signal};
