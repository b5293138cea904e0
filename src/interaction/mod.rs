//! Interaction - pointer events, hover/active state, cursors and routing.
//!
//! The host feeds pointer events (already projected onto the root plane)
//! into a [`PointerRouter`]; hit targets forward them to each element's
//! merged [`EventHandlers`]. Hover and active state come back out as
//! signals that drive the `hover` and `active` conditional properties.

mod cursor;
mod events;
mod router;
mod state;

pub use cursor::CursorRegistry;
pub use events::{EventHandlers, PointerAction, PointerEvent, PointerHandler, WheelEvent, WheelHandler};
pub use router::{PointerRouter, TargetId};
pub use state::InteractionState;
