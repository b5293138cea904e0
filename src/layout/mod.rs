//! Layout - taffy-backed flex layout with reactive outputs.
//!
//! # Example
//!
//! ```ignore
//! let engine = LayoutEngine::new(config.point_scale_factor);
//! let scheduler = LayoutScheduler::new();
//! let root = LayoutNode::new(&engine, &scheduler, &props, None, None, None)?;
//!
//! // once per frame
//! scheduler.run_pending();
//! let size = root.outputs().size.get();
//! ```

mod engine;
mod node;
mod scheduler;
mod style;

pub use engine::{LayoutEngine, MeasureFn};
pub use node::{LayoutNode, LayoutOutputs};
pub use scheduler::LayoutScheduler;
pub use style::build_style;
