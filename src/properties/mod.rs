//! Properties - keys, values, sources and the merged view components read.

mod conditions;
mod key;
mod merged;
mod source;
mod transformers;
mod value;

pub use conditions::{Breakpoint, Condition, ConditionContext};
pub use key::PropertyKey;
pub use merged::MergedProperties;
pub use source::{PropertySource, Variant};
pub use transformers::{fan_out, DeriveFn, Entry, TransformFn, Transformers};
pub use value::{PropValue, Value};
