//! Components - roots, containers, panels, text and scene objects.
//!
//! A [`Root`] owns the layout engine, scheduler, frame hooks, group managers
//! and pointer router of one UI tree. Every component below it is an
//! [`Element`] with extra behavior on top:
//!
//! - [`Container`] - panel, children and scrolling
//! - [`Panel`] - panel only
//! - [`Text`] - panel and glyphs laid out through a host [`FontMetrics`]
//! - [`ObjectElement`] - a host scene object sized by layout
//!
//! [`FontMetrics`]: crate::text::FontMetrics

mod container;
mod context;
mod element;
mod object;
mod root;
mod text;

pub use container::{Container, Panel};
pub use context::Lifecycle;
pub use element::{Element, DEFAULT_MATERIAL_CLASS};
pub use object::ObjectElement;
pub use root::{DrawGroup, Root, RootBuilder};
pub use text::Text;

#[cfg(test)]
mod tests;
