//! # spark-spatial
//!
//! Reactive, retained-mode UI for 3D scene graphs.
//!
//! ## Architecture
//!
//! Every component resolves its style through [`properties::MergedProperties`]
//! and feeds a shared taffy tree through a [`layout::LayoutNode`]. Layout
//! outputs are signals, so everything downstream is derived:
//!
//! ```text
//! property sources → merged properties → layout node → matrices / clip rects
//!                                                    → instance groups → host draw calls
//! pointer events → hover/active signals → conditional properties
//! ```
//!
//! The host owns the scene graph, meshes and materials. It drives a
//! [`component::Root`] once per frame and draws the instance groups the
//! root returns.
//!
//! ## Modules
//!
//! - [`reactive`] - signals, deriveds, effects
//! - [`properties`] - property keys, sources, merged view
//! - [`layout`] - taffy-backed layout nodes and the per-frame scheduler
//! - [`transform`], [`clipping`], [`scroll`] - matrices, clip rects, scroll state
//! - [`batching`] - instanced panel and glyph groups
//! - [`interaction`] - pointer routing, hover/active, cursors
//! - [`text`] - line breaking and glyph placement
//! - [`component`] - roots, containers, panels, text, scene objects

pub mod batching;
pub mod clipping;
pub mod component;
pub mod config;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod layout;
pub mod order;
pub mod properties;
pub mod reactive;
pub mod scene;
pub mod scroll;
pub mod subscriptions;
pub mod text;
pub mod theme;
pub mod transform;
pub mod types;

pub use component::{Container, DrawGroup, Element, ObjectElement, Panel, Root, RootBuilder, Text};
pub use config::UiConfig;
pub use error::{Result, UiError};
pub use properties::{PropertyKey, PropertySource};
pub use scene::SceneObject;
