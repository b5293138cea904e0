//! Layout node - one taffy node driven by merged properties.
//!
//! A style effect rebuilds the node's taffy style whenever a layout property
//! changes and asks the scheduler for a pass. The pass runs from the root on
//! the next frame and publishes every node's outputs as signals.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec2;
use taffy::NodeId;
use tracing::{debug, warn};

use crate::error::Result;
use crate::properties::{MergedProperties, PropertyKey};
use crate::reactive::{batch, effect, signal, Effect, Signal};
use crate::types::{Inset, Overflow};

use super::engine::{LayoutEngine, MeasureFn};
use super::scheduler::LayoutScheduler;
use super::style::build_style;

// =============================================================================
// Outputs
// =============================================================================

/// Reactive layout results, all in layout units.
#[derive(Clone)]
pub struct LayoutOutputs {
    pub size: Signal<Vec2>,
    /// Center relative to the parent's center, Y axis pointing down.
    pub relative_center: Signal<Vec2>,
    pub border_inset: Signal<Inset>,
    pub padding_inset: Signal<Inset>,
    pub overflow: Signal<Overflow>,
    pub content_size: Signal<Vec2>,
    /// Zero unless `overflow: scroll` and the content exceeds the box.
    pub max_scroll_position: Signal<Vec2>,
}

impl Default for LayoutOutputs {
    fn default() -> Self {
        Self {
            size: signal(Vec2::ZERO),
            relative_center: signal(Vec2::ZERO),
            border_inset: signal(Inset::ZERO),
            padding_inset: signal(Inset::ZERO),
            overflow: signal(Overflow::Visible),
            content_size: signal(Vec2::ZERO),
            max_scroll_position: signal(Vec2::ZERO),
        }
    }
}

struct Published {
    size: Vec2,
    relative_center: Vec2,
    border_inset: Inset,
    padding_inset: Inset,
    content_size: Vec2,
}

// =============================================================================
// Node
// =============================================================================

pub(super) struct NodeInner {
    engine: LayoutEngine,
    scheduler: LayoutScheduler,
    handle: Cell<Option<NodeId>>,
    outputs: LayoutOutputs,
    root: Weak<NodeInner>,
    children: RefCell<Vec<Weak<NodeInner>>>,
    style_effect: RefCell<Option<Effect>>,
}

impl NodeInner {
    fn release(&self) -> bool {
        if let Some(style_effect) = self.style_effect.borrow_mut().take() {
            style_effect.stop();
        }
        match self.handle.take() {
            Some(handle) => {
                self.engine.remove(handle);
                true
            }
            None => false,
        }
    }
}

impl Drop for NodeInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// Shared handle to one layout node.
#[derive(Clone)]
pub struct LayoutNode {
    pub(super) inner: Rc<NodeInner>,
}

impl std::fmt::Debug for LayoutNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutNode")
            .field("handle", &self.inner.handle.get())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

impl LayoutNode {
    /// Create a node under `parent` (or a root when `None`) at child `index`
    /// (appended when `None` or out of range).
    ///
    /// Leaves with intrinsic content pass a `measure` function.
    pub fn new(
        engine: &LayoutEngine,
        scheduler: &LayoutScheduler,
        properties: &MergedProperties,
        parent: Option<&LayoutNode>,
        index: Option<usize>,
        measure: Option<MeasureFn>,
    ) -> Result<Self> {
        let handle = engine.create_node(taffy::Style::default(), measure)?;
        if let Some(parent_handle) = parent.and_then(|p| p.inner.handle.get()) {
            engine.attach(parent_handle, handle, index)?;
        }

        let inner = Rc::new_cyclic(|weak| NodeInner {
            engine: engine.clone(),
            scheduler: scheduler.clone(),
            handle: Cell::new(Some(handle)),
            outputs: LayoutOutputs::default(),
            root: parent.map_or_else(|| weak.clone(), |p| p.inner.root.clone()),
            children: RefCell::new(Vec::new()),
            style_effect: RefCell::new(None),
        });

        if let Some(parent) = parent {
            let mut children = parent.inner.children.borrow_mut();
            children.retain(|c| c.strong_count() > 0);
            let at = index.unwrap_or(children.len()).min(children.len());
            children.insert(at, Rc::downgrade(&inner));
        }

        let weak = Rc::downgrade(&inner);
        let props = properties.clone();
        let style_effect = effect(move || {
            let Some(inner) = weak.upgrade() else { return };
            let Some(handle) = inner.handle.get() else { return };

            let style = build_style(&props, inner.engine.point_scale());
            inner.outputs.overflow.set(props.keyword::<Overflow>(PropertyKey::Overflow));
            match inner.engine.set_style(handle, style) {
                Ok(()) => LayoutNode { inner }.request_calculate_layout(),
                Err(err) => warn!(target: "spark_spatial::layout", %err, "failed to apply style"),
            }
        });
        *inner.style_effect.borrow_mut() = Some(style_effect);

        Ok(Self { inner })
    }

    pub fn outputs(&self) -> &LayoutOutputs {
        &self.inner.outputs
    }

    pub fn engine(&self) -> &LayoutEngine {
        &self.inner.engine
    }

    /// Whether the engine node is still held.
    pub fn is_alive(&self) -> bool {
        self.inner.handle.get().is_some()
    }

    pub fn is_root(&self) -> bool {
        std::ptr::eq(self.inner.root.as_ptr(), Rc::as_ptr(&self.inner))
    }

    /// Ask for a pass from this node's root on the next frame.
    /// No-op once the node is destroyed.
    pub fn request_calculate_layout(&self) {
        if !self.is_alive() {
            return;
        }
        self.inner.scheduler.request(self.inner.root.clone());
    }

    /// Re-measure after intrinsic content (text, font) changed.
    pub fn mark_measure_dirty(&self) {
        let Some(handle) = self.inner.handle.get() else { return };
        if self.inner.engine.mark_dirty(handle).is_ok() {
            self.request_calculate_layout();
        }
    }

    /// Run one synchronous pass from this node and publish the results of
    /// every node below it.
    pub fn calculate_layout(&self) -> Result<()> {
        let Some(handle) = self.inner.handle.get() else { return Ok(()) };
        self.inner.engine.compute(handle)?;

        let mut results = Vec::new();
        collect(&self.inner, None, &mut results);
        batch(|| {
            for (node, published) in results {
                publish(&node, published);
            }
        });
        Ok(())
    }

    /// Release the engine node; safe to call more than once and before any
    /// pass ran. The root relayouts so siblings reflow.
    pub fn destroy(&self) {
        if !self.inner.release() {
            return;
        }
        debug!(target: "spark_spatial::layout", "layout node destroyed");
        if !self.is_root() {
            if let Some(root) = self.inner.root.upgrade() {
                LayoutNode { inner: root }.request_calculate_layout();
            }
        }
    }
}

fn collect(inner: &Rc<NodeInner>, parent_size: Option<Vec2>, out: &mut Vec<(Rc<NodeInner>, Published)>) {
    let Some(handle) = inner.handle.get() else { return };
    let Some(layout) = inner.engine.layout(handle) else { return };
    let scale = inner.engine.point_scale();

    let size = Vec2::new(layout.size.width, layout.size.height) / scale;
    let location = Vec2::new(layout.location.x, layout.location.y) / scale;
    let relative_center = match parent_size {
        Some(parent_size) => location + size * 0.5 - parent_size * 0.5,
        None => Vec2::ZERO,
    };
    let inset = |rect: taffy::Rect<f32>| {
        Inset::new(rect.top / scale, rect.right / scale, rect.bottom / scale, rect.left / scale)
    };

    out.push((
        inner.clone(),
        Published {
            size,
            relative_center,
            border_inset: inset(layout.border),
            padding_inset: inset(layout.padding),
            content_size: Vec2::new(layout.content_size.width, layout.content_size.height) / scale,
        },
    ));

    let children: Vec<_> = inner.children.borrow().iter().filter_map(Weak::upgrade).collect();
    for child in &children {
        collect(child, Some(size), out);
    }
}

fn publish(inner: &NodeInner, published: Published) {
    let outputs = &inner.outputs;
    let max_scroll = if outputs.overflow.peek() == Overflow::Scroll {
        (published.content_size - published.size).max(Vec2::ZERO)
    } else {
        Vec2::ZERO
    };

    outputs.size.set(published.size);
    outputs.relative_center.set(published.relative_center);
    outputs.border_inset.set(published.border_inset);
    outputs.padding_inset.set(published.padding_inset);
    outputs.content_size.set(published.content_size);
    outputs.max_scroll_position.set(max_scroll);
}
