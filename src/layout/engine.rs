//! Layout engine - one shared taffy tree per root.

use std::cell::RefCell;
use std::rc::Rc;

use taffy::{AvailableSpace, Layout, NodeId, Size, Style, TaffyTree, TraversePartialTree};
use tracing::trace;

use crate::error::{Result, UiError};

/// Measures leaf content in layout units.
///
/// Receives the known dimensions and the available space, both already
/// converted from engine units.
pub type MeasureFn = Rc<dyn Fn(Size<Option<f32>>, Size<AvailableSpace>) -> Size<f32>>;

/// Per-node context stored in the taffy tree.
#[derive(Clone, Default)]
pub struct NodeContext {
    measure: Option<MeasureFn>,
}

struct EngineState {
    tree: TaffyTree<NodeContext>,
    passes: usize,
}

/// Shared handle to a taffy tree plus the layout ↔ engine unit conversion.
#[derive(Clone)]
pub struct LayoutEngine {
    state: Rc<RefCell<EngineState>>,
    point_scale: f32,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("point_scale", &self.point_scale)
            .field("nodes", &self.node_count())
            .field("passes", &self.passes())
            .finish()
    }
}

fn engine_error(err: taffy::TaffyError) -> UiError {
    UiError::Layout(err.to_string())
}

fn scale_space(space: AvailableSpace, factor: f32) -> AvailableSpace {
    match space {
        AvailableSpace::Definite(v) => AvailableSpace::Definite(v * factor),
        other => other,
    }
}

impl LayoutEngine {
    pub fn new(point_scale: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(EngineState { tree: TaffyTree::new(), passes: 0 })),
            point_scale,
        }
    }

    /// Layout units are multiplied by this before reaching taffy.
    pub fn point_scale(&self) -> f32 {
        self.point_scale
    }

    /// Number of completed layout passes.
    pub fn passes(&self) -> usize {
        self.state.borrow().passes
    }

    /// Nodes currently alive in the tree.
    pub fn node_count(&self) -> usize {
        self.state.borrow().tree.total_node_count()
    }

    pub(crate) fn create_node(&self, style: Style, measure: Option<MeasureFn>) -> Result<NodeId> {
        let mut state = self.state.borrow_mut();
        let node = match measure {
            Some(measure) => state
                .tree
                .new_leaf_with_context(style, NodeContext { measure: Some(measure) }),
            None => state.tree.new_leaf(style),
        };
        node.map_err(engine_error)
    }

    /// Attach `child` under `parent`, at `index` or at the end.
    pub(crate) fn attach(&self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let count = state.tree.child_count(parent);
        let attached = match index {
            Some(index) if index < count => state.tree.insert_child_at_index(parent, index, child),
            _ => state.tree.add_child(parent, child),
        };
        attached.map_err(engine_error)
    }

    pub(crate) fn set_style(&self, node: NodeId, style: Style) -> Result<()> {
        self.state.borrow_mut().tree.set_style(node, style).map_err(engine_error)
    }

    /// Mark a measured node dirty after its content changed.
    pub(crate) fn mark_dirty(&self, node: NodeId) -> Result<()> {
        self.state.borrow_mut().tree.mark_dirty(node).map_err(engine_error)
    }

    /// Release `node`; its former parent is marked dirty so siblings reflow.
    pub(crate) fn remove(&self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        if let Some(parent) = state.tree.parent(node) {
            if let Err(err) = state.tree.mark_dirty(parent) {
                trace!(target: "spark_spatial::layout", %err, "parent already released");
            }
        }
        if let Err(err) = state.tree.remove(node) {
            trace!(target: "spark_spatial::layout", %err, "node already released");
        }
    }

    pub(crate) fn layout(&self, node: NodeId) -> Option<Layout> {
        self.state.borrow().tree.layout(node).ok().copied()
    }

    /// Run one synchronous pass from `root`.
    pub(crate) fn compute(&self, root: NodeId) -> Result<()> {
        let scale = self.point_scale;
        let mut state = self.state.borrow_mut();
        state.passes += 1;
        trace!(target: "spark_spatial::layout", pass = state.passes, "computing layout");

        let available = Size { width: AvailableSpace::MaxContent, height: AvailableSpace::MaxContent };
        state
            .tree
            .compute_layout_with_measure(
                root,
                available,
                |known_dimensions, available_space, _node_id, context, _style| {
                    let Some(measure) = context.and_then(|c| c.measure.clone()) else {
                        return Size::ZERO;
                    };
                    let known = Size {
                        width: known_dimensions.width.map(|w| w / scale),
                        height: known_dimensions.height.map(|h| h / scale),
                    };
                    let available = Size {
                        width: scale_space(available_space.width, 1.0 / scale),
                        height: scale_space(available_space.height, 1.0 / scale),
                    };
                    let size = measure(known, available);
                    Size { width: size.width * scale, height: size.height * scale }
                },
            )
            .map_err(engine_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_sees_layout_units() {
        let engine = LayoutEngine::new(100.0);
        let measure: MeasureFn = Rc::new(|_, _| Size { width: 3.0, height: 1.5 });
        let node = engine.create_node(Style::default(), Some(measure)).unwrap();

        engine.compute(node).unwrap();
        let layout = engine.layout(node).unwrap();
        assert_eq!(layout.size.width, 300.0);
        assert_eq!(layout.size.height, 150.0);
        assert_eq!(engine.passes(), 1);
    }

    #[test]
    fn test_insert_child_at_index() {
        let engine = LayoutEngine::new(1.0);
        let parent = engine.create_node(Style::default(), None).unwrap();
        let a = engine.create_node(Style::default(), None).unwrap();
        let b = engine.create_node(Style::default(), None).unwrap();

        engine.attach(parent, a, None).unwrap();
        engine.attach(parent, b, Some(0)).unwrap();

        let children = engine.state.borrow().tree.children(parent).unwrap();
        assert_eq!(children, vec![b, a]);
        assert_eq!(engine.node_count(), 3);

        engine.remove(b);
        assert_eq!(engine.node_count(), 2);
    }

    #[test]
    fn test_remove_reflows_parent() {
        let engine = LayoutEngine::new(1.0);
        let leaf = || Style {
            size: Size { width: taffy::Dimension::Length(5.0), height: taffy::Dimension::Length(5.0) },
            ..Style::default()
        };
        let parent = engine.create_node(Style::default(), None).unwrap();
        let a = engine.create_node(leaf(), None).unwrap();
        let b = engine.create_node(leaf(), None).unwrap();
        engine.attach(parent, a, None).unwrap();
        engine.attach(parent, b, None).unwrap();

        engine.compute(parent).unwrap();
        assert_eq!(engine.layout(parent).unwrap().size.width, 10.0);

        engine.remove(a);
        engine.compute(parent).unwrap();
        assert_eq!(engine.layout(parent).unwrap().size.width, 5.0);
        assert_eq!(engine.layout(b).unwrap().location.x, 0.0);
    }
}
