//! Reactive Runtime - Arena of signal/derived/effect nodes.
//!
//! Every reactive cell lives in a thread-local arena addressed by a
//! generational [`NodeId`]. Edges are stored on both ends (`sources` and
//! `observers`) so invalidation can push down the graph and evaluation can
//! pull up it.
//!
//! # Propagation
//!
//! ```text
//! set(signal)  → direct observers: Dirty, transitive observers: Check
//! get(derived) → Check: refresh sources, Dirty only if one really changed
//!              → Dirty: recompute once, rewire sources
//! end of batch → run queued effects (each at most once per pass)
//! ```
//!
//! A node is recomputed at most once per propagation batch, and a derived that
//! recomputes to an equal value (`PartialEq`) does not dirty its observers.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// Node Types
// =============================================================================

/// Generational index of a node in the reactive arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NodeState {
    Clean = 0,
    Check = 1,
    Dirty = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Source,
    Derived,
    Effect,
}

pub(crate) type AnyValue = Box<dyn Any>;
pub(crate) type ComputeFn = Rc<dyn Fn() -> AnyValue>;
pub(crate) type EffectFn = Rc<RefCell<dyn FnMut()>>;
pub(crate) type EqFn = fn(&dyn Any, &dyn Any) -> bool;

/// Equality over type-erased values of a known type.
pub(crate) fn eq_any<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

struct Node {
    kind: NodeKind,
    state: NodeState,
    value: Option<AnyValue>,
    eq: Option<EqFn>,
    compute: Option<ComputeFn>,
    effect: Option<EffectFn>,
    sources: Vec<NodeId>,
    observers: Vec<NodeId>,
    computing: bool,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A computation currently being evaluated.
struct Tracker {
    node: Option<NodeId>,
    kind: NodeKind,
    sources: Vec<NodeId>,
}

/// Upper bound on effect re-runs within one flush; exceeding it means an
/// effect keeps invalidating itself.
const MAX_EFFECT_RUNS: usize = 100_000;

pub(crate) struct Runtime {
    slots: Vec<Slot>,
    free: Vec<u32>,
    tracking: Vec<Tracker>,
    batch_depth: u32,
    pending_effects: Vec<NodeId>,
    flushing: bool,
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());

    /// Nodes whose handles were dropped while the arena was borrowed.
    static PENDING_DISPOSE: RefCell<Vec<NodeId>> = const { RefCell::new(Vec::new()) };
}

impl Runtime {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            tracking: Vec::new(),
            batch_depth: 0,
            pending_effects: Vec::new(),
            flushing: false,
        }
    }

    fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    fn try_node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn try_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node(&self, id: NodeId) -> &Node {
        self.try_node(id)
            .unwrap_or_else(|| panic!("reactive node {id:?} used after dispose"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.try_node_mut(id)
            .unwrap_or_else(|| panic!("reactive node {id:?} used after dispose"))
    }

    /// Push invalidation: `id` gets `state`, everything downstream gets `Check`.
    fn mark(&mut self, id: NodeId, state: NodeState) {
        let mut stack = vec![(id, state)];
        while let Some((id, state)) = stack.pop() {
            let Some(node) = self.try_node_mut(id) else { continue };
            if node.state >= state {
                continue;
            }
            let was_clean = node.state == NodeState::Clean;
            node.state = state;
            let is_effect = node.kind == NodeKind::Effect;
            if was_clean {
                for &observer in &node.observers {
                    stack.push((observer, NodeState::Check));
                }
            }
            if was_clean && is_effect {
                self.pending_effects.push(id);
            }
        }
    }

    fn record_read(&mut self, id: NodeId) {
        if let Some(tracker) = self.tracking.last_mut() {
            if tracker.node.is_some() && !tracker.sources.contains(&id) {
                tracker.sources.push(id);
            }
        }
    }

    /// Replace the source edges of `id` with `sources`.
    fn rewire(&mut self, id: NodeId, sources: Vec<NodeId>) {
        let old = std::mem::take(&mut self.node_mut(id).sources);
        for source in &old {
            if !sources.contains(source) {
                if let Some(node) = self.try_node_mut(*source) {
                    node.observers.retain(|o| *o != id);
                }
            }
        }
        for source in &sources {
            if !old.contains(source) {
                if let Some(node) = self.try_node_mut(*source) {
                    node.observers.push(id);
                }
            }
        }
        self.node_mut(id).sources = sources;
    }

    /// Unlink and take a node out of the arena. The caller drops it once the
    /// arena borrow is released.
    fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        for source in &node.sources {
            if let Some(s) = self.try_node_mut(*source) {
                s.observers.retain(|o| *o != id);
            }
        }
        for observer in &node.observers {
            if let Some(o) = self.try_node_mut(*observer) {
                o.sources.retain(|s| *s != id);
            }
        }
        self.pending_effects.retain(|e| *e != id);
        Some(node)
    }

    fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }
}

// =============================================================================
// Arena Access
// =============================================================================

fn with<R>(f: impl FnOnce(&mut Runtime) -> R) -> R {
    RUNTIME.with(|rt| f(&mut rt.borrow_mut()))
}

/// Pops the tracker even if the computation panics.
struct TrackerGuard;

impl Drop for TrackerGuard {
    fn drop(&mut self) {
        let _ = RUNTIME.try_with(|rt| {
            if let Ok(mut rt) = rt.try_borrow_mut() {
                rt.tracking.pop();
            }
        });
    }
}

fn run_tracked<R>(id: Option<NodeId>, kind: NodeKind, f: impl FnOnce() -> R) -> (R, Vec<NodeId>) {
    with(|rt| {
        rt.tracking.push(Tracker { node: id, kind, sources: Vec::new() })
    });
    let guard = TrackerGuard;
    let result = f();
    let tracker = with(|rt| rt.tracking.pop());
    std::mem::forget(guard);
    (result, tracker.map(|t| t.sources).unwrap_or_default())
}

// =============================================================================
// Node Creation
// =============================================================================

pub(crate) fn create_source(value: AnyValue, eq: EqFn) -> NodeId {
    with(|rt| {
        rt.insert(Node {
            kind: NodeKind::Source,
            state: NodeState::Clean,
            value: Some(value),
            eq: Some(eq),
            compute: None,
            effect: None,
            sources: Vec::new(),
            observers: Vec::new(),
            computing: false,
        })
    })
}

pub(crate) fn create_derived(compute: ComputeFn, eq: EqFn) -> NodeId {
    with(|rt| {
        rt.insert(Node {
            kind: NodeKind::Derived,
            state: NodeState::Dirty,
            value: None,
            eq: Some(eq),
            compute: Some(compute),
            effect: None,
            sources: Vec::new(),
            observers: Vec::new(),
            computing: false,
        })
    })
}

/// Create an effect node and run it once.
pub(crate) fn create_effect(effect: EffectFn) -> NodeId {
    let id = with(|rt| {
        rt.insert(Node {
            kind: NodeKind::Effect,
            state: NodeState::Dirty,
            value: None,
            eq: None,
            compute: None,
            effect: Some(effect),
            sources: Vec::new(),
            observers: Vec::new(),
            computing: false,
        })
    });
    refresh(id);
    flush_effects();
    id
}

// =============================================================================
// Read / Write
// =============================================================================

/// Read a node's value, registering a dependency with the running computation.
pub(crate) fn read<R>(id: NodeId, tracked: bool, f: impl FnOnce(&dyn Any) -> R) -> R {
    refresh(id);
    RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        if tracked {
            rt.record_read(id);
        }
        let value = rt
            .node(id)
            .value
            .as_deref()
            .unwrap_or_else(|| panic!("reactive node {id:?} has no value"));
        f(value)
    })
}

/// Replace a source node's value. Equal values do not invalidate.
pub(crate) fn write(id: NodeId, value: AnyValue) {
    let previous = with(|rt| {
        let read_by_running = rt
            .tracking
            .iter()
            .any(|t| t.kind == NodeKind::Derived && t.sources.contains(&id));
        if read_by_running {
            panic!("signal {id:?} written while a derived that read it is evaluating");
        }

        let node = rt.node_mut(id);
        let unchanged = match (&node.value, node.eq) {
            (Some(old), Some(eq)) => eq(old.as_ref(), value.as_ref()),
            _ => false,
        };
        if unchanged {
            return Err(value);
        }
        let previous = node.value.replace(value);
        let observers = node.observers.clone();
        for observer in observers {
            rt.mark(observer, NodeState::Dirty);
        }
        Ok(previous)
    });
    drop(previous);
    flush_effects();
}

/// Bring a derived or effect node up to date.
fn refresh(id: NodeId) {
    let (kind, state) = with(|rt| {
        let node = rt.node(id);
        (node.kind, node.state)
    });
    if kind == NodeKind::Source || state == NodeState::Clean {
        return;
    }

    if state == NodeState::Check {
        let sources = with(|rt| rt.node(id).sources.clone());
        for source in sources {
            let live = with(|rt| rt.try_node(source).is_some());
            if live {
                refresh(source);
            }
            let now = with(|rt| rt.try_node(id).map(|n| n.state));
            if now == Some(NodeState::Dirty) {
                break;
            }
        }
    }

    // Clean before evaluating so writes made during an effect re-queue it.
    let dirty = with(|rt| match rt.try_node_mut(id) {
        Some(node) => {
            let dirty = node.state == NodeState::Dirty;
            node.state = NodeState::Clean;
            dirty
        }
        None => false,
    });
    if dirty {
        match kind {
            NodeKind::Derived => recompute_derived(id),
            NodeKind::Effect => run_effect(id),
            NodeKind::Source => {}
        }
    }
}

fn recompute_derived(id: NodeId) {
    let compute = with(|rt| {
        let node = rt.node_mut(id);
        if node.computing {
            panic!("cycle detected while evaluating derived {id:?}");
        }
        node.computing = true;
        node.compute.clone()
    });
    let Some(compute) = compute else { return };

    let (value, sources) = run_tracked(Some(id), NodeKind::Derived, || compute());

    let replaced = with(|rt| {
        rt.rewire(id, sources);
        let node = rt.node_mut(id);
        node.computing = false;
        let changed = match (&node.value, node.eq) {
            (Some(old), Some(eq)) => !eq(old.as_ref(), value.as_ref()),
            _ => true,
        };
        if !changed {
            return Some(value);
        }
        let previous = node.value.replace(value);
        let observers = node.observers.clone();
        // Observers still evaluating are pulling this value right now.
        for observer in observers {
            if !rt.tracking.iter().any(|t| t.node == Some(observer)) {
                rt.mark(observer, NodeState::Dirty);
            }
        }
        previous
    });
    drop(compute);
    drop(replaced);
}

fn run_effect(id: NodeId) {
    let effect = with(|rt| rt.try_node(id).and_then(|n| n.effect.clone()));
    let Some(effect) = effect else { return };
    let ((), sources) = run_tracked(Some(id), NodeKind::Effect, || {
        (effect.borrow_mut())();
    });
    with(|rt| {
        if rt.try_node(id).is_some() {
            rt.rewire(id, sources);
        }
    });
}

fn flush_effects() {
    let should_flush = with(|rt| {
        if rt.flushing || rt.batch_depth > 0 || rt.tracking.iter().any(|t| t.node.is_some()) {
            return false;
        }
        rt.flushing = true;
        true
    });
    if !should_flush {
        return;
    }

    let mut runs = 0usize;
    loop {
        drain_pending_dispose();
        let next = with(|rt| {
            if rt.pending_effects.is_empty() {
                None
            } else {
                Some(rt.pending_effects.remove(0))
            }
        });
        let Some(id) = next else { break };
        runs += 1;
        if runs > MAX_EFFECT_RUNS {
            with(|rt| rt.flushing = false);
            panic!("effects did not settle after {MAX_EFFECT_RUNS} runs");
        }
        let live = with(|rt| rt.try_node(id).is_some());
        if live {
            refresh(id);
        }
    }
    with(|rt| rt.flushing = false);
}

// =============================================================================
// Disposal
// =============================================================================

pub(crate) fn dispose(id: NodeId) {
    let removed = RUNTIME.try_with(|rt| match rt.try_borrow_mut() {
        Ok(mut rt) => Ok(rt.remove(id)),
        Err(_) => Err(()),
    });
    match removed {
        Ok(Ok(node)) => drop(node),
        Ok(Err(())) => {
            let _ = PENDING_DISPOSE.try_with(|pending| pending.borrow_mut().push(id));
        }
        Err(_) => {}
    }
}

fn drain_pending_dispose() {
    loop {
        let next = PENDING_DISPOSE.with(|pending| pending.borrow_mut().pop());
        let Some(id) = next else { break };
        let node = with(|rt| rt.remove(id));
        drop(node);
    }
}

// =============================================================================
// Public Helpers
// =============================================================================

/// Run `f` with all signal writes batched; effects run once when the
/// outermost batch ends.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    struct BatchGuard;
    impl Drop for BatchGuard {
        fn drop(&mut self) {
            let _ = RUNTIME.try_with(|rt| {
                if let Ok(mut rt) = rt.try_borrow_mut() {
                    rt.batch_depth -= 1;
                }
            });
        }
    }

    with(|rt| rt.batch_depth += 1);
    let result = {
        let _guard = BatchGuard;
        f()
    };
    flush_effects();
    result
}

/// Run `f` without registering any dependencies.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let (result, _) = run_tracked(None, NodeKind::Effect, f);
    result
}

/// Whether a derived or effect is currently evaluating.
pub fn is_tracking() -> bool {
    with(|rt| rt.tracking.iter().rev().any(|t| t.node.is_some()))
}

/// Number of live nodes in this thread's arena.
pub fn live_node_count() -> usize {
    drain_pending_dispose();
    with(|rt| rt.live_count())
}
