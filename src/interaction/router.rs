//! Pointer routing to layout-aware hit targets.
//!
//! Every interactive element registers a target whose bounds follow its
//! layout. A pointer hits the top-most target (by paint order) whose bounds
//! and clip rect contain the point; events then run on the hit target and
//! each of its ancestors. A pointer pressed on a target stays captured by it
//! until released.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::clipping::ClipRect;
use crate::order::OrderInfo;

use super::events::{EventHandlers, PointerAction, PointerEvent, WheelEvent};

/// Identifies one hit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

#[derive(Debug)]
struct HitTarget {
    parent: Option<TargetId>,
    handlers: EventHandlers,
    bounds: ClipRect,
    clip: Option<ClipRect>,
    order: OrderInfo,
    enabled: bool,
}

impl HitTarget {
    fn hit(&self, event_point: glam::Vec2) -> bool {
        self.enabled
            && !self.bounds.is_empty()
            && self.bounds.contains(event_point)
            && self.clip.is_none_or(|clip| clip.contains(event_point))
    }
}

#[derive(Debug, Default)]
struct RouterState {
    targets: HashMap<TargetId, HitTarget>,
    next_id: u64,
    /// Hovered path per pointer, innermost first.
    hovered: HashMap<u32, Vec<TargetId>>,
    captured: HashMap<u32, Vec<TargetId>>,
}

impl RouterState {
    fn path(&self, target: Option<TargetId>) -> Vec<TargetId> {
        let mut path = Vec::new();
        let mut current = target;
        while let Some(id) = current {
            let Some(entry) = self.targets.get(&id) else { break };
            path.push(id);
            current = entry.parent;
        }
        path
    }

    fn handlers(&self, path: &[TargetId]) -> Vec<EventHandlers> {
        path.iter().filter_map(|id| self.targets.get(id)).map(|t| t.handlers.clone()).collect()
    }
}

/// Hit targets of one root.
#[derive(Clone, Default)]
pub struct PointerRouter {
    state: Rc<RefCell<RouterState>>,
}

impl std::fmt::Debug for PointerRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PointerRouter")
            .field("targets", &state.targets.len())
            .field("hovered", &state.hovered.len())
            .finish()
    }
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&self, parent: Option<TargetId>, handlers: EventHandlers) -> TargetId {
        let mut state = self.state.borrow_mut();
        let id = TargetId(state.next_id);
        state.next_id += 1;
        state.targets.insert(
            id,
            HitTarget {
                parent,
                handlers,
                bounds: ClipRect::EMPTY,
                clip: None,
                order: OrderInfo::ROOT,
                enabled: true,
            },
        );
        id
    }

    /// Update where a target is; `clip` limits the hittable area.
    pub fn set_bounds(&self, id: TargetId, bounds: ClipRect, clip: Option<ClipRect>, order: OrderInfo) {
        if let Some(target) = self.state.borrow_mut().targets.get_mut(&id) {
            target.bounds = bounds;
            target.clip = clip;
            target.order = order;
        }
    }

    /// Disabled targets are skipped by hit-testing (`pointerEvents: none`).
    pub fn set_enabled(&self, id: TargetId, enabled: bool) {
        if let Some(target) = self.state.borrow_mut().targets.get_mut(&id) {
            target.enabled = enabled;
        }
    }

    pub fn set_handlers(&self, id: TargetId, handlers: EventHandlers) {
        if let Some(target) = self.state.borrow_mut().targets.get_mut(&id) {
            target.handlers = handlers;
        }
    }

    /// Forget a target without emitting events.
    pub fn remove_target(&self, id: TargetId) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        state.targets.remove(&id);
        for path in state.hovered.values_mut().chain(state.captured.values_mut()) {
            path.retain(|t| *t != id);
        }
    }

    pub fn target_count(&self) -> usize {
        self.state.borrow().targets.len()
    }

    /// Top-most target at `point`; later registration wins ties.
    pub fn hit_test(&self, point: glam::Vec2) -> Option<TargetId> {
        let state = self.state.borrow();
        state
            .targets
            .iter()
            .filter(|(_, target)| target.hit(point))
            .max_by(|(a_id, a), (b_id, b)| a.order.cmp(&b.order).then(a_id.cmp(b_id)))
            .map(|(id, _)| *id)
    }

    /// Whether `target` is on the hovered path of any pointer.
    pub fn is_hovered(&self, target: TargetId) -> bool {
        self.state.borrow().hovered.values().any(|path| path.contains(&target))
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    pub fn pointer_move(&self, event: &PointerEvent) {
        self.update_hover(event);
        let path = self.active_path(event);
        self.emit(&path, PointerAction::Move, event);
    }

    pub fn pointer_down(&self, event: &PointerEvent) {
        let path = self.update_hover(event);
        self.state.borrow_mut().captured.insert(event.pointer_id, path.clone());
        self.emit(&path, PointerAction::Down, event);
    }

    pub fn pointer_up(&self, event: &PointerEvent) {
        self.update_hover(event);
        let path = self.active_path(event);
        self.state.borrow_mut().captured.remove(&event.pointer_id);
        self.emit(&path, PointerAction::Up, event);
    }

    /// The pointer left the root: leave every hovered target.
    pub fn pointer_cancel(&self, event: &PointerEvent) {
        let (hovered, captured) = {
            let mut state = self.state.borrow_mut();
            (
                state.hovered.remove(&event.pointer_id).unwrap_or_default(),
                state.captured.remove(&event.pointer_id).unwrap_or_default(),
            )
        };
        self.emit(&captured, PointerAction::Up, event);
        self.emit(&hovered, PointerAction::Leave, event);
    }

    /// Bubbles from the hit target outward until a handler consumes it.
    pub fn wheel(&self, event: &WheelEvent) -> bool {
        let path = {
            let hit = self.hit_test(event.point);
            self.state.borrow().path(hit)
        };
        let handlers = self.state.borrow().handlers(&path);
        for handlers in handlers {
            if handlers.emit_wheel(event) {
                return true;
            }
        }
        false
    }

    fn active_path(&self, event: &PointerEvent) -> Vec<TargetId> {
        let state = self.state.borrow();
        match state.captured.get(&event.pointer_id) {
            Some(path) => path.clone(),
            None => state.hovered.get(&event.pointer_id).cloned().unwrap_or_default(),
        }
    }

    /// Emit leave/enter for the change of hovered path; returns the new path.
    fn update_hover(&self, event: &PointerEvent) -> Vec<TargetId> {
        let hit = self.hit_test(event.point);
        let (left, entered, path) = {
            let mut state = self.state.borrow_mut();
            let path = state.path(hit);
            let previous = state.hovered.insert(event.pointer_id, path.clone()).unwrap_or_default();
            let left: Vec<_> = previous.iter().copied().filter(|id| !path.contains(id)).collect();
            let entered: Vec<_> = path.iter().rev().copied().filter(|id| !previous.contains(id)).collect();
            (left, entered, path)
        };
        if !left.is_empty() || !entered.is_empty() {
            trace!(target: "spark_spatial::interaction", pointer = event.pointer_id, ?hit, "hover changed");
        }
        self.emit(&left, PointerAction::Leave, event);
        self.emit(&entered, PointerAction::Enter, event);
        path
    }

    fn emit(&self, path: &[TargetId], action: PointerAction, event: &PointerEvent) {
        let handlers = self.state.borrow().handlers(path);
        for set in handlers {
            set.emit(action, event);
        }
    }
}
