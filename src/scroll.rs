//! Scroll state for `overflow: scroll` containers.
//!
//! Position is a signal in layout units, always inside
//! `[0, max_scroll_position]`. Wheel and drag handlers write it directly; the
//! frame pass applies drag inertia with exponential friction.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat4, Vec2};
use tracing::trace;

use crate::reactive::{effect, signal, Effect, Signal};
use crate::transform::scroll_matrix;

/// Velocity below which inertia stops, layout units per second.
const MIN_VELOCITY: f32 = 0.01;

// =============================================================================
// CLAMPING
// =============================================================================

/// Clamp a position into `[0, max]`; a negative max (content smaller than
/// the container) clamps to zero.
pub fn clamp_scroll(position: Vec2, max: Vec2) -> Vec2 {
    position.clamp(Vec2::ZERO, max.max(Vec2::ZERO))
}

// =============================================================================
// SCROLL STATE
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Drag {
    last: Vec2,
}

struct ScrollInner {
    position: Signal<Vec2>,
    max: Signal<Vec2>,
    velocity: Cell<Vec2>,
    drag_delta: Cell<Vec2>,
    drags: RefCell<HashMap<u32, Drag>>,
    friction: f32,
    wheel_multiplier: f32,
    clamp_effect: RefCell<Option<Effect>>,
}

impl Drop for ScrollInner {
    fn drop(&mut self) {
        if let Some(clamp) = self.clamp_effect.get_mut().take() {
            clamp.stop();
        }
    }
}

/// Scroll position of one container.
#[derive(Clone)]
pub struct ScrollState {
    inner: Rc<ScrollInner>,
}

impl std::fmt::Debug for ScrollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollState")
            .field("position", &self.inner.position.peek())
            .field("max", &self.inner.max.peek())
            .field("velocity", &self.inner.velocity.get())
            .finish()
    }
}

impl ScrollState {
    /// `max` is the layout node's max scroll position. `friction` is the
    /// fraction of velocity kept per second.
    pub fn new(max: Signal<Vec2>, friction: f32, wheel_multiplier: f32) -> Self {
        let state = Self {
            inner: Rc::new(ScrollInner {
                position: signal(Vec2::ZERO),
                max,
                velocity: Cell::new(Vec2::ZERO),
                drag_delta: Cell::new(Vec2::ZERO),
                drags: RefCell::new(HashMap::new()),
                friction: friction.clamp(0.0, 1.0),
                wheel_multiplier,
                clamp_effect: RefCell::new(None),
            }),
        };

        let weak = Rc::downgrade(&state.inner);
        let clamp = effect(move || {
            let Some(inner) = weak.upgrade() else { return };
            let max = inner.max.get();
            inner.position.set(clamp_scroll(inner.position.peek(), max));
        });
        *state.inner.clamp_effect.borrow_mut() = Some(clamp);
        state
    }

    pub fn position(&self) -> &Signal<Vec2> {
        &self.inner.position
    }

    pub fn max(&self) -> Vec2 {
        self.inner.max.get()
    }

    pub fn velocity(&self) -> Vec2 {
        self.inner.velocity.get()
    }

    /// Whether there is anything to scroll on either axis.
    pub fn is_scrollable(&self) -> bool {
        let max = self.inner.max.peek();
        max.x > 0.0 || max.y > 0.0
    }

    pub fn is_dragging(&self) -> bool {
        !self.inner.drags.borrow().is_empty()
    }

    /// Set the position (clamped).
    pub fn scroll_to(&self, position: Vec2) {
        self.inner.position.set(clamp_scroll(position, self.inner.max.peek()));
    }

    /// Scroll by a delta. Returns `false` if already at the boundary.
    pub fn scroll_by(&self, delta: Vec2) -> bool {
        let current = self.inner.position.peek();
        let next = clamp_scroll(current + delta, self.inner.max.peek());
        if next == current {
            return false;
        }
        self.inner.position.set(next);
        true
    }

    pub fn scroll_to_top(&self) {
        let current = self.inner.position.peek();
        self.scroll_to(Vec2::new(current.x, 0.0));
    }

    pub fn scroll_to_bottom(&self) {
        let current = self.inner.position.peek();
        self.scroll_to(Vec2::new(current.x, self.inner.max.peek().y));
    }

    pub fn scroll_to_start(&self) {
        let current = self.inner.position.peek();
        self.scroll_to(Vec2::new(0.0, current.y));
    }

    pub fn scroll_to_end(&self) {
        let current = self.inner.position.peek();
        self.scroll_to(Vec2::new(self.inner.max.peek().x, current.y));
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Wheel delta in wheel units; stops any inertia.
    pub fn on_wheel(&self, delta: Vec2) -> bool {
        self.inner.velocity.set(Vec2::ZERO);
        self.scroll_by(delta * self.inner.wheel_multiplier)
    }

    /// `point` is the pointer position on the container plane, layout units.
    pub fn on_pointer_down(&self, pointer_id: u32, point: Vec2) {
        self.inner.velocity.set(Vec2::ZERO);
        self.inner.drag_delta.set(Vec2::ZERO);
        self.inner.drags.borrow_mut().insert(pointer_id, Drag { last: point });
    }

    /// Drags the content with the pointer. Returns whether the position moved.
    pub fn on_pointer_move(&self, pointer_id: u32, point: Vec2) -> bool {
        let delta = {
            let mut drags = self.inner.drags.borrow_mut();
            let Some(drag) = drags.get_mut(&pointer_id) else { return false };
            let delta = drag.last - point;
            drag.last = point;
            delta
        };
        self.inner.drag_delta.set(self.inner.drag_delta.get() + delta);
        self.scroll_by(delta)
    }

    pub fn on_pointer_up(&self, pointer_id: u32) {
        self.inner.drags.borrow_mut().remove(&pointer_id);
    }

    /// Per-frame pass: measures drag velocity while dragging, applies
    /// inertia otherwise. `delta` is in seconds.
    pub fn on_frame(&self, delta: f32) {
        if delta <= 0.0 {
            return;
        }

        if self.is_dragging() {
            self.inner.velocity.set(self.inner.drag_delta.get() / delta);
            self.inner.drag_delta.set(Vec2::ZERO);
            return;
        }

        let velocity = self.inner.velocity.get();
        if velocity.length() < MIN_VELOCITY {
            self.inner.velocity.set(Vec2::ZERO);
            return;
        }

        let current = self.inner.position.peek();
        let max = self.inner.max.peek();
        let next = clamp_scroll(current + velocity * delta, max);

        // stop on any axis that hit a bound
        let mut decayed = velocity * self.inner.friction.powf(delta);
        if next.x != current.x + velocity.x * delta {
            decayed.x = 0.0;
        }
        if next.y != current.y + velocity.y * delta {
            decayed.y = 0.0;
        }
        trace!(target: "spark_spatial::scroll", ?next, ?decayed, "inertia step");

        self.inner.velocity.set(decayed);
        self.inner.position.set(next);
    }

    /// Content offset matrix for children, see [`scroll_matrix`].
    pub fn matrix(&self, pixel_size: f32) -> Mat4 {
        scroll_matrix(self.inner.position.get(), pixel_size)
    }

    /// Stop reacting to layout changes.
    pub fn destroy(&self) {
        if let Some(clamp) = self.inner.clamp_effect.borrow_mut().take() {
            clamp.stop();
        }
        self.inner.drags.borrow_mut().clear();
        self.inner.velocity.set(Vec2::ZERO);
    }
}

/// Scroll the first state in `chain` that can still move, innermost first.
pub fn scroll_by_with_chaining<'a>(chain: impl IntoIterator<Item = &'a ScrollState>, delta: Vec2) -> bool {
    chain.into_iter().any(|state| state.scroll_by(delta))
}

// =============================================================================
// SCROLLBARS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn pick(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }
}

/// Scrollbar thumb along one axis, layout units from the container's
/// start edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarGeometry {
    pub offset: f32,
    pub length: f32,
    pub thickness: f32,
}

/// Thumb geometry for `axis`; `None` when the content fits.
pub fn compute_scrollbar(
    axis: Axis,
    content_size: Vec2,
    container_size: Vec2,
    position: Vec2,
    scrollbar_width: f32,
) -> Option<ScrollbarGeometry> {
    let content = axis.pick(content_size);
    let container = axis.pick(container_size);
    if content <= container || container <= 0.0 || scrollbar_width <= 0.0 {
        return None;
    }

    let length = (container * container / content).max(scrollbar_width).min(container);
    let max_scroll = content - container;
    let progress = (axis.pick(position) / max_scroll).clamp(0.0, 1.0);
    Some(ScrollbarGeometry { offset: progress * (container - length), length, thickness: scrollbar_width })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(max: Vec2) -> (Signal<Vec2>, ScrollState) {
        let max = signal(max);
        let state = ScrollState::new(max.clone(), 0.05, 1.0);
        (max, state)
    }

    #[test]
    fn test_clamp_scroll() {
        assert_eq!(clamp_scroll(Vec2::new(-5.0, 50.0), Vec2::new(10.0, 20.0)), Vec2::new(0.0, 20.0));
        assert_eq!(clamp_scroll(Vec2::new(5.0, 5.0), Vec2::new(-3.0, 10.0)), Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_scroll_by_stops_at_boundary() {
        let (_max, state) = setup(Vec2::new(0.0, 20.0));
        assert!(state.is_scrollable());
        assert!(state.scroll_by(Vec2::new(0.0, 15.0)));
        assert!(state.scroll_by(Vec2::new(0.0, 15.0)));
        assert_eq!(state.position().get(), Vec2::new(0.0, 20.0));
        assert!(!state.scroll_by(Vec2::new(0.0, 1.0)));

        state.scroll_to_top();
        assert_eq!(state.position().get().y, 0.0);
        state.scroll_to_bottom();
        assert_eq!(state.position().get().y, 20.0);
    }

    #[test]
    fn test_layout_shrink_reclamps() {
        let (max, state) = setup(Vec2::new(0.0, 100.0));
        state.scroll_to(Vec2::new(0.0, 80.0));
        max.set(Vec2::new(0.0, 30.0));
        assert_eq!(state.position().get().y, 30.0);

        max.set(Vec2::new(0.0, -10.0));
        assert_eq!(state.position().get().y, 0.0);
    }

    #[test]
    fn test_drag_and_inertia() {
        let (_max, state) = setup(Vec2::new(0.0, 1000.0));
        state.on_pointer_down(1, Vec2::new(0.0, 100.0));
        // pointer moves up, content follows: scroll position grows
        assert!(state.on_pointer_move(1, Vec2::new(0.0, 90.0)));
        assert_eq!(state.position().get().y, 10.0);
        assert!(!state.on_pointer_move(2, Vec2::new(0.0, 0.0)));

        state.on_frame(0.1);
        assert_eq!(state.velocity(), Vec2::new(0.0, 100.0));
        state.on_pointer_up(1);

        state.on_frame(0.1);
        assert!((state.position().get().y - 20.0).abs() < 1e-4);
        let v1 = state.velocity().y;
        assert!(v1 < 100.0 && v1 > 0.0);

        for _ in 0..200 {
            state.on_frame(0.1);
        }
        assert_eq!(state.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_inertia_stops_at_bound() {
        let (_max, state) = setup(Vec2::new(0.0, 5.0));
        state.on_pointer_down(1, Vec2::ZERO);
        state.on_pointer_move(1, Vec2::new(0.0, -4.0));
        state.on_frame(0.1);
        state.on_pointer_up(1);

        state.on_frame(0.1);
        assert_eq!(state.position().get().y, 5.0);
        assert_eq!(state.velocity().y, 0.0);
    }

    #[test]
    fn test_chaining() {
        let (_a, inner) = setup(Vec2::new(0.0, 10.0));
        let (_b, outer) = setup(Vec2::new(0.0, 10.0));
        inner.scroll_to(Vec2::new(0.0, 10.0));

        assert!(scroll_by_with_chaining([&inner, &outer], Vec2::new(0.0, 3.0)));
        assert_eq!(outer.position().get().y, 3.0);
    }

    #[test]
    fn test_scrollbar_geometry() {
        let content = Vec2::new(100.0, 400.0);
        let container = Vec2::new(100.0, 100.0);

        assert_eq!(compute_scrollbar(Axis::X, content, container, Vec2::ZERO, 10.0), None);

        let bar = compute_scrollbar(Axis::Y, content, container, Vec2::new(0.0, 300.0), 10.0).unwrap();
        assert_eq!(bar.length, 25.0);
        assert_eq!(bar.offset, 75.0);
        assert_eq!(bar.thickness, 10.0);
    }
}
