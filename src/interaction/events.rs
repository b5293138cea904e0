//! Pointer events and handler sets.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;

/// Pointer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Enter,
    Leave,
    Down,
    Up,
    Move,
}

impl PointerAction {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

/// Pointer event; `point` is on the root plane in root space, world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    pub point: Vec2,
}

impl PointerEvent {
    pub fn new(pointer_id: u32, point: Vec2) -> Self {
        Self { pointer_id, point }
    }
}

/// Wheel event; `delta` is in layout units, positive Y scrolls down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub pointer_id: u32,
    pub point: Vec2,
    pub delta: Vec2,
}

impl WheelEvent {
    pub fn new(pointer_id: u32, point: Vec2, delta: Vec2) -> Self {
        Self { pointer_id, point, delta }
    }
}

pub type PointerHandler = Rc<dyn Fn(&PointerEvent)>;

/// Wheel handler. Return true to consume the event.
pub type WheelHandler = Rc<dyn Fn(&WheelEvent) -> bool>;

/// Handlers of one element, in registration order per action.
#[derive(Clone, Default)]
pub struct EventHandlers {
    pointer: [Vec<PointerHandler>; PointerAction::COUNT],
    wheel: Vec<WheelHandler>,
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("pointer", &self.pointer.iter().map(Vec::len).collect::<Vec<_>>())
            .field("wheel", &self.wheel.len())
            .finish()
    }
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, action: PointerAction, handler: impl Fn(&PointerEvent) + 'static) -> Self {
        self.add(action, Rc::new(handler));
        self
    }

    pub fn on_wheel(mut self, handler: impl Fn(&WheelEvent) -> bool + 'static) -> Self {
        self.wheel.push(Rc::new(handler));
        self
    }

    pub fn add(&mut self, action: PointerAction, handler: PointerHandler) {
        self.pointer[action.index()].push(handler);
    }

    pub fn add_wheel(&mut self, handler: WheelHandler) {
        self.wheel.push(handler);
    }

    /// Append every handler of `other` after the existing ones.
    pub fn merge(&mut self, other: &EventHandlers) {
        for (mine, theirs) in self.pointer.iter_mut().zip(&other.pointer) {
            mine.extend(theirs.iter().cloned());
        }
        self.wheel.extend(other.wheel.iter().cloned());
    }

    /// One set running every input set in order.
    pub fn merged<'a>(sets: impl IntoIterator<Item = &'a EventHandlers>) -> Self {
        let mut out = Self::new();
        for set in sets {
            out.merge(set);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.pointer.iter().all(Vec::is_empty) && self.wheel.is_empty()
    }

    pub fn handles(&self, action: PointerAction) -> bool {
        !self.pointer[action.index()].is_empty()
    }

    pub fn handles_wheel(&self) -> bool {
        !self.wheel.is_empty()
    }

    pub fn emit(&self, action: PointerAction, event: &PointerEvent) {
        for handler in &self.pointer[action.index()] {
            handler(event);
        }
    }

    /// Runs every wheel handler; true if any consumed.
    pub fn emit_wheel(&self, event: &WheelEvent) -> bool {
        let mut consumed = false;
        for handler in &self.wheel {
            consumed |= handler(event);
        }
        consumed
    }
}
