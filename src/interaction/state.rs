//! Hover and active state of one element.
//!
//! Tracks pointers by id so two pointers over the same element leave it
//! hovered until both are gone.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::properties::PropValue;
use crate::reactive::{signal, Signal};

use super::events::{EventHandlers, PointerAction};

#[derive(Default)]
struct Pointers {
    hovering: HashSet<u32>,
    pressing: HashSet<u32>,
}

/// `hovered` / `active` signals driven by pointer events.
#[derive(Clone)]
pub struct InteractionState {
    hovered: Signal<bool>,
    active: Signal<bool>,
    pointers: Rc<RefCell<Pointers>>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionState")
            .field("hovered", &self.hovered.peek())
            .field("active", &self.active.peek())
            .finish()
    }
}

impl InteractionState {
    pub fn new() -> Self {
        Self { hovered: signal(false), active: signal(false), pointers: Rc::default() }
    }

    pub fn hovered(&self) -> &Signal<bool> {
        &self.hovered
    }

    pub fn active(&self) -> &Signal<bool> {
        &self.active
    }

    /// Condition inputs for a `ConditionContext`.
    pub fn conditions(&self) -> (PropValue<bool>, PropValue<bool>) {
        (self.hovered.clone().into(), self.active.clone().into())
    }

    pub fn pointer_enter(&self, pointer_id: u32) {
        self.pointers.borrow_mut().hovering.insert(pointer_id);
        self.sync();
    }

    pub fn pointer_leave(&self, pointer_id: u32) {
        {
            let mut pointers = self.pointers.borrow_mut();
            pointers.hovering.remove(&pointer_id);
            pointers.pressing.remove(&pointer_id);
        }
        self.sync();
    }

    pub fn pointer_down(&self, pointer_id: u32) {
        self.pointers.borrow_mut().pressing.insert(pointer_id);
        self.sync();
    }

    pub fn pointer_up(&self, pointer_id: u32) {
        self.pointers.borrow_mut().pressing.remove(&pointer_id);
        self.sync();
    }

    /// Forget every pointer.
    pub fn reset(&self) {
        *self.pointers.borrow_mut() = Pointers::default();
        self.sync();
    }

    fn sync(&self) {
        let (hovered, active) = {
            let pointers = self.pointers.borrow();
            (!pointers.hovering.is_empty(), !pointers.pressing.is_empty())
        };
        self.hovered.set(hovered);
        self.active.set(active);
    }

    /// Handlers feeding this state.
    pub fn handlers(&self) -> EventHandlers {
        let (enter, leave, down, up) = (self.clone(), self.clone(), self.clone(), self.clone());
        EventHandlers::new()
            .on(PointerAction::Enter, move |e| enter.pointer_enter(e.pointer_id))
            .on(PointerAction::Leave, move |e| leave.pointer_leave(e.pointer_id))
            .on(PointerAction::Down, move |e| down.pointer_down(e.pointer_id))
            .on(PointerAction::Up, move |e| up.pointer_up(e.pointer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerEvent;
    use glam::Vec2;

    #[test]
    fn test_two_pointers_hover() {
        let state = InteractionState::new();
        state.pointer_enter(1);
        state.pointer_enter(2);
        state.pointer_leave(1);
        assert!(state.hovered().get());
        state.pointer_leave(2);
        assert!(!state.hovered().get());
    }

    #[test]
    fn test_leave_clears_active() {
        let state = InteractionState::new();
        let handlers = state.handlers();
        let event = PointerEvent::new(7, Vec2::ZERO);

        handlers.emit(PointerAction::Enter, &event);
        handlers.emit(PointerAction::Down, &event);
        assert!(state.active().get());

        handlers.emit(PointerAction::Leave, &event);
        assert!(!state.active().get());
        assert!(!state.hovered().get());
    }
}
