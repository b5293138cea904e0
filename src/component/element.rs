//! Element - the wiring every component shares.
//!
//! An element owns its merged properties and layout node, and derives from
//! them everything downstream: pixel size, paint order, visibility, global
//! and children matrices, clip rects. Effects push those into the hit
//! target, the cursor registry and (for elements with a panel) the panel
//! group manager. Everything an element registers is listed in its
//! subscriptions and released on [`Element::destroy`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::{Mat4, Vec2};
use tracing::debug;

use crate::batching::{InstanceSlots, PanelGroupKey, PanelInstance, PanelStyle};
use crate::clipping::{compute_clipping_rect, inset_rect, ClipRect};
use crate::error::Result;
use crate::frame::FrameHookId;
use crate::interaction::{EventHandlers, InteractionState, PointerAction, TargetId};
use crate::layout::{LayoutNode, MeasureFn};
use crate::order::OrderInfo;
use crate::properties::{ConditionContext, MergedProperties, PropertyKey, PropertySource, Transformers};
use crate::reactive::{derived, effect, Derived, Effect};
use crate::scroll::ScrollState;
use crate::subscriptions::Subscriptions;
use crate::theme::dark_condition;
use crate::transform::{children_matrix, local_matrix, read_anchors, root_matrix, TransformProps};
use crate::types::{Display, ElementType, Inset, Visibility};

use super::context::RootContext;

pub(crate) type PanelSlots = InstanceSlots<PanelGroupKey, PanelInstance>;

/// Material class used when `panelMaterialClass` is unset.
pub const DEFAULT_MATERIAL_CLASS: &str = "default";

#[derive(Default)]
pub(crate) struct ElementOptions {
    /// Child index under the parent; appended when `None`.
    pub index: Option<usize>,
    pub measure: Option<MeasureFn>,
    /// Draw a background/border panel.
    pub panel: bool,
    /// Own a scroll state driven by wheel and drag.
    pub scrollable: bool,
    /// Paint-order kind of this element.
    pub element_type: ElementType,
}

pub(crate) struct ElementInner {
    pub(crate) ctx: Rc<RootContext>,
    parent: Option<Weak<ElementInner>>,
    base_source: PropertySource,
    properties: MergedProperties,
    interaction: InteractionState,
    node: LayoutNode,
    pixel_size: Derived<f32>,
    order: Derived<OrderInfo>,
    visible: Derived<bool>,
    global_matrix: Derived<Mat4>,
    children_matrix: Derived<Mat4>,
    clipping: Derived<Option<ClipRect>>,
    children_clipping: Derived<Option<ClipRect>>,
    scroll: Option<ScrollState>,
    target: TargetId,
    builtin_handlers: EventHandlers,
    user_handlers: RefCell<EventHandlers>,
    subscriptions: Subscriptions,
    children: RefCell<Vec<Element>>,
    destroyed: Cell<bool>,
}

/// Shared handle to one element.
#[derive(Clone)]
pub struct Element {
    pub(crate) inner: Rc<ElementInner>,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("target", &self.inner.target)
            .field("children", &self.inner.children.borrow().len())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

impl Element {
    pub(crate) fn new(
        ctx: &Rc<RootContext>,
        parent: Option<&Element>,
        sources: Vec<PropertySource>,
        options: ElementOptions,
    ) -> Result<Self> {
        let interaction = InteractionState::new();
        let (hovered, active) = interaction.conditions();
        let context = ConditionContext {
            hovered,
            active,
            dark: dark_condition(),
            root_width: ctx.root_width.clone().into(),
            breakpoints: ctx.config.breakpoints.clone(),
        };

        let properties = MergedProperties::new(
            Transformers::standard(),
            context,
            parent.map(|p| p.inner.properties.clone()),
        );
        let base_source = match parent {
            Some(_) => ctx.theme.element_source(),
            None => ctx.theme.default_source(ctx.config.pixel_size),
        };
        properties.add_all(std::iter::once(base_source.clone()).chain(sources));

        let node = LayoutNode::new(
            &ctx.engine,
            &ctx.scheduler,
            &properties,
            parent.map(|p| &p.inner.node),
            options.index,
            options.measure,
        )?;
        let outputs = node.outputs().clone();

        let scroll = options.scrollable.then(|| {
            ScrollState::new(
                outputs.max_scroll_position.clone(),
                ctx.config.scroll_friction,
                ctx.config.wheel_multiplier,
            )
        });

        let pixel_size = {
            let (props, fallback) = (properties.clone(), ctx.config.pixel_size);
            derived(move || props.number_or(PropertyKey::PixelSize, fallback))
        };

        let order = {
            let props = properties.clone();
            let parent_order = parent.map(|p| p.inner.order.clone());
            let element_type = options.element_type;
            derived(move || {
                let z_index_offset = props.number_or(PropertyKey::ZIndexOffset, 0.0) as i32;
                match &parent_order {
                    Some(parent_order) => OrderInfo::child(&parent_order.get(), z_index_offset, element_type),
                    None => OrderInfo::new(z_index_offset, element_type, 0),
                }
            })
        };

        let visible = {
            let props = properties.clone();
            let parent_visible = parent.map(|p| p.inner.visible.clone());
            derived(move || {
                parent_visible.as_ref().is_none_or(|v| v.get())
                    && props.keyword::<Visibility>(PropertyKey::Visibility) == Visibility::Visible
                    && props.keyword::<Display>(PropertyKey::Display) != Display::None
            })
        };

        let global_matrix = {
            let (props, p) = (properties.clone(), pixel_size.clone());
            let (size, relative_center) = (outputs.size.clone(), outputs.relative_center.clone());
            let parent_children = parent.map(|p| p.inner.children_matrix.clone());
            let (default_x, default_y) = (ctx.config.anchor_x(), ctx.config.anchor_y());
            derived(move || {
                let (p, size) = (p.get(), size.get());
                let transform = TransformProps::read(&props);
                match &parent_children {
                    Some(parent_children) => {
                        parent_children.get() * local_matrix(&transform, relative_center.get(), size, p)
                    }
                    None => {
                        let (anchor_x, anchor_y) = read_anchors(&props, default_x, default_y);
                        root_matrix(anchor_x, anchor_y, size, p) * local_matrix(&transform, Vec2::ZERO, size, p)
                    }
                }
            })
        };

        let children_matrix_derived = {
            let (global, p, scroll) = (global_matrix.clone(), pixel_size.clone(), scroll.clone());
            derived(move || {
                let scroll = scroll.as_ref().map(|s| s.matrix(p.get()));
                children_matrix(&global.get(), scroll.as_ref())
            })
        };

        let clipping = {
            let parent_clipping = parent.map(|p| p.inner.children_clipping.clone());
            derived(move || parent_clipping.as_ref().and_then(|c| c.get()))
        };

        let children_clipping = {
            let (global, p, clipping) = (global_matrix.clone(), pixel_size.clone(), clipping.clone());
            let outputs = outputs.clone();
            derived(move || {
                compute_clipping_rect(
                    &global.get(),
                    outputs.size.get(),
                    outputs.border_inset.get(),
                    outputs.overflow.get(),
                    p.get(),
                    clipping.get().as_ref(),
                )
            })
        };

        let mut builtin_handlers = interaction.handlers();
        if let Some(scroll) = &scroll {
            builtin_handlers.merge(&scroll_handlers(scroll, &pixel_size));
        }
        let target = ctx.router.add_target(parent.map(|p| p.inner.target), builtin_handlers.clone());

        let element = Self {
            inner: Rc::new(ElementInner {
                ctx: ctx.clone(),
                parent: parent.map(|p| Rc::downgrade(&p.inner)),
                base_source,
                properties,
                interaction,
                node,
                pixel_size,
                order,
                visible,
                global_matrix,
                children_matrix: children_matrix_derived,
                clipping,
                children_clipping,
                scroll,
                target,
                builtin_handlers,
                user_handlers: RefCell::new(EventHandlers::new()),
                subscriptions: Subscriptions::new(),
                children: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        };

        element.wire_hit_target();
        element.wire_cursor();
        let panel_slots = options.panel.then(|| element.wire_panel());
        let frame_hook = element.inner.scroll.clone().map(|scroll| {
            ctx.frame_hooks.register(move |delta| scroll.on_frame(delta))
        });
        element.add_teardown(panel_slots, frame_hook);

        if let Some(parent) = parent {
            let mut children = parent.inner.children.borrow_mut();
            let at = options.index.unwrap_or(children.len()).min(children.len());
            children.insert(at, element.clone());
        }
        Ok(element)
    }

    fn wire_hit_target(&self) {
        let inner = &self.inner;
        let router = inner.ctx.router.clone();
        let target = inner.target;
        let (global, clipping, order, visible) = (
            inner.global_matrix.clone(),
            inner.clipping.clone(),
            inner.order.clone(),
            inner.visible.clone(),
        );
        let (size, p, props) = (inner.node.outputs().size.clone(), inner.pixel_size.clone(), inner.properties.clone());

        self.track(effect(move || {
            let bounds = inset_rect(&global.get(), size.get(), Inset::ZERO, p.get());
            router.set_bounds(target, bounds, clipping.get(), order.get());
            let pointer_events = props.string(PropertyKey::PointerEvents);
            router.set_enabled(target, visible.get() && pointer_events.as_deref() != Some("none"));
        }));
    }

    fn wire_cursor(&self) {
        let inner = &self.inner;
        let cursors = inner.ctx.cursors.clone();
        let owner = cursors.owner();
        let (hovered, props) = (inner.interaction.hovered().clone(), inner.properties.clone());

        self.track(effect(move || match (hovered.get(), props.string(PropertyKey::Cursor)) {
            (true, Some(cursor)) => cursors.request(owner, cursor),
            _ => cursors.release(owner),
        }));

        let cursors = inner.ctx.cursors.clone();
        inner.subscriptions.add(move || cursors.release(owner));
    }

    fn wire_panel(&self) -> Rc<PanelSlots> {
        let inner = &self.inner;
        let slots = Rc::new(InstanceSlots::new(inner.ctx.panels.clone()));
        let outputs = inner.node.outputs().clone();
        let (props, p, order, visible, global, clipping) = (
            inner.properties.clone(),
            inner.pixel_size.clone(),
            inner.order.clone(),
            inner.visible.clone(),
            inner.global_matrix.clone(),
            inner.clipping.clone(),
        );

        let panel = slots.clone();
        self.track(effect(move || {
            let (size, border) = (outputs.size.get(), outputs.border_inset.get());
            let style = PanelStyle::read(&props);
            if !visible.get() || size.x <= 0.0 || size.y <= 0.0 || !style.is_visible(&border) {
                panel.sync(std::iter::empty());
                return;
            }
            let key = PanelGroupKey {
                material_class: props
                    .string(PropertyKey::PanelMaterialClass)
                    .unwrap_or_else(|| DEFAULT_MATERIAL_CLASS.to_string()),
                order: order.get(),
            };
            let instance = PanelInstance::new(&global.get(), size, border, p.get(), &style, clipping.get().as_ref());
            panel.sync([(key, instance)]);
        }));
        slots
    }

    /// Runs after every effect added so far is stopped.
    fn add_teardown(&self, panel_slots: Option<Rc<PanelSlots>>, frame_hook: Option<FrameHookId>) {
        let inner = &self.inner;
        let (router, target) = (inner.ctx.router.clone(), inner.target);
        let interaction = inner.interaction.clone();
        let frame_hooks = inner.ctx.frame_hooks.clone();
        let scroll = inner.scroll.clone();
        let node = inner.node.clone();

        inner.subscriptions.add(move || {
            if let Some(slots) = panel_slots {
                slots.clear();
            }
            router.remove_target(target);
            interaction.reset();
            if let Some(id) = frame_hook {
                frame_hooks.unregister(id);
            }
            if let Some(scroll) = scroll {
                scroll.destroy();
            }
            node.destroy();
        });
    }

    /// Stop `effect` when this element is destroyed.
    pub(crate) fn track(&self, effect: Effect) {
        self.inner.subscriptions.add_effect(effect);
    }

    /// Run `cleanup` when this element is destroyed.
    pub(crate) fn on_destroy(&self, cleanup: impl FnOnce() + 'static) {
        self.inner.subscriptions.add(cleanup);
    }

    pub(crate) fn context(&self) -> &Rc<RootContext> {
        &self.inner.ctx
    }

    /// Panics when the element or its root was destroyed.
    pub(crate) fn assert_alive(&self) {
        assert!(
            !self.inner.destroyed.get() && !self.inner.ctx.is_destroyed(),
            "element used after destroy"
        );
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn properties(&self) -> &MergedProperties {
        &self.inner.properties
    }

    /// Replace the user sources; the theme layer stays underneath.
    pub fn set_sources(&self, sources: impl IntoIterator<Item = PropertySource>) {
        self.assert_alive();
        self.inner
            .properties
            .replace(std::iter::once(self.inner.base_source.clone()).chain(sources));
    }

    pub fn node(&self) -> &LayoutNode {
        &self.inner.node
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.inner.interaction
    }

    pub fn scroll(&self) -> Option<&ScrollState> {
        self.inner.scroll.as_ref()
    }

    pub fn target(&self) -> TargetId {
        self.inner.target
    }

    /// Layout size in layout units.
    pub fn size(&self) -> Vec2 {
        self.inner.node.outputs().size.get()
    }

    pub fn pixel_size(&self) -> Derived<f32> {
        self.inner.pixel_size.clone()
    }

    pub fn order(&self) -> Derived<OrderInfo> {
        self.inner.order.clone()
    }

    pub fn visible(&self) -> Derived<bool> {
        self.inner.visible.clone()
    }

    /// Matrix relative to the root's scene object.
    pub fn global_matrix(&self) -> Derived<Mat4> {
        self.inner.global_matrix.clone()
    }

    pub fn children_matrix(&self) -> Derived<Mat4> {
        self.inner.children_matrix.clone()
    }

    /// Clip rect applied to this element by its ancestors.
    pub fn clipping(&self) -> Derived<Option<ClipRect>> {
        self.inner.clipping.clone()
    }

    /// Clip rect this element applies to its children.
    pub fn children_clipping(&self) -> Derived<Option<ClipRect>> {
        self.inner.children_clipping.clone()
    }

    pub fn parent(&self) -> Option<Element> {
        let inner = self.inner.parent.as_ref()?.upgrade()?;
        Some(Element { inner })
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.children.borrow().clone()
    }

    /// Attach event handlers, replacing earlier ones. Hover, active and
    /// scroll handling stay in place.
    pub fn set_handlers(&self, handlers: EventHandlers) {
        self.assert_alive();
        let merged = EventHandlers::merged([&self.inner.builtin_handlers, &handlers]);
        *self.inner.user_handlers.borrow_mut() = handlers;
        self.inner.ctx.router.set_handlers(self.inner.target, merged);
    }

    pub fn handlers(&self) -> EventHandlers {
        self.inner.user_handlers.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Destroy children first, then release everything this element
    /// registered. Calling it again is a no-op.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children.iter().rev() {
            child.destroy();
        }
        self.inner.subscriptions.drain();

        if let Some(parent) = self.parent() {
            parent.inner.children.borrow_mut().retain(|c| !c.ptr_eq(self));
        }
        debug!(target: "spark_spatial::component", target = ?self.inner.target, "element destroyed");
    }
}

/// Wheel and drag handlers of a scroll container.
///
/// Pointer points arrive in root space; drags are tracked in layout units.
fn scroll_handlers(scroll: &ScrollState, pixel_size: &Derived<f32>) -> EventHandlers {
    fn to_layout(point: Vec2, pixel_size: f32) -> Vec2 {
        if pixel_size <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(point.x / pixel_size, -point.y / pixel_size)
    }

    let (wheel, down, moved, up) = (scroll.clone(), scroll.clone(), scroll.clone(), scroll.clone());
    let (p_down, p_move) = (pixel_size.clone(), pixel_size.clone());
    EventHandlers::new()
        .on_wheel(move |e| wheel.on_wheel(e.delta))
        .on(PointerAction::Down, move |e| down.on_pointer_down(e.pointer_id, to_layout(e.point, p_down.peek())))
        .on(PointerAction::Move, move |e| {
            moved.on_pointer_move(e.pointer_id, to_layout(e.point, p_move.peek()));
        })
        .on(PointerAction::Up, move |e| up.on_pointer_up(e.pointer_id))
}
