//! Containers and panels.

use std::ops::Deref;
use std::rc::Rc;

use glam::{Mat4, Vec2};

use crate::batching::{InstanceSlots, PanelGroupKey, PanelInstance, PanelStyle};
use crate::error::Result;
use crate::order::OrderInfo;
use crate::properties::{PropertyKey, PropertySource};
use crate::reactive::effect;
use crate::scene::SceneObject;
use crate::scroll::{compute_scrollbar, Axis, ScrollbarGeometry};
use crate::text::FontMetrics;
use crate::transform::layout_to_world;
use crate::types::{Color, Inset};

use super::context::RootContext;
use super::element::{Element, ElementOptions, DEFAULT_MATERIAL_CLASS};
use super::object::ObjectElement;
use super::text::Text;

/// Default scrollbar thickness in layout units.
const DEFAULT_SCROLLBAR_WIDTH: f32 = 10.0;

/// An element with a panel, children and a scroll state.
///
/// Content only scrolls when `overflow` is `scroll` and it exceeds the box;
/// the scroll state exists regardless so toggling overflow needs no rebuild.
#[derive(Debug, Clone)]
pub struct Container {
    element: Element,
}

impl Deref for Container {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.element
    }
}

impl Container {
    pub(crate) fn create(
        ctx: &Rc<RootContext>,
        parent: Option<&Element>,
        index: Option<usize>,
        sources: Vec<PropertySource>,
    ) -> Result<Self> {
        let options = ElementOptions { index, panel: true, scrollable: true, ..Default::default() };
        let element = Element::new(ctx, parent, sources, options)?;
        wire_scrollbars(&element);
        Ok(Self { element })
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn add_container(&self, sources: impl IntoIterator<Item = PropertySource>) -> Result<Container> {
        self.element.assert_alive();
        Container::create(self.element.context(), Some(&self.element), None, sources.into_iter().collect())
    }

    /// Insert a container at child `index`; appended when out of range.
    pub fn insert_container(
        &self,
        index: usize,
        sources: impl IntoIterator<Item = PropertySource>,
    ) -> Result<Container> {
        self.element.assert_alive();
        Container::create(self.element.context(), Some(&self.element), Some(index), sources.into_iter().collect())
    }

    pub fn add_panel(&self, sources: impl IntoIterator<Item = PropertySource>) -> Result<Panel> {
        self.element.assert_alive();
        let options = ElementOptions { panel: true, ..Default::default() };
        let element = Element::new(self.element.context(), Some(&self.element), sources.into_iter().collect(), options)?;
        Ok(Panel { element })
    }

    pub fn add_text(
        &self,
        font: Rc<dyn FontMetrics>,
        sources: impl IntoIterator<Item = PropertySource>,
    ) -> Result<Text> {
        self.element.assert_alive();
        Text::create(&self.element, font, sources.into_iter().collect())
    }

    /// Place a host scene object in the layout flow.
    pub fn add_object(
        &self,
        object: Rc<dyn SceneObject>,
        sources: impl IntoIterator<Item = PropertySource>,
    ) -> Result<ObjectElement> {
        self.element.assert_alive();
        ObjectElement::create(&self.element, object, sources.into_iter().collect())
    }
}

/// A leaf element that only draws its panel.
#[derive(Debug, Clone)]
pub struct Panel {
    element: Element,
}

impl Deref for Panel {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.element
    }
}

impl Panel {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

// =============================================================================
// Scrollbars
// =============================================================================

/// Center and size of a scrollbar thumb relative to the container center,
/// layout units with Y down.
fn scrollbar_rect(axis: Axis, bar: &ScrollbarGeometry, size: Vec2, border: Inset) -> (Vec2, Vec2) {
    let half = size * 0.5;
    match axis {
        Axis::Y => (
            Vec2::new(
                half.x - border.right - bar.thickness * 0.5,
                -half.y + border.top + bar.offset + bar.length * 0.5,
            ),
            Vec2::new(bar.thickness, bar.length),
        ),
        Axis::X => (
            Vec2::new(
                -half.x + border.left + bar.offset + bar.length * 0.5,
                half.y - border.bottom - bar.thickness * 0.5,
            ),
            Vec2::new(bar.length, bar.thickness),
        ),
    }
}

fn wire_scrollbars(element: &Element) {
    let Some(scroll) = element.scroll().cloned() else { return };
    let slots = Rc::new(InstanceSlots::new(element.context().panels.clone()));
    let outputs = element.node().outputs().clone();
    let props = element.properties().clone();
    let (p, order, visible, global, clipping) = (
        element.pixel_size(),
        element.order(),
        element.visible(),
        element.global_matrix(),
        element.clipping(),
    );

    let bars = slots.clone();
    element.track(effect(move || {
        let max_scroll = outputs.max_scroll_position.get();
        if !visible.get() || (max_scroll.x <= 0.0 && max_scroll.y <= 0.0) {
            bars.sync(std::iter::empty());
            return;
        }

        let (size, border) = (outputs.size.get(), outputs.border_inset.get());
        let inner_size = Vec2::new(size.x - border.horizontal(), size.y - border.vertical());
        let position = scroll.position().get();
        let width = props.number_or(PropertyKey::ScrollbarWidth, DEFAULT_SCROLLBAR_WIDTH);
        let radius = props.number_or(PropertyKey::ScrollbarBorderRadius, width * 0.5);
        let color = props.color(PropertyKey::ScrollbarColor).unwrap_or(Color::BLACK);
        let style = PanelStyle {
            background_color: color.with_opacity(props.number_or(PropertyKey::ScrollbarOpacity, 1.0)),
            border_color: Color::TRANSPARENT,
            border_radius: [radius; 4],
            border_bend: 0.0,
            opacity: props.number_or(PropertyKey::Opacity, 1.0),
        };

        let order = order.get();
        let key = PanelGroupKey {
            material_class: props
                .string(PropertyKey::PanelMaterialClass)
                .unwrap_or_else(|| DEFAULT_MATERIAL_CLASS.to_string()),
            order: OrderInfo { minor_index: order.minor_index + 1, ..order },
        };
        let (p, global, clip) = (p.get(), global.get(), clipping.get());

        let instances: Vec<_> = [Axis::X, Axis::Y]
            .into_iter()
            .filter_map(|axis| {
                let bar = compute_scrollbar(axis, inner_size + max_scroll, inner_size, position, width)?;
                let (center, bar_size) = scrollbar_rect(axis, &bar, size, border);
                let matrix = global * Mat4::from_translation(layout_to_world(center, p));
                let instance = PanelInstance::new(&matrix, bar_size, Inset::ZERO, p, &style, clip.as_ref());
                Some((key.clone(), instance))
            })
            .collect();
        bars.sync(instances);
    }));

    element.on_destroy(move || slots.clear());
}
