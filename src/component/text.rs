//! Text elements.
//!
//! The `text` property and the text style feed two signals. The layout node
//! measures through them, and a glyph effect rebuilds the glyph instances
//! whenever the laid-out box, the content or the color changes.

use std::ops::Deref;
use std::rc::Rc;

use crate::batching::{GlyphGroupKey, GlyphInstance, InstanceSlots};
use crate::error::Result;
use crate::order::OrderInfo;
use crate::properties::{PropertyKey, PropertySource};
use crate::reactive::{effect, signal, Signal};
use crate::text::{glyph_matrices, layout_text, measure_fn, FontMetrics, TextLayout, TextStyle};
use crate::types::{Color, ElementType};

use super::element::{Element, ElementOptions};

/// A text leaf with a panel behind its glyphs.
#[derive(Clone)]
pub struct Text {
    element: Element,
    font: Rc<dyn FontMetrics>,
    content: Signal<String>,
    style: Signal<TextStyle>,
}

impl std::fmt::Debug for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Text")
            .field("element", &self.element)
            .field("font", &self.font.font_id())
            .field("content", &self.content.peek())
            .finish()
    }
}

impl Deref for Text {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.element
    }
}

impl Text {
    pub(crate) fn create(parent: &Element, font: Rc<dyn FontMetrics>, sources: Vec<PropertySource>) -> Result<Self> {
        let content = signal(String::new());
        let style = signal(TextStyle::default());
        let options = ElementOptions {
            measure: Some(measure_fn(font.clone(), content.clone(), style.clone())),
            panel: true,
            ..Default::default()
        };
        let element = Element::new(parent.context(), Some(parent), sources, options)?;

        let text = Self { element, font, content, style };
        text.wire_content();
        text.wire_glyphs();
        Ok(text)
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Current text content.
    pub fn content(&self) -> Signal<String> {
        self.content.clone()
    }

    pub fn style(&self) -> Signal<TextStyle> {
        self.style.clone()
    }

    /// Lay out the current content against the current box width.
    pub fn layout(&self) -> TextLayout {
        let outputs = self.element.node().outputs();
        let inset = outputs.border_inset.peek() + outputs.padding_inset.peek();
        let width = (outputs.size.peek().x - inset.horizontal()).max(0.0);
        let style = self.style.peek();
        self.content
            .with_untracked(|content| layout_text(content, self.font.as_ref(), &style, Some(width)))
    }

    fn wire_content(&self) {
        let props = self.element.properties().clone();
        let (content, style) = (self.content.clone(), self.style.clone());
        let node = self.element.node().clone();

        self.element.track(effect(move || {
            let next_content = props.string(PropertyKey::Text).unwrap_or_default();
            let next_style = TextStyle::read(&props);
            let changed = content.with_untracked(|current| *current != next_content) || style.peek() != next_style;
            content.set(next_content);
            style.set(next_style);
            if changed {
                node.mark_measure_dirty();
            }
        }));
    }

    fn wire_glyphs(&self) {
        let element = &self.element;
        let slots = Rc::new(InstanceSlots::new(element.context().glyphs.clone()));
        let outputs = element.node().outputs().clone();
        let props = element.properties().clone();
        let (font, content, style) = (self.font.clone(), self.content.clone(), self.style.clone());
        let (p, order, visible, global, clipping) = (
            element.pixel_size(),
            element.order(),
            element.visible(),
            element.global_matrix(),
            element.clipping(),
        );

        let glyphs = slots.clone();
        element.track(effect(move || {
            let size = outputs.size.get();
            if !visible.get() || size.x <= 0.0 || size.y <= 0.0 {
                glyphs.sync(std::iter::empty());
                return;
            }

            let inset = outputs.border_inset.get() + outputs.padding_inset.get();
            let style = style.get();
            let width = (size.x - inset.horizontal()).max(0.0);
            let layout = content.with(|content| layout_text(content, font.as_ref(), &style, Some(width)));

            let color = props
                .color(PropertyKey::Color)
                .unwrap_or(Color::BLACK)
                .with_opacity(props.number_or(PropertyKey::Opacity, 1.0));
            let order = order.get();
            let key = GlyphGroupKey {
                font: font.font_id().to_string(),
                order: OrderInfo::new(order.major_index, ElementType::Text, order.minor_index),
            };
            let (global, clip) = (global.get(), clipping.get());

            let instances: Vec<_> = glyph_matrices(&layout, size, inset, style.align, p.get())
                .into_iter()
                .filter_map(|(ch, matrix)| {
                    let uv = font.uv(ch)?;
                    Some((key.clone(), GlyphInstance::new(&(global * matrix), uv, color, clip.as_ref())))
                })
                .collect();
            glyphs.sync(instances);
        }));

        element.on_destroy(move || slots.clear());
    }
}
