//! Text - glyph metrics, line breaking and layout measurement.
//!
//! Fonts are supplied by the host through [`FontMetrics`]; this module only
//! decides where glyphs go. Every length is in layout units.

mod wrap;

use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use taffy::{AvailableSpace, Size};

use crate::layout::MeasureFn;
use crate::properties::{MergedProperties, PropertyKey};
use crate::reactive::Signal;
use crate::types::{Inset, TextAlign, WordBreak};

pub use wrap::{align_offset, layout_text, LineLayout, PositionedGlyph, TextLayout};

/// Glyph metrics of one font, provided by the host.
pub trait FontMetrics {
    /// Identifier used to group glyph instances.
    fn font_id(&self) -> &str;

    /// Horizontal advance of `ch` as a fraction of the font size.
    fn advance(&self, ch: char) -> f32;

    /// Atlas rect (u, v, width, height) of `ch`, `None` when the font has no
    /// glyph for it.
    fn uv(&self, ch: char) -> Option<[f32; 4]>;
}

/// Fixed-advance font over a uniform atlas grid, handy for tests and
/// bitmap fonts.
#[derive(Debug, Clone)]
pub struct MonospaceFont {
    id: String,
    advance: f32,
    columns: u32,
}

impl MonospaceFont {
    pub fn new(id: impl Into<String>, advance: f32) -> Self {
        Self { id: id.into(), advance, columns: 16 }
    }

    /// Printable ASCII laid out row-major over `columns` atlas columns.
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns.max(1);
        self
    }
}

impl FontMetrics for MonospaceFont {
    fn font_id(&self) -> &str {
        &self.id
    }

    fn advance(&self, _ch: char) -> f32 {
        self.advance
    }

    fn uv(&self, ch: char) -> Option<[f32; 4]> {
        if !ch.is_ascii_graphic() {
            return None;
        }
        let index = ch as u32 - 0x21;
        let rows = (94 + self.columns - 1) / self.columns;
        let (w, h) = (1.0 / self.columns as f32, 1.0 / rows as f32);
        Some([(index % self.columns) as f32 * w, (index / self.columns) as f32 * h, w, h])
    }
}

/// Text properties that affect breaking and placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    /// Multiple of the font size.
    pub line_height: f32,
    /// Extra space after each glyph, as a fraction of the font size.
    pub letter_spacing: f32,
    pub align: TextAlign,
    pub word_break: WordBreak,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 1.2,
            letter_spacing: 0.0,
            align: TextAlign::Left,
            word_break: WordBreak::BreakWord,
        }
    }
}

impl TextStyle {
    pub fn read(props: &MergedProperties) -> Self {
        let defaults = Self::default();
        Self {
            font_size: props.number_or(PropertyKey::FontSize, defaults.font_size),
            line_height: props.number_or(PropertyKey::LineHeight, defaults.line_height),
            letter_spacing: props.number_or(PropertyKey::LetterSpacing, defaults.letter_spacing),
            align: props.keyword(PropertyKey::TextAlign),
            word_break: props.keyword(PropertyKey::WordBreak),
        }
    }
}

fn space_width(space: AvailableSpace) -> Option<f32> {
    match space {
        AvailableSpace::Definite(width) => Some(width),
        AvailableSpace::MinContent => Some(0.0),
        AvailableSpace::MaxContent => None,
    }
}

/// Measure function for a text leaf. Reads the current text and style
/// without tracking; callers mark the node dirty when either changes.
pub fn measure_fn(metrics: Rc<dyn FontMetrics>, text: Signal<String>, style: Signal<TextStyle>) -> MeasureFn {
    Rc::new(move |known: Size<Option<f32>>, available: Size<AvailableSpace>| {
        let max_width = known.width.or_else(|| space_width(available.width));
        let style = style.peek();
        let layout = text.with_untracked(|text| layout_text(text, metrics.as_ref(), &style, max_width));
        Size {
            width: known.width.unwrap_or_else(|| layout.width()),
            height: known.height.unwrap_or_else(|| layout.height()),
        }
    })
}

/// Matrices of the visible glyph quads of `layout`, relative to the center
/// of a text box of `size` with `inset` (border + padding) applied.
///
/// Each quad is one advance wide and one font size tall; pair with
/// [`FontMetrics::uv`] to build instances.
pub fn glyph_matrices(layout: &TextLayout, size: Vec2, inset: Inset, align: TextAlign, pixel_size: f32) -> Vec<(char, Mat4)> {
    let content_width = (size.x - inset.horizontal()).max(0.0);
    let origin = Vec2::new(inset.left - size.x * 0.5, inset.top - size.y * 0.5);
    let leading = (layout.line_height - layout.font_size) * 0.5;

    layout
        .placements(content_width, align)
        .map(|(glyph, x, top)| {
            let center = origin + Vec2::new(x + glyph.advance * 0.5, top + leading + layout.font_size * 0.5);
            let translation = Vec3::new(center.x * pixel_size, -center.y * pixel_size, 0.0);
            let scale = Vec3::new(glyph.advance * pixel_size, layout.font_size * pixel_size, 1.0);
            (glyph.ch, Mat4::from_scale_rotation_translation(scale, glam::Quat::IDENTITY, translation))
        })
        .collect()
}
