//! Line breaking and glyph placement.
//!
//! Greedy breaking, one paragraph per `\n`. Positions are in layout units
//! with the origin at the top-left of the text box and Y pointing down.

use crate::types::{TextAlign, WordBreak};

use super::{FontMetrics, TextStyle};

/// One placed character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub ch: char,
    /// Left edge within the line.
    pub x: f32,
    pub advance: f32,
}

impl PositionedGlyph {
    fn right(&self) -> f32 {
        self.x + self.advance
    }
}

/// One broken line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineLayout {
    pub glyphs: Vec<PositionedGlyph>,
    /// Extent up to the last visible glyph; trailing spaces excluded.
    pub width: f32,
}

impl LineLayout {
    fn finish(mut glyphs: Vec<PositionedGlyph>) -> Self {
        while glyphs.last().is_some_and(|g| g.ch.is_whitespace()) {
            glyphs.pop();
        }
        let width = glyphs.last().map_or(0.0, PositionedGlyph::right);
        Self { glyphs, width }
    }
}

/// Result of breaking a text into lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<LineLayout>,
    pub line_height: f32,
    pub font_size: f32,
}

impl TextLayout {
    /// Width of the widest line.
    pub fn width(&self) -> f32 {
        self.lines.iter().map(|l| l.width).fold(0.0, f32::max)
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    pub fn glyph_count(&self) -> usize {
        self.lines.iter().map(|l| l.glyphs.len()).sum()
    }

    /// Top-left of every visible glyph inside a box of `box_width`, aligned
    /// per `align`.
    pub fn placements(&self, box_width: f32, align: TextAlign) -> impl Iterator<Item = (PositionedGlyph, f32, f32)> + '_ {
        self.lines.iter().enumerate().flat_map(move |(row, line)| {
            let shift = align_offset(align, line.width, box_width);
            let top = row as f32 * self.line_height;
            line.glyphs
                .iter()
                .filter(|g| !g.ch.is_whitespace())
                .map(move |g| (*g, g.x + shift, top))
        })
    }
}

/// Horizontal shift of a line of `line_width` inside `box_width`.
pub fn align_offset(align: TextAlign, line_width: f32, box_width: f32) -> f32 {
    let free = (box_width - line_width).max(0.0);
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => free * 0.5,
        TextAlign::Right => free,
    }
}

/// Break `text` into lines no wider than `max_width` (unbounded when `None`).
pub fn layout_text(text: &str, metrics: &dyn FontMetrics, style: &TextStyle, max_width: Option<f32>) -> TextLayout {
    let line_height = style.font_size * style.line_height;
    let spacing = style.letter_spacing * style.font_size;

    let mut lines = Vec::new();
    if !text.is_empty() {
        for paragraph in text.split('\n') {
            break_paragraph(paragraph, metrics, style, spacing, max_width, &mut lines);
        }
    }

    TextLayout { lines, line_height, font_size: style.font_size }
}

fn break_paragraph(
    paragraph: &str,
    metrics: &dyn FontMetrics,
    style: &TextStyle,
    spacing: f32,
    max_width: Option<f32>,
    lines: &mut Vec<LineLayout>,
) {
    let mut line: Vec<PositionedGlyph> = Vec::new();
    // index in `line` just after the last whitespace
    let mut break_at: Option<usize> = None;
    let mut x = 0.0f32;

    for ch in paragraph.chars() {
        let advance = metrics.advance(ch) * style.font_size;

        if ch.is_whitespace() {
            line.push(PositionedGlyph { ch, x, advance });
            x += advance + spacing;
            break_at = Some(line.len());
            continue;
        }

        let overflows = max_width.is_some_and(|max| x + advance > max) && !line.is_empty();
        if overflows {
            match (style.word_break, break_at) {
                (WordBreak::BreakAll, _) => {
                    lines.push(LineLayout::finish(std::mem::take(&mut line)));
                    x = 0.0;
                    break_at = None;
                }
                (_, Some(at)) if at > 0 && at < line.len() => {
                    let carry = line.split_off(at);
                    lines.push(LineLayout::finish(std::mem::take(&mut line)));
                    let origin = carry[0].x;
                    line = carry.into_iter().map(|g| PositionedGlyph { x: g.x - origin, ..g }).collect();
                    x = line.last().map_or(0.0, |g| g.right() + spacing);
                    break_at = None;
                }
                (_, Some(at)) if at == line.len() => {
                    lines.push(LineLayout::finish(std::mem::take(&mut line)));
                    x = 0.0;
                    break_at = None;
                }
                (WordBreak::BreakWord, _) => {
                    lines.push(LineLayout::finish(std::mem::take(&mut line)));
                    x = 0.0;
                    break_at = None;
                }
                (WordBreak::KeepAll, _) => {}
            }
        }

        line.push(PositionedGlyph { ch, x, advance });
        x += advance + spacing;
    }

    lines.push(LineLayout::finish(line));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MonospaceFont;

    fn style(word_break: WordBreak) -> TextStyle {
        TextStyle { font_size: 1.0, line_height: 1.5, word_break, ..TextStyle::default() }
    }

    fn texts(layout: &TextLayout) -> Vec<String> {
        layout.lines.iter().map(|l| l.glyphs.iter().map(|g| g.ch).collect()).collect()
    }

    #[test]
    fn test_unbounded_single_line() {
        let font = MonospaceFont::new("mono", 0.5);
        let layout = layout_text("hello world", &font, &style(WordBreak::BreakWord), None);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.width(), 5.5);
        assert_eq!(layout.height(), 1.5);
    }

    #[test]
    fn test_break_word_wraps_at_spaces() {
        let font = MonospaceFont::new("mono", 1.0);
        let layout = layout_text("hello big world", &font, &style(WordBreak::BreakWord), Some(9.0));
        assert_eq!(texts(&layout), vec!["hello big", "world"]);
        assert_eq!(layout.lines[1].glyphs[0].x, 0.0);
        assert_eq!(layout.width(), 9.0);
    }

    #[test]
    fn test_break_word_splits_long_words() {
        let font = MonospaceFont::new("mono", 1.0);
        let layout = layout_text("abcdefgh", &font, &style(WordBreak::BreakWord), Some(3.0));
        assert_eq!(texts(&layout), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_keep_all_overflows() {
        let font = MonospaceFont::new("mono", 1.0);
        let layout = layout_text("abcdefgh ij", &font, &style(WordBreak::KeepAll), Some(3.0));
        assert_eq!(texts(&layout), vec!["abcdefgh", "ij"]);
        assert_eq!(layout.width(), 8.0);
    }

    #[test]
    fn test_break_all_ignores_spaces() {
        let font = MonospaceFont::new("mono", 1.0);
        let layout = layout_text("ab cdef", &font, &style(WordBreak::BreakAll), Some(4.0));
        assert_eq!(texts(&layout), vec!["ab c", "def"]);
    }

    #[test]
    fn test_newlines_and_empty() {
        let font = MonospaceFont::new("mono", 1.0);
        let layout = layout_text("a\n\nb", &font, &style(WordBreak::BreakWord), None);
        assert_eq!(layout.lines.len(), 3);
        assert_eq!(layout.height(), 4.5);

        let empty = layout_text("", &font, &style(WordBreak::BreakWord), None);
        assert!(empty.lines.is_empty());
        assert_eq!(empty.height(), 0.0);
    }

    #[test]
    fn test_letter_spacing_scales_with_font() {
        let font = MonospaceFont::new("mono", 0.5);
        let spaced = TextStyle { font_size: 2.0, letter_spacing: 0.25, ..TextStyle::default() };
        let layout = layout_text("abc", &font, &spaced, None);
        // advance 1.0, spacing 0.5
        assert_eq!(layout.lines[0].glyphs[2].x, 3.0);
        assert_eq!(layout.width(), 4.0);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(align_offset(TextAlign::Left, 4.0, 10.0), 0.0);
        assert_eq!(align_offset(TextAlign::Center, 4.0, 10.0), 3.0);
        assert_eq!(align_offset(TextAlign::Right, 4.0, 10.0), 6.0);
        assert_eq!(align_offset(TextAlign::Right, 12.0, 10.0), 0.0);

        let font = MonospaceFont::new("mono", 1.0);
        let layout = layout_text("a b", &font, &style(WordBreak::BreakWord), None);
        let placed: Vec<_> = layout.placements(7.0, TextAlign::Right).map(|(g, x, _)| (g.ch, x)).collect();
        assert_eq!(placed, vec![('a', 4.0), ('b', 6.0)]);
    }
}
