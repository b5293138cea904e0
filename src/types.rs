//! Core types for spark-spatial.
//!
//! These types define the foundation that everything builds on.
//! They flow through the reactive pipeline from merged properties to the
//! instance buffers the host renders.

use serde::{Deserialize, Serialize};

// =============================================================================
// Color
// =============================================================================

/// Linear RGBA color with `f32` channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new RGBA color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create an opaque color from `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic color name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(hex.get(range)?, 16).ok().map(|v| v as f32 / 255.0)
            };
            return match hex.len() {
                3 => {
                    let short = |i: usize| {
                        u8::from_str_radix(hex.get(i..i + 1)?, 16)
                            .ok()
                            .map(|v| (v * 17) as f32 / 255.0)
                    };
                    Some(Self::rgb(short(0)?, short(1)?, short(2)?))
                }
                6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
                8 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?)),
                _ => None,
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "gray" | "grey" => Some(Self::from_hex(0x808080)),
            _ => None,
        }
    }

    /// Same color with alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { a: self.a * opacity.clamp(0.0, 1.0), ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// A length in layout units, a percentage of the parent, or auto.
///
/// # Examples
///
/// ```
/// use spark_spatial::types::Dimension;
///
/// let width = Dimension::Length(200.0);
/// let height = Dimension::Percent(100.0);
/// let auto = Dimension::Auto;
/// assert_ne!(width, auto);
/// # let _ = height;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    /// Absolute length in layout units.
    Length(f32),
    /// Percentage of the parent (0-100).
    Percent(f32),
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Dimension::Length(value)
    }
}

impl Dimension {
    /// Parse `"auto"`, `"50%"` or a plain number.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        if let Some(p) = s.strip_suffix('%') {
            return p.trim().parse().ok().map(Self::Percent);
        }
        s.parse().ok().map(Self::Length)
    }
}

// =============================================================================
// Insets
// =============================================================================

/// Edge insets in layout units: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Inset {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Inset {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

impl std::ops::Add for Inset {
    type Output = Inset;

    fn add(self, rhs: Inset) -> Inset {
        Inset::new(self.top + rhs.top, self.right + rhs.right, self.bottom + rhs.bottom, self.left + rhs.left)
    }
}

// =============================================================================
// Keyword Enums
// =============================================================================

/// Enum-valued property that is written as a keyword string.
pub trait Keyword: Sized + Copy + Default + 'static {
    /// Parse a keyword (case-sensitive, the camelCase/kebab form used in properties).
    fn from_name(name: &str) -> Option<Self>;
    /// The canonical keyword.
    fn name(self) -> &'static str;
}

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $($kw:literal)|+ ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::types::Keyword for $name {
            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $($kw)|+ => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $crate::types::keyword_enum!(@first $($kw)|+), )+
                }
            }
        }
    };
    (@first $first:literal $(| $rest:literal)*) => { $first };
}

pub(crate) use keyword_enum;

keyword_enum! {
    /// Flex direction for container layout.
    FlexDirection {
        #[default]
        Row => "row",
        Column => "column",
        RowReverse => "row-reverse" | "rowReverse",
        ColumnReverse => "column-reverse" | "columnReverse",
    }
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }
}

keyword_enum! {
    /// Flex wrap behavior.
    FlexWrap {
        #[default]
        NoWrap => "no-wrap" | "nowrap" | "noWrap",
        Wrap => "wrap",
        WrapReverse => "wrap-reverse" | "wrapReverse",
    }
}

keyword_enum! {
    /// Justify content (main axis alignment).
    JustifyContent {
        #[default]
        FlexStart => "flex-start" | "flexStart",
        Center => "center",
        FlexEnd => "flex-end" | "flexEnd",
        SpaceBetween => "space-between" | "spaceBetween",
        SpaceAround => "space-around" | "spaceAround",
        SpaceEvenly => "space-evenly" | "spaceEvenly",
    }
}

keyword_enum! {
    /// Align items (cross axis alignment).
    AlignItems {
        #[default]
        Stretch => "stretch",
        FlexStart => "flex-start" | "flexStart",
        Center => "center",
        FlexEnd => "flex-end" | "flexEnd",
        Baseline => "baseline",
    }
}

keyword_enum! {
    /// Align self (item override for align items).
    AlignSelf {
        #[default]
        Auto => "auto",
        Stretch => "stretch",
        FlexStart => "flex-start" | "flexStart",
        Center => "center",
        FlexEnd => "flex-end" | "flexEnd",
        Baseline => "baseline",
    }
}

keyword_enum! {
    /// Align content (multi-line cross axis).
    AlignContent {
        #[default]
        Stretch => "stretch",
        FlexStart => "flex-start" | "flexStart",
        Center => "center",
        FlexEnd => "flex-end" | "flexEnd",
        SpaceBetween => "space-between" | "spaceBetween",
        SpaceAround => "space-around" | "spaceAround",
    }
}

keyword_enum! {
    /// Overflow behavior.
    Overflow {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
        Scroll => "scroll",
    }
}

impl Overflow {
    /// Whether content outside the box is cut off.
    pub const fn clips(&self) -> bool {
        !matches!(self, Self::Visible)
    }
}

keyword_enum! {
    /// Position type.
    PositionType {
        #[default]
        Relative => "relative",
        Absolute => "absolute",
    }
}

keyword_enum! {
    /// Display mode; `None` removes the node from layout.
    Display {
        #[default]
        Flex => "flex",
        None => "none",
    }
}

keyword_enum! {
    /// Visibility; hidden elements keep their layout space.
    Visibility {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
    }
}

keyword_enum! {
    /// Horizontal anchor of a root relative to its scene-graph origin.
    AnchorX {
        Left => "left",
        #[default]
        Center => "center",
        Right => "right",
    }
}

impl AnchorX {
    /// Offset as a fraction of the root width.
    pub const fn offset(self) -> f32 {
        match self {
            Self::Left => 0.5,
            Self::Center => 0.0,
            Self::Right => -0.5,
        }
    }
}

keyword_enum! {
    /// Vertical anchor of a root relative to its scene-graph origin.
    AnchorY {
        Top => "top",
        #[default]
        Center => "center",
        Bottom => "bottom",
    }
}

impl AnchorY {
    /// Offset as a fraction of the root height.
    pub const fn offset(self) -> f32 {
        match self {
            Self::Top => -0.5,
            Self::Center => 0.0,
            Self::Bottom => 0.5,
        }
    }
}

keyword_enum! {
    /// Horizontal text alignment.
    TextAlign {
        #[default]
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

keyword_enum! {
    /// Line breaking behavior for text.
    WordBreak {
        #[default]
        BreakWord => "break-word" | "breakWord",
        KeepAll => "keep-all" | "keepAll",
        BreakAll => "break-all" | "breakAll",
    }
}

// =============================================================================
// Element Types
// =============================================================================

/// Kind of visual element; part of the paint order within one z-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum ElementType {
    #[default]
    Panel = 0,
    Image = 1,
    Object = 2,
    Text = 3,
}
