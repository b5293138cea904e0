//! Style building - converts merged properties into a taffy `Style`.
//!
//! Lengths are multiplied by the engine's point scale factor on the way in,
//! so the engine's whole-unit rounding keeps sub-unit precision.

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf,
    Dimension as TaffyDimension, Display as TaffyDisplay, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, Overflow as TaffyOverflow, Position as TaffyPosition, Rect, Size, Style,
};

use crate::properties::{MergedProperties, PropertyKey};
use crate::types::{
    AlignContent, AlignItems, AlignSelf, Dimension, Display, FlexDirection, FlexWrap,
    JustifyContent, Overflow, PositionType,
};

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

pub(crate) fn to_taffy_dimension(dim: Dimension, scale: f32) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Length(n) => TaffyDimension::Length(n * scale),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_taffy_lpa(dim: Dimension, scale: f32) -> LengthPercentageAuto {
    match dim {
        Dimension::Auto => LengthPercentageAuto::Auto,
        Dimension::Length(n) => LengthPercentageAuto::Length(n * scale),
        Dimension::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
    }
}

fn to_taffy_lp(dim: Dimension, scale: f32) -> LengthPercentage {
    match dim {
        Dimension::Percent(p) => LengthPercentage::Percent(p / 100.0),
        Dimension::Length(n) => LengthPercentage::Length(n * scale),
        Dimension::Auto => LengthPercentage::Length(0.0),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: JustifyContent) -> Option<TaffyJustifyContent> {
    Some(match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align_items(align: AlignItems) -> Option<TaffyAlignItems> {
    Some(match align {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
        AlignItems::Baseline => TaffyAlignItems::Baseline,
    })
}

fn to_taffy_align_content(align: AlignContent) -> Option<TaffyAlignContent> {
    Some(match align {
        AlignContent::Stretch => TaffyAlignContent::Stretch,
        AlignContent::FlexStart => TaffyAlignContent::FlexStart,
        AlignContent::Center => TaffyAlignContent::Center,
        AlignContent::FlexEnd => TaffyAlignContent::FlexEnd,
        AlignContent::SpaceBetween => TaffyAlignContent::SpaceBetween,
        AlignContent::SpaceAround => TaffyAlignContent::SpaceAround,
    })
}

fn to_taffy_align_self(align: AlignSelf) -> Option<TaffyAlignSelf> {
    match align {
        AlignSelf::Auto => None, // inherit from parent
        AlignSelf::Stretch => Some(TaffyAlignSelf::Stretch),
        AlignSelf::FlexStart => Some(TaffyAlignSelf::FlexStart),
        AlignSelf::Center => Some(TaffyAlignSelf::Center),
        AlignSelf::FlexEnd => Some(TaffyAlignSelf::FlexEnd),
        AlignSelf::Baseline => Some(TaffyAlignSelf::Baseline),
    }
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_taffy_position(position: PositionType) -> TaffyPosition {
    match position {
        PositionType::Relative => TaffyPosition::Relative,
        PositionType::Absolute => TaffyPosition::Absolute,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a taffy `Style` from merged properties (tracked).
///
/// `scale` is the point scale factor. Nodes with a measure function keep
/// `auto` sizes unless width or height are set explicitly.
pub fn build_style(props: &MergedProperties, scale: f32) -> Style {
    use PropertyKey as K;

    let dim = |key| props.dimension(key).unwrap_or_default();
    let length = |key| props.number_or(key, 0.0) * scale;
    let edge = |key| to_taffy_lp(props.dimension(key).unwrap_or(Dimension::Length(0.0)), scale);
    let margin = |key| to_taffy_lpa(props.dimension(key).unwrap_or(Dimension::Length(0.0)), scale);
    let inset = |key| to_taffy_lpa(dim(key), scale);

    let overflow = to_taffy_overflow(props.keyword::<Overflow>(K::Overflow));

    Style {
        display: match props.keyword::<Display>(K::Display) {
            Display::Flex => TaffyDisplay::Flex,
            Display::None => TaffyDisplay::None,
        },
        position: to_taffy_position(props.keyword(K::PositionType)),
        inset: Rect {
            top: inset(K::PositionTop),
            right: inset(K::PositionRight),
            bottom: inset(K::PositionBottom),
            left: inset(K::PositionLeft),
        },

        // Flex container properties
        flex_direction: to_taffy_flex_direction(props.keyword(K::FlexDirection)),
        flex_wrap: to_taffy_flex_wrap(props.keyword(K::FlexWrap)),
        justify_content: to_taffy_justify_content(props.keyword(K::JustifyContent)),
        align_items: to_taffy_align_items(props.keyword(K::AlignItems)),
        align_content: to_taffy_align_content(props.keyword(K::AlignContent)),
        gap: Size {
            width: LengthPercentage::Length(length(K::ColumnGap)),
            height: LengthPercentage::Length(length(K::RowGap)),
        },

        // Flex item properties
        flex_grow: props.number_or(K::FlexGrow, 0.0),
        flex_shrink: props.number_or(K::FlexShrink, 1.0),
        flex_basis: to_taffy_dimension(dim(K::FlexBasis), scale),
        align_self: to_taffy_align_self(props.keyword(K::AlignSelf)),

        // Dimensions
        size: Size {
            width: to_taffy_dimension(dim(K::Width), scale),
            height: to_taffy_dimension(dim(K::Height), scale),
        },
        min_size: Size {
            width: to_taffy_dimension(dim(K::MinWidth), scale),
            height: to_taffy_dimension(dim(K::MinHeight), scale),
        },
        max_size: Size {
            width: to_taffy_dimension(dim(K::MaxWidth), scale),
            height: to_taffy_dimension(dim(K::MaxHeight), scale),
        },
        aspect_ratio: props.number(K::AspectRatio),

        margin: Rect {
            top: margin(K::MarginTop),
            right: margin(K::MarginRight),
            bottom: margin(K::MarginBottom),
            left: margin(K::MarginLeft),
        },
        padding: Rect {
            top: edge(K::PaddingTop),
            right: edge(K::PaddingRight),
            bottom: edge(K::PaddingBottom),
            left: edge(K::PaddingLeft),
        },
        border: Rect {
            top: LengthPercentage::Length(length(K::BorderTop)),
            right: LengthPercentage::Length(length(K::BorderRight)),
            bottom: LengthPercentage::Length(length(K::BorderBottom)),
            left: LengthPercentage::Length(length(K::BorderLeft)),
        },

        overflow: taffy::Point { x: overflow, y: overflow },
        // Scrollbars are drawn over the content, not beside it.
        scrollbar_width: 0.0,

        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertySource;

    #[test]
    fn test_dimension_conversion() {
        assert!(matches!(to_taffy_dimension(Dimension::Auto, 100.0), TaffyDimension::Auto));
        assert!(matches!(
            to_taffy_dimension(Dimension::Length(0.5), 100.0),
            TaffyDimension::Length(50.0)
        ));
        // Percent: 50% → 0.5
        if let TaffyDimension::Percent(p) = to_taffy_dimension(Dimension::Percent(50.0), 100.0) {
            assert!((p - 0.5).abs() < 0.001);
        } else {
            panic!("Expected Percent variant");
        }
    }

    #[test]
    fn test_build_style_scales_lengths() {
        let props = MergedProperties::standalone();
        props.add_all([PropertySource::new()
            .set(PropertyKey::Width, 2.0)
            .set(PropertyKey::Height, "50%")
            .set(PropertyKey::Padding, 1.0)
            .set(PropertyKey::FlexDirection, "column")
            .set(PropertyKey::Overflow, "scroll")]);

        let style = build_style(&props, 100.0);
        assert!(matches!(style.size.width, TaffyDimension::Length(w) if w == 200.0));
        assert!(matches!(style.size.height, TaffyDimension::Percent(h) if (h - 0.5).abs() < 1e-6));
        assert!(matches!(style.padding.left, LengthPercentage::Length(p) if p == 100.0));
        assert_eq!(style.flex_direction, TaffyFlexDirection::Column);
        assert_eq!(style.overflow.x, TaffyOverflow::Scroll);
        assert_eq!(style.flex_shrink, 1.0);
    }

    #[test]
    fn test_display_none() {
        let props = MergedProperties::standalone();
        props.add_all([PropertySource::new().set(PropertyKey::Display, "none")]);
        assert_eq!(build_style(&props, 100.0).display, TaffyDisplay::None);
    }
}
