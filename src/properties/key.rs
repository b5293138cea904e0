//! Property keys - the closed set of properties a component understands.

use std::fmt;

macro_rules! property_keys {
    ( $( $variant:ident => $name:literal ),+ $(,)? ) => {
        /// A recognized property.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PropertyKey {
            $( $variant ),+
        }

        impl PropertyKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [PropertyKey] = &[ $( PropertyKey::$variant ),+ ];

            /// The camelCase name used in property objects.
            pub const fn name(self) -> &'static str {
                match self {
                    $( PropertyKey::$variant => $name ),+
                }
            }

            /// Look up a key by its camelCase name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(PropertyKey::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

property_keys! {
    // Size
    Width => "width",
    Height => "height",
    MinWidth => "minWidth",
    MinHeight => "minHeight",
    MaxWidth => "maxWidth",
    MaxHeight => "maxHeight",
    AspectRatio => "aspectRatio",
    SizeX => "sizeX",
    SizeY => "sizeY",

    // Flex
    Display => "display",
    FlexDirection => "flexDirection",
    FlexWrap => "flexWrap",
    JustifyContent => "justifyContent",
    AlignItems => "alignItems",
    AlignSelf => "alignSelf",
    AlignContent => "alignContent",
    FlexGrow => "flexGrow",
    FlexShrink => "flexShrink",
    FlexBasis => "flexBasis",
    Gap => "gap",
    RowGap => "rowGap",
    ColumnGap => "columnGap",

    // Spacing
    Padding => "padding",
    PaddingX => "paddingX",
    PaddingY => "paddingY",
    PaddingTop => "paddingTop",
    PaddingRight => "paddingRight",
    PaddingBottom => "paddingBottom",
    PaddingLeft => "paddingLeft",
    Margin => "margin",
    MarginX => "marginX",
    MarginY => "marginY",
    MarginTop => "marginTop",
    MarginRight => "marginRight",
    MarginBottom => "marginBottom",
    MarginLeft => "marginLeft",
    Border => "border",
    BorderX => "borderX",
    BorderY => "borderY",
    BorderTop => "borderTop",
    BorderRight => "borderRight",
    BorderBottom => "borderBottom",
    BorderLeft => "borderLeft",

    // Positioning
    PositionType => "positionType",
    PositionTop => "positionTop",
    PositionRight => "positionRight",
    PositionBottom => "positionBottom",
    PositionLeft => "positionLeft",
    Overflow => "overflow",

    // Root placement and transform
    PixelSize => "pixelSize",
    AnchorX => "anchorX",
    AnchorY => "anchorY",
    TranslateX => "translateX",
    TranslateY => "translateY",
    TranslateZ => "translateZ",
    RotateX => "rotateX",
    RotateY => "rotateY",
    RotateZ => "rotateZ",
    ScaleX => "scaleX",
    ScaleY => "scaleY",
    ScaleZ => "scaleZ",
    TransformOriginX => "transformOriginX",
    TransformOriginY => "transformOriginY",

    // Panel
    BackgroundColor => "backgroundColor",
    BackgroundOpacity => "backgroundOpacity",
    BorderColor => "borderColor",
    BorderOpacity => "borderOpacity",
    BorderRadius => "borderRadius",
    BorderTopRadius => "borderTopRadius",
    BorderBottomRadius => "borderBottomRadius",
    BorderLeftRadius => "borderLeftRadius",
    BorderRightRadius => "borderRightRadius",
    BorderTopLeftRadius => "borderTopLeftRadius",
    BorderTopRightRadius => "borderTopRightRadius",
    BorderBottomRightRadius => "borderBottomRightRadius",
    BorderBottomLeftRadius => "borderBottomLeftRadius",
    BorderBend => "borderBend",
    Opacity => "opacity",
    Visibility => "visibility",
    ZIndexOffset => "zIndexOffset",
    PanelMaterialClass => "panelMaterialClass",
    DepthTest => "depthTest",
    RenderOrder => "renderOrder",
    ReceiveShadow => "receiveShadow",
    CastShadow => "castShadow",

    // Scroll
    ScrollbarColor => "scrollbarColor",
    ScrollbarOpacity => "scrollbarOpacity",
    ScrollbarWidth => "scrollbarWidth",
    ScrollbarBorderRadius => "scrollbarBorderRadius",

    // Text
    Text => "text",
    Color => "color",
    FontFamily => "fontFamily",
    FontSize => "fontSize",
    LineHeight => "lineHeight",
    LetterSpacing => "letterSpacing",
    TextAlign => "textAlign",
    WordBreak => "wordBreak",

    // Interaction
    Cursor => "cursor",
    PointerEvents => "pointerEvents",
}

impl PropertyKey {
    /// Keys that fall back to the parent's merged value when unset.
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            PropertyKey::PixelSize
                | PropertyKey::Color
                | PropertyKey::Opacity
                | PropertyKey::FontFamily
                | PropertyKey::FontSize
                | PropertyKey::LineHeight
                | PropertyKey::LetterSpacing
                | PropertyKey::TextAlign
                | PropertyKey::WordBreak
                | PropertyKey::DepthTest
                | PropertyKey::RenderOrder
                | PropertyKey::ReceiveShadow
                | PropertyKey::CastShadow
        )
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
