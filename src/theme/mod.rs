//! Theme - color scheme state and the default property layer.
//!
//! A root receives [`Theme::default_source`] as its lowest precedence
//! source; other components receive [`Theme::element_source`], which leaves
//! inheritable keys to the parent. Colors switch through `dark` variants, so flipping the
//! color scheme restyles everything that did not set its own colors.
//!
//! # Example
//!
//! ```rust
//! use spark_spatial::theme::{set_preferred_color_scheme, ColorScheme, Theme};
//!
//! let theme = Theme::default();
//! let defaults = theme.default_source(0.01);
//! assert!(!defaults.is_empty());
//! set_preferred_color_scheme(ColorScheme::Dark);
//! ```

mod scheme;

pub use scheme::{
    dark_condition, is_dark, preferred_color_scheme, reset_theme_state, set_preferred_color_scheme,
    set_preferred_color_scheme_name, set_system_dark, ColorScheme,
};

use serde::Deserialize;

use crate::properties::{Condition, PropertyKey, PropertySource};
use crate::types::Color;

/// One palette.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Palette {
    /// Text.
    pub foreground: Color,
    pub border: Color,
    pub scrollbar: Color,
}

/// Light and dark palettes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Theme {
    pub name: String,
    pub light: Palette,
    pub dark: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            light: Palette {
                foreground: Color::from_hex(0x09090b),
                border: Color::from_hex(0xe4e4e7),
                scrollbar: Color::from_hex(0x71717a),
            },
            dark: Palette {
                foreground: Color::from_hex(0xfafafa),
                border: Color::from_hex(0x27272a),
                scrollbar: Color::from_hex(0xa1a1aa),
            },
        }
    }
}

impl Theme {
    pub fn palette(&self, dark: bool) -> &Palette {
        if dark { &self.dark } else { &self.light }
    }

    /// The lowest-precedence source of a root.
    pub fn default_source(&self, pixel_size: f32) -> PropertySource {
        fn colors(palette: &Palette) -> PropertySource {
            PropertySource::new()
                .set(PropertyKey::Color, palette.foreground)
                .set(PropertyKey::BorderColor, palette.border)
                .set(PropertyKey::ScrollbarColor, palette.scrollbar)
        }

        colors(&self.light)
            .set(PropertyKey::PixelSize, pixel_size)
            .set(PropertyKey::Opacity, 1.0)
            .set(PropertyKey::BorderOpacity, 1.0)
            .set(PropertyKey::ScrollbarOpacity, 1.0)
            .set(PropertyKey::ScrollbarWidth, 10.0)
            .set(PropertyKey::FontSize, 16.0)
            .set(PropertyKey::LineHeight, 1.2)
            .set(PropertyKey::LetterSpacing, 0.0)
            .set(PropertyKey::DepthTest, true)
            .set(PropertyKey::RenderOrder, 0)
            .variant(Condition::Dark, colors(&self.dark))
    }

    /// The lowest-precedence source of a non-root component.
    pub fn element_source(&self) -> PropertySource {
        self.default_source(0.0).without_inherited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{ConditionContext, MergedProperties, Transformers};

    #[test]
    fn test_default_source_switches_with_scheme() {
        reset_theme_state();
        let theme = Theme::default();
        let merged = MergedProperties::new(
            Transformers::standard(),
            ConditionContext { dark: dark_condition(), ..Default::default() },
            None,
        );
        merged.add_all([theme.default_source(0.01)]);

        assert_eq!(merged.color(PropertyKey::Color), Some(theme.light.foreground));
        set_preferred_color_scheme(ColorScheme::Dark);
        assert_eq!(merged.color(PropertyKey::Color), Some(theme.dark.foreground));
        assert_eq!(merged.number(PropertyKey::PixelSize), Some(0.01));
        reset_theme_state();
    }

    #[test]
    fn test_element_source_leaves_inherited_keys() {
        let source = Theme::default().element_source();
        assert!(source.get(PropertyKey::Color).is_none());
        assert!(source.get(PropertyKey::PixelSize).is_none());
        assert!(source.get(PropertyKey::BorderColor).is_some());
        assert_eq!(source.variants().len(), 1);
    }

    #[test]
    fn test_theme_from_json() {
        let theme: Theme = serde_json::from_str(
            r#"{
                "name": "mono",
                "light": {
                    "foreground": { "r": 0, "g": 0, "b": 0, "a": 1 },
                    "border": { "r": 0.5, "g": 0.5, "b": 0.5, "a": 1 },
                    "scrollbar": { "r": 0.5, "g": 0.5, "b": 0.5, "a": 1 }
                },
                "dark": {
                    "foreground": { "r": 1, "g": 1, "b": 1, "a": 1 },
                    "border": { "r": 0.5, "g": 0.5, "b": 0.5, "a": 1 },
                    "scrollbar": { "r": 0.5, "g": 0.5, "b": 0.5, "a": 1 }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(theme.dark.foreground, Color::WHITE);
    }
}
