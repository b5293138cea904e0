//! Runtime configuration shared by every component under one root.
//!
//! All fields have defaults, so a partial JSON document is enough:
//!
//! ```
//! use spark_spatial::config::UiConfig;
//!
//! let config = UiConfig::from_json(r#"{ "pixel_size": 0.002 }"#).unwrap();
//! assert_eq!(config.pixel_size, 0.002);
//! assert_eq!(config.point_scale_factor, 100.0);
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::types::{AnchorX, AnchorY, Keyword};

/// Default world size of one layout unit.
pub const DEFAULT_PIXEL_SIZE: f32 = 0.01;

/// Default multiplier from layout units to layout-engine units.
pub const DEFAULT_POINT_SCALE_FACTOR: f32 = 100.0;

/// Responsive breakpoints, minimum root width in layout units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub sm: f32,
    pub md: f32,
    pub lg: f32,
    pub xl: f32,
    #[serde(rename = "2xl")]
    pub xxl: f32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self { sm: 640.0, md: 768.0, lg: 1024.0, xl: 1280.0, xxl: 1536.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// World units per layout unit.
    pub pixel_size: f32,
    /// Layout units are multiplied by this before reaching the layout engine,
    /// which rounds to whole engine units.
    pub point_scale_factor: f32,
    pub breakpoints: Breakpoints,
    /// Fraction of scroll velocity kept per second.
    pub scroll_friction: f32,
    /// Layout units scrolled per wheel delta unit.
    pub wheel_multiplier: f32,
    pub default_anchor_x: String,
    pub default_anchor_y: String,
    /// Seconds an emptied instance group is kept before it is released.
    pub group_release_delay: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            point_scale_factor: DEFAULT_POINT_SCALE_FACTOR,
            breakpoints: Breakpoints::default(),
            scroll_friction: 0.05,
            wheel_multiplier: 1.0,
            default_anchor_x: AnchorX::Center.name().to_string(),
            default_anchor_y: AnchorY::Center.name().to_string(),
            group_release_delay: 1.0,
        }
    }
}

impl UiConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configured default horizontal anchor; unknown names fall back to center.
    pub fn anchor_x(&self) -> AnchorX {
        AnchorX::from_name(&self.default_anchor_x).unwrap_or_default()
    }

    /// Configured default vertical anchor; unknown names fall back to center.
    pub fn anchor_y(&self) -> AnchorY {
        AnchorY::from_name(&self.default_anchor_y).unwrap_or_default()
    }
}
