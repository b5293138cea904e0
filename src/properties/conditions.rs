//! Conditional variants.
//!
//! A property source may carry variants that only apply while a condition
//! holds: interaction state (`hover`, `active`), the color scheme (`dark`),
//! responsive breakpoints against the root width, or `important`, which always
//! applies and outranks explicit properties.

use crate::config::Breakpoints;
use crate::error::{Result, UiError};

use super::value::PropValue;

/// Responsive breakpoint, matched when the root width is at least its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Breakpoint {
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl Breakpoint {
    /// Minimum root width in layout units.
    pub fn min_width(self, breakpoints: &Breakpoints) -> f32 {
        match self {
            Breakpoint::Sm => breakpoints.sm,
            Breakpoint::Md => breakpoints.md,
            Breakpoint::Lg => breakpoints.lg,
            Breakpoint::Xl => breakpoints.xl,
            Breakpoint::Xxl => breakpoints.xxl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Hover,
    Active,
    Dark,
    Breakpoint(Breakpoint),
    Important,
}

impl Condition {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "hover" => Condition::Hover,
            "active" => Condition::Active,
            "dark" => Condition::Dark,
            "sm" => Condition::Breakpoint(Breakpoint::Sm),
            "md" => Condition::Breakpoint(Breakpoint::Md),
            "lg" => Condition::Breakpoint(Breakpoint::Lg),
            "xl" => Condition::Breakpoint(Breakpoint::Xl),
            "2xl" => Condition::Breakpoint(Breakpoint::Xxl),
            "important" => Condition::Important,
            _ => return None,
        })
    }

    /// Like [`Condition::from_name`], but an unknown name is an error.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| UiError::UnknownCondition { name: name.to_string() })
    }

    pub fn name(self) -> &'static str {
        match self {
            Condition::Hover => "hover",
            Condition::Active => "active",
            Condition::Dark => "dark",
            Condition::Breakpoint(Breakpoint::Sm) => "sm",
            Condition::Breakpoint(Breakpoint::Md) => "md",
            Condition::Breakpoint(Breakpoint::Lg) => "lg",
            Condition::Breakpoint(Breakpoint::Xl) => "xl",
            Condition::Breakpoint(Breakpoint::Xxl) => "2xl",
            Condition::Important => "important",
        }
    }
}

/// The reactive state conditions are evaluated against.
///
/// Each field is read through [`PropValue::get`], so a merged property that
/// depends on `hover` re-resolves when the hover signal changes.
#[derive(Clone)]
pub struct ConditionContext {
    pub hovered: PropValue<bool>,
    pub active: PropValue<bool>,
    pub dark: PropValue<bool>,
    /// Root width in layout units.
    pub root_width: PropValue<f32>,
    pub breakpoints: Breakpoints,
}

impl Default for ConditionContext {
    fn default() -> Self {
        Self {
            hovered: PropValue::Static(false),
            active: PropValue::Static(false),
            dark: PropValue::Static(false),
            root_width: PropValue::Static(0.0),
            breakpoints: Breakpoints::default(),
        }
    }
}

impl ConditionContext {
    pub fn is_met(&self, condition: Condition) -> bool {
        match condition {
            Condition::Hover => self.hovered.get(),
            Condition::Active => self.active.get(),
            Condition::Dark => self.dark.get(),
            Condition::Breakpoint(bp) => self.root_width.get() >= bp.min_width(&self.breakpoints),
            Condition::Important => true,
        }
    }

    pub fn all_met(&self, conditions: &[Condition]) -> bool {
        conditions.iter().all(|c| self.is_met(*c))
    }
}
