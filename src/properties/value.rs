//! Property values.
//!
//! [`Value`] is the dynamically typed payload every property carries.
//! [`PropValue`] wraps a value as static, a signal, or a getter so reactive
//! connections survive all the way into merged properties.

use std::rc::Rc;

use crate::error::{Result, UiError};
use crate::reactive::{Derived, Signal};
use crate::types::{Color, Dimension, Keyword};

// =============================================================================
// Value
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    Percent(f32),
    Auto,
    Bool(bool),
    Color(Color),
    Str(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_dimension(&self) -> Option<Dimension> {
        match self {
            Value::Number(n) => Some(Dimension::Length(*n)),
            Value::Percent(p) => Some(Dimension::Percent(*p)),
            Value::Auto => Some(Dimension::Auto),
            Value::Str(s) => Dimension::parse(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Str(s) => Color::parse(s),
            Value::Number(n) if *n >= 0.0 => Some(Color::from_hex(*n as u32)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_keyword<K: Keyword>(&self) -> Option<K> {
        match self {
            Value::Str(s) => K::from_name(s),
            Value::Auto => K::from_name("auto"),
            _ => None,
        }
    }

    /// Convert a JSON scalar into a value.
    pub fn from_json(property: &str, json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(|n| Value::Number(n as f32))
                .ok_or_else(|| UiError::invalid_value(property, "number out of range")),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::String(s) => Ok(Self::from_text(s)),
            other => Err(UiError::invalid_value(
                property,
                format!("expected a number, boolean or string, got {other}"),
            )),
        }
    }

    /// Interpret text: `"auto"`, `"50%"`, or a plain string.
    pub fn from_text(s: &str) -> Self {
        if s.eq_ignore_ascii_case("auto") {
            return Value::Auto;
        }
        if let Some(p) = s.strip_suffix('%') {
            if let Ok(p) = p.trim().parse() {
                return Value::Percent(p);
            }
        }
        Value::Str(s.to_string())
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value as f32)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f32)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::from_text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::from_text(&value)
    }
}

impl From<Dimension> for Value {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Auto => Value::Auto,
            Dimension::Length(n) => Value::Number(n),
            Dimension::Percent(p) => Value::Percent(p),
        }
    }
}

// =============================================================================
// Prop Value - Reactive property wrapper
// =============================================================================

/// A property value that can be static, a signal, or a getter.
///
/// Reading through [`PropValue::get`] inside a derived or effect tracks the
/// underlying signal.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal (changes propagate automatically).
    Signal(Signal<T>),
    /// Getter function (called each time value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }

    pub fn getter(f: impl Fn() -> T + 'static) -> Self {
        PropValue::Getter(Rc::new(f))
    }

    pub fn is_static(&self) -> bool {
        matches!(self, PropValue::Static(_))
    }
}

impl PropValue<Value> {
    /// Bind a typed signal, converting on every read.
    pub fn from_signal<S>(signal: Signal<S>) -> Self
    where
        S: Clone + Into<Value> + 'static,
    {
        PropValue::Getter(Rc::new(move || signal.get().into()))
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for PropValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Static(v) => f.debug_tuple("Static").field(v).finish(),
            PropValue::Signal(s) => f.debug_tuple("Signal").field(s).finish(),
            PropValue::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl<T: Clone + PartialEq + 'static> From<Derived<T>> for PropValue<T> {
    fn from(derived: Derived<T>) -> Self {
        PropValue::Getter(Rc::new(move || derived.get()))
    }
}

impl From<Value> for PropValue<Value> {
    fn from(value: Value) -> Self {
        PropValue::Static(value)
    }
}

macro_rules! static_prop_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue<Value> {
                fn from(value: $ty) -> Self {
                    PropValue::Static(Value::from(value))
                }
            }
        )*
    };
}

static_prop_from!(f32, f64, i32, bool, &str, String, Color, Dimension);
