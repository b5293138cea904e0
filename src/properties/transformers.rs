//! Property transformers.
//!
//! A transformer runs when its key is ingested into [`MergedProperties`] and
//! expands the written value into one or more properties. Expansion happens
//! once per ingestion; values that depend on other properties are expressed
//! as [`Entry::Derived`] and resolved live on every read.
//!
//! [`MergedProperties`]: super::MergedProperties

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::DEFAULT_PIXEL_SIZE;

use super::key::PropertyKey;
use super::merged::MergedProperties;
use super::value::{PropValue, Value};

/// Computes a property from an input value and the other resolved properties.
pub type DeriveFn = Rc<dyn Fn(&Value, &MergedProperties) -> Value>;

/// A resolved slot in merged properties.
#[derive(Clone)]
pub enum Entry {
    Value(PropValue<Value>),
    Derived { input: PropValue<Value>, derive: DeriveFn },
}

impl Entry {
    pub fn resolve(&self, properties: &MergedProperties) -> Value {
        match self {
            Entry::Value(value) => value.get(),
            Entry::Derived { input, derive } => derive(&input.get(), properties),
        }
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Entry::Derived { input, .. } => f.debug_struct("Derived").field("input", input).finish(),
        }
    }
}

/// Expansion produced by one transformer call.
pub type TransformFn = Rc<dyn Fn(&PropValue<Value>) -> Vec<(PropertyKey, Entry)>>;

/// Transformer table keyed by the property that triggers it.
#[derive(Clone, Default)]
pub struct Transformers {
    table: HashMap<PropertyKey, TransformFn>,
}

impl Transformers {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transform` for `key`, replacing any earlier registration.
    pub fn register(
        &mut self,
        key: PropertyKey,
        transform: impl Fn(&PropValue<Value>) -> Vec<(PropertyKey, Entry)> + 'static,
    ) {
        self.table.insert(key, Rc::new(transform));
    }

    pub fn get(&self, key: PropertyKey) -> Option<&TransformFn> {
        self.table.get(&key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Size conversion and shorthand expansion.
    pub fn standard() -> Self {
        use PropertyKey as K;

        let mut t = Self::new();

        t.register(K::SizeX, |input| vec![(K::Width, world_to_layout(input))]);
        t.register(K::SizeY, |input| vec![(K::Height, world_to_layout(input))]);

        t.register(K::Padding, fan_out(&[K::PaddingTop, K::PaddingRight, K::PaddingBottom, K::PaddingLeft]));
        t.register(K::PaddingX, fan_out(&[K::PaddingLeft, K::PaddingRight]));
        t.register(K::PaddingY, fan_out(&[K::PaddingTop, K::PaddingBottom]));
        t.register(K::Margin, fan_out(&[K::MarginTop, K::MarginRight, K::MarginBottom, K::MarginLeft]));
        t.register(K::MarginX, fan_out(&[K::MarginLeft, K::MarginRight]));
        t.register(K::MarginY, fan_out(&[K::MarginTop, K::MarginBottom]));
        t.register(K::Border, fan_out(&[K::BorderTop, K::BorderRight, K::BorderBottom, K::BorderLeft]));
        t.register(K::BorderX, fan_out(&[K::BorderLeft, K::BorderRight]));
        t.register(K::BorderY, fan_out(&[K::BorderTop, K::BorderBottom]));
        t.register(K::Gap, fan_out(&[K::RowGap, K::ColumnGap]));

        t.register(
            K::BorderRadius,
            fan_out(&[
                K::BorderTopLeftRadius,
                K::BorderTopRightRadius,
                K::BorderBottomRightRadius,
                K::BorderBottomLeftRadius,
            ]),
        );
        t.register(K::BorderTopRadius, fan_out(&[K::BorderTopLeftRadius, K::BorderTopRightRadius]));
        t.register(K::BorderBottomRadius, fan_out(&[K::BorderBottomLeftRadius, K::BorderBottomRightRadius]));
        t.register(K::BorderLeftRadius, fan_out(&[K::BorderTopLeftRadius, K::BorderBottomLeftRadius]));
        t.register(K::BorderRightRadius, fan_out(&[K::BorderTopRightRadius, K::BorderBottomRightRadius]));

        t
    }
}

impl std::fmt::Debug for Transformers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.table.keys().collect();
        keys.sort();
        f.debug_struct("Transformers").field("keys", &keys).finish()
    }
}

/// Copy the input to every key in `targets`.
pub fn fan_out(
    targets: &'static [PropertyKey],
) -> impl Fn(&PropValue<Value>) -> Vec<(PropertyKey, Entry)> + 'static {
    move |input| targets.iter().map(|&key| (key, Entry::Value(input.clone()))).collect()
}

/// World size to layout units: `value / pixelSize`.
fn world_to_layout(input: &PropValue<Value>) -> Entry {
    Entry::Derived {
        input: input.clone(),
        derive: Rc::new(|value, properties| match value.as_number() {
            Some(size) => {
                let pixel_size = properties
                    .number(PropertyKey::PixelSize)
                    .filter(|p| *p > 0.0)
                    .unwrap_or(DEFAULT_PIXEL_SIZE);
                Value::Number(size / pixel_size)
            }
            None => value.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces() {
        let mut t = Transformers::new();
        t.register(PropertyKey::Gap, fan_out(&[PropertyKey::RowGap]));
        t.register(PropertyKey::Gap, fan_out(&[PropertyKey::ColumnGap]));
        assert_eq!(t.len(), 1);

        let out = (t.get(PropertyKey::Gap).unwrap())(&PropValue::Static(Value::Number(4.0)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, PropertyKey::ColumnGap);
    }

    #[test]
    fn test_padding_expands_to_edges() {
        let t = Transformers::standard();
        let out = (t.get(PropertyKey::Padding).unwrap())(&PropValue::Static(Value::Number(8.0)));
        let keys: Vec<_> = out.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                PropertyKey::PaddingTop,
                PropertyKey::PaddingRight,
                PropertyKey::PaddingBottom,
                PropertyKey::PaddingLeft
            ]
        );
    }
}
