//! Property sources - one layer of properties as written by the user, a
//! theme, or a component's defaults.

use crate::error::{Result, UiError};

use super::conditions::Condition;
use super::key::PropertyKey;
use super::value::{PropValue, Value};

/// A conditional block inside a source.
#[derive(Debug, Clone)]
pub struct Variant {
    pub condition: Condition,
    pub source: PropertySource,
}

/// An ordered set of properties plus conditional variants.
///
/// Within one source a later entry for the same key wins, and among variants
/// the later declared one wins.
///
/// # Example
///
/// ```ignore
/// let source = PropertySource::new()
///     .set(PropertyKey::Padding, 8.0)
///     .set(PropertyKey::BackgroundColor, Color::WHITE)
///     .variant(Condition::Hover, PropertySource::new().set(PropertyKey::BackgroundColor, Color::BLUE));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    entries: Vec<(PropertyKey, PropValue<Value>)>,
    variants: Vec<Variant>,
}

impl PropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`PropertySource::insert`].
    pub fn set(mut self, key: PropertyKey, value: impl Into<PropValue<Value>>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: PropertyKey, value: impl Into<PropValue<Value>>) {
        self.entries.push((key, value.into()));
    }

    pub fn variant(mut self, condition: Condition, source: PropertySource) -> Self {
        self.variants.push(Variant { condition, source });
        self
    }

    /// Last value written for `key`, ignoring variants.
    pub fn get(&self, key: PropertyKey) -> Option<&PropValue<Value>> {
        self.entries.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(PropertyKey, PropValue<Value>)] {
        &self.entries
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.variants.is_empty()
    }

    /// Drop inheritable keys, here and in every variant, so a layer below
    /// the parent's values does not shadow them.
    pub fn without_inherited(mut self) -> Self {
        self.entries.retain(|(key, _)| !key.is_inherited());
        self.variants = self
            .variants
            .into_iter()
            .map(|v| Variant { condition: v.condition, source: v.source.without_inherited() })
            .filter(|v| !v.source.is_empty())
            .collect();
        self
    }

    /// Parse a JSON object such as
    /// `{ "padding": 8, "hover": { "backgroundColor": "#336" } }`.
    ///
    /// Condition names map to nested objects; every other key must be a
    /// known property.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| UiError::ExpectedObject {
            context: "property source".to_string(),
        })?;

        let mut source = PropertySource::new();
        for (name, value) in object {
            if let Some(condition) = Condition::from_name(name) {
                if !value.is_object() {
                    return Err(UiError::ExpectedObject { context: name.clone() });
                }
                source.variants.push(Variant { condition, source: Self::from_json(value)? });
                continue;
            }

            let key = PropertyKey::from_name(name)
                .ok_or_else(|| UiError::UnknownProperty { name: name.clone() })?;
            source.insert(key, Value::from_json(name, value)?);
        }
        Ok(source)
    }

    /// Parse a JSON string, see [`PropertySource::from_json`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json(&serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    #[test]
    fn test_builder_last_write_wins() {
        let source = PropertySource::new()
            .set(PropertyKey::Width, 10.0)
            .set(PropertyKey::Width, 20.0);
        assert_eq!(source.get(PropertyKey::Width).map(PropValue::get), Some(Value::Number(20.0)));
        assert!(source.get(PropertyKey::Height).is_none());
    }

    #[test]
    fn test_from_json_with_variants() {
        let source = PropertySource::from_json_str(
            r##"{ "padding": 8, "backgroundColor": "#ff0000", "hover": { "opacity": 0.5 } }"##,
        )
        .unwrap();

        assert_eq!(source.entries().len(), 2);
        assert_eq!(
            source.get(PropertyKey::BackgroundColor).and_then(|v| v.get().as_color()),
            Some(Color::RED)
        );
        assert_eq!(source.variants().len(), 1);
        assert_eq!(source.variants()[0].condition, Condition::Hover);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            PropertySource::from_json_str(r#"{ "colour": "red" }"#),
            Err(UiError::UnknownProperty { .. })
        ));
        assert!(matches!(
            PropertySource::from_json_str(r#"{ "hover": 3 }"#),
            Err(UiError::ExpectedObject { .. })
        ));
        assert!(matches!(PropertySource::from_json_str("[]"), Err(UiError::ExpectedObject { .. })));
        assert!(matches!(PropertySource::from_json_str("{"), Err(UiError::Json(_))));
    }
}
