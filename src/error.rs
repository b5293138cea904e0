//! Error types.
//!
//! Configuration problems surface as [`UiError`]. Broken invariants (using a
//! destroyed root, registering into a destroyed group, reactive cycles) panic
//! instead; they are programming errors, not recoverable states.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UiError>;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown property: {name}")]
    UnknownProperty { name: String },

    #[error("unknown condition: {name}")]
    UnknownCondition { name: String },

    #[error("invalid value for {property}: {reason}")]
    InvalidValue { property: String, reason: String },

    #[error("expected a JSON object for {context}")]
    ExpectedObject { context: String },

    #[error("layout engine error: {0}")]
    Layout(String),
}

impl UiError {
    pub fn invalid_value(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            property: property.into(),
            reason: reason.into(),
        }
    }
}
