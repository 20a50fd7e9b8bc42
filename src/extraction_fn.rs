//! The extraction function abstraction.
//!
//! An extraction function maps an arbitrary input value to a derived string.
//! The query planner reads its metadata (ordering, cardinality) without looking
//! at the implementation, and the result cache folds its [`ExtractionFn::cache_key`]
//! into a broader query fingerprint.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Cardinality class of an extraction function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionType {
    /// Distinct inputs never map to the same output (asserted by configuration)
    OneToOne,
    /// Distinct inputs may map to the same output
    ManyToOne,
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionType::OneToOne => write!(f, "ONE_TO_ONE"),
            ExtractionType::ManyToOne => write!(f, "MANY_TO_ONE"),
        }
    }
}

/// Trait for extraction functions
///
/// Implementations are immutable after construction and shared across all
/// threads evaluating a query, so every method takes `&self`.
pub trait ExtractionFn: Send + Sync + fmt::Debug + fmt::Display {
    /// Name this variant is registered under
    fn type_name(&self) -> &'static str;

    /// Transform a single value
    ///
    /// # Returns
    ///
    /// * `Ok(Some(s))` - Derived value, never empty
    /// * `Ok(None)` - No value (empty results are normalized to `None`)
    /// * `Err(ExtractionError::Evaluation)` - The value could not be transformed
    fn apply(&self, value: &Value) -> Result<Option<String>>;

    /// Transform a string value; equivalent to `apply(&Value::String(..))`
    fn apply_str(&self, value: &str) -> Result<Option<String>> {
        self.apply(&Value::String(value.to_string()))
    }

    /// Transform an integer value; equivalent to `apply(&Value::from(..))`
    fn apply_long(&self, value: i64) -> Result<Option<String>> {
        self.apply(&Value::from(value))
    }

    /// Deterministic byte encoding of this instance's semantic identity,
    /// starting with the variant's reserved tag byte
    fn cache_key(&self) -> Vec<u8>;

    /// Whether `apply` is monotonic with respect to input ordering
    fn preserves_ordering(&self) -> bool;

    fn extraction_type(&self) -> ExtractionType;
}

/// Normalize an empty result to `None`
pub fn empty_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Render a non-string input as text for string-oriented variants
///
/// `null` renders as `None`; strings are passed through unchanged; numbers and
/// booleans use their JSON text; arrays and objects use compact JSON.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
