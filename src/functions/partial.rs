//! Partial extraction function: keeps values matching a regex, drops the rest.

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache_key::{cache_type_id, text_cache_key};
use crate::error::{ExtractionError, Result};
use crate::extraction_fn::{empty_to_none, value_to_text, ExtractionFn, ExtractionType};

/// Configuration shape for a partial extraction function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialExtractionFnSpec {
    #[serde(default)]
    pub expr: Option<String>,
}

impl PartialExtractionFnSpec {
    pub fn build(&self) -> Result<PartialExtractionFn> {
        let expr = self.expr.as_deref().ok_or_else(|| {
            ExtractionError::Configuration("expr must not be null".to_string())
        })?;
        PartialExtractionFn::new(expr)
    }
}

#[derive(Clone)]
pub struct PartialExtractionFn {
    expr: String,
    pattern: Regex,
}

impl PartialExtractionFn {
    pub fn new(expr: impl Into<String>) -> Result<Self> {
        let expr = expr.into();
        let pattern = Regex::new(&expr).map_err(|e| {
            ExtractionError::Compilation(format!("Invalid regex '{}': {}", expr, e))
        })?;
        Ok(Self { expr, pattern })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }
}

impl ExtractionFn for PartialExtractionFn {
    fn type_name(&self) -> &'static str {
        "partial"
    }

    fn apply(&self, value: &Value) -> Result<Option<String>> {
        let kept = value_to_text(value).filter(|text| self.pattern.is_match(text));
        Ok(empty_to_none(kept))
    }

    fn cache_key(&self) -> Vec<u8> {
        text_cache_key(cache_type_id::PARTIAL, &self.expr)
    }

    fn preserves_ordering(&self) -> bool {
        false
    }

    fn extraction_type(&self) -> ExtractionType {
        ExtractionType::ManyToOne
    }
}

impl PartialEq for PartialExtractionFn {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for PartialExtractionFn {}

impl Hash for PartialExtractionFn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.expr.hash(state);
    }
}

impl fmt::Debug for PartialExtractionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialExtractionFn")
            .field("expr", &self.expr)
            .finish()
    }
}

impl fmt::Display for PartialExtractionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partial(/{}/)", self.expr)
    }
}
