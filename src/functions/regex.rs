//! Regex extraction function: first capture group of the first match.

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache_key::{cache_type_id, text_cache_key};
use crate::error::{ExtractionError, Result};
use crate::extraction_fn::{empty_to_none, value_to_text, ExtractionFn, ExtractionType};

/// Configuration shape for a regex extraction function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexExtractionFnSpec {
    #[serde(default)]
    pub expr: Option<String>,
}

impl RegexExtractionFnSpec {
    pub fn build(&self) -> Result<RegexExtractionFn> {
        let expr = self.expr.as_deref().ok_or_else(|| {
            ExtractionError::Configuration("expr must not be null".to_string())
        })?;
        RegexExtractionFn::new(expr)
    }
}

/// Returns capture group 1 of the first match, or the input when nothing matches
#[derive(Clone)]
pub struct RegexExtractionFn {
    expr: String,
    pattern: Regex,
}

impl RegexExtractionFn {
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

impl ExtractionFn for RegexExtractionFn {
    fn type_name(&self) -> &'static str {
        "regex"
    }

    fn apply(&self, value: &Value) -> Result<Option<String>> {
        let Some(text) = value_to_text(value) else {
            return Ok(None);
        };

        let extracted = match self.pattern.captures(&text) {
            Some(caps) => caps.get(1).map(|m| m.as_str().to_string()),
            None => Some(text),
        };

        Ok(empty_to_none(extracted))
    }

    fn cache_key(&self) -> Vec<u8> {
        text_cache_key(cache_type_id::REGEX, &self.expr)
    }

    fn preserves_ordering(&self) -> bool {
        false
    }

    fn extraction_type(&self) -> ExtractionType {
        ExtractionType::ManyToOne
    }
}

impl PartialEq for RegexExtractionFn {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for RegexExtractionFn {}

impl Hash for RegexExtractionFn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.expr.hash(state);
    }
}

impl fmt::Debug for RegexExtractionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexExtractionFn")
            .field("expr", &self.expr)
            .finish()
    }
}

impl fmt::Display for RegexExtractionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "regex(/{}/)", self.expr)
    }
}
