//! Script extraction function.
//!
//! Compiles a user-supplied expression once, at construction, and evaluates it
//! per value at query time. The compiled callable is shared by every thread
//! applying the function. Identity, equality and the cache key are derived
//! from the interpreter's reserved tag and the source text, so two processes
//! compiling the same text agree on the cache key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache_key::text_cache_key;
use crate::error::{ExtractionError, Result};
use crate::extraction_fn::{empty_to_none, ExtractionFn, ExtractionType};
use crate::interpreter::{CompiledFunction, Interpreter};

/// Configuration shape for a script extraction function
///
/// ```yaml
/// type: javascript
/// function: "function(str) { return str + '!'; }"
/// injective: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptExtractionFnSpec {
    /// Expression source text
    #[serde(default)]
    pub function: Option<String>,

    /// Caller's assertion that the function is one-to-one
    #[serde(default)]
    pub injective: bool,
}

impl ScriptExtractionFnSpec {
    pub fn new(function: impl Into<String>, injective: bool) -> Self {
        Self {
            function: Some(function.into()),
            injective,
        }
    }

    /// Build with the embedded JavaScript interpreter
    #[cfg(feature = "javascript")]
    pub fn build(&self) -> Result<ScriptExtractionFn> {
        self.build_with(&crate::interpreter::JavascriptInterpreter::new())
    }

    /// Build with the given interpreter
    ///
    /// # Errors
    ///
    /// * `Configuration` - `function` is missing or blank
    /// * `Compilation` - the interpreter rejected the source
    pub fn build_with(&self, interpreter: &dyn Interpreter) -> Result<ScriptExtractionFn> {
        let function = self.function.as_deref().ok_or_else(|| {
            ExtractionError::Configuration("function must not be null".to_string())
        })?;

        ScriptExtractionFn::with_interpreter(interpreter, function, self.injective)
    }
}

/// Extraction function backed by a compiled script
#[derive(Clone)]
pub struct ScriptExtractionFn {
    function: String,
    injective: bool,
    type_name: &'static str,
    cache_type_id: u8,
    compiled: Arc<dyn CompiledFunction>,
}

impl ScriptExtractionFn {
    /// Compile `function` with the embedded JavaScript interpreter
    #[cfg(feature = "javascript")]
    pub fn new(function: impl Into<String>, injective: bool) -> Result<Self> {
        Self::with_interpreter(
            &crate::interpreter::JavascriptInterpreter::new(),
            function,
            injective,
        )
    }

    /// Compile `function` with the embedded Python interpreter
    #[cfg(feature = "python-bridge")]
    pub fn python(function: impl Into<String>, injective: bool) -> Result<Self> {
        Self::with_interpreter(
            &crate::interpreter::PythonInterpreter::new(),
            function,
            injective,
        )
    }

    /// Compile `function` with the given interpreter
    pub fn with_interpreter(
        interpreter: &dyn Interpreter,
        function: impl Into<String>,
        injective: bool,
    ) -> Result<Self> {
        let function = function.into();
        if function.trim().is_empty() {
            return Err(ExtractionError::Configuration(
                "function must not be empty".to_string(),
            ));
        }

        let compiled = interpreter.compile(&function)?;

        tracing::debug!(
            interpreter = interpreter.name(),
            injective,
            "Compiled script extraction function: {}",
            function
        );

        Ok(Self {
            function,
            injective,
            type_name: interpreter.name(),
            cache_type_id: interpreter.cache_type_id(),
            compiled,
        })
    }

    /// Expression source text
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn is_injective(&self) -> bool {
        self.injective
    }

    /// Configuration this function was built from
    pub fn spec(&self) -> ScriptExtractionFnSpec {
        ScriptExtractionFnSpec::new(self.function.clone(), self.injective)
    }
}

impl ExtractionFn for ScriptExtractionFn {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn apply(&self, value: &Value) -> Result<Option<String>> {
        match self.compiled.call(value) {
            Ok(result) => Ok(empty_to_none(result)),
            Err(e) => {
                tracing::trace!("Script extraction function failed: {}", e);
                Err(e)
            }
        }
    }

    fn cache_key(&self) -> Vec<u8> {
        text_cache_key(self.cache_type_id, &self.function)
    }

    // Arbitrary script logic cannot be shown to be monotonic.
    fn preserves_ordering(&self) -> bool {
        false
    }

    fn extraction_type(&self) -> ExtractionType {
        if self.injective {
            ExtractionType::OneToOne
        } else {
            ExtractionType::ManyToOne
        }
    }
}

// Equality and hashing ignore `injective`: the same source shares cache
// entries regardless of the cardinality hint.
impl PartialEq for ScriptExtractionFn {
    fn eq(&self, other: &Self) -> bool {
        self.cache_type_id == other.cache_type_id && self.function == other.function
    }
}

impl Eq for ScriptExtractionFn {}

impl Hash for ScriptExtractionFn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.function.hash(state);
    }
}

impl fmt::Debug for ScriptExtractionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptExtractionFn")
            .field("type", &self.type_name)
            .field("function", &self.function)
            .field("injective", &self.injective)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ScriptExtractionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptExtractionFn{{function='{}'}}", self.function)
    }
}

impl Serialize for ScriptExtractionFn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ScriptExtractionFn", 3)?;
        state.serialize_field("type", self.type_name())?;
        state.serialize_field("function", &self.function)?;
        state.serialize_field("injective", &self.injective)?;
        state.end()
    }
}
