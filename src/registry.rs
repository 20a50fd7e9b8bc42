//! Extraction function registry.
//!
//! Maps variant type names to factories that build an extraction function from
//! its JSON configuration, so the configuration layer can construct any
//! registered variant from `{"type": "...", ...}`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ExtractionError, Result};
use crate::extraction_fn::ExtractionFn;
use crate::functions::{PartialExtractionFnSpec, RegexExtractionFnSpec, ScriptExtractionFnSpec};
use crate::interpreter::Interpreter;

/// Trait for extraction function factories
pub trait ExtractionFnFactory: Send + Sync {
    /// Build an extraction function from its configuration object
    fn create(&self, config: &Value) -> Result<Arc<dyn ExtractionFn>>;
}

impl<F> ExtractionFnFactory for F
where
    F: Fn(&Value) -> Result<Arc<dyn ExtractionFn>> + Send + Sync,
{
    fn create(&self, config: &Value) -> Result<Arc<dyn ExtractionFn>> {
        self(config)
    }
}

/// Registry of extraction function variants, in registration order
pub struct ExtractionFnRegistry {
    factories: IndexMap<String, Box<dyn ExtractionFnFactory>>,
}

impl ExtractionFnRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in variants
    ///
    /// Registers `regex` and `partial`, plus `javascript` (embedded QuickJS,
    /// feature `javascript`) and `python` (embedded CPython, feature
    /// `python-bridge`) when those features are enabled.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(
            "regex",
            Box::new(|config: &Value| -> Result<Arc<dyn ExtractionFn>> {
                let spec: RegexExtractionFnSpec = parse_spec("regex", config)?;
                Ok(Arc::new(spec.build()?))
            }),
        );

        registry.register(
            "partial",
            Box::new(|config: &Value| -> Result<Arc<dyn ExtractionFn>> {
                let spec: PartialExtractionFnSpec = parse_spec("partial", config)?;
                Ok(Arc::new(spec.build()?))
            }),
        );

        #[cfg(feature = "javascript")]
        registry.register_interpreter(
            "javascript",
            Arc::new(crate::interpreter::JavascriptInterpreter::new()),
        );

        #[cfg(feature = "python-bridge")]
        registry.register_interpreter(
            "python",
            Arc::new(crate::interpreter::PythonInterpreter::new()),
        );

        registry
    }

    /// Register a variant factory, replacing any previous one with that name
    pub fn register(&mut self, name: impl Into<String>, factory: Box<dyn ExtractionFnFactory>) {
        let name = name.into();
        if self.factories.insert(name.clone(), factory).is_some() {
            tracing::warn!("Replaced extraction function factory '{}'", name);
        }
    }

    /// Register a script variant compiled by `interpreter`
    pub fn register_interpreter(&mut self, name: impl Into<String>, interpreter: Arc<dyn Interpreter>) {
        let name = name.into();
        let type_name = name.clone();

        self.register(
            name,
            Box::new(move |config: &Value| -> Result<Arc<dyn ExtractionFn>> {
                let spec: ScriptExtractionFnSpec = parse_spec(&type_name, config)?;
                Ok(Arc::new(spec.build_with(interpreter.as_ref())?))
            }),
        );
    }

    /// Build an extraction function from a `{"type": ..., ...}` object
    ///
    /// # Errors
    ///
    /// * `Configuration` - config is not an object or has no string `type`
    /// * `NotFound` - no variant is registered under `type`
    /// * any error raised by the variant's construction
    pub fn build(&self, config: &Value) -> Result<Arc<dyn ExtractionFn>> {
        let type_name = config
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ExtractionError::Configuration(
                    "Extraction function config missing 'type' field".to_string(),
                )
            })?;

        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| ExtractionError::NotFound(type_name.to_string()))?;

        factory.create(config)
    }

    /// Check if a variant is registered
    pub fn has_type(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered variant names, in registration order
    pub fn list_types(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl Default for ExtractionFnRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Deserialize a variant's configuration, ignoring the `type` tag
fn parse_spec<T: DeserializeOwned>(type_name: &str, config: &Value) -> Result<T> {
    let mut fields = config
        .as_object()
        .cloned()
        .ok_or_else(|| {
            ExtractionError::Configuration(format!(
                "'{}' extraction function config must be an object",
                type_name
            ))
        })?;
    fields.remove("type");

    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        ExtractionError::Configuration(format!(
            "Invalid '{}' extraction function config: {}",
            type_name, e
        ))
    })
}
