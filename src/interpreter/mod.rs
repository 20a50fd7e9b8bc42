//! Interpreter boundary for script extraction functions.
//!
//! An [`Interpreter`] compiles source text once into a [`CompiledFunction`].
//! The compiled function owns its scope and is shared read-only across
//! threads; each [`CompiledFunction::call`] acquires a thread-appropriate
//! execution context for the duration of that call only.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

#[cfg(feature = "javascript")]
pub mod javascript;
#[cfg(feature = "python-bridge")]
pub mod python;

#[cfg(feature = "javascript")]
pub use javascript::{JavascriptFunction, JavascriptInterpreter};
#[cfg(feature = "python-bridge")]
pub use python::{PythonFunction, PythonInterpreter};

/// An expression interpreter that turns source text into a callable
pub trait Interpreter: Send + Sync {
    /// Type name of the script variant this interpreter backs
    fn name(&self) -> &'static str;

    /// Reserved cache tag for functions compiled by this interpreter
    fn cache_type_id(&self) -> u8;

    /// Compile `source` into a single-argument callable
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Compilation` if the source is malformed or
    /// does not produce a callable. Never deferred to the first call.
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledFunction>>;
}

/// A compiled single-argument function bound to its own scope
pub trait CompiledFunction: Send + Sync {
    /// Invoke the function with `input` as its sole argument
    ///
    /// # Returns
    ///
    /// * `Ok(Some(s))` - String form of the function's result
    /// * `Ok(None)` - The function returned null/None
    /// * `Err(ExtractionError::Evaluation)` - The function raised an error
    fn call(&self, input: &Value) -> Result<Option<String>>;
}
