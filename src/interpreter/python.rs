//! Embedded CPython interpreter for script extraction functions.
//!
//! This module is only available when the `python-bridge` feature is enabled.
//!
//! A script is a Python expression evaluating to a single-argument callable:
//!
//! ```text
//! lambda s: s + '!'
//! ```

use std::sync::Arc;

use pyo3::exceptions::PySyntaxError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde_json::Value;

use super::{CompiledFunction, Interpreter};
use crate::cache_key::cache_type_id;
use crate::error::{ExtractionError, Result};

/// CPython interpreter
///
/// Initializes the embedded interpreter on first construction. Cheap to
/// create; all instances share the process-wide interpreter.
#[derive(Debug, Clone, Copy)]
pub struct PythonInterpreter;

impl PythonInterpreter {
    pub fn new() -> Self {
        pyo3::prepare_freethreaded_python();
        Self
    }
}

impl Default for PythonInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter for PythonInterpreter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn cache_type_id(&self) -> u8 {
        cache_type_id::PYTHON
    }

    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledFunction>> {
        Python::with_gil(|py| {
            // Every function gets a private globals dict so scripts cannot
            // observe each other's bindings.
            let scope = PyDict::new(py);

            let callable = py.eval(source.trim(), Some(scope), None).map_err(|e| {
                if e.is_instance_of::<PySyntaxError>(py) {
                    ExtractionError::Compilation(format!("Syntax error in function: {}", e))
                } else {
                    ExtractionError::Compilation(format!("Failed to evaluate function: {}", e))
                }
            })?;

            if !callable.is_callable() {
                let type_name = callable.get_type().name().unwrap_or("unknown");
                return Err(ExtractionError::Compilation(format!(
                    "Function must evaluate to a callable, got '{}'",
                    type_name
                )));
            }

            Ok(Arc::new(PythonFunction {
                callable: callable.into_py(py),
                scope: Py::from(scope),
            }) as Arc<dyn CompiledFunction>)
        })
    }
}

/// A compiled Python callable and the scope it closes over
///
/// `Py<T>` handles are `Send + Sync`; the GIL is only taken inside
/// [`CompiledFunction::call`] and released when the call returns.
pub struct PythonFunction {
    callable: PyObject,
    scope: Py<PyDict>,
}

impl CompiledFunction for PythonFunction {
    fn call(&self, input: &Value) -> Result<Option<String>> {
        Python::with_gil(|py| {
            let arg = json_value_to_py(py, input)?;

            let result = self.callable.call1(py, (arg,)).map_err(|e| {
                ExtractionError::Evaluation(format!("Python function call failed: {}", e))
            })?;

            let result = result.as_ref(py);
            if result.is_none() {
                return Ok(None);
            }

            let text = result
                .str()
                .and_then(|s| s.to_str().map(str::to_string))
                .map_err(|e| {
                    ExtractionError::Evaluation(format!(
                        "Failed to convert result to string: {}",
                        e
                    ))
                })?;

            Ok(Some(text))
        })
    }
}

impl Drop for PythonFunction {
    fn drop(&mut self) {
        // Release the callable and the scope's bindings under the GIL so they
        // are freed now rather than queued for the next thread that acquires
        // it. The emptied dict itself goes through pyo3's pending decrefs.
        Python::with_gil(|py| {
            self.scope.as_ref(py).clear();
            drop(std::mem::replace(&mut self.callable, py.None()));
        });
    }
}

/// Convert serde_json::Value to PyObject
fn json_value_to_py(py: Python, value: &Value) -> Result<PyObject> {
    match value {
        Value::Null => Ok(py.None()),
        Value::Bool(b) => Ok(b.into_py(py)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into_py(py))
            } else if let Some(u) = n.as_u64() {
                Ok(u.into_py(py))
            } else if let Some(f) = n.as_f64() {
                Ok(f.into_py(py))
            } else {
                Err(ExtractionError::Evaluation(format!(
                    "Unsupported number: {}",
                    n
                )))
            }
        }
        Value::String(s) => Ok(s.as_str().into_py(py)),
        Value::Array(arr) => {
            let items = arr
                .iter()
                .map(|v| json_value_to_py(py, v))
                .collect::<Result<Vec<PyObject>>>()?;
            Ok(items.into_py(py))
        }
        Value::Object(obj) => {
            let py_dict = PyDict::new(py);
            for (k, v) in obj {
                let py_value = json_value_to_py(py, v)?;
                py_dict.set_item(k, py_value).map_err(|e| {
                    ExtractionError::Evaluation(format!("Failed to set key '{}': {}", k, e))
                })?;
            }
            Ok(py_dict.into_py(py))
        }
    }
}
