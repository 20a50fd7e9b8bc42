//! Embedded QuickJS interpreter for JavaScript extraction functions.
//!
//! This module is only available when the `javascript` feature is enabled.
//!
//! A script is a JavaScript function expression taking one argument:
//!
//! ```text
//! function(str) { return str + '!'; }
//! ```

use std::sync::Arc;

use rquickjs::convert::Coerced;
use rquickjs::{CatchResultExt, Context, Ctx, Function, Runtime};
use serde_json::Value;

use super::{CompiledFunction, Interpreter};
use crate::cache_key::cache_type_id;
use crate::error::{ExtractionError, Result};

/// Global the compiled function is bound to inside its own context
const FUNCTION_BINDING: &str = "__extraction_fn";

/// QuickJS interpreter
///
/// Every compiled function gets its own runtime and context, so scripts
/// cannot observe each other's globals.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavascriptInterpreter;

impl JavascriptInterpreter {
    pub fn new() -> Self {
        Self
    }
}

impl Interpreter for JavascriptInterpreter {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn cache_type_id(&self) -> u8 {
        cache_type_id::JAVASCRIPT
    }

    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledFunction>> {
        let runtime = Runtime::new().map_err(|e| {
            ExtractionError::Compilation(format!("Failed to create JavaScript runtime: {}", e))
        })?;
        let context = Context::full(&runtime).map_err(|e| {
            ExtractionError::Compilation(format!("Failed to create JavaScript context: {}", e))
        })?;

        context.with(|ctx| -> Result<()> {
            // Parenthesized so `function(...) {...}` parses as an expression
            // rather than an anonymous declaration.
            let value: rquickjs::Value = ctx
                .eval(format!("({})", source.trim()))
                .catch(&ctx)
                .map_err(|e| {
                    ExtractionError::Compilation(format!("Failed to compile function: {}", e))
                })?;

            let type_name = value.type_name();
            let function = value.into_function().ok_or_else(|| {
                ExtractionError::Compilation(format!(
                    "Function must evaluate to a function, got '{}'",
                    type_name
                ))
            })?;

            ctx.globals().set(FUNCTION_BINDING, function).map_err(|e| {
                ExtractionError::Compilation(format!("Failed to bind function: {}", e))
            })
        })?;

        Ok(Arc::new(JavascriptFunction {
            context,
            _runtime: runtime,
        }))
    }
}

/// A compiled JavaScript function and the context that owns it
///
/// The context is locked for the duration of each [`CompiledFunction::call`],
/// so one function is entered by a single thread at a time.
pub struct JavascriptFunction {
    // Declared before the runtime so it is dropped first.
    context: Context,
    _runtime: Runtime,
}

impl CompiledFunction for JavascriptFunction {
    fn call(&self, input: &Value) -> Result<Option<String>> {
        self.context.with(|ctx| -> Result<Option<String>> {
            let function: Function = ctx.globals().get(FUNCTION_BINDING).map_err(|e| {
                ExtractionError::Evaluation(format!("Function binding is missing: {}", e))
            })?;

            let arg = json_value_to_js(&ctx, input)?;

            let result: rquickjs::Value = function
                .call((arg,))
                .catch(&ctx)
                .map_err(|e| {
                    ExtractionError::Evaluation(format!("JavaScript function call failed: {}", e))
                })?;

            // `undefined` is stringified like any other value; only `null`
            // means "no value".
            if result.is_null() {
                return Ok(None);
            }

            let text: Coerced<String> = result.get().catch(&ctx).map_err(|e| {
                ExtractionError::Evaluation(format!("Failed to convert result to string: {}", e))
            })?;

            Ok(Some(text.0))
        })
    }
}

/// Convert serde_json::Value to a JavaScript value in `ctx`
fn json_value_to_js<'js>(ctx: &Ctx<'js>, value: &Value) -> Result<rquickjs::Value<'js>> {
    let json = serde_json::to_string(value)
        .map_err(|e| ExtractionError::Evaluation(format!("Failed to encode input: {}", e)))?;

    ctx.json_parse(json)
        .catch(ctx)
        .map_err(|e| ExtractionError::Evaluation(format!("Failed to convert input: {}", e)))
}
