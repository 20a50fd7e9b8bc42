//! # Extractfn: Pluggable Value Extraction Functions
//!
//! Extractfn provides the extraction function abstraction used by a
//! column-oriented query engine to derive dimension values from raw input,
//! together with a registry of concrete variants.
//!
//! ## Features
//!
//! - **Uniform contract**: every variant exposes `apply`, a tagged cache key,
//!   ordering and cardinality metadata
//! - **Deterministic cache keys**: a reserved tag byte followed by the variant's
//!   declarative configuration, identical across processes
//! - **Script extraction functions**: user expressions compiled once at
//!   configuration time and applied per value from any thread
//! - **JavaScript**: embedded QuickJS via rquickjs (feature: `javascript`, on by default)
//! - **Python bridge**: embedded CPython via PyO3 (feature: `python-bridge`, on by default)
//!
//! ## Example: Configuration
//!
//! ```yaml
//! extraction_fns:
//!   shout:
//!     type: javascript
//!     function: "function(str) { return str.toUpperCase() + '!'; }"
//!     injective: true
//!   first_word:
//!     type: python
//!     function: "lambda s: s.split()[0] if s else None"
//!   username:
//!     type: regex
//!     expr: "^([^@]+)@"
//! ```
//!
//! ## Example: Script extraction function
//!
//! ```ignore
//! use extractfn::{ExtractionFn, ScriptExtractionFn};
//!
//! let f = ScriptExtractionFn::new("function(str) { return str + '!'; }", false)?;
//! assert_eq!(f.apply_str("abc")?, Some("abc!".to_string()));
//! assert_eq!(f.cache_key()[0], 0x4);
//! ```

pub mod cache_key;
pub mod config_loader;
pub mod error;
pub mod extraction_fn;
pub mod functions;
pub mod interpreter;
pub mod registry;

// Re-export key types
pub use cache_key::{cache_type_id, CacheKeyBuilder};
pub use config_loader::ExtractionConfig;
pub use error::{ExtractionError, Result};
pub use extraction_fn::{empty_to_none, ExtractionFn, ExtractionType};
pub use functions::{
    PartialExtractionFn, PartialExtractionFnSpec, RegexExtractionFn, RegexExtractionFnSpec,
    ScriptExtractionFn, ScriptExtractionFnSpec,
};
pub use interpreter::{CompiledFunction, Interpreter};
pub use registry::{ExtractionFnFactory, ExtractionFnRegistry};

#[cfg(feature = "javascript")]
pub use interpreter::JavascriptInterpreter;
#[cfg(feature = "python-bridge")]
pub use interpreter::PythonInterpreter;
