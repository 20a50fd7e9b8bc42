//! Concrete extraction function variants.

pub mod partial;
pub mod regex;
pub mod script;

pub use self::partial::{PartialExtractionFn, PartialExtractionFnSpec};
pub use self::regex::{RegexExtractionFn, RegexExtractionFnSpec};
pub use self::script::{ScriptExtractionFn, ScriptExtractionFnSpec};
