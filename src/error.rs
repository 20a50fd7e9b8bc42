//! Error type shared by every extraction function variant.

use std::fmt;

/// Error type for extraction function construction and evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Configuration has the wrong shape (missing or empty required field)
    Configuration(String),
    /// Expression content was rejected while compiling
    Compilation(String),
    /// A per-value evaluation failed
    Evaluation(String),
    /// No variant registered under the requested type name
    NotFound(String),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ExtractionError::Compilation(msg) => write!(f, "Compilation error: {}", msg),
            ExtractionError::Evaluation(msg) => write!(f, "Evaluation error: {}", msg),
            ExtractionError::NotFound(name) => {
                write!(f, "Extraction function type not found: {}", name)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ExtractionError>;
