//! Extraction function configuration loader.
//!
//! Loads named extraction function definitions from YAML (JSON documents are
//! accepted too) and builds them through an [`ExtractionFnRegistry`].

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ExtractionError, Result};
use crate::extraction_fn::ExtractionFn;
use crate::registry::ExtractionFnRegistry;

/// Named extraction function definitions, in document order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Extraction function configs: name -> `{"type": ..., ...}`
    #[serde(default)]
    pub extraction_fns: IndexMap<String, JsonValue>,
}

impl ExtractionConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Example
    /// ```ignore
    /// use extractfn::ExtractionConfig;
    ///
    /// let config = ExtractionConfig::load_from_file("config/extraction_fns.yaml")?;
    /// println!("Defined: {:?}", config.names());
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|e| {
            ExtractionError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_yaml_str(&contents).map_err(|e| match e {
            ExtractionError::Configuration(msg) => {
                ExtractionError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        tracing::info!(
            "Loaded {} extraction function definitions from {}",
            config.extraction_fns.len(),
            path.display()
        );

        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(contents).map_err(|e| {
            ExtractionError::Configuration(format!("Failed to parse YAML: {}", e))
        })?;

        let fns_yaml = yaml.get("extraction_fns").ok_or_else(|| {
            ExtractionError::Configuration("Config missing 'extraction_fns' field".to_string())
        })?;

        let extraction_fns: IndexMap<String, JsonValue> =
            serde_yaml::from_value(fns_yaml.clone()).map_err(|e| {
                ExtractionError::Configuration(format!(
                    "Failed to parse extraction functions: {}",
                    e
                ))
            })?;

        Ok(Self { extraction_fns })
    }

    /// Defined names, in document order
    pub fn names(&self) -> Vec<&String> {
        self.extraction_fns.keys().collect()
    }

    /// Raw configuration for `name`
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.extraction_fns.get(name)
    }

    /// Build the extraction function named `name`
    pub fn build(&self, name: &str, registry: &ExtractionFnRegistry) -> Result<Arc<dyn ExtractionFn>> {
        let config = self.get(name).ok_or_else(|| {
            ExtractionError::Configuration(format!("No extraction function named '{}'", name))
        })?;

        registry
            .build(config)
            .map_err(|e| with_context(name, e))
    }

    /// Build every defined extraction function
    ///
    /// Fails on the first definition that cannot be built; nothing is
    /// returned for a partially valid configuration.
    pub fn build_all(
        &self,
        registry: &ExtractionFnRegistry,
    ) -> Result<IndexMap<String, Arc<dyn ExtractionFn>>> {
        self.extraction_fns
            .iter()
            .map(|(name, config)| {
                let f = registry.build(config).map_err(|e| with_context(name, e))?;
                Ok((name.clone(), f))
            })
            .collect()
    }
}

/// Prefix an error message with the definition name, keeping its category
fn with_context(name: &str, err: ExtractionError) -> ExtractionError {
    match err {
        ExtractionError::Configuration(msg) => {
            ExtractionError::Configuration(format!("'{}': {}", name, msg))
        }
        ExtractionError::Compilation(msg) => {
            ExtractionError::Compilation(format!("'{}': {}", name, msg))
        }
        other => other,
    }
}
