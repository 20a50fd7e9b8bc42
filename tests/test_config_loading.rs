//! Configuration loading and registry tests that do not need an interpreter

use std::io::Write;
use std::sync::Arc;

use extractfn::{
    cache_type_id, CompiledFunction, ExtractionConfig, ExtractionError, ExtractionFnRegistry,
    ExtractionType, Interpreter, Result,
};
use serde_json::{json, Value};

/// Interpreter whose source text is a fixed suffix to append
struct SuffixInterpreter;

const SUFFIX_TAG: u8 = 0x7F;

struct Suffix(String);

impl Interpreter for SuffixInterpreter {
    fn name(&self) -> &'static str {
        "suffix"
    }

    fn cache_type_id(&self) -> u8 {
        SUFFIX_TAG
    }

    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledFunction>> {
        if source.contains('(') {
            return Err(ExtractionError::Compilation(format!("unbalanced: {}", source)));
        }
        Ok(Arc::new(Suffix(source.to_string())))
    }
}

impl CompiledFunction for Suffix {
    fn call(&self, input: &Value) -> Result<Option<String>> {
        Ok(input.as_str().map(|s| format!("{}{}", s, self.0)))
    }
}

const CONFIG: &str = r#"
extraction_fns:
  bang:
    type: suffix
    function: "!"
  bang_injective:
    type: suffix
    function: "!"
    injective: true
  domain:
    type: regex
    expr: "@(.+)$"
  only_errors:
    type: partial
    expr: "^ERR"
"#;

fn registry() -> ExtractionFnRegistry {
    let mut registry = ExtractionFnRegistry::with_builtins();
    registry.register_interpreter("suffix", Arc::new(SuffixInterpreter));
    registry
}

#[test]
fn test_load_and_build_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let config = ExtractionConfig::load_from_file(file.path()).unwrap();
    let fns = config.build_all(&registry()).unwrap();

    assert_eq!(
        fns.keys().collect::<Vec<_>>(),
        vec!["bang", "bang_injective", "domain", "only_errors"]
    );
    assert_eq!(fns["bang"].apply_str("hi").unwrap(), Some("hi!".to_string()));
    assert_eq!(
        fns["domain"].apply_str("a@example.com").unwrap(),
        Some("example.com".to_string())
    );
    assert_eq!(fns["only_errors"].apply_str("ERR 1").unwrap(), Some("ERR 1".to_string()));
}

#[test]
fn test_injective_config_shares_cache_key() {
    let config = ExtractionConfig::from_yaml_str(CONFIG).unwrap();
    let registry = registry();

    let a = config.build("bang", &registry).unwrap();
    let b = config.build("bang_injective", &registry).unwrap();

    assert_eq!(a.cache_key(), b.cache_key());
    assert_eq!(a.extraction_type(), ExtractionType::ManyToOne);
    assert_eq!(b.extraction_type(), ExtractionType::OneToOne);
}

#[test]
fn test_first_byte_is_variant_tag() {
    let config = ExtractionConfig::from_yaml_str(CONFIG).unwrap();
    let fns = config.build_all(&registry()).unwrap();

    assert_eq!(fns["bang"].cache_key()[0], SUFFIX_TAG);
    assert_eq!(fns["domain"].cache_key()[0], cache_type_id::REGEX);
    assert_eq!(fns["only_errors"].cache_key()[0], cache_type_id::PARTIAL);

    for f in fns.values() {
        assert!(!f.preserves_ordering());
    }
}

#[test]
fn test_json_config_is_accepted() {
    let config = ExtractionConfig::from_yaml_str(
        r#"{"extraction_fns": {"bang": {"type": "suffix", "function": "?"}}}"#,
    )
    .unwrap();

    let f = config.build("bang", &registry()).unwrap();
    assert_eq!(f.apply_str("ok").unwrap(), Some("ok?".to_string()));
}

#[test]
fn test_bad_function_fails_whole_config() {
    let config = ExtractionConfig::from_yaml_str(
        "extraction_fns:\n  broken:\n    type: suffix\n    function: \"(\"\n",
    )
    .unwrap();

    let err = config.build_all(&registry()).unwrap_err();
    assert!(matches!(err, ExtractionError::Compilation(_)));
}

#[test]
fn test_missing_function_is_configuration_error() {
    let err = registry()
        .build(&json!({"type": "suffix", "injective": true}))
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Configuration(_)));
}
