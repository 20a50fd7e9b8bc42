//! Integration tests for script extraction functions backed by embedded Python

#![cfg(feature = "python-bridge")]

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::thread;

use extractfn::{
    cache_type_id, ExtractionError, ExtractionFn, ExtractionFnRegistry, ExtractionType,
    PythonInterpreter, ScriptExtractionFn, ScriptExtractionFnSpec,
};
use serde_json::json;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_append_exclamation() {
    let source = "lambda s: s + '!'";
    let f = ScriptExtractionFn::python(source, false).unwrap();

    assert_eq!(f.apply_str("abc").unwrap(), Some("abc!".to_string()));
    assert_eq!(f.extraction_type(), ExtractionType::ManyToOne);
    assert!(!f.preserves_ordering());

    let mut expected = vec![0x5];
    expected.extend_from_slice(source.as_bytes());
    assert_eq!(f.cache_key(), expected);
}

#[test]
fn test_empty_string_result_is_none() {
    let f = ScriptExtractionFn::python("lambda s: ''", false).unwrap();

    assert_eq!(f.apply_str("abc").unwrap(), None);
    assert_eq!(f.apply_long(42).unwrap(), None);
    assert_eq!(f.apply(&json!({"a": 1})).unwrap(), None);
}

#[test]
fn test_cache_key_is_deterministic() {
    let sources = [
        "lambda s: s + '!'",
        "lambda s: str(s).lower()",
        "lambda s: 'ünïcödé ' + str(s)",
    ];

    for source in sources {
        let a = ScriptExtractionFn::python(source, false).unwrap();
        let b = ScriptExtractionFn::python(source, true).unwrap();

        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key()[0], cache_type_id::PYTHON);
        assert_eq!(&a.cache_key()[1..], source.as_bytes());
    }
}

#[test]
fn test_injective_flag_does_not_affect_identity() {
    let a = ScriptExtractionFn::python("lambda s: s.upper()", false).unwrap();
    let b = ScriptExtractionFn::python("lambda s: s.upper()", true).unwrap();

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.extraction_type(), ExtractionType::ManyToOne);
    assert_eq!(b.extraction_type(), ExtractionType::OneToOne);
}

#[test]
fn test_overloads_match_general_apply() {
    let f = ScriptExtractionFn::python("lambda v: type(v).__name__ + ':' + str(v)", false).unwrap();

    assert_eq!(f.apply_str("x").unwrap(), f.apply(&json!("x")).unwrap());
    assert_eq!(f.apply_long(7).unwrap(), f.apply(&json!(7)).unwrap());
    assert_eq!(f.apply_long(7).unwrap(), Some("int:7".to_string()));
}

#[test]
fn test_none_result_and_null_input() {
    let f = ScriptExtractionFn::python("lambda v: None if v is None else 'x'", false).unwrap();

    assert_eq!(f.apply(&json!(null)).unwrap(), None);
    assert_eq!(f.apply_str("anything").unwrap(), Some("x".to_string()));
}

#[test]
fn test_construction_failures_are_distinguishable() {
    let missing = ScriptExtractionFnSpec {
        function: None,
        injective: false,
    };
    assert!(matches!(
        missing.build_with(&PythonInterpreter::new()).unwrap_err(),
        ExtractionError::Configuration(_)
    ));

    assert!(matches!(
        ScriptExtractionFn::python("lambda s: s +", false).unwrap_err(),
        ExtractionError::Compilation(_)
    ));

    assert!(matches!(
        ScriptExtractionFn::python("'not callable'", false).unwrap_err(),
        ExtractionError::Compilation(_)
    ));
}

#[test]
fn test_evaluation_error_is_reported_and_recoverable() {
    let f = ScriptExtractionFn::python("lambda s: 1 / int(s)", false).unwrap();

    assert!(matches!(
        f.apply_str("0").unwrap_err(),
        ExtractionError::Evaluation(_)
    ));
    assert_eq!(f.apply_str("4").unwrap(), Some("0.25".to_string()));
}

#[test]
fn test_concurrent_apply() {
    let f = Arc::new(ScriptExtractionFn::python("lambda s: 'v' + str(s)", false).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let f = Arc::clone(&f);
            thread::spawn(move || {
                for i in 0..200i64 {
                    let input = t * 1000 + i;
                    let result = f.apply_long(input).unwrap();
                    assert_eq!(result, Some(format!("v{}", input)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_failures_do_not_leak_between_threads() {
    let f = Arc::new(ScriptExtractionFn::python("lambda s: s.upper()", false).unwrap());

    thread::scope(|scope| {
        for t in 0..4 {
            let f = Arc::clone(&f);
            scope.spawn(move || {
                for i in 0..100 {
                    if (t + i) % 2 == 0 {
                        assert!(f.apply_long(i).is_err());
                    } else {
                        assert_eq!(f.apply_str("ok").unwrap(), Some("OK".to_string()));
                    }
                }
            });
        }
    });
}

#[test]
fn test_registry_builds_python() {
    let registry = ExtractionFnRegistry::with_builtins();
    let f = registry
        .build(&json!({"type": "python", "function": "lambda s: s[::-1]", "injective": true}))
        .unwrap();

    assert_eq!(f.type_name(), "python");
    assert_eq!(f.apply_str("abc").unwrap(), Some("cba".to_string()));
    assert_eq!(f.extraction_type(), ExtractionType::OneToOne);

    let err = registry
        .build(&json!({"type": "python", "function": "lambda s: (", "injective": false}))
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Compilation(_)));
}

#[test]
fn test_cache_keys_dedupe_across_variants_by_tag() {
    let registry = ExtractionFnRegistry::with_builtins();
    let script = registry
        .build(&json!({"type": "python", "function": "lambda s: s"}))
        .unwrap();
    let regex = registry
        .build(&json!({"type": "regex", "expr": "lambda s: s"}))
        .unwrap();

    let keys: HashSet<Vec<u8>> = [script.cache_key(), regex.cache_key()].into_iter().collect();
    assert_eq!(keys.len(), 2);
}

#[test]
fn test_drop_releases_function() {
    for _ in 0..50 {
        let f = ScriptExtractionFn::python("lambda s: s * 2", false).unwrap();
        let copy = f.clone();
        drop(f);
        assert_eq!(copy.apply_str("ab").unwrap(), Some("abab".to_string()));
    }
}
