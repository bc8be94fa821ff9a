// tests/engine_tests.rs

use std::{sync::Arc, thread};

use parsley::{Engine, Expression, Source, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_identical_text_yields_the_same_evaluator() {
    let engine = Engine::default();
    let first = engine.parse("a.b + 1").unwrap();
    let second = engine.parse(String::from("a.b + 1")).unwrap();
    let other = engine.parse("a.b+1").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(engine.len(), 2);
}

#[test]
fn test_engines_do_not_share_caches() {
    let one = Engine::default();
    let two = Engine::default();
    let a = one.parse("x").unwrap();
    let b = two.parse("x").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_repeated_evaluation_is_stable() {
    let engine = Engine::default();
    let expr = engine.parse("items | filter:'a' | limitTo:1").unwrap();
    let mut context = Value::from(json!({"items": ["b", "ab", "ca"]}));
    let first = expr.eval(&mut context).unwrap();
    for _ in 0..3 {
        assert_eq!(expr.eval(&mut context).unwrap(), first);
    }
    assert_eq!(first.to_json(), json!(["ab"]));
}

#[test]
fn test_constant_flags() {
    let engine = Engine::default();
    assert!(engine.parse("[1,2,3]").unwrap().is_constant());
    assert!(engine.parse("{a: 1 + 2}").unwrap().is_constant());
    assert!(engine.parse("1 | uppercase").unwrap().is_constant());
    assert!(!engine.parse("a+1").unwrap().is_constant());
    assert!(!engine.parse("f()").unwrap().is_constant());
    assert!(!engine.parse("[1, 2][i]").unwrap().is_constant());
}

#[test]
fn test_literal_flags() {
    let engine = Engine::default();
    for source in ["", "1", "'a'", "[a, b]", "{a: b}", "null"] {
        assert!(engine.parse(source).unwrap().is_literal(), "{source:?}");
    }
    for source in ["a", "1 + 1", "-1", "1; 2", "this"] {
        assert!(!engine.parse(source).unwrap().is_literal(), "{source:?}");
    }
}

#[test]
fn test_source_is_recorded() {
    let engine = Engine::default();
    assert_eq!(engine.parse("a | json").unwrap().source(), Some("a | json"));
    assert_eq!(Expression::noop().source(), None);
}

#[test]
fn test_programmatic_evaluators_pass_through() {
    let engine = Engine::default();
    let custom = Expression::from_fn(|frame| {
        let base = frame.lookup("base").to_number();
        Ok(Value::Float(base * 2.0))
    });
    let expr = engine.parse(custom).unwrap();
    assert!(!expr.is_assignable());
    let mut context = Value::from(json!({"base": 21}));
    assert_eq!(expr.eval(&mut context).unwrap(), Value::Integer(42));
    assert!(engine.is_empty());
}

#[test]
fn test_missing_source_is_a_noop() {
    let engine = Engine::default();
    let expr = engine.parse(Source::Empty).unwrap();
    let mut context = Value::from(json!({"a": 1}));
    assert_eq!(expr.eval(&mut context).unwrap(), Value::Undefined);
    assert!(!expr.is_assignable());
    assert!(!expr.is_constant());
}

#[test]
fn test_concurrent_parses_agree() {
    let engine = Arc::new(Engine::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let expr = engine.parse("n * 2").unwrap();
                let mut context = Value::from(json!({"n": 21}));
                (expr.eval(&mut context).unwrap(), engine.parse("n * 2").unwrap())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let winner = engine.parse("n * 2").unwrap();
    for (value, expr) in results {
        assert_eq!(value, Value::Integer(42));
        assert!(Arc::ptr_eq(&expr, &winner));
    }
    assert_eq!(engine.len(), 1);
}
