use lispy::{LispError, Value, eval_source, evaluator};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

fn source_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lispy-{}-{}.lspy", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_file_forms_evaluate_in_order_and_share_the_session() {
    let path = source_file(
        "prelude",
        "; helpers\n\
         (def {add} (\\ {a b}\n    {+ a b}))\n\
         (def {inc} (add 1))\n\
         (inc 41)\n",
    );
    let source = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let env = evaluator::create_global_env();
    let results = eval_source(&env, &source).unwrap();
    let printed: Vec<String> = results.iter().map(ToString::to_string).collect();
    assert_eq!(printed, vec!["()", "()", "42"]);

    // Definitions stay visible to later input in the same session
    assert_eq!(env.borrow().get("inc").to_string(), "(\\ {b} {+ a b})");
}

#[test]
fn test_file_errors_do_not_stop_later_forms() {
    let env = evaluator::create_global_env();
    let results = eval_source(&env, "(/ 1 0)\n(def {x} 5)\n(+ x 1)").unwrap();
    assert_eq!(
        results,
        vec![Value::error("division by zero"), Value::sexpr(vec![]), Value::Number(6)]
    );
}

#[test]
fn test_file_forms_without_parentheses_are_separate_expressions() {
    let env = evaluator::create_global_env();
    let results = eval_source(&env, "def {x} 5").unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1], Value::qexpr(vec![Value::symbol("x")]));
    assert_eq!(results[2], Value::Number(5));
    assert_eq!(env.borrow().get("x"), Value::error("unbound symbol x"));
}

#[test]
fn test_file_parse_error_is_reported() {
    let env = evaluator::create_global_env();
    assert!(matches!(
        eval_source(&env, "(def {x} 5"),
        Err(LispError::Parse(_))
    ));
    assert!(eval_source(&env, "").unwrap().is_empty());
}
