use thiserror::Error;

/// Error taxonomy for the interpreter.
///
/// Inside the evaluator these never escape as `Err`: `apply` turns them into
/// [`Value::Error`] so they flow through reduction like any other value. Only
/// the text parser returns them directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LispError {
    #[error("Function '{func}' passed incorrect type for argument {index}: got {got}, expected {expected}")]
    TypeMismatch {
        func: String,
        index: usize,
        expected: &'static str,
        got: &'static str,
    },
    #[error("Function '{func}' passed incorrect number of arguments: got {got}, expected {expected}")]
    ArityMismatch {
        func: String,
        expected: String,
        got: usize,
    },
    #[error("Function '{0}' passed {{}}")]
    EmptyList(String),
    #[error("unbound symbol {0}")]
    UnboundSymbol(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid number")]
    MalformedNumber,
    #[error("first element is not a function")]
    NotAFunction,
    #[error("too many arguments: got {got}, expected {expected}")]
    TooManyArguments { got: usize, expected: usize },
    #[error("integer overflow in {0}")]
    Overflow(&'static str),
    #[error("{0}")]
    User(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LispError {
    pub fn type_mismatch(func: &str, index: usize, expected: &'static str, got: &Value) -> Self {
        LispError::TypeMismatch {
            func: func.to_string(),
            index,
            expected,
            got: got.type_name(),
        }
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod parser;
pub mod reader;

pub use ast::Value;
pub use evaluator::{EnvRef, Environment};

/// Parse `source` and evaluate each top-level expression in order
///
/// Unlike a REPL line, which is read as one S-expression, every top-level form
/// is evaluated on its own. Source files therefore write their forms in
/// parentheses: `(def {x} 5)`. An error value does not stop later forms.
pub fn eval_source(env: &EnvRef, source: &str) -> Result<Vec<Value>, LispError> {
    let tree = parser::parse(source)?;
    let forms = match reader::read(&tree) {
        Value::List { items, .. } => items,
        other => vec![other],
    };
    Ok(forms
        .into_iter()
        .map(|form| evaluator::eval(env, form))
        .collect())
}
