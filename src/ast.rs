use crate::LispError;
use crate::builtinops::BuiltinOp;
use crate::evaluator::Environment;

/// Core value types of the interpreter
///
/// Every value owns its children outright; `clone` is always a deep copy. The only
/// thing a clone shares with its source is a closure environment's parent link,
/// which is a non-owning back-reference (see [`Environment`]).
#[derive(Debug, Clone)]
pub enum Value {
    /// A diagnostic that short-circuits evaluation
    Error(String),
    /// Numbers (signed integers only)
    Number(i64),
    /// Symbols (identifiers), resolved through the environment chain
    Symbol(String),
    /// String literals
    String(String),
    /// Built-in operations and user-defined closures
    Function(Function),
    /// Evaluable (`( )`) and quoted (`{ }`) lists share one representation
    List { kind: ListKind, items: Vec<Value> },
}

/// Which of the two list flavors a [`Value::List`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// S-expression: children are reduced, then the head is applied to the rest
    Sexpr,
    /// Q-expression: evaluates to itself
    Qexpr,
}

#[derive(Debug, Clone)]
pub enum Function {
    /// Identified by its registry row; equality compares the registered id
    Builtin(&'static BuiltinOp),
    Closure(Closure),
}

/// A user-defined function produced by `\`
#[derive(Debug, Clone)]
pub struct Closure {
    /// Parameter names still awaiting an argument
    pub formals: Vec<String>,
    /// Unevaluated body; retagged as an S-expression when called
    pub body: Vec<Value>,
    /// Bindings accumulated so far (by partial application)
    pub env: Environment,
}

impl Closure {
    pub fn new(formals: Vec<String>, body: Vec<Value>) -> Self {
        Closure {
            formals,
            body,
            env: Environment::new(),
        }
    }
}

impl Value {
    pub fn sexpr(items: Vec<Value>) -> Value {
        Value::List {
            kind: ListKind::Sexpr,
            items,
        }
    }

    pub fn qexpr(items: Vec<Value>) -> Value {
        Value::List {
            kind: ListKind::Qexpr,
            items,
        }
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Human-readable variant name, used in type mismatch diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Error(_) => "Error",
            Value::Number(_) => "Number",
            Value::Symbol(_) => "Symbol",
            Value::String(_) => "String",
            Value::Function(_) => "Function",
            Value::List {
                kind: ListKind::Sexpr,
                ..
            } => "S-Expression",
            Value::List {
                kind: ListKind::Qexpr,
                ..
            } => "Q-Expression",
        }
    }
}

impl From<LispError> for Value {
    fn from(error: LispError) -> Self {
        Value::Error(error.to_string())
    }
}

impl From<Closure> for Value {
    fn from(closure: Closure) -> Self {
        Value::Function(Function::Closure(closure))
    }
}

/// Re-escape a string so it prints the way it would be written in source
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\0"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_items(
    f: &mut std::fmt::Formatter<'_>,
    items: &[Value],
    open: char,
    close: char,
) -> std::fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Error(message) => write!(f, "Error: {}", message),
            Value::Number(n) => write!(f, "{}", n),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::String(s) => write!(f, "\"{}\"", escape(s)),
            Value::Function(Function::Builtin(op)) => write!(f, "<builtin:{}>", op.id),
            Value::Function(Function::Closure(closure)) => {
                write!(f, "(\\ {{")?;
                write!(f, "{}", closure.formals.join(" "))?;
                write!(f, "}} ")?;
                write_items(f, &closure.body, '{', '}')?;
                write!(f, ")")
            }
            Value::List {
                kind: ListKind::Sexpr,
                items,
            } => write_items(f, items, '(', ')'),
            Value::List {
                kind: ListKind::Qexpr,
                items,
            } => write_items(f, items, '{', '}'),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Compare builtins by registered id, not function pointer
            (Function::Builtin(a), Function::Builtin(b)) => a.id == b.id,
            // Captured environments are deliberately not compared
            (Function::Closure(a), Function::Closure(b)) => {
                a.formals == b.formals && a.body == b.body
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (
                Value::List {
                    kind: k1,
                    items: i1,
                },
                Value::List {
                    kind: k2,
                    items: i2,
                },
            ) => k1 == k2 && i1 == i2,
            _ => false, // Different variants are never equal
        }
    }
}
