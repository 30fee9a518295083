//! Built-in operations registry.
//!
//! Every primitive is a row in [`BUILTIN_OPS`]: its identifier, its implementation
//! and the number of operands it accepts. The root environment binds each
//! identifier to a [`Function::Builtin`] pointing at its row.
//!
//! ```text
//! (+ 1 2 3)              ; 6
//! (head {1 2 3})         ; {1}
//! (join {1 2} {3})       ; {1 2 3}
//! (eval {+ 1 2})         ; 3
//! (def {inc} (\ {x} {+ x 1}))
//! (if (> 2 1) {1} {0})   ; 1
//! ```
//!
//! ## Error Handling
//!
//! Operations receive already-reduced operands (the function slot is stripped)
//! and report problems as [`LispError`]. The evaluator converts those into
//! `Error` values at the application boundary, so a failing builtin reduces its
//! whole expression to a single error value.
//!
//! - **Arity**: checked against the registry before dispatch
//! - **Types**: no coercion; `(+ 1 "1")` is a type mismatch
//! - **Overflow**: arithmetic is checked and reports overflow instead of wrapping
//!
//! ## Adding New Operations
//!
//! 1. Implement `fn(Vec<Value>) -> Result<Value, LispError>`, or take `&EnvRef`
//!    as well if the operation needs the calling environment
//! 2. Add a row to `BUILTIN_OPS` with its identifier and arity
//! 3. Add tests covering edge cases and error conditions

use crate::LispError;
use crate::ast::{Function, ListKind, Value};
use crate::evaluator::{
    EnvRef, builtin_def, builtin_eval, builtin_if, builtin_lambda, builtin_put, take_args,
};

/// Represents the expected number of operands for an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Arity {
    /// Exactly n operands required
    Exact(usize),
    /// At least n operands required
    AtLeast(usize),
    /// Any number of operands (0 or more)
    Any,
}

impl Arity {
    /// Check if the given number of operands is valid for this arity constraint
    pub fn validate(&self, func: &str, arg_count: usize) -> Result<(), LispError> {
        let (valid, expected) = match self {
            Arity::Exact(n) => (arg_count == *n, n.to_string()),
            Arity::AtLeast(n) => (arg_count >= *n, format!("at least {}", n)),
            Arity::Any => (true, String::new()),
        };

        if valid {
            Ok(())
        } else {
            Err(LispError::ArityMismatch {
                func: func.to_string(),
                expected,
                got: arg_count,
            })
        }
    }
}

/// Implementation of a built-in operation
#[derive(Clone, Copy)]
pub enum OpKind {
    /// Works on its operands alone
    Function(fn(Vec<Value>) -> Result<Value, LispError>),
    /// Needs the calling environment (evaluation, binding, closures)
    WithEnv(fn(&EnvRef, Vec<Value>) -> Result<Value, LispError>),
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::WithEnv(_) => write!(f, "WithEnv(<fn>)"),
        }
    }
}

/// Definition of a built-in operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// The identifier this operation is bound to in the root environment
    pub id: &'static str,
    /// The implementation of this operation
    pub op_kind: OpKind,
    /// Expected number of operands
    pub arity: Arity,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        // Operations are uniquely identified by id
        self.id == other.id
    }
}

impl BuiltinOp {
    /// Validate arity, then run the operation
    pub fn call(&self, env: &EnvRef, args: Vec<Value>) -> Result<Value, LispError> {
        self.arity.validate(self.id, args.len())?;
        match self.op_kind {
            OpKind::Function(func) => func(args),
            OpKind::WithEnv(func) => func(env, args),
        }
    }
}

//
// Operand helpers
//

/// Unwrap a Q-expression operand into its children
pub fn expect_qexpr(func: &str, index: usize, value: Value) -> Result<Vec<Value>, LispError> {
    match value {
        Value::List {
            kind: ListKind::Qexpr,
            items,
        } => Ok(items),
        other => Err(LispError::type_mismatch(func, index, "Q-Expression", &other)),
    }
}

/// Unwrap a Q-expression operand whose children must all be symbols
pub fn expect_symbols(func: &str, index: usize, value: Value) -> Result<Vec<String>, LispError> {
    expect_qexpr(func, index, value)?
        .into_iter()
        .map(|item| match item {
            Value::Symbol(name) => Ok(name),
            other => Err(LispError::type_mismatch(func, index, "Symbol", &other)),
        })
        .collect()
}

fn expect_numbers(func: &str, args: Vec<Value>) -> Result<Vec<i64>, LispError> {
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| match arg {
            Value::Number(n) => Ok(n),
            other => Err(LispError::type_mismatch(func, index, "Number", &other)),
        })
        .collect()
}

//
// Builtin Function Implementations
//

// Macro to generate left-to-right numeric folds; the first operand seeds the accumulator
macro_rules! numeric_fold {
    ($name:ident, $op_str:expr, $checked:ident, $op_name:expr) => {
        pub fn $name(args: Vec<Value>) -> Result<Value, LispError> {
            let numbers = expect_numbers($op_str, args)?;
            let (first, rest) = numbers
                .split_first()
                .ok_or_else(|| LispError::ArityMismatch {
                    func: $op_str.to_string(),
                    expected: "at least 1".to_string(),
                    got: 0,
                })?;
            let mut acc = *first;
            for n in rest {
                acc = acc.$checked(*n).ok_or(LispError::Overflow($op_name))?;
            }
            Ok(Value::Number(acc))
        }
    };
}

numeric_fold!(builtin_add, "+", checked_add, "addition");
numeric_fold!(builtin_sub, "-", checked_sub, "subtraction");
numeric_fold!(builtin_mul, "*", checked_mul, "multiplication");

pub fn builtin_div(args: Vec<Value>) -> Result<Value, LispError> {
    let numbers = expect_numbers("/", args)?;
    let (first, rest) = numbers.split_first().ok_or_else(|| LispError::ArityMismatch {
        func: "/".to_string(),
        expected: "at least 1".to_string(),
        got: 0,
    })?;
    let mut acc = *first;
    for n in rest {
        if *n == 0 {
            return Err(LispError::DivisionByZero);
        }
        // Truncates toward zero; only i64::MIN / -1 can overflow
        acc = acc.checked_div(*n).ok_or(LispError::Overflow("division"))?;
    }
    Ok(Value::Number(acc))
}

// Macro to generate binary numeric comparison functions
macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        pub fn $name(args: Vec<Value>) -> Result<Value, LispError> {
            let [a, b] = take_args::<2>($op_str, args)?;
            match (a, b) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number((a $op b) as i64)),
                (Value::Number(_), other) => {
                    Err(LispError::type_mismatch($op_str, 1, "Number", &other))
                }
                (other, _) => Err(LispError::type_mismatch($op_str, 0, "Number", &other)),
            }
        }
    };
}

numeric_comparison!(builtin_gt, >, ">");
numeric_comparison!(builtin_lt, <, "<");
numeric_comparison!(builtin_ge, >=, ">=");
numeric_comparison!(builtin_le, <=, "<=");

/// `==`: structural equality over any two values; mismatched variants are unequal
pub fn builtin_equal(args: Vec<Value>) -> Result<Value, LispError> {
    let [a, b] = take_args::<2>("==", args)?;
    Ok(Value::Number((a == b) as i64))
}

pub fn builtin_not_equal(args: Vec<Value>) -> Result<Value, LispError> {
    let [a, b] = take_args::<2>("!=", args)?;
    Ok(Value::Number((a != b) as i64))
}

pub fn builtin_list(args: Vec<Value>) -> Result<Value, LispError> {
    Ok(Value::qexpr(args))
}

pub fn builtin_head(args: Vec<Value>) -> Result<Value, LispError> {
    let [list] = take_args::<1>("head", args)?;
    let mut items = expect_qexpr("head", 0, list)?;
    if items.is_empty() {
        return Err(LispError::EmptyList("head".to_string()));
    }
    items.truncate(1);
    Ok(Value::qexpr(items))
}

pub fn builtin_tail(args: Vec<Value>) -> Result<Value, LispError> {
    let [list] = take_args::<1>("tail", args)?;
    let mut items = expect_qexpr("tail", 0, list)?;
    if items.is_empty() {
        return Err(LispError::EmptyList("tail".to_string()));
    }
    items.remove(0);
    Ok(Value::qexpr(items))
}

pub fn builtin_join(args: Vec<Value>) -> Result<Value, LispError> {
    let mut joined = Vec::new();
    for (index, arg) in args.into_iter().enumerate() {
        joined.extend(expect_qexpr("join", index, arg)?);
    }
    Ok(Value::qexpr(joined))
}

/// `error`: turn a string into an error value
pub fn builtin_error(args: Vec<Value>) -> Result<Value, LispError> {
    match take_args::<1>("error", args)? {
        [Value::String(message)] => Err(LispError::User(message)),
        [other] => Err(LispError::type_mismatch("error", 0, "String", &other)),
    }
}

/// `print`: write operands to stdout separated by spaces
pub fn builtin_print(args: Vec<Value>) -> Result<Value, LispError> {
    let line: Vec<String> = args.iter().map(Value::to_string).collect();
    println!("{}", line.join(" "));
    Ok(Value::sexpr(Vec::new()))
}

/// Global registry of all built-in operations
static BUILTIN_OPS: &[BuiltinOp] = &[
    // List operations
    BuiltinOp {
        id: "list",
        op_kind: OpKind::Function(builtin_list),
        arity: Arity::Any,
    },
    BuiltinOp {
        id: "head",
        op_kind: OpKind::Function(builtin_head),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        id: "tail",
        op_kind: OpKind::Function(builtin_tail),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        id: "join",
        op_kind: OpKind::Function(builtin_join),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        id: "eval",
        op_kind: OpKind::WithEnv(builtin_eval),
        arity: Arity::Exact(1),
    },
    // Functions and variables
    BuiltinOp {
        id: "\\",
        op_kind: OpKind::WithEnv(builtin_lambda),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "def",
        op_kind: OpKind::WithEnv(builtin_def),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        id: "=",
        op_kind: OpKind::WithEnv(builtin_put),
        arity: Arity::AtLeast(1),
    },
    // Arithmetic operations
    BuiltinOp {
        id: "+",
        op_kind: OpKind::Function(builtin_add),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        id: "-",
        op_kind: OpKind::Function(builtin_sub),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        id: "*",
        op_kind: OpKind::Function(builtin_mul),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        id: "/",
        op_kind: OpKind::Function(builtin_div),
        arity: Arity::AtLeast(1),
    },
    // Comparison operations
    BuiltinOp {
        id: ">",
        op_kind: OpKind::Function(builtin_gt),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "<",
        op_kind: OpKind::Function(builtin_lt),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: ">=",
        op_kind: OpKind::Function(builtin_ge),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "<=",
        op_kind: OpKind::Function(builtin_le),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "==",
        op_kind: OpKind::Function(builtin_equal),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        id: "!=",
        op_kind: OpKind::Function(builtin_not_equal),
        arity: Arity::Exact(2),
    },
    // Control flow
    BuiltinOp {
        id: "if",
        op_kind: OpKind::WithEnv(builtin_if),
        arity: Arity::Exact(3),
    },
    // Diagnostics and output
    BuiltinOp {
        id: "error",
        op_kind: OpKind::Function(builtin_error),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        id: "print",
        op_kind: OpKind::Function(builtin_print),
        arity: Arity::Any,
    },
];

/// Get all builtin operations
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}

/// Find a builtin operation by its identifier
pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_OPS.iter().find(|op| op.id == id)
}

impl From<&'static BuiltinOp> for Value {
    fn from(op: &'static BuiltinOp) -> Self {
        Value::Function(Function::Builtin(op))
    }
}
