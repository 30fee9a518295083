use crate::LispError;
use crate::ast::{Closure, Function, ListKind, Value};
use crate::builtinops::{expect_qexpr, expect_symbols, get_builtin_ops};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Shared handle to a live environment frame
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of variable bindings
///
/// The parent link is a non-owning back-reference: a frame never keeps its
/// parent alive. Closures carry a frame with no parent; the link is attached to
/// the calling frame only for the duration of a call. `clone` deep-copies the
/// bindings and keeps the same parent link.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<Weak<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Attach this frame to `parent` for free-variable lookup
    pub fn set_parent(&mut self, parent: &EnvRef) {
        self.parent = Some(Rc::downgrade(parent));
    }

    fn parent(&self) -> Option<EnvRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Bind `name` in this frame only, replacing any existing local binding
    pub fn put(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look `name` up in this frame, then each ancestor innermost-first
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent().and_then(|parent| parent.borrow().lookup(name)),
        }
    }

    /// Copy of the bound value, or an unbound symbol error value
    pub fn get(&self, name: &str) -> Value {
        self.lookup(name)
            .unwrap_or_else(|| LispError::UnboundSymbol(name.to_string()).into())
    }

    /// Bind `name` in the root ancestor of this frame
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        match self.parent() {
            Some(parent) => parent.borrow_mut().define_global(name, value),
            None => self.put(name, value),
        }
    }

    /// Local bindings sorted by name
    pub fn bindings(&self) -> Vec<(&str, &Value)> {
        let mut bindings: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        bindings.sort_by_key(|(name, _)| *name);
        bindings
    }
}

/// Evaluate a value in the given environment
pub fn eval(env: &EnvRef, value: Value) -> Value {
    match value {
        Value::Symbol(name) => env.borrow().get(&name),
        Value::List {
            kind: ListKind::Sexpr,
            items,
        } => eval_sexpr(env, items),
        // Everything else, including Q-expressions, is self-evaluating
        other => other,
    }
}

/// Reduce every child left to right, stopping at the first error, then apply the head
fn eval_sexpr(env: &EnvRef, items: Vec<Value>) -> Value {
    let mut reduced = Vec::with_capacity(items.len());
    for item in items {
        let value = eval(env, item);
        if value.is_error() {
            return value;
        }
        reduced.push(value);
    }

    let mut values = reduced.into_iter();
    match (values.next(), values.len()) {
        (None, _) => Value::sexpr(Vec::new()),
        (Some(only), 0) => only,
        (Some(Value::Function(function)), _) => apply(env, function, values.collect()),
        (Some(_), _) => LispError::NotAFunction.into(),
    }
}

/// Apply a function to already-reduced arguments
pub fn apply(env: &EnvRef, function: Function, args: Vec<Value>) -> Value {
    match function {
        Function::Builtin(op) => {
            trace!(op = op.id, argc = args.len(), "apply builtin");
            op.call(env, args).unwrap_or_else(Value::from)
        }
        Function::Closure(closure) => apply_closure(env, closure, args),
    }
}

fn apply_closure(env: &EnvRef, closure: Closure, args: Vec<Value>) -> Value {
    let supplied = args.len();
    let expected = closure.formals.len();
    if supplied > expected {
        return LispError::TooManyArguments {
            got: supplied,
            expected,
        }
        .into();
    }

    let Closure {
        mut formals,
        body,
        env: mut frame,
    } = closure;
    let remaining = formals.split_off(supplied);
    for (formal, arg) in formals.into_iter().zip(args) {
        frame.put(formal, arg);
    }

    if remaining.is_empty() {
        trace!(argc = supplied, "apply closure");
        frame.set_parent(env);
        let frame = frame.into_ref();
        eval(&frame, Value::sexpr(body))
    } else {
        debug!(supplied, remaining = remaining.len(), "partial application");
        Value::from(Closure {
            formals: remaining,
            body,
            env: frame,
        })
    }
}

/// `eval`: retag a Q-expression as an S-expression and reduce it
pub fn builtin_eval(env: &EnvRef, args: Vec<Value>) -> Result<Value, LispError> {
    let [expr] = take_args::<1>("eval", args)?;
    let items = expect_qexpr("eval", 0, expr)?;
    Ok(eval(env, Value::sexpr(items)))
}

/// `\`: build a closure from a formals list and a body
pub fn builtin_lambda(_env: &EnvRef, args: Vec<Value>) -> Result<Value, LispError> {
    let [formals, body] = take_args::<2>("\\", args)?;
    let formals = expect_symbols("\\", 0, formals)?;
    let body = expect_qexpr("\\", 1, body)?;
    Ok(Value::from(Closure::new(formals, body)))
}

/// `def`: bind in the root environment
pub fn builtin_def(env: &EnvRef, args: Vec<Value>) -> Result<Value, LispError> {
    bind_symbols("def", env, args, |frame, name, value| {
        debug!(name = %name, "define global");
        frame.define_global(name, value)
    })
}

/// `=`: bind in the current environment only
pub fn builtin_put(env: &EnvRef, args: Vec<Value>) -> Result<Value, LispError> {
    bind_symbols("=", env, args, |frame, name, value| {
        debug!(name = %name, "define local");
        frame.put(name, value)
    })
}

fn bind_symbols(
    func: &str,
    env: &EnvRef,
    args: Vec<Value>,
    bind: impl Fn(&mut Environment, String, Value),
) -> Result<Value, LispError> {
    let mut args = args.into_iter();
    let names = match args.next() {
        Some(names) => expect_symbols(func, 0, names)?,
        None => {
            return Err(LispError::ArityMismatch {
                func: func.to_string(),
                expected: "at least 1".to_string(),
                got: 0,
            });
        }
    };
    let values: Vec<Value> = args.collect();
    if names.len() != values.len() {
        return Err(LispError::ArityMismatch {
            func: func.to_string(),
            expected: names.len().to_string(),
            got: values.len(),
        });
    }

    // Duplicate names: the last binding wins
    let mut frame = env.borrow_mut();
    for (name, value) in names.into_iter().zip(values) {
        bind(&mut frame, name, value);
    }
    Ok(Value::sexpr(Vec::new()))
}

/// `if`: evaluate exactly one of two quoted branches
pub fn builtin_if(env: &EnvRef, args: Vec<Value>) -> Result<Value, LispError> {
    let [condition, then_branch, else_branch] = take_args::<3>("if", args)?;
    let condition = match condition {
        Value::Number(n) => n,
        other => return Err(LispError::type_mismatch("if", 0, "Number", &other)),
    };
    let then_branch = expect_qexpr("if", 1, then_branch)?;
    let else_branch = expect_qexpr("if", 2, else_branch)?;

    let taken = if condition != 0 { then_branch } else { else_branch };
    Ok(eval(env, Value::sexpr(taken)))
}

/// Move exactly `N` arguments out of the argument vector
pub(crate) fn take_args<const N: usize>(
    func: &str,
    args: Vec<Value>,
) -> Result<[Value; N], LispError> {
    <[Value; N]>::try_from(args).map_err(|args| LispError::ArityMismatch {
        func: func.to_string(),
        expected: N.to_string(),
        got: args.len(),
    })
}

/// Create a root environment with every built-in registered
pub fn create_global_env() -> EnvRef {
    let mut env = Environment::new();
    for op in get_builtin_ops() {
        env.put(op.id, Value::from(op));
    }
    env.into_ref()
}
