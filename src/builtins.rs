//! # Built-in Targets
//!
//! A small catalog of functions the `casebook` binary can test by name.
//! They double as fixtures for the harness's own tests.
//!
//! ## Targets Provided
//!
//! - **Arithmetic**: `divide`, `triple`, `sum`
//! - **Collections**: `length`, `concat`
//! - **Harness**: `compare`, the equality engine itself

use crate::case::Kwargs;
use crate::equality::{compare, CompareOptions};
use crate::fault::{Fault, FaultKind};
use crate::runner::{CallOutcome, Target};
use crate::value::Value;
use std::collections::HashMap;

/// Signature shared by every built-in.
pub type BuiltinFn = fn(&[Value], &Kwargs) -> CallOutcome;

/// A named built-in function.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub usage: &'static str,
    pub func: BuiltinFn,
}

impl Target for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, args: &[Value], kwargs: &Kwargs) -> CallOutcome {
        (self.func)(args, kwargs)
    }
}

// Registry of built-ins, inspectable at runtime.
#[derive(Default)]
pub struct TargetRegistry {
    pub targets: HashMap<&'static str, Builtin>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the whole catalog.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for builtin in CATALOG {
            registry.register(builtin);
        }
        registry
    }

    pub fn register(&mut self, builtin: Builtin) {
        self.targets.insert(builtin.name, builtin);
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.targets.get(name)
    }

    /// Registered built-ins sorted by name.
    pub fn list(&self) -> Vec<&Builtin> {
        let mut all: Vec<&Builtin> = self.targets.values().collect();
        all.sort_by_key(|b| b.name);
        all
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

const CATALOG: [Builtin; 6] = [
    Builtin {
        name: "divide",
        usage: "divide(a, b) -> a / b",
        func: DIVIDE,
    },
    Builtin {
        name: "triple",
        usage: "triple(a, b) -> (a, b, a + b)",
        func: TRIPLE,
    },
    Builtin {
        name: "compare",
        usage: "compare(a, b, compare_type=true, compare_size=true, soft_compare=false) -> bool",
        func: COMPARE,
    },
    Builtin {
        name: "length",
        usage: "length(x) -> number of elements or characters",
        func: LENGTH,
    },
    Builtin {
        name: "sum",
        usage: "sum(xs) -> total of a numeric container",
        func: SUM,
    },
    Builtin {
        name: "concat",
        usage: "concat(a, b) -> a joined with b",
        func: CONCAT,
    },
];

/// Looks up a built-in by name.
pub fn lookup(name: &str) -> Option<Builtin> {
    CATALOG.into_iter().find(|b| b.name == name)
}

// ============================================================================
// HELPERS
// ============================================================================

fn arity_error(actual: usize, expected: usize, name: &str) -> Fault {
    Fault::type_error(format!(
        "{} expects {} argument{}, got {}",
        name,
        expected,
        if expected == 1 { "" } else { "s" },
        actual
    ))
}

fn check_arity(args: &[Value], expected: usize, name: &str) -> Result<(), Fault> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(arity_error(args.len(), expected, name))
    }
}

fn no_kwargs(kwargs: &Kwargs, name: &str) -> Result<(), Fault> {
    match kwargs.keys().next() {
        Some(key) => Err(Fault::type_error(format!(
            "{} got an unexpected keyword argument '{}'",
            name, key
        ))),
        None => Ok(()),
    }
}

fn extract_number(value: &Value, name: &str) -> Result<f64, Fault> {
    value.as_f64().ok_or_else(|| {
        Fault::type_error(format!(
            "{} expects a number, found {}",
            name,
            value.type_name()
        ))
    })
}

fn extract_flag(kwargs: &Kwargs, key: &str, default: bool, name: &str) -> Result<bool, Fault> {
    match kwargs.get(key) {
        None => Ok(default),
        Some(value) => value.as_bool().ok_or_else(|| {
            Fault::type_error(format!(
                "{} expects `{}` to be a bool, found {}",
                name,
                key,
                value.type_name()
            ))
        }),
    }
}

/// Adds two numbers, keeping integers integral.
fn add(a: &Value, b: &Value, name: &str) -> CallOutcome {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x
            .checked_add(y)
            .map(Value::Int)
            .ok_or_else(|| Fault::new(FaultKind::Overflow, format!("{} overflowed", name))),
        _ => Ok(Value::Float(extract_number(a, name)? + extract_number(b, name)?)),
    }
}

// ============================================================================
// BUILT-INS
// ============================================================================

/// True division.
///
/// Usage: divide(a, b)
///   Returns: Float
///   Faults: ZeroDivision when `b` is zero, Type for non-numbers
pub const DIVIDE: BuiltinFn = |args, kwargs| {
    no_kwargs(kwargs, "divide")?;
    check_arity(args, 2, "divide")?;
    let a = extract_number(&args[0], "divide")?;
    let b = extract_number(&args[1], "divide")?;
    if b == 0.0 {
        return Err(Fault::zero_division("division by zero"));
    }
    Ok(Value::Float(a / b))
};

/// Returns its arguments followed by their sum.
///
/// Usage: triple(a, b)
///   Returns: Tuple (a, b, a + b)
pub const TRIPLE: BuiltinFn = |args, kwargs| {
    no_kwargs(kwargs, "triple")?;
    check_arity(args, 2, "triple")?;
    let total = add(&args[0], &args[1], "triple")?;
    Ok(Value::Tuple(vec![args[0].clone(), args[1].clone(), total]))
};

/// Runs the equality engine.
///
/// Usage: compare(a, b, compare_type=true, compare_size=true, soft_compare=false)
///   Returns: Bool
pub const COMPARE: BuiltinFn = |args, kwargs| {
    check_arity(args, 2, "compare")?;
    if let Some(key) = kwargs
        .keys()
        .find(|k| !["compare_type", "compare_size", "soft_compare"].contains(&k.as_str()))
    {
        return Err(Fault::type_error(format!(
            "compare got an unexpected keyword argument '{}'",
            key
        )));
    }
    let opts = CompareOptions::new(
        extract_flag(kwargs, "compare_type", true, "compare")?,
        extract_flag(kwargs, "compare_size", true, "compare")?,
        extract_flag(kwargs, "soft_compare", false, "compare")?,
    );
    Ok(Value::Bool(compare(&args[0], &args[1], opts)))
};

/// Number of elements of a container or characters of a string.
///
/// Usage: length(x)
///   Returns: Int
///   Faults: Type for other scalars
pub const LENGTH: BuiltinFn = |args, kwargs| {
    no_kwargs(kwargs, "length")?;
    check_arity(args, 1, "length")?;
    let len = match &args[0] {
        Value::Str(s) => s.chars().count(),
        v if v.is_container() => v.length(),
        v => {
            return Err(Fault::type_error(format!(
                "{} has no length",
                v.type_name()
            )))
        }
    };
    Ok(Value::Int(len as i64))
};

/// Totals a numeric container. Integers stay integral; any float makes
/// the result a Float.
///
/// Usage: sum(xs)
///   Returns: Int or Float
pub const SUM: BuiltinFn = |args, kwargs| {
    no_kwargs(kwargs, "sum")?;
    check_arity(args, 1, "sum")?;
    if !args[0].is_container() {
        return Err(Fault::type_error(format!(
            "sum expects a container, found {}",
            args[0].type_name()
        )));
    }
    args[0]
        .elements()
        .try_fold(Value::Int(0), |total, item| add(&total, item, "sum"))
};

/// Joins two strings, lists or tuples of the same kind.
///
/// Usage: concat(a, b)
///   Returns: the shared kind
pub const CONCAT: BuiltinFn = |args, kwargs| {
    no_kwargs(kwargs, "concat")?;
    check_arity(args, 2, "concat")?;
    let joined = |a: &[Value], b: &[Value]| a.iter().chain(b).cloned().collect::<Vec<_>>();
    match (&args[0], &args[1]) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (Value::List(a), Value::List(b)) => Ok(Value::List(joined(&a[..], &b[..]))),
        (Value::Tuple(a), Value::Tuple(b)) => Ok(Value::Tuple(joined(&a[..], &b[..]))),
        (a, b) => Err(Fault::type_error(format!(
            "cannot concatenate {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
};
