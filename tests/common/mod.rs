//! # Shared Test Helpers
//!
//! Value builders and instrumented targets used across the integration tests.

#![allow(dead_code)]

use casebook::runner::{CallOutcome, Function, Target};
use casebook::{Kwargs, Value};
use std::cell::Cell;

pub fn list(values: &[i64]) -> Value {
    Value::List(values.iter().copied().map(Value::Int).collect())
}

pub fn tuple(values: &[i64]) -> Value {
    Value::Tuple(values.iter().copied().map(Value::Int).collect())
}

pub fn array(values: &[i32]) -> Value {
    Value::Array(values.iter().copied().map(Value::Int32).collect())
}

/// Wraps a target and counts how many times it is called.
pub struct Counting<'a, T: Target> {
    pub inner: T,
    pub calls: &'a Cell<usize>,
}

impl<T: Target> Target for Counting<'_, T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self, args: &[Value], kwargs: &Kwargs) -> CallOutcome {
        self.calls.set(self.calls.get() + 1);
        self.inner.call(args, kwargs)
    }
}

/// A target that returns a fixed value regardless of its arguments.
pub fn constant(value: Value) -> impl Target {
    Function::new("constant", move |_: &[Value], _: &Kwargs| Ok(value.clone()))
}
