//! # Equality Engine
//!
//! Structural comparison of two values of possibly different kinds, governed
//! by three switches:
//!
//! - `compare_size`: lengths must agree (map key count, 1 for scalars).
//! - `compare_type`: kinds must agree. In soft mode a conversion path from the
//!   left kind to the right kind is enough (see [`crate::convert`]).
//! - `soft_compare`: selects the soft kind check described above.
//!
//! When both sides are containers the elements are compared pairwise in
//! iteration order with the same switches, stopping at the shorter side.
//! Maps compare their values in key order, and with both `compare_type` and
//! `compare_size` on their key sets must also be equal.
//! Scalar leaves compare by value only when both `compare_type` and
//! `compare_size` are on. With either switch off the comparison is about
//! shape or kinds alone: a size-only comparison never looks at element types
//! and a type-only comparison never looks at element values.
//!
//! A mismatch is never an error; it is `false`.

use crate::case::Expected;
use crate::convert::conversion_exists;
use crate::value::Value;

/// Switches for [`compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    pub compare_type: bool,
    pub compare_size: bool,
    pub soft_compare: bool,
}

impl CompareOptions {
    /// Exact kinds and sizes.
    pub const STRICT: Self = Self {
        compare_type: true,
        compare_size: true,
        soft_compare: false,
    };

    /// Sizes plus kinds up to conversion. Used to judge value expectations.
    pub const EXPECTATION: Self = Self {
        compare_type: true,
        compare_size: true,
        soft_compare: true,
    };

    /// Lengths only, at every depth.
    pub const SHAPE: Self = Self {
        compare_type: false,
        compare_size: true,
        soft_compare: false,
    };

    pub const fn new(compare_type: bool, compare_size: bool, soft_compare: bool) -> Self {
        Self {
            compare_type,
            compare_size,
            soft_compare,
        }
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self::STRICT
    }
}

/// Compares two values under `opts`.
///
/// ```rust
/// use casebook::equality::{compare, CompareOptions};
/// use casebook::value::Value;
/// let short = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
/// let long = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
/// assert!(!compare(&short, &long, CompareOptions::STRICT));
/// assert!(compare(&short, &long, CompareOptions::new(true, false, false)));
/// ```
pub fn compare(a: &Value, b: &Value, opts: CompareOptions) -> bool {
    let mut eq = true;

    if opts.compare_size {
        eq = a.length() == b.length();
    }

    if opts.compare_type {
        eq = eq
            && if opts.soft_compare {
                conversion_exists(a.kind(), b.kind())
            } else {
                a.kind() == b.kind()
            };
    }

    if let (Value::Map(x), Value::Map(y)) = (a, b) {
        if opts.compare_type && opts.compare_size {
            eq = eq && x.keys().eq(y.keys());
        }
    }

    if a.is_container() && b.is_container() {
        eq = eq
            && a
                .elements()
                .zip(b.elements())
                .all(|(x, y)| compare(x, y, opts));
    } else if opts.compare_type
        && opts.compare_size
        && !a.is_container()
        && !b.is_container()
    {
        eq = eq && a.value_eq(b);
    }

    eq
}

/// Kind and size comparison with exact kinds; the harness default.
pub fn compare_size_type(a: &Value, b: &Value) -> bool {
    compare(a, b, CompareOptions::STRICT)
}

/// Kind compatibility ignoring sizes. Top-level kinds must match exactly;
/// `soft` relaxes the check for nested elements only.
pub fn type_compatible(a: &Value, b: &Value, soft: bool) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    if !a.is_container() {
        return true;
    }
    compare(a, b, CompareOptions::new(true, false, soft))
}

/// Judges an actual value against an expectation.
///
/// A wildcard matches everything. A literal matches under
/// [`CompareOptions::EXPECTATION`], so `2.0` satisfies an expected `2`. A
/// composite requires a container of the same length whose elements match
/// slot by slot.
pub fn matches(expected: &Expected, actual: &Value) -> bool {
    match expected {
        Expected::Wildcard => true,
        Expected::Literal(literal) => compare(actual, literal, CompareOptions::EXPECTATION),
        Expected::Composite(slots) => {
            actual.is_container()
                && actual.length() == slots.len()
                && slots
                    .iter()
                    .zip(actual.elements())
                    .all(|(slot, element)| matches(slot, element))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    #[test]
    fn size_check_alone_ignores_values() {
        let a = Value::List(ints(&[1, 2]));
        let b = Value::Tuple(vec![Value::from("x"), Value::Nil]);
        assert!(compare(&a, &b, CompareOptions::SHAPE));
    }

    #[test]
    fn all_switches_off_is_always_equal() {
        let a = Value::from("x");
        let b = Value::List(ints(&[1, 2, 3]));
        assert!(compare(&a, &b, CompareOptions::new(false, false, false)));
    }

    #[test]
    fn type_compatible_requires_same_top_level_kind() {
        let list = Value::List(ints(&[1]));
        let tuple = Value::Tuple(ints(&[1]));
        assert!(!type_compatible(&list, &tuple, true));
        assert!(type_compatible(&list, &Value::List(ints(&[1, 2, 3])), false));
        assert!(type_compatible(&Value::Int(1), &Value::Int(9), false));
    }

    #[test]
    fn soft_type_compatible_relaxes_nested_elements() {
        let floats = Value::Tuple(vec![Value::Float(0.0), Value::Float(10.0)]);
        let bounds = Value::Tuple(ints(&[0, 100]));
        assert!(type_compatible(&floats, &bounds, true));
        assert!(!type_compatible(&floats, &bounds, false));
    }
}
