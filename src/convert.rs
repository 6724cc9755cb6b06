//! # Kind Conversion Table
//!
//! The fixed matrix of conversions between value kinds. The equality engine
//! only asks whether a conversion exists; [`Value::convert_to`] applies one.
//!
//! The table is not symmetric: `Float32` has no outgoing conversions and
//! `Map` converts to nothing, so soft comparison can differ by argument order.

use crate::value::{Kind, Value};

/// A conversion function. Returns `None` when the specific value cannot be
/// represented in the target kind (an out-of-range integer, a non-numeric
/// element headed for an array).
pub type Conversion = fn(&Value) -> Option<Value>;

/// Looks up the conversion from one kind to another. Identical kinds always
/// resolve to the identity conversion.
pub fn find_conversion(from: Kind, to: Kind) -> Option<Conversion> {
    if from == to {
        return Some(identity);
    }
    match (from, to) {
        // Container conversions
        (Kind::Tuple | Kind::Set | Kind::Array, Kind::List) => Some(to_list),
        (Kind::List | Kind::Set | Kind::Array, Kind::Tuple) => Some(to_tuple),
        (Kind::List | Kind::Tuple | Kind::Array, Kind::Set) => Some(to_set),
        (Kind::List | Kind::Tuple | Kind::Set, Kind::Array) => Some(to_array),

        // Scalar numeric conversions
        (Kind::Float | Kind::Int32, Kind::Int) => Some(to_int),
        (Kind::Int | Kind::Int32, Kind::Float) => Some(to_float),
        (Kind::Int | Kind::Float, Kind::Int32) => Some(to_int32),
        (Kind::Int | Kind::Float | Kind::Int32, Kind::Float32) => Some(to_float32),

        _ => None,
    }
}

pub fn conversion_exists(from: Kind, to: Kind) -> bool {
    find_conversion(from, to).is_some()
}

impl Value {
    /// Converts this value to `kind` through the conversion table.
    ///
    /// ```rust
    /// use casebook::value::{Kind, Value};
    /// let t = Value::List(vec![Value::Int(1)]).convert_to(Kind::Tuple);
    /// assert_eq!(t, Some(Value::Tuple(vec![Value::Int(1)])));
    /// assert_eq!(Value::Str("x".into()).convert_to(Kind::Int), None);
    /// ```
    pub fn convert_to(&self, kind: Kind) -> Option<Value> {
        find_conversion(self.kind(), kind).and_then(|convert| convert(self))
    }
}

fn identity(value: &Value) -> Option<Value> {
    Some(value.clone())
}

/// Elements of a sequence-like container, with native array numerics
/// widened back to `Int`/`Float`.
fn plain_elements(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.iter().map(widen_native).collect()),
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items.clone()),
        _ => None,
    }
}

fn widen_native(value: &Value) -> Value {
    match value {
        Value::Int32(n) => Value::Int(i64::from(*n)),
        Value::Float32(n) => Value::Float(f64::from(*n)),
        other => other.clone(),
    }
}

fn to_list(value: &Value) -> Option<Value> {
    plain_elements(value).map(Value::List)
}

fn to_tuple(value: &Value) -> Option<Value> {
    plain_elements(value).map(Value::Tuple)
}

fn to_set(value: &Value) -> Option<Value> {
    plain_elements(value).map(Value::set)
}

fn to_array(value: &Value) -> Option<Value> {
    let items = plain_elements(value)?;
    if items.iter().all(|v| v.kind().is_numeric()) {
        Some(Value::Array(items))
    } else {
        None
    }
}

fn to_int(value: &Value) -> Option<Value> {
    match value {
        Value::Int(n) => Some(Value::Int(*n)),
        Value::Int32(n) => Some(Value::Int(i64::from(*n))),
        Value::Float(n) if n.is_finite() => Some(Value::Int(n.trunc() as i64)),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<Value> {
    value.as_f64().map(Value::Float)
}

fn to_int32(value: &Value) -> Option<Value> {
    let wide = match value {
        Value::Float(n) if n.is_finite() => n.trunc() as i64,
        other => other.as_i64()?,
    };
    i32::try_from(wide).ok().map(Value::Int32)
}

fn to_float32(value: &Value) -> Option<Value> {
    value.as_f64().map(|n| Value::Float32(n as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_always_exists() {
        assert!(conversion_exists(Kind::Map, Kind::Map));
        assert!(conversion_exists(Kind::Str, Kind::Str));
    }

    #[test]
    fn maps_convert_to_nothing_else() {
        for to in [Kind::List, Kind::Tuple, Kind::Set, Kind::Array] {
            assert!(!conversion_exists(Kind::Map, to));
            assert!(!conversion_exists(to, Kind::Map));
        }
    }

    #[test]
    fn float32_has_no_outgoing_conversions() {
        assert!(conversion_exists(Kind::Int, Kind::Float32));
        assert!(!conversion_exists(Kind::Float32, Kind::Int));
        assert!(!conversion_exists(Kind::Float32, Kind::Float));
    }

    #[test]
    fn array_to_list_widens_natives() {
        let array = Value::Array(vec![Value::Int32(1), Value::Float32(0.5)]);
        assert_eq!(
            array.convert_to(Kind::List),
            Some(Value::List(vec![Value::Int(1), Value::Float(0.5)]))
        );
    }

    #[test]
    fn list_to_array_rejects_non_numeric_elements() {
        let list = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(list.convert_to(Kind::Array), None);
    }

    #[test]
    fn int32_conversion_checks_range() {
        assert_eq!(Value::Int(5).convert_to(Kind::Int32), Some(Value::Int32(5)));
        assert_eq!(Value::Int(i64::MAX).convert_to(Kind::Int32), None);
        assert_eq!(Value::Float(2.9).convert_to(Kind::Int), Some(Value::Int(2)));
    }
}
