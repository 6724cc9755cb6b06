use im::OrdMap;
use std::cmp::Ordering;
use std::fmt;

/// A dynamic value passed to and returned from functions under test.
///
/// Scalars carry a single datum. Containers hold nested values and expose a
/// uniform iteration order through [`Value::elements`].
///
/// # Examples
///
/// ```rust
/// use casebook::value::{Kind, Value};
/// let n = Value::Int(3);
/// assert_eq!(n.kind(), Kind::Int);
/// let t = Value::Tuple(vec![Value::Int(1), Value::Str("a".into())]);
/// assert_eq!(t.length(), 2);
/// assert!(Value::default().is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Platform-native 32-bit integer, the element type of numeric arrays.
    Int32(i32),
    /// Platform-native 32-bit float.
    Float32(f32),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Unique collection. Build through [`Value::set`] to keep it sorted and deduplicated.
    Set(Vec<Value>),
    Map(OrdMap<String, Value>),
    /// Numeric array. Elements are numeric scalars.
    Array(Vec<Value>),
}

/// Type tag of a [`Value`], one per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Float,
    Int32,
    Float32,
    Str,
    List,
    Tuple,
    Set,
    Map,
    Array,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Int32 => "int32",
            Kind::Float32 => "float32",
            Kind::Str => "str",
            Kind::List => "list",
            Kind::Tuple => "tuple",
            Kind::Set => "set",
            Kind::Map => "map",
            Kind::Array => "array",
        }
    }

    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Kind::List | Kind::Tuple | Kind::Set | Kind::Map | Kind::Array
        )
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Float | Kind::Int32 | Kind::Float32)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Int32(_) => Kind::Int32,
            Value::Float32(_) => Kind::Float32,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
            Value::Tuple(_) => Kind::Tuple,
            Value::Set(_) => Kind::Set,
            Value::Map(_) => Kind::Map,
            Value::Array(_) => Kind::Array,
        }
    }

    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Number of elements in a container, key count for a map, and 1 for any scalar.
    ///
    /// ```rust
    /// use casebook::value::Value;
    /// assert_eq!(Value::Str("hello".into()).length(), 1);
    /// assert_eq!(Value::List(vec![]).length(), 0);
    /// ```
    pub fn length(&self) -> usize {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) | Value::Array(items) => {
                items.len()
            }
            Value::Map(map) => map.len(),
            _ => 1,
        }
    }

    /// Iterates a container's elements: sequences in order, sets in sorted
    /// order, maps by value in key order. Scalars yield nothing.
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) | Value::Array(items) => {
                Box::new(items.iter())
            }
            Value::Map(map) => Box::new(map.values()),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Builds a set value, sorting and dropping duplicates.
    pub fn set<I: IntoIterator<Item = Value>>(items: I) -> Self {
        let mut items: Vec<Value> = items.into_iter().collect();
        items.sort_by(Value::total_cmp);
        items.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        Value::Set(items)
    }

    pub fn map<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(entries: I) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of any numeric scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Int32(n) => Some(f64::from(*n)),
            Value::Float32(n) => Some(f64::from(*n)),
            _ => None,
        }
    }

    /// Integer view of integer scalars only.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Int32(n) => Some(i64::from(*n)),
            _ => None,
        }
    }

    /// Scalar value equality. Numeric kinds compare by numeric value, so
    /// `Int(2)` equals `Float(2.0)`. Containers compare structurally.
    pub fn value_eq(&self, other: &Value) -> bool {
        match (self.as_i64(), other.as_i64()) {
            (Some(a), Some(b)) => a == b,
            (Some(i), None) => other.as_f64().is_some_and(|f| int_eq_float(i, f)),
            (None, Some(i)) => self.as_f64().is_some_and(|f| int_eq_float(i, f)),
            (None, None) => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => self == other,
            },
        }
    }

    /// Total order used to keep sets canonical: by kind, then by content.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::Float32(a), Value::Float32(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::List(a), Value::List(b))
            | (Value::Tuple(a), Value::Tuple(b))
            | (Value::Set(a), Value::Set(b))
            | (Value::Array(a), Value::Array(b)) => cmp_slices(a, b),
            (Value::Map(a), Value::Map(b)) => a
                .iter()
                .zip(b.iter())
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.total_cmp(vb)))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.kind().cmp(&other.kind()),
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_items(
        f: &mut fmt::Formatter<'_>,
        open: &str,
        items: &[Value],
        close: &str,
    ) -> fmt::Result {
        write!(f, "{}", open)?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        if open == "(" && items.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, "{}", close)
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &OrdMap<String, Value>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

fn cmp_slices(a: &[Value], b: &[Value]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Int32(n) => write!(f, "{}i32", n),
            Value::Float32(n) => write!(f, "{:?}f32", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => Value::fmt_items(f, "[", items, "]"),
            Value::Tuple(items) => Value::fmt_items(f, "(", items, ")"),
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => Value::fmt_items(f, "{", items, "}"),
            Value::Map(map) => Value::fmt_map(f, map),
            Value::Array(items) => Value::fmt_items(f, "array([", items, "])"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Exact integer/float equality: the float must be integral and round-trip
/// through `i64` without saturating.
fn int_eq_float(i: i64, f: f64) -> bool {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    (-TWO_POW_63..TWO_POW_63).contains(&f) && f.fract() == 0.0 && f as i64 == i
}
