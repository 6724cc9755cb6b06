//! # Case Specification Parser
//!
//! A raw test case is an ordered list of [`CaseItem`]s: positional arguments
//! interleaved with [`Marker`]s that describe keyword arguments and the
//! expected outcome. [`parse_case`] separates them into a [`ParsedCase`].
//!
//! Markers may appear anywhere in the list; only the relative order of the
//! positional arguments matters.

use crate::errors::{HarnessError, Result};
use crate::fault::FaultKind;
use crate::value::Value;
use im::OrdMap;
use std::fmt;

/// Keyword arguments passed to a target.
pub type Kwargs = OrdMap<String, Value>;

/// Which faults an exception expectation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultMatcher {
    /// Any fault at all.
    Any,
    /// The named kind or any of its subtypes.
    Kind(FaultKind),
}

impl FaultMatcher {
    pub fn accepts(self, kind: FaultKind) -> bool {
        match self {
            FaultMatcher::Any => true,
            FaultMatcher::Kind(expected) => kind.is_a(expected),
        }
    }
}

impl fmt::Display for FaultMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultMatcher::Any => write!(f, "_"),
            FaultMatcher::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

impl From<FaultKind> for FaultMatcher {
    fn from(kind: FaultKind) -> Self {
        FaultMatcher::Kind(kind)
    }
}

/// An expected (or forbidden) return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// Matches anything.
    Wildcard,
    /// Matches a value equal to this one.
    Literal(Value),
    /// Matches a container position by position.
    Composite(Vec<Expected>),
}

impl Expected {
    pub fn composite<I: IntoIterator<Item = Expected>>(slots: I) -> Self {
        Expected::Composite(slots.into_iter().collect())
    }
}

macro_rules! literal_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expected {
                fn from(value: $ty) -> Self {
                    Expected::Literal(value.into())
                }
            }
        )*
    };
}

literal_from!(Value, i64, i32, f64, bool, &str, String, Vec<Value>);

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Wildcard => write!(f, "_"),
            Expected::Literal(value) => write!(f, "{}", value),
            Expected::Composite(slots) => {
                write!(f, "[")?;
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", slot)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A non-argument element of a case.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Exception(FaultMatcher),
    Expect(Expected),
    NotExpect(Expected),
    Kwargs(Kwargs),
    /// Escalate a failure of this case into an aborted run.
    Raise(bool),
}

/// One element of a raw case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseItem {
    Arg(Value),
    Marker(Marker),
}

impl CaseItem {
    pub fn arg(value: impl Into<Value>) -> Self {
        CaseItem::Arg(value.into())
    }

    pub fn err(kind: FaultKind) -> Self {
        CaseItem::Marker(Marker::Exception(FaultMatcher::Kind(kind)))
    }

    pub fn err_any() -> Self {
        CaseItem::Marker(Marker::Exception(FaultMatcher::Any))
    }

    pub fn expect(expected: impl Into<Expected>) -> Self {
        CaseItem::Marker(Marker::Expect(expected.into()))
    }

    pub fn not_expect(forbidden: impl Into<Expected>) -> Self {
        CaseItem::Marker(Marker::NotExpect(forbidden.into()))
    }

    pub fn kwargs<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(entries: I) -> Self {
        CaseItem::Marker(Marker::Kwargs(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn raise() -> Self {
        CaseItem::Marker(Marker::Raise(true))
    }
}

impl From<Value> for CaseItem {
    fn from(value: Value) -> Self {
        CaseItem::Arg(value)
    }
}

impl From<Marker> for CaseItem {
    fn from(marker: Marker) -> Self {
        CaseItem::Marker(marker)
    }
}

/// A case separated into call arguments and expectations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCase {
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
    pub expected_exception: Option<FaultMatcher>,
    pub expected_value: Option<Expected>,
    pub forbidden_value: Option<Expected>,
    pub raise_on_failure: bool,
}

impl ParsedCase {
    /// True when the case asserts nothing about the outcome.
    pub fn is_unchecked(&self) -> bool {
        self.expected_exception.is_none()
            && self.expected_value.is_none()
            && self.forbidden_value.is_none()
    }

    /// Renders the call arguments as `a, b, key=value`.
    pub fn describe_args(&self) -> String {
        self.args
            .iter()
            .map(Value::to_string)
            .chain(self.kwargs.iter().map(|(k, v)| format!("{}={}", k, v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Separates a raw case into positional arguments, keyword arguments and
/// expectations in a single left-to-right scan.
///
/// Later keyword bundles overwrite earlier keys, and a repeated expectation
/// marker replaces the previous one. A case carrying both an expected and a
/// forbidden value is rejected.
///
/// ```rust
/// use casebook::case::{parse_case, CaseItem, Expected};
/// use casebook::value::Value;
/// let parsed = parse_case(&[CaseItem::arg(10), CaseItem::arg(5), CaseItem::expect(2)]).unwrap();
/// assert_eq!(parsed.args, vec![Value::Int(10), Value::Int(5)]);
/// assert_eq!(parsed.expected_value, Some(Expected::Literal(Value::Int(2))));
/// ```
pub fn parse_case(items: &[CaseItem]) -> Result<ParsedCase> {
    let mut case = ParsedCase::default();

    for item in items {
        match item {
            CaseItem::Arg(value) => case.args.push(value.clone()),
            CaseItem::Marker(Marker::Kwargs(bundle)) => {
                for (key, value) in bundle.iter() {
                    case.kwargs.insert(key.clone(), value.clone());
                }
            }
            CaseItem::Marker(Marker::Exception(matcher)) => {
                case.expected_exception = Some(*matcher);
            }
            CaseItem::Marker(Marker::Expect(expected)) => {
                case.expected_value = Some(expected.clone());
            }
            CaseItem::Marker(Marker::NotExpect(forbidden)) => {
                case.forbidden_value = Some(forbidden.clone());
            }
            CaseItem::Marker(Marker::Raise(flag)) => {
                case.raise_on_failure = *flag;
            }
        }
    }

    if case.expected_value.is_some() && case.forbidden_value.is_some() {
        return Err(HarnessError::ConflictingExpectations);
    }

    tracing::trace!(
        args = case.args.len(),
        kwargs = case.kwargs.len(),
        raise = case.raise_on_failure,
        "parsed case"
    );
    Ok(case)
}
