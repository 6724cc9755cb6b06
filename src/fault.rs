//! Faults raised by functions under test.
//!
//! A [`Fault`] is the error half of a target's return value. Its
//! [`FaultKind`] belongs to a small closed hierarchy so that an expectation
//! naming a parent kind (`Arithmetic`) also accepts its subtypes
//! (`ZeroDivision`).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Root of the hierarchy; every kind is an `Error`.
    Error,
    Arithmetic,
    ZeroDivision,
    Overflow,
    Type,
    Value,
    Lookup,
    Index,
    Key,
    Assertion,
    /// The target panicked instead of returning.
    Panic,
}

impl FaultKind {
    pub const ALL: [FaultKind; 11] = [
        FaultKind::Error,
        FaultKind::Arithmetic,
        FaultKind::ZeroDivision,
        FaultKind::Overflow,
        FaultKind::Type,
        FaultKind::Value,
        FaultKind::Lookup,
        FaultKind::Index,
        FaultKind::Key,
        FaultKind::Assertion,
        FaultKind::Panic,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FaultKind::Error => "Error",
            FaultKind::Arithmetic => "Arithmetic",
            FaultKind::ZeroDivision => "ZeroDivision",
            FaultKind::Overflow => "Overflow",
            FaultKind::Type => "Type",
            FaultKind::Value => "Value",
            FaultKind::Lookup => "Lookup",
            FaultKind::Index => "Index",
            FaultKind::Key => "Key",
            FaultKind::Assertion => "Assertion",
            FaultKind::Panic => "Panic",
        }
    }

    pub const fn parent(self) -> Option<FaultKind> {
        match self {
            FaultKind::Error => None,
            FaultKind::ZeroDivision | FaultKind::Overflow => Some(FaultKind::Arithmetic),
            FaultKind::Index | FaultKind::Key => Some(FaultKind::Lookup),
            _ => Some(FaultKind::Error),
        }
    }

    /// True when `self` is `ancestor` or one of its subtypes.
    ///
    /// ```rust
    /// use casebook::fault::FaultKind;
    /// assert!(FaultKind::ZeroDivision.is_a(FaultKind::Arithmetic));
    /// assert!(FaultKind::Key.is_a(FaultKind::Error));
    /// assert!(!FaultKind::Arithmetic.is_a(FaultKind::ZeroDivision));
    /// ```
    pub fn is_a(self, ancestor: FaultKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name does not denote a fault kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a fault kind")]
pub struct UnknownFaultKind(pub String);

impl FromStr for FaultKind {
    type Err = UnknownFaultKind;

    /// Accepts the bare name (`ZeroDivision`) or the name with an `Error`
    /// suffix (`ZeroDivisionError`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.strip_suffix("Error").filter(|rest| !rest.is_empty());
        FaultKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s || Some(kind.name()) == bare)
            .ok_or_else(|| UnknownFaultKind(s.to_string()))
    }
}

/// A fault raised by a target function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Type, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Value, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(FaultKind::ZeroDivision, message)
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Assertion, message)
    }
}
