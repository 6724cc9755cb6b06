//! Casebook error handling.
//!
//! Every failure that is not a test outcome is a [`HarnessError`]. Case and
//! argument-spec problems are caller bugs and surface before anything runs;
//! escalation is the one error a running suite can produce.

use crate::fault::Fault;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    #[error("invalid marker record: {message}")]
    #[diagnostic(
        code(casebook::case::marker),
        help("a marker record carries one of `err`, `expect`, `not_expect` or `kwargs: true`, plus an optional boolean `raise_err`")
    )]
    InvalidMarker { message: String },

    #[error("unknown fault kind '{name}'")]
    #[diagnostic(
        code(casebook::case::fault_kind),
        help("use `_` to accept any fault, or one of: Error, Arithmetic, ZeroDivision, Overflow, Type, Value, Lookup, Index, Key, Assertion, Panic")
    )]
    UnknownFaultKind { name: String },

    #[error("case carries both an expected and a forbidden value")]
    #[diagnostic(
        code(casebook::case::conflict),
        help("keep either `expect` or `not_expect`, not both")
    )]
    ConflictingExpectations,

    #[error("invalid case literal: {message}")]
    #[diagnostic(code(casebook::case::literal))]
    InvalidLiteral { message: String },

    #[error("case {index}: {source}")]
    #[diagnostic(code(casebook::case::invalid))]
    Case {
        index: usize,
        #[source]
        source: Box<HarnessError>,
    },

    #[error("invalid argument spec: {message}")]
    #[diagnostic(code(casebook::generator::spec))]
    InvalidArgSpec { message: String },

    #[error("case {index} escalated: {fault}")]
    #[diagnostic(
        code(casebook::run::escalated),
        help("the case set `raise_err`, so its failure aborted the run")
    )]
    Escalated { index: usize, fault: Fault },

    #[error("unknown target '{name}'")]
    #[diagnostic(
        code(casebook::run::target),
        help("`casebook targets` lists the built-in functions")
    )]
    UnknownTarget { name: String },

    #[error("failed to read '{}'", path.display())]
    #[diagnostic(code(casebook::io::read))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {message}", path.display())]
    #[diagnostic(code(casebook::io::format))]
    Format { path: PathBuf, message: String },
}

impl HarnessError {
    pub fn invalid_marker(message: impl Into<String>) -> Self {
        Self::InvalidMarker {
            message: message.into(),
        }
    }

    pub fn invalid_literal(message: impl Into<String>) -> Self {
        Self::InvalidLiteral {
            message: message.into(),
        }
    }

    pub fn invalid_arg_spec(message: impl Into<String>) -> Self {
        Self::InvalidArgSpec {
            message: message.into(),
        }
    }

    /// Attaches the 1-based case index to a configuration error.
    pub fn in_case(self, index: usize) -> Self {
        Self::Case {
            index,
            source: Box::new(self),
        }
    }

    /// True for errors that signal a malformed case or spec rather than a
    /// test outcome or an I/O problem.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Case { source, .. } => source.is_configuration(),
            Self::InvalidMarker { .. }
            | Self::UnknownFaultKind { .. }
            | Self::ConflictingExpectations
            | Self::InvalidLiteral { .. }
            | Self::InvalidArgSpec { .. } => true,
            Self::Escalated { .. }
            | Self::UnknownTarget { .. }
            | Self::Io { .. }
            | Self::Format { .. } => false,
        }
    }
}
