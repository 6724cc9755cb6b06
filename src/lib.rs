pub use crate::case::{parse_case, CaseItem, Expected, FaultMatcher, Kwargs, Marker, ParsedCase};
pub use crate::equality::{compare, compare_size_type, matches, CompareOptions};
pub use crate::errors::{HarnessError, Result};
pub use crate::fault::{Fault, FaultKind};
pub use crate::runner::{run_tests, Function, RunOptions, RunSummary, Target, TestRunner};
pub use crate::value::{Kind, Value};

pub mod builtins;
pub mod case;
pub mod cli;
pub mod convert;
pub mod equality;
pub mod errors;
pub mod fault;
pub mod generator;
pub mod output;
pub mod runner;
pub mod value;
pub mod wire;
