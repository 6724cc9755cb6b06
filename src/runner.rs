//! # Test Runner
//!
//! Invokes a [`Target`] once per parsed case and classifies the outcome.
//! A failing case that opted into escalation turns into
//! [`CaseControl::Abort`], and [`run_tests`] stops there.

use crate::case::{parse_case, CaseItem, Kwargs, ParsedCase};
use crate::equality::matches;
use crate::errors::{HarnessError, Result};
use crate::fault::{Fault, FaultKind};
use crate::output::{self, OutputSink};
use crate::value::Value;
use std::panic::{self, AssertUnwindSafe};

/// What a single call produced.
pub type CallOutcome = std::result::Result<Value, Fault>;

/// A function under test.
pub trait Target {
    fn name(&self) -> &str;
    fn call(&self, args: &[Value], kwargs: &Kwargs) -> CallOutcome;
}

/// A [`Target`] backed by a closure.
pub struct Function<F> {
    name: String,
    func: F,
}

impl<F> Function<F>
where
    F: Fn(&[Value], &Kwargs) -> CallOutcome,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Target for Function<F>
where
    F: Fn(&[Value], &Kwargs) -> CallOutcome,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Value], kwargs: &Kwargs) -> CallOutcome {
        (self.func)(args, kwargs)
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// 1-based position of the case within its run.
    pub index: usize,
    pub passed: bool,
    pub reason: Option<String>,
    pub outcome: CallOutcome,
}

/// Whether the run continues after a case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseControl {
    Continue(TestResult),
    /// The case failed with escalation requested; the run must stop.
    Abort(Fault),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub print_args: bool,
    pub print_res: bool,
}

/// Results of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub target: String,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    /// 1-based indices of failed cases.
    pub fn failed(&self) -> Vec<usize> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.index)
            .collect()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }
}

/// Executes parsed cases against a target.
pub struct TestRunner;

impl TestRunner {
    /// Calls the target, turning a panic into a [`FaultKind::Panic`] fault.
    pub fn invoke(target: &dyn Target, case: &ParsedCase) -> CallOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| target.call(&case.args, &case.kwargs)))
            .unwrap_or_else(|payload| {
                Err(Fault::new(FaultKind::Panic, panic_message(payload.as_ref())))
            })
    }

    /// Runs one case exactly once and classifies it.
    pub fn run_case(target: &dyn Target, case: &ParsedCase, index: usize) -> CaseControl {
        let outcome = Self::invoke(target, case);

        let reason = match &outcome {
            Ok(value) => Self::check_success(case, value),
            Err(fault) => Self::check_fault(case, fault),
        };

        if let (Some(reason), true) = (&reason, case.raise_on_failure) {
            tracing::debug!(index, %reason, "case escalated");
            return CaseControl::Abort(match outcome {
                Err(fault) => fault,
                Ok(_) => Fault::assertion(reason.clone()),
            });
        }

        CaseControl::Continue(TestResult {
            index,
            passed: reason.is_none(),
            reason,
            outcome,
        })
    }

    /// Judges a normal return. `None` means the case passed.
    fn check_success(case: &ParsedCase, actual: &Value) -> Option<String> {
        if let Some(expected) = case.expected_exception {
            return Some(format!("expected fault {} was not raised", expected));
        }
        match (&case.expected_value, &case.forbidden_value) {
            (Some(expected), _) if !matches(expected, actual) => {
                Some(format!("expected {} but got {}", expected, actual))
            }
            (_, Some(forbidden)) if matches(forbidden, actual) => {
                Some(format!("forbidden value matched: {}", actual))
            }
            _ => None,
        }
    }

    /// Judges a raised fault. `None` means the case passed.
    fn check_fault(case: &ParsedCase, fault: &Fault) -> Option<String> {
        match case.expected_exception {
            None => Some(format!("unexpected fault: {}", fault)),
            Some(matcher) if matcher.accepts(fault.kind) => None,
            Some(matcher) => Some(format!(
                "expected fault {} but got {}",
                matcher, fault.kind
            )),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "target panicked".to_string()
    }
}

/// Parses every case, then runs them in order, reporting to `sink`.
///
/// Malformed cases fail the whole call before any case runs. An escalated
/// failure stops the run and is returned as [`HarnessError::Escalated`];
/// later cases are never executed.
pub fn run_tests(
    target: &dyn Target,
    cases: &[Vec<CaseItem>],
    options: RunOptions,
    sink: &mut dyn OutputSink,
) -> Result<RunSummary> {
    let parsed = cases
        .iter()
        .enumerate()
        .map(|(i, items)| parse_case(items).map_err(|e| e.in_case(i + 1)))
        .collect::<Result<Vec<_>>>()?;
    run_parsed(target, &parsed, options, sink)
}

/// Runs cases that are already parsed.
pub fn run_parsed(
    target: &dyn Target,
    cases: &[ParsedCase],
    options: RunOptions,
    sink: &mut dyn OutputSink,
) -> Result<RunSummary> {
    output::report_start(sink, target.name());
    let mut summary = RunSummary {
        target: target.name().to_string(),
        results: Vec::with_capacity(cases.len()),
    };

    for (i, case) in cases.iter().enumerate() {
        let index = i + 1;
        let args = options.print_args.then(|| case.describe_args());
        output::report_case_start(sink, target.name(), index, args.as_deref());

        match TestRunner::run_case(target, case, index) {
            CaseControl::Continue(result) => {
                output::report_case(sink, &result, options.print_res);
                summary.results.push(result);
            }
            CaseControl::Abort(fault) => {
                tracing::warn!(function = target.name(), index, "run aborted");
                return Err(HarnessError::Escalated { index, fault });
            }
        }
    }

    tracing::debug!(
        function = target.name(),
        passed = summary.passed_count(),
        total = summary.results.len(),
        "run complete"
    );
    output::report_summary(sink, &summary);
    Ok(summary)
}

/// Runs generated argument tuples with no expectation attached; faults
/// count as failures.
pub fn run_unchecked(
    target: &dyn Target,
    arg_sets: &[Vec<Value>],
    options: RunOptions,
    sink: &mut dyn OutputSink,
) -> Result<RunSummary> {
    let cases: Vec<ParsedCase> = arg_sets
        .iter()
        .map(|args| ParsedCase {
            args: args.clone(),
            ..ParsedCase::default()
        })
        .collect();
    run_parsed(target, &cases, options, sink)
}
