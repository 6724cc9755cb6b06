//! Test runner tests: outcome classification, reporting and escalation.

mod common;

use casebook::builtins::lookup;
use casebook::output::{NullSink, OutputBuffer};
use casebook::runner::{run_tests, run_unchecked, CaseControl, Function, RunOptions, TestRunner};
use casebook::{parse_case, CaseItem, Fault, FaultKind, HarnessError, Kwargs, Value};
use common::{constant, tuple, Counting};
use std::cell::Cell;

fn divide() -> casebook::builtins::Builtin {
    lookup("divide").unwrap()
}

fn run_one(target: &dyn casebook::Target, items: &[CaseItem]) -> CaseControl {
    TestRunner::run_case(target, &parse_case(items).unwrap(), 1)
}

fn passed(control: CaseControl) -> bool {
    match control {
        CaseControl::Continue(result) => result.passed,
        CaseControl::Abort(fault) => panic!("unexpected abort: {}", fault),
    }
}

fn reason(control: CaseControl) -> String {
    match control {
        CaseControl::Continue(result) => result.reason.unwrap_or_default(),
        CaseControl::Abort(fault) => panic!("unexpected abort: {}", fault),
    }
}

#[cfg(test)]
mod classification_tests {
    use super::*;

    #[test]
    fn test_unchecked_case_passes_when_nothing_is_raised() {
        let control = run_one(&divide(), &[CaseItem::arg(1), CaseItem::arg(1)]);
        match control {
            CaseControl::Continue(result) => {
                assert!(result.passed);
                assert_eq!(result.reason, None);
                assert_eq!(result.index, 1);
            }
            CaseControl::Abort(_) => panic!("case aborted"),
        }
    }

    #[test]
    fn test_expected_fault_passes() {
        let items = [
            CaseItem::arg(1),
            CaseItem::arg(0),
            CaseItem::err(FaultKind::ZeroDivision),
        ];
        assert!(passed(run_one(&divide(), &items)));
    }

    #[test]
    fn test_parent_fault_kind_accepts_subtype() {
        let items = [
            CaseItem::arg(1),
            CaseItem::arg(0),
            CaseItem::err(FaultKind::Arithmetic),
        ];
        assert!(passed(run_one(&divide(), &items)));
    }

    #[test]
    fn test_wrong_fault_kind_fails() {
        let items = [CaseItem::arg(1), CaseItem::arg(0), CaseItem::err(FaultKind::Type)];
        assert_eq!(
            reason(run_one(&divide(), &items)),
            "expected fault Type but got ZeroDivision"
        );
    }

    #[test]
    fn test_unexpected_fault_fails() {
        let items = [CaseItem::arg(1), CaseItem::arg(0)];
        assert!(reason(run_one(&divide(), &items)).starts_with("unexpected fault: ZeroDivision"));
    }

    #[test]
    fn test_missing_fault_fails() {
        let items = [CaseItem::arg(1), CaseItem::arg(1), CaseItem::err_any()];
        assert_eq!(
            reason(run_one(&divide(), &items)),
            "expected fault _ was not raised"
        );
    }

    #[test]
    fn test_expected_value_matches_after_normalization() {
        let items = [CaseItem::arg(10), CaseItem::arg(5), CaseItem::expect(2)];
        assert!(passed(run_one(&divide(), &items)));
    }

    #[test]
    fn test_expected_value_mismatch_cites_both_values() {
        let items = [CaseItem::arg(11), CaseItem::arg(5), CaseItem::expect(3)];
        assert_eq!(reason(run_one(&divide(), &items)), "expected 3 but got 2.2");
    }

    #[test]
    fn test_composite_expectation_with_wildcard() {
        let triple = lookup("triple").unwrap();
        let expected = casebook::Expected::composite([
            casebook::Expected::Wildcard,
            1.into(),
            2.into(),
        ]);
        let items = [CaseItem::arg(1), CaseItem::arg(1), CaseItem::expect(expected)];
        assert!(passed(run_one(&triple, &items)));
    }

    #[test]
    fn test_forbidden_value_fails() {
        let target = constant(Value::Int(2));
        let items = [CaseItem::arg(1), CaseItem::arg(1), CaseItem::not_expect(2)];
        assert_eq!(reason(run_one(&target, &items)), "forbidden value matched: 2");
    }

    #[test]
    fn test_forbidden_value_not_matched_passes() {
        let target = constant(tuple(&[1, 2]));
        assert!(passed(run_one(&target, &[CaseItem::not_expect(3)])));
    }

    #[test]
    fn test_kwargs_reach_the_target() {
        let compare = lookup("compare").unwrap();
        let items = [
            CaseItem::arg(common::list(&[1, 2, 3])),
            CaseItem::arg(common::list(&[1, 2, 3, 4])),
            CaseItem::kwargs([("compare_size", Value::Bool(false))]),
            CaseItem::expect(true),
        ];
        assert!(passed(run_one(&compare, &items)));
    }

    #[test]
    fn test_panicking_target_is_a_panic_fault() {
        let target = Function::new("boom", |_: &[Value], _: &Kwargs| -> Result<Value, Fault> {
            panic!("boom")
        });
        let items = [CaseItem::err(FaultKind::Panic)];
        assert!(passed(run_one(&target, &items)));
    }
}

#[cfg(test)]
mod escalation_tests {
    use super::*;

    #[test]
    fn test_failing_raised_case_aborts_with_original_fault() {
        let items = [CaseItem::arg(1), CaseItem::arg(0), CaseItem::raise()];
        match run_one(&divide(), &items) {
            CaseControl::Abort(fault) => assert_eq!(fault.kind, FaultKind::ZeroDivision),
            CaseControl::Continue(_) => panic!("case did not abort"),
        }
    }

    #[test]
    fn test_failing_value_check_aborts_with_assertion() {
        let items = [
            CaseItem::arg(11),
            CaseItem::arg(5),
            CaseItem::expect(3),
            CaseItem::raise(),
        ];
        match run_one(&divide(), &items) {
            CaseControl::Abort(fault) => {
                assert_eq!(fault.kind, FaultKind::Assertion);
                assert!(fault.message.contains("expected 3 but got 2.2"));
            }
            CaseControl::Continue(_) => panic!("case did not abort"),
        }
    }

    #[test]
    fn test_passing_raised_case_continues() {
        let items = [CaseItem::arg(10), CaseItem::arg(5), CaseItem::expect(2), CaseItem::raise()];
        assert!(passed(run_one(&divide(), &items)));
    }

    #[test]
    fn test_escalation_stops_later_cases() {
        let calls = Cell::new(0);
        let target = Counting {
            inner: divide(),
            calls: &calls,
        };
        let cases = vec![
            vec![CaseItem::arg(1), CaseItem::arg(1)],
            vec![CaseItem::arg(1), CaseItem::arg(0), CaseItem::raise()],
            vec![CaseItem::arg(2), CaseItem::arg(1)],
        ];
        let result = run_tests(&target, &cases, RunOptions::default(), &mut NullSink);
        match result {
            Err(HarnessError::Escalated { index, fault }) => {
                assert_eq!(index, 2);
                assert_eq!(fault.kind, FaultKind::ZeroDivision);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_malformed_case_fails_before_any_call() {
        let calls = Cell::new(0);
        let target = Counting {
            inner: divide(),
            calls: &calls,
        };
        let cases = vec![
            vec![CaseItem::arg(1), CaseItem::arg(1)],
            vec![CaseItem::expect(1), CaseItem::not_expect(2)],
        ];
        let result = run_tests(&target, &cases, RunOptions::default(), &mut NullSink);
        match result {
            Err(err @ HarnessError::Case { index: 2, .. }) => assert!(err.is_configuration()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.get(), 0);
    }
}

#[cfg(test)]
mod reporting_tests {
    use super::*;

    #[test]
    fn test_summary_lists_failed_indices() {
        let cases = vec![
            vec![CaseItem::arg(1), CaseItem::arg(1)],
            vec![CaseItem::arg(1), CaseItem::arg(0)],
            vec![CaseItem::arg(10), CaseItem::arg(5), CaseItem::expect(2)],
            vec![CaseItem::arg(11), CaseItem::arg(5), CaseItem::expect(3)],
        ];
        let mut out = OutputBuffer::new();
        let summary = run_tests(&divide(), &cases, RunOptions::default(), &mut out).unwrap();

        assert_eq!(summary.failed(), vec![2, 4]);
        assert_eq!(summary.passed_count(), 2);
        assert!(!summary.all_passed());
        assert!(out.as_str().starts_with("Running tests for divide:"));
        assert!(out.as_str().contains("    Test 3 passed"));
        assert!(out
            .as_str()
            .contains("    Test 4 failed with error: expected 3 but got 2.2"));
        assert!(out
            .as_str()
            .ends_with("Tests for divide complete: 2 of 4 failed [2, 4]"));
    }

    #[test]
    fn test_print_flags_show_arguments_and_results() {
        let cases = vec![vec![CaseItem::arg(10), CaseItem::arg(5)]];
        let options = RunOptions {
            print_args: true,
            print_res: true,
        };
        let mut out = OutputBuffer::new();
        run_tests(&divide(), &cases, options, &mut out).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.contains(&"  args: (10, 5) ->"));
        assert!(lines.contains(&"    result: 2.0"));
        assert_eq!(
            lines.last(),
            Some(&"Tests for divide complete: all passed")
        );
    }

    #[test]
    fn test_unchecked_runs_count_faults_as_failures() {
        let arg_sets = vec![
            vec![Value::Int(4), Value::Int(2)],
            vec![Value::Int(4), Value::Int(0)],
        ];
        let summary =
            run_unchecked(&divide(), &arg_sets, RunOptions::default(), &mut NullSink).unwrap();
        assert_eq!(summary.failed(), vec![2]);
    }
}
