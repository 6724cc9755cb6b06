//! Case specification parser tests, covering both the typed builders and the
//! YAML/JSON wire form.

mod common;

use casebook::case::{parse_case, CaseItem, Expected, FaultMatcher, ParsedCase};
use casebook::wire::{decode_case, decode_cases, decode_value, encode_value};
use casebook::{FaultKind, HarnessError, Value};
use common::{list, tuple};
use serde_json::json;

fn parse_json(case: serde_json::Value) -> Result<ParsedCase, HarnessError> {
    parse_case(&decode_case(&case)?)
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    #[test]
    fn test_plain_arguments() {
        let parsed = parse_case(&[CaseItem::arg(1), CaseItem::arg(1)]).unwrap();
        assert_eq!(parsed.args, vec![Value::Int(1), Value::Int(1)]);
        assert!(parsed.kwargs.is_empty());
        assert!(parsed.is_unchecked());
        assert!(!parsed.raise_on_failure);
    }

    #[test]
    fn test_markers_never_become_arguments() {
        let parsed = parse_case(&[
            CaseItem::arg(10),
            CaseItem::expect(2),
            CaseItem::arg(5),
            CaseItem::raise(),
        ])
        .unwrap();
        assert_eq!(parsed.args, vec![Value::Int(10), Value::Int(5)]);
        assert_eq!(parsed.expected_value, Some(Expected::Literal(Value::Int(2))));
        assert!(parsed.raise_on_failure);
    }

    #[test]
    fn test_kwargs_bundles_merge_with_later_keys_winning() {
        let parsed = parse_case(&[
            CaseItem::kwargs([("a", Value::Int(1)), ("b", Value::Int(2))]),
            CaseItem::kwargs([("b", Value::Int(3))]),
        ])
        .unwrap();
        assert_eq!(parsed.kwargs.get("a"), Some(&Value::Int(1)));
        assert_eq!(parsed.kwargs.get("b"), Some(&Value::Int(3)));
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn test_exception_marker() {
        let parsed = parse_case(&[CaseItem::arg(1), CaseItem::err(FaultKind::ZeroDivision)]).unwrap();
        assert_eq!(
            parsed.expected_exception,
            Some(FaultMatcher::Kind(FaultKind::ZeroDivision))
        );
        let parsed = parse_case(&[CaseItem::err_any()]).unwrap();
        assert_eq!(parsed.expected_exception, Some(FaultMatcher::Any));
    }

    #[test]
    fn test_expect_and_not_expect_together_is_rejected() {
        let result = parse_case(&[CaseItem::expect(1), CaseItem::not_expect(2)]);
        assert!(matches!(result, Err(HarnessError::ConflictingExpectations)));
    }

    #[test]
    fn test_repeated_expectation_keeps_the_last() {
        let parsed = parse_case(&[CaseItem::expect(1), CaseItem::expect(2)]).unwrap();
        assert_eq!(parsed.expected_value, Some(Expected::Literal(Value::Int(2))));
    }

    #[test]
    fn test_describe_args_lists_keywords_after_positionals() {
        let parsed = parse_case(&[
            CaseItem::arg(1),
            CaseItem::arg("x"),
            CaseItem::kwargs([("flag", Value::Bool(true))]),
        ])
        .unwrap();
        assert_eq!(parsed.describe_args(), "1, \"x\", flag=true");
    }
}

#[cfg(test)]
mod wire_tests {
    use super::*;

    #[test]
    fn test_scenario_cases_decode() {
        let parsed = parse_json(json!([1, 0, {"err": "ZeroDivisionError"}])).unwrap();
        assert_eq!(parsed.args, vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(
            parsed.expected_exception,
            Some(FaultMatcher::Kind(FaultKind::ZeroDivision))
        );

        let parsed = parse_json(json!([1, 1, {"expect": ["_", 1, 2]}])).unwrap();
        assert_eq!(
            parsed.expected_value,
            Some(Expected::composite([
                Expected::Wildcard,
                Expected::Literal(Value::Int(1)),
                Expected::Literal(Value::Int(2)),
            ]))
        );
    }

    #[test]
    fn test_wildcard_err_accepts_any_fault() {
        let parsed = parse_json(json!([{"err": "_"}])).unwrap();
        assert_eq!(parsed.expected_exception, Some(FaultMatcher::Any));
    }

    #[test]
    fn test_kwargs_bundle_with_raise_flag() {
        let parsed = parse_json(json!([
            [1, 2],
            [1, 2, 3],
            {"kwargs": true, "compare_size": false, "raise_err": true},
            {"expect": true}
        ]))
        .unwrap();
        assert_eq!(parsed.args, vec![list(&[1, 2]), list(&[1, 2, 3])]);
        assert_eq!(parsed.kwargs.get("compare_size"), Some(&Value::Bool(false)));
        assert!(!parsed.kwargs.contains_key("raise_err"));
        assert!(parsed.raise_on_failure);
    }

    #[test]
    fn test_plain_mapping_is_an_argument() {
        let parsed = parse_json(json!([{"a": 1, "b": 2}])).unwrap();
        assert_eq!(
            parsed.args,
            vec![Value::map([("a", Value::Int(1)), ("b", Value::Int(2))])]
        );
    }

    #[test]
    fn test_unknown_fault_kind_is_rejected() {
        let result = parse_json(json!([1, {"err": "Segfault"}]));
        assert!(matches!(result, Err(HarnessError::UnknownFaultKind { .. })));
    }

    #[test]
    fn test_malformed_marker_records_are_rejected() {
        let bad = [
            json!([{"expect": 1, "err": "Type"}]),
            json!([{"kwargs": false, "a": 1}]),
            json!([{"raise_err": "yes"}]),
            json!([{"expect": 1, "extra": 2}]),
        ];
        for case in bad {
            let result = parse_json(case.clone());
            assert!(
                matches!(result, Err(HarnessError::InvalidMarker { .. })),
                "{} was accepted",
                case
            );
        }
    }

    #[test]
    fn test_case_must_be_a_list() {
        assert!(matches!(
            decode_case(&json!({"expect": 1})),
            Err(HarnessError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_decode_cases_reports_the_failing_index() {
        let cases = [json!([1]), json!([2]), json!([{"err": 5}])];
        match decode_cases(&cases) {
            Err(HarnessError::Case { index, .. }) => assert_eq!(index, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_tagged_values() {
        assert_eq!(
            decode_value(&json!({"$tuple": [1, 2]})).unwrap(),
            tuple(&[1, 2])
        );
        assert_eq!(
            decode_value(&json!({"$set": [3, 1, 3]})).unwrap(),
            Value::Set(vec![Value::Int(1), Value::Int(3)])
        );
        assert_eq!(
            decode_value(&json!({"$array": [1, 2.5]})).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Float(2.5)])
        );
        assert_eq!(decode_value(&json!({"$i32": 7})).unwrap(), Value::Int32(7));
        assert!(decode_value(&json!({"$array": ["x"]})).is_err());
        assert!(decode_value(&json!({"$i32": 5000000000i64})).is_err());
    }

    #[test]
    fn test_encoded_kinds_survive_decoding() {
        let value = Value::Tuple(vec![
            Value::set([Value::Int(2), Value::Int(1)]),
            Value::Int32(4),
            Value::map([("k", Value::Float(0.5))]),
        ]);
        assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
    }
}
