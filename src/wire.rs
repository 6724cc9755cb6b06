//! # Case Literal Wire Format
//!
//! Suites and generator specs are written in YAML or JSON and read into
//! `serde_json::Value` before being decoded here.
//!
//! A case is a list. A mapping element carrying any reserved key (`err`,
//! `expect`, `not_expect`, `kwargs`, `raise_err`) is a marker record; every
//! other element is a positional argument:
//!
//! ```yaml
//! - [1, 1]
//! - [1, 0, {err: ZeroDivision}]
//! - [10, 5, {expect: 2}]
//! - [1, 1, {expect: ["_", 1, 2]}]
//! - [[1, 2], [1, 2, 3], {kwargs: true, compare_size: false}, {expect: true, raise_err: true}]
//! ```
//!
//! Kinds JSON cannot spell directly are written as single-key tag objects:
//! `{"$tuple": [..]}`, `{"$set": [..]}`, `{"$array": [..]}`, `{"$i32": n}`
//! and `{"$f32": x}`.

use crate::case::{CaseItem, Expected, FaultMatcher, Kwargs, Marker};
use crate::errors::{HarnessError, Result};
use crate::fault::FaultKind;
use crate::value::Value;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Number, Value as Json};
use std::path::Path;

pub const WILDCARD: &str = "_";

const KEY_ERR: &str = "err";
const KEY_EXPECT: &str = "expect";
const KEY_NOT_EXPECT: &str = "not_expect";
const KEY_KWARGS: &str = "kwargs";
const KEY_RAISE: &str = "raise_err";
const RESERVED_KEYS: [&str; 5] = [KEY_ERR, KEY_EXPECT, KEY_NOT_EXPECT, KEY_KWARGS, KEY_RAISE];

const TAG_TUPLE: &str = "$tuple";
const TAG_SET: &str = "$set";
const TAG_ARRAY: &str = "$array";
const TAG_I32: &str = "$i32";
const TAG_F32: &str = "$f32";

// ============================================================================
// VALUES
// ============================================================================

/// Decodes a JSON value into a [`Value`].
pub fn decode_value(json: &Json) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Nil),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => decode_number(n),
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Array(items) => Ok(Value::List(decode_values(items)?)),
        Json::Object(map) => match tagged(map) {
            Some((tag, inner)) => decode_tagged(tag, inner),
            None => {
                let mut entries = im::OrdMap::new();
                for (key, value) in map {
                    entries.insert(key.clone(), decode_value(value)?);
                }
                Ok(Value::Map(entries))
            }
        },
    }
}

fn decode_values(items: &[Json]) -> Result<Vec<Value>> {
    items.iter().map(decode_value).collect()
}

fn decode_number(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    n.as_f64()
        .map(Value::Float)
        .ok_or_else(|| HarnessError::invalid_literal(format!("number {} is out of range", n)))
}

fn tagged(map: &JsonMap<String, Json>) -> Option<(&str, &Json)> {
    if map.len() != 1 {
        return None;
    }
    let (key, inner) = map.iter().next()?;
    [TAG_TUPLE, TAG_SET, TAG_ARRAY, TAG_I32, TAG_F32]
        .contains(&key.as_str())
        .then_some((key.as_str(), inner))
}

fn decode_tagged(tag: &str, inner: &Json) -> Result<Value> {
    match (tag, inner) {
        (TAG_TUPLE, Json::Array(items)) => Ok(Value::Tuple(decode_values(items)?)),
        (TAG_SET, Json::Array(items)) => Ok(Value::set(decode_values(items)?)),
        (TAG_ARRAY, Json::Array(items)) => {
            let items = decode_values(items)?;
            if let Some(bad) = items.iter().find(|v| !v.kind().is_numeric()) {
                return Err(HarnessError::invalid_literal(format!(
                    "array elements must be numeric, found {}",
                    bad
                )));
            }
            Ok(Value::Array(items))
        }
        (TAG_I32, Json::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int32)
            .ok_or_else(|| HarnessError::invalid_literal(format!("{} is not a 32-bit integer", n))),
        (TAG_F32, Json::Number(n)) => n
            .as_f64()
            .map(|f| Value::Float32(f as f32))
            .ok_or_else(|| HarnessError::invalid_literal(format!("{} is not a float", n))),
        _ => Err(HarnessError::invalid_literal(format!(
            "`{}` does not accept {}",
            tag, inner
        ))),
    }
}

/// Encodes a [`Value`] as JSON, using tag objects for kinds JSON lacks.
pub fn encode_value(value: &Value) -> Json {
    let tag = |name: &str, inner: Json| {
        let mut map = JsonMap::new();
        map.insert(name.to_string(), inner);
        Json::Object(map)
    };
    let list = |items: &[Value]| Json::Array(items.iter().map(encode_value).collect());

    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::Float(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Int32(n) => tag(TAG_I32, Json::from(*n)),
        Value::Float32(n) => tag(
            TAG_F32,
            Number::from_f64(f64::from(*n)).map_or(Json::Null, Json::Number),
        ),
        Value::Str(s) => Json::String(s.clone()),
        Value::List(items) => list(items),
        Value::Tuple(items) => tag(TAG_TUPLE, list(items)),
        Value::Set(items) => tag(TAG_SET, list(items)),
        Value::Array(items) => tag(TAG_ARRAY, list(items)),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect(),
        ),
    }
}

// ============================================================================
// CASES
// ============================================================================

/// Decodes one case literal.
pub fn decode_case(json: &Json) -> Result<Vec<CaseItem>> {
    let Json::Array(elements) = json else {
        return Err(HarnessError::invalid_literal(format!(
            "a case must be a list, found {}",
            json
        )));
    };

    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Json::Object(record) if is_marker_record(record) => {
                items.extend(decode_marker_record(record)?.into_iter().map(CaseItem::Marker));
            }
            other => items.push(CaseItem::Arg(decode_value(other)?)),
        }
    }
    Ok(items)
}

/// Decodes a list of case literals, tagging errors with the 1-based case index.
pub fn decode_cases(cases: &[Json]) -> Result<Vec<Vec<CaseItem>>> {
    cases
        .iter()
        .enumerate()
        .map(|(i, case)| decode_case(case).map_err(|e| e.in_case(i + 1)))
        .collect()
}

fn is_marker_record(record: &JsonMap<String, Json>) -> bool {
    RESERVED_KEYS.iter().any(|key| record.contains_key(*key))
}

fn decode_marker_record(record: &JsonMap<String, Json>) -> Result<Vec<Marker>> {
    let primary: Vec<&str> = [KEY_ERR, KEY_EXPECT, KEY_NOT_EXPECT, KEY_KWARGS]
        .into_iter()
        .filter(|key| record.contains_key(*key))
        .collect();

    if primary.len() > 1 {
        return Err(HarnessError::invalid_marker(format!(
            "record mixes `{}`",
            primary.join("`, `")
        )));
    }

    let mut markers = Vec::with_capacity(2);
    match primary.first().copied() {
        Some(KEY_ERR) => markers.push(Marker::Exception(decode_fault_matcher(&record[KEY_ERR])?)),
        Some(KEY_EXPECT) => markers.push(Marker::Expect(decode_expected(&record[KEY_EXPECT])?)),
        Some(KEY_NOT_EXPECT) => {
            markers.push(Marker::NotExpect(decode_expected(&record[KEY_NOT_EXPECT])?))
        }
        Some(KEY_KWARGS) => markers.push(Marker::Kwargs(decode_bundle(record)?)),
        _ => {}
    }

    if let Some(flag) = record.get(KEY_RAISE) {
        let Json::Bool(flag) = flag else {
            return Err(HarnessError::invalid_marker(format!(
                "`raise_err` must be a boolean, found {}",
                flag
            )));
        };
        markers.push(Marker::Raise(*flag));
    }

    // Only a keyword bundle may carry free-form keys.
    if primary.first() != Some(&KEY_KWARGS) {
        if let Some(extra) = record
            .keys()
            .find(|key| !RESERVED_KEYS.contains(&key.as_str()))
        {
            return Err(HarnessError::invalid_marker(format!(
                "unexpected key `{}` in a marker record",
                extra
            )));
        }
    }

    Ok(markers)
}

fn decode_bundle(record: &JsonMap<String, Json>) -> Result<Kwargs> {
    if record.get(KEY_KWARGS) != Some(&Json::Bool(true)) {
        return Err(HarnessError::invalid_marker(
            "a keyword bundle is flagged with `kwargs: true`",
        ));
    }
    let mut kwargs = Kwargs::new();
    for (key, value) in record {
        if key != KEY_KWARGS && key != KEY_RAISE {
            kwargs.insert(key.clone(), decode_value(value)?);
        }
    }
    Ok(kwargs)
}

/// `"_"` accepts any fault; any other string must name a [`FaultKind`].
pub fn decode_fault_matcher(json: &Json) -> Result<FaultMatcher> {
    match json {
        Json::String(s) if s == WILDCARD => Ok(FaultMatcher::Any),
        Json::String(s) => s
            .parse::<FaultKind>()
            .map(FaultMatcher::Kind)
            .map_err(|_| HarnessError::UnknownFaultKind { name: s.clone() }),
        other => Err(HarnessError::invalid_marker(format!(
            "`err` must name a fault kind, found {}",
            other
        ))),
    }
}

/// `"_"` is the wildcard, a list is a composite of per-position
/// expectations, anything else is a literal.
pub fn decode_expected(json: &Json) -> Result<Expected> {
    match json {
        Json::String(s) if s == WILDCARD => Ok(Expected::Wildcard),
        Json::Array(slots) => Ok(Expected::Composite(
            slots.iter().map(decode_expected).collect::<Result<_>>()?,
        )),
        other => Ok(Expected::Literal(decode_value(other)?)),
    }
}

// ============================================================================
// DOCUMENTS
// ============================================================================

/// A suite file: the target to call and its cases.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteFile {
    pub target: String,
    pub cases: Vec<Json>,
}

impl SuiteFile {
    pub fn decode_cases(&self) -> Result<Vec<Vec<CaseItem>>> {
        decode_cases(&self.cases)
    }
}

/// Reads a YAML or JSON document. Files ending in `.json` are parsed as
/// JSON; everything else as YAML.
pub fn load_document<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let text = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| HarnessError::Format {
        path: path.to_path_buf(),
        message,
    })
}
