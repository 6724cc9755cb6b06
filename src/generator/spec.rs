//! Argument specs and their resolution into sampling plans.
//!
//! An [`ArgSpec`] is what a user writes; every field except `type` is
//! optional and falls back to the per-type defaults of [`ArgSpec::defaults`].
//! [`resolve`] merges, validates and compiles a spec into a [`Plan`].

use crate::equality::type_compatible;
use crate::errors::{HarnessError, Result};
use crate::value::{Kind, Value};
use crate::wire;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;
use std::fmt;

const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DEFAULT_SIZE_RANGE: (usize, usize) = (0, 100);
const DEFAULT_STR_LENGTH: usize = 10;
// Widest float range the sampler can scale without overflowing.
const MAX_FLOAT_SPAN: f64 = f64::MAX / 2.0;

/// The kind of argument a spec generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Int,
    Float,
    Str,
    Bool,
    List,
    Tuple,
    Dict,
    Set,
    Array,
}

impl ArgType {
    pub const fn name(self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::Str => "str",
            ArgType::Bool => "bool",
            ArgType::List => "list",
            ArgType::Tuple => "tuple",
            ArgType::Dict => "dict",
            ArgType::Set => "set",
            ArgType::Array => "array",
        }
    }

    /// The value kind this type produces.
    pub const fn kind(self) -> Kind {
        match self {
            ArgType::Int => Kind::Int,
            ArgType::Float => Kind::Float,
            ArgType::Str => Kind::Str,
            ArgType::Bool => Kind::Bool,
            ArgType::List => Kind::List,
            ArgType::Tuple => Kind::Tuple,
            ArgType::Dict => Kind::Map,
            ArgType::Set => Kind::Set,
            ArgType::Array => Kind::Array,
        }
    }

    /// Other kinds accepted as `choices` for this type.
    pub const fn alt_kinds(self) -> &'static [Kind] {
        match self {
            ArgType::Int => &[Kind::Int32],
            ArgType::Float => &[Kind::Int, Kind::Int32, Kind::Float32],
            _ => &[],
        }
    }

    pub const fn is_container(self) -> bool {
        matches!(
            self,
            ArgType::List | ArgType::Tuple | ArgType::Dict | ArgType::Set | ArgType::Array
        )
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one generated argument.
///
/// ```yaml
/// - type: int
///   range: [1, 6]
/// - type: list
///   size_range: [0, 5]
///   fill_type: str
/// - type: float
///   choices: [0.5, 1, 2.5]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgSpec {
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    /// Inclusive bounds for int and float; half-open for array elements.
    #[serde(default, deserialize_with = "decode_optional")]
    pub range: Option<Value>,
    /// Values to pick from. Takes precedence over `range`.
    #[serde(default, deserialize_with = "decode_optional")]
    pub choices: Option<Value>,
    /// Inclusive bounds on a container's length.
    #[serde(default)]
    pub size_range: Option<(usize, usize)>,
    /// Element type of a container.
    #[serde(default)]
    pub fill_type: Option<ArgType>,
    /// Alphabet for strings.
    #[serde(default)]
    pub characters: Option<String>,
    /// Keys of a generated dict.
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    /// Length of generated strings.
    #[serde(default)]
    pub length: Option<usize>,
}

fn decode_optional<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Json>::deserialize(deserializer)?
        .as_ref()
        .map(wire::decode_value)
        .transpose()
        .map_err(serde::de::Error::custom)
}

impl ArgSpec {
    /// A spec naming only its type.
    pub fn bare(arg_type: ArgType) -> Self {
        Self {
            arg_type,
            range: None,
            choices: None,
            size_range: None,
            fill_type: None,
            characters: None,
            keys: None,
            length: None,
        }
    }

    pub fn with_range(mut self, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.range = Some(Value::List(vec![low.into(), high.into()]));
        self
    }

    pub fn with_choices<I: IntoIterator<Item = Value>>(mut self, choices: I) -> Self {
        self.choices = Some(Value::List(choices.into_iter().collect()));
        self
    }

    pub fn with_size_range(mut self, low: usize, high: usize) -> Self {
        self.size_range = Some((low, high));
        self
    }

    pub fn with_fill(mut self, fill_type: ArgType) -> Self {
        self.fill_type = Some(fill_type);
        self
    }

    /// The fully populated defaults for a type.
    pub fn defaults(arg_type: ArgType) -> Self {
        let bounds = |low: Value, high: Value| Some(Value::List(vec![low, high]));
        let mut spec = Self::bare(arg_type);
        match arg_type {
            ArgType::Int => spec.range = bounds(Value::Int(0), Value::Int(100)),
            ArgType::Float => spec.range = bounds(Value::Float(0.0), Value::Float(100.0)),
            ArgType::Str => {
                spec.characters = Some(ALPHANUMERIC.to_string());
                spec.length = Some(DEFAULT_STR_LENGTH);
            }
            ArgType::Bool => {
                spec.choices = Some(Value::List(vec![Value::Bool(true), Value::Bool(false)]));
            }
            ArgType::List | ArgType::Tuple | ArgType::Set => {
                spec.size_range = Some(DEFAULT_SIZE_RANGE);
                spec.fill_type = Some(ArgType::Int);
            }
            ArgType::Dict => {
                spec.size_range = Some(DEFAULT_SIZE_RANGE);
                spec.fill_type = Some(ArgType::Int);
                spec.keys = Some(vec!["a".into(), "b".into(), "c".into()]);
            }
            ArgType::Array => {
                spec.size_range = Some(DEFAULT_SIZE_RANGE);
                spec.fill_type = Some(ArgType::Int);
                spec.range = bounds(Value::Int(-100), Value::Int(100));
            }
        }
        spec
    }

    /// Fills every field the user left out from the type's defaults.
    /// Explicit `choices` suppress the range.
    fn merged(&self) -> Self {
        let defaults = Self::defaults(self.arg_type);
        let choices = self.choices.clone().or(defaults.choices);
        let range = match choices {
            Some(_) => None,
            None => self.range.clone().or(defaults.range),
        };
        Self {
            arg_type: self.arg_type,
            range,
            choices,
            size_range: self.size_range.or(defaults.size_range),
            fill_type: self.fill_type.or(defaults.fill_type),
            characters: self.characters.clone().or(defaults.characters),
            keys: self.keys.clone().or(defaults.keys),
            length: self.length.or(defaults.length),
        }
    }
}

// ============================================================================
// PLANS
// ============================================================================

/// A validated recipe for sampling one argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Uniform choice among fixed values.
    Pick(Vec<Value>),
    /// Inclusive integer range.
    Int { low: i64, high: i64 },
    /// Inclusive float range.
    Float { low: f64, high: f64 },
    Text { alphabet: Vec<char>, length: usize },
    /// List, tuple or set of `element`s with a length drawn from `size`.
    Sequence {
        arg_type: ArgType,
        size: (usize, usize),
        element: Box<Plan>,
    },
    Dict { keys: Vec<String>, element: Box<Plan> },
    /// Numeric array. Elements are `Int32` in `[low, high)` unless
    /// `float` is set, in which case they are `Float32`. Both bounds are
    /// exactly representable in the element type.
    Array {
        size: (usize, usize),
        low: f64,
        high: f64,
        float: bool,
    },
}

/// Validates a spec, merges it over its type's defaults and compiles the
/// result into a [`Plan`].
///
/// ```rust
/// use casebook::generator::{resolve, ArgSpec, ArgType, Plan};
/// let plan = resolve(&ArgSpec::bare(ArgType::Int).with_range(1, 6)).unwrap();
/// assert_eq!(plan, Plan::Int { low: 1, high: 6 });
/// ```
pub fn resolve(spec: &ArgSpec) -> Result<Plan> {
    check_range_shape(spec)?;
    let merged = spec.merged();
    let plan = compile(&merged)?;
    tracing::trace!(arg_type = %spec.arg_type, ?plan, "resolved arg spec");
    Ok(plan)
}

/// A user range must have the same shape of kinds as the default range,
/// up to soft conversion of its bounds. Ignored when choices are given.
fn check_range_shape(spec: &ArgSpec) -> Result<()> {
    if spec.choices.is_some() {
        return Ok(());
    }
    let (Some(range), Some(default)) = (&spec.range, ArgSpec::defaults(spec.arg_type).range)
    else {
        return Ok(());
    };
    if type_compatible(range, &default, true) {
        Ok(())
    } else {
        Err(HarnessError::invalid_arg_spec(format!(
            "range {} for {} does not match the shape of {}",
            range, spec.arg_type, default
        )))
    }
}

fn compile(spec: &ArgSpec) -> Result<Plan> {
    if let Some(choices) = &spec.choices {
        let picks = checked_choices(spec, choices)?;
        if !spec.arg_type.is_container() {
            return Ok(Plan::Pick(coerce_all(&picks, spec.arg_type)));
        }
        return compile_container(spec, Some(picks));
    }

    match spec.arg_type {
        ArgType::Int => {
            let (low, high) = int_bounds(spec)?;
            Ok(Plan::Int { low, high })
        }
        ArgType::Float => {
            let (low, high) = float_bounds(spec)?;
            Ok(Plan::Float { low, high })
        }
        ArgType::Str => {
            let alphabet: Vec<char> = spec.characters.as_deref().unwrap_or_default().chars().collect();
            if alphabet.is_empty() {
                return Err(HarnessError::invalid_arg_spec("str needs a non-empty `characters` set"));
            }
            Ok(Plan::Text {
                alphabet,
                length: spec.length.unwrap_or(DEFAULT_STR_LENGTH),
            })
        }
        ArgType::Bool => Err(HarnessError::invalid_arg_spec("bool needs `choices`")),
        _ => compile_container(spec, None),
    }
}

fn compile_container(spec: &ArgSpec, picks: Option<Vec<Value>>) -> Result<Plan> {
    let fill = spec.fill_type.ok_or_else(|| {
        HarnessError::invalid_arg_spec(format!("{} needs a `fill_type`", spec.arg_type))
    })?;
    let size = size_bounds(spec)?;

    if spec.arg_type == ArgType::Array {
        let float = match fill {
            ArgType::Int => false,
            ArgType::Float => true,
            other => {
                return Err(HarnessError::invalid_arg_spec(format!(
                    "array elements must be int or float, not {}",
                    other
                )))
            }
        };
        if let Some(picks) = picks {
            let natives = picks
                .iter()
                .map(|v| {
                    native(v, float).ok_or_else(|| {
                        HarnessError::invalid_arg_spec(format!(
                            "choice {} does not fit a {} array",
                            v, fill
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Plan::Sequence {
                arg_type: ArgType::Array,
                size,
                element: Box::new(Plan::Pick(natives)),
            });
        }
        let (low, high) = float_bounds(spec)?;
        if low >= high {
            return Err(HarnessError::invalid_arg_spec(format!(
                "array range [{}, {}) is empty",
                low, high
            )));
        }
        let (low, high) = if float {
            f32_bounds(low, high)?
        } else {
            i32_bounds(low, high)?
        };
        return Ok(Plan::Array {
            size,
            low,
            high,
            float,
        });
    }

    let element = match picks {
        Some(picks) => Plan::Pick(coerce_all(&picks, fill)),
        None => resolve(&ArgSpec::bare(fill))?,
    };

    if spec.arg_type == ArgType::Dict {
        return Ok(Plan::Dict {
            keys: spec.keys.clone().unwrap_or_default(),
            element: Box::new(element),
        });
    }
    Ok(Plan::Sequence {
        arg_type: spec.arg_type,
        size,
        element: Box::new(element),
    })
}

/// Choices must be a non-empty list whose kinds belong to the type, its
/// alternates, or the fill type and its alternates.
fn checked_choices(spec: &ArgSpec, choices: &Value) -> Result<Vec<Value>> {
    let items: Vec<Value> = match choices {
        Value::List(items) | Value::Tuple(items) => items.clone(),
        other => {
            return Err(HarnessError::invalid_arg_spec(format!(
                "`choices` must be a list, found {}",
                other.type_name()
            )))
        }
    };
    if items.is_empty() {
        return Err(HarnessError::invalid_arg_spec("`choices` is empty"));
    }

    let mut valid = vec![spec.arg_type.kind()];
    valid.extend_from_slice(spec.arg_type.alt_kinds());
    if let Some(fill) = spec.fill_type {
        valid.push(fill.kind());
        valid.extend_from_slice(fill.alt_kinds());
    }

    if let Some(bad) = items.iter().find(|v| !valid.contains(&v.kind())) {
        return Err(HarnessError::invalid_arg_spec(format!(
            "choice {} is not a valid {}",
            bad, spec.arg_type
        )));
    }
    Ok(items)
}

/// Normalizes numeric picks to the kind the type generates.
fn coerce_all(values: &[Value], arg_type: ArgType) -> Vec<Value> {
    values
        .iter()
        .map(|value| match arg_type {
            ArgType::Int => value.as_i64().map_or_else(|| value.clone(), Value::Int),
            ArgType::Float => value.as_f64().map_or_else(|| value.clone(), Value::Float),
            _ => value.clone(),
        })
        .collect()
}

fn native(value: &Value, float: bool) -> Option<Value> {
    if float {
        value.as_f64().map(|f| Value::Float32(f as f32))
    } else {
        value
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int32)
    }
}

fn two_bounds(spec: &ArgSpec) -> Result<(&Value, &Value)> {
    let range = spec.range.as_ref().ok_or_else(|| {
        HarnessError::invalid_arg_spec(format!("{} needs a `range` or `choices`", spec.arg_type))
    })?;
    match range.elements().collect::<Vec<_>>().as_slice() {
        [low, high] => Ok((*low, *high)),
        _ => Err(HarnessError::invalid_arg_spec(format!(
            "range {} must hold exactly two bounds",
            range
        ))),
    }
}

fn int_bounds(spec: &ArgSpec) -> Result<(i64, i64)> {
    let (low, high) = two_bounds(spec)?;
    match (low.as_i64(), high.as_i64()) {
        (Some(low), Some(high)) if low <= high => Ok((low, high)),
        (Some(low), Some(high)) => Err(HarnessError::invalid_arg_spec(format!(
            "range minimum {} exceeds maximum {}",
            low, high
        ))),
        _ => Err(HarnessError::invalid_arg_spec(format!(
            "int range bounds must be integers, found {} and {}",
            low, high
        ))),
    }
}

fn float_bounds(spec: &ArgSpec) -> Result<(f64, f64)> {
    let (low, high) = two_bounds(spec)?;
    let (low, high) = match (low.as_f64(), high.as_f64()) {
        (Some(low), Some(high)) => (low, high),
        _ => {
            return Err(HarnessError::invalid_arg_spec(format!(
                "range bounds must be numbers, found {} and {}",
                low, high
            )))
        }
    };
    if !low.is_finite() || !high.is_finite() {
        return Err(HarnessError::invalid_arg_spec(format!(
            "range bounds must be finite, found {} and {}",
            low, high
        )));
    }
    if low > high {
        return Err(HarnessError::invalid_arg_spec(format!(
            "range minimum {} exceeds maximum {}",
            low, high
        )));
    }
    if high - low > MAX_FLOAT_SPAN {
        return Err(HarnessError::invalid_arg_spec(format!(
            "range [{}, {}] is too wide to sample",
            low, high
        )));
    }
    Ok((low, high))
}

/// Integer bounds of a half-open array range.
fn i32_bounds(low: f64, high: f64) -> Result<(f64, f64)> {
    if low < f64::from(i32::MIN) || high > f64::from(i32::MAX) {
        return Err(HarnessError::invalid_arg_spec(format!(
            "array range [{}, {}) exceeds 32-bit integers",
            low, high
        )));
    }
    let (first, end) = (low.ceil(), high.ceil());
    if first >= end {
        return Err(HarnessError::invalid_arg_spec(format!(
            "array range [{}, {}) holds no integer",
            low, high
        )));
    }
    Ok((first, end))
}

/// Narrows a half-open array range to the `f32` values inside it.
fn f32_bounds(low: f64, high: f64) -> Result<(f64, f64)> {
    let limit = f64::from(f32::MAX);
    if low < -limit || high > limit {
        return Err(HarnessError::invalid_arg_spec(format!(
            "array range [{}, {}) exceeds 32-bit floats",
            low, high
        )));
    }
    let (first, end) = (f32_at_or_above(low), f32_at_or_above(high));
    if first >= end {
        return Err(HarnessError::invalid_arg_spec(format!(
            "array range [{}, {}) holds no 32-bit float",
            low, high
        )));
    }
    if !(end - first).is_finite() {
        return Err(HarnessError::invalid_arg_spec(format!(
            "array range [{}, {}) is too wide to sample",
            low, high
        )));
    }
    Ok((f64::from(first), f64::from(end)))
}

/// Smallest `f32` not below `x`. `x` must lie within the finite `f32` range.
fn f32_at_or_above(x: f64) -> f32 {
    let nearest = x as f32;
    if f64::from(nearest) >= x {
        nearest
    } else if nearest == 0.0 {
        f32::from_bits(1)
    } else if nearest > 0.0 {
        f32::from_bits(nearest.to_bits() + 1)
    } else {
        f32::from_bits(nearest.to_bits() - 1)
    }
}

fn size_bounds(spec: &ArgSpec) -> Result<(usize, usize)> {
    match spec.size_range {
        Some((low, high)) if low <= high => Ok((low, high)),
        Some((low, high)) => Err(HarnessError::invalid_arg_spec(format!(
            "size_range minimum {} exceeds maximum {}",
            low, high
        ))),
        None => Err(HarnessError::invalid_arg_spec(format!(
            "{} needs a `size_range`",
            spec.arg_type
        ))),
    }
}
