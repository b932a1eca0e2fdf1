//! Raw column values and their conversions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::structure::FieldType;

/// Leading numeric prefix, e.g. `" 12.5kg"` -> `"12.5"`.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("numeric prefix pattern")
});

/// A single cell of a row, or a hydrated field value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// One raw row: column values in column order.
pub type Row = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Best-effort integer coercion. Non-numeric input becomes zero.
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => i64::from(*b),
            Value::Int(i) => *i,
            Value::Float(f) => float_to_int(*f),
            Value::Text(s) => parse_int_prefix(s),
        }
    }

    /// Best-effort float coercion. Non-numeric input becomes zero.
    pub fn to_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Text(s) => parse_float_prefix(s),
        }
    }

    /// Truthiness: empty text, `"0"`, zero and null are false.
    pub fn to_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !(s.is_empty() || s == "0"),
        }
    }
}

fn numeric_prefix(s: &str) -> Option<&str> {
    NUMERIC_PREFIX
        .find(s.trim_start())
        .map(|m| m.as_str())
}

fn parse_float_prefix(s: &str) -> f64 {
    numeric_prefix(s)
        .and_then(|p| p.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn parse_int_prefix(s: &str) -> i64 {
    let Some(prefix) = numeric_prefix(s) else {
        return 0;
    };
    match prefix.parse::<i64>() {
        Ok(i) => i,
        Err(_) => prefix.parse::<f64>().map(float_to_int).unwrap_or(0),
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        // saturating, truncates toward zero
        f as i64
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion applied to a raw column value before assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueConversion {
    /// Assign the raw value unmodified.
    #[default]
    None,
    ToInt,
    ToFloat,
    ToBool,
}

impl ValueConversion {
    /// All conversions, in hydration pass order.
    pub const ALL: [ValueConversion; 4] = [
        ValueConversion::None,
        ValueConversion::ToInt,
        ValueConversion::ToFloat,
        ValueConversion::ToBool,
    ];

    /// Position of this conversion in [`ValueConversion::ALL`].
    pub fn index(self) -> usize {
        match self {
            ValueConversion::None => 0,
            ValueConversion::ToInt => 1,
            ValueConversion::ToFloat => 2,
            ValueConversion::ToBool => 3,
        }
    }

    /// Conversion implied by a declared field type.
    pub fn for_field_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Integer => ValueConversion::ToInt,
            FieldType::Float => ValueConversion::ToFloat,
            FieldType::Bool => ValueConversion::ToBool,
            FieldType::String => ValueConversion::None,
        }
    }

    pub fn apply(self, value: &Value) -> Value {
        match self {
            ValueConversion::None => value.clone(),
            ValueConversion::ToInt => Value::Int(value.to_int()),
            ValueConversion::ToFloat => Value::Float(value.to_float()),
            ValueConversion::ToBool => Value::Bool(value.to_truthy()),
        }
    }
}

impl fmt::Display for ValueConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConversion::None => write!(f, "none"),
            ValueConversion::ToInt => write!(f, "int"),
            ValueConversion::ToFloat => write!(f, "float"),
            ValueConversion::ToBool => write!(f, "bool"),
        }
    }
}
