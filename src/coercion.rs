//! Type classification and coercion.
//!
//! The `coerce_to_*` functions are total: input with no sensible conversion
//! yields the target's zero value (`false`, `0`, `0.0`, `""`, Null). The
//! exceptions are [`coerce_to_number`], which rejects enum-like and opaque
//! values, and [`coerce_to_type`], which is strict about unparsable strings.
//!
//! ```
//! use elx_lang::coercion::*;
//! use elx_lang::Value;
//!
//! assert_eq!(coerce_to_integer(&Value::from("42")), 42);
//! assert_eq!(coerce_to_double(&Value::from("3.5")), 3.5);
//! assert!(coerce_to_boolean(&Value::from(coerce_to_string(&Value::Boolean(true)))));
//! assert_eq!(coerce_to_number(&Value::from("7")).unwrap(), Value::Integer(7));
//! assert_eq!(coerce_to_number(&Value::from("7.0")).unwrap(), Value::Double(7.0));
//! ```

use std::{fmt, rc::Rc};

use crate::{
    error::EvalError,
    value::{EnumType, Kind, Value},
};

/// Target representation for [`coerce_to_type`].
#[derive(Debug, Clone, PartialEq)]
pub enum TargetType {
    /// No conversion
    Any,
    Boolean,
    Integer,
    Double,
    /// Integer or Double, whichever the input parses as
    Number,
    String,
    Enum(Rc<EnumType>),
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Any => f.write_str("any"),
            TargetType::Boolean => f.write_str("boolean"),
            TargetType::Integer => f.write_str("integer"),
            TargetType::Double => f.write_str("double"),
            TargetType::Number => f.write_str("number"),
            TargetType::String => f.write_str("string"),
            TargetType::Enum(ty) => write!(f, "enum {}", ty.name()),
        }
    }
}

pub fn classify(value: &Value) -> Kind {
    value.kind()
}

pub fn coerce_to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Double(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Enum(_) | Value::Other(_) => false,
    }
}

pub fn coerce_to_integer(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Boolean(b) => i64::from(*b),
        Value::Integer(n) => *n,
        Value::Double(n) => truncate(*n),
        Value::String(s) => parse_integer(s).unwrap_or(0),
        Value::Enum(_) | Value::Other(_) => 0,
    }
}

pub fn coerce_to_double(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::Integer(n) => *n as f64,
        Value::Double(n) => *n,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Enum(_) | Value::Other(_) => 0.0,
    }
}

pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Double(n) => format_double(*n),
        Value::String(s) => s.clone(),
        Value::Enum(e) => e.name().to_string(),
        Value::Other(object) => object.to_string(),
    }
}

/// Converts to Integer when the input has no decimal point, Double otherwise.
///
/// Fails for enum-like and opaque values, which have no numeric reading.
pub fn coerce_to_number(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Null => Ok(Value::Integer(0)),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Integer(_) | Value::Double(_) => Ok(value.clone()),
        Value::String(s) => Ok(parse_number(s).unwrap_or(Value::Integer(0))),
        Value::Enum(_) | Value::Other(_) => Err(EvalError::coercion(value, "number")),
    }
}

/// Reads a constant of `ty`: by name from strings, unchanged from enum values
/// of the same type. Anything else yields Null.
pub fn coerce_to_enum(value: &Value, ty: &Rc<EnumType>) -> Value {
    match value {
        Value::Enum(e) if e.enum_type() == ty => value.clone(),
        Value::Enum(e) => ty.value_of(e.name()).map_or(Value::Null, Value::Enum),
        Value::String(s) => ty.value_of(s).map_or(Value::Null, Value::Enum),
        _ => Value::Null,
    }
}

/// Converts `value` to the requested representation.
///
/// Null converts to the target's zero value. Strings must parse completely
/// for numeric targets and name an existing constant for enum targets.
pub fn coerce_to_type(value: &Value, target: &TargetType) -> Result<Value, EvalError> {
    let fail = || EvalError::coercion(value, target.to_string());

    match target {
        TargetType::Any => Ok(value.clone()),
        TargetType::String => Ok(Value::String(coerce_to_string(value))),
        TargetType::Boolean => match value {
            Value::Null | Value::Boolean(_) | Value::String(_) => {
                Ok(Value::Boolean(coerce_to_boolean(value)))
            }
            _ => Err(fail()),
        },
        TargetType::Integer => match value {
            Value::Null => Ok(Value::Integer(0)),
            Value::Integer(_) => Ok(value.clone()),
            Value::Double(n) => Ok(Value::Integer(truncate(*n))),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Integer(0)),
            Value::String(s) => parse_integer(s).map(Value::Integer).ok_or_else(fail),
            _ => Err(fail()),
        },
        TargetType::Double => match value {
            Value::Null => Ok(Value::Double(0.0)),
            Value::Integer(n) => Ok(Value::Double(*n as f64)),
            Value::Double(_) => Ok(value.clone()),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Double(0.0)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| fail()),
            _ => Err(fail()),
        },
        TargetType::Number => match value {
            Value::Null => Ok(Value::Integer(0)),
            Value::Integer(_) | Value::Double(_) => Ok(value.clone()),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Integer(0)),
            Value::String(s) => parse_number(s).ok_or_else(fail),
            _ => Err(fail()),
        },
        TargetType::Enum(ty) => match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) if s.is_empty() => Ok(Value::Null),
            Value::String(_) | Value::Enum(_) => match coerce_to_enum(value, ty) {
                Value::Null => Err(fail()),
                coerced => Ok(coerced),
            },
            _ => Err(fail()),
        },
    }
}

/// Renders a double so that it stays recognizable as floating point
/// (`3.0`, `0.5`, `1e21`).
pub fn format_double(n: f64) -> String {
    format!("{n:?}")
}

fn truncate(n: f64) -> i64 {
    // `as` saturates and maps NaN to 0
    n.trunc() as i64
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(truncate)
    })
}

fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if !s.contains('.')
        && let Ok(n) = s.parse::<i64>()
    {
        return Some(Value::Integer(n));
    }
    s.parse::<f64>().ok().map(Value::Double)
}
