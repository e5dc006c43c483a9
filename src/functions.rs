//! The `fn:` string library.
//!
//! ```
//! use elx_lang::{EvalContext, FunctionMapper, parse};
//!
//! let mut ctx = EvalContext::default().with_functions(FunctionMapper::with_standard_functions());
//! let node = parse("${fn:toUpperCase('abc')} ${fn:length('four')}").unwrap();
//! assert_eq!(node.evaluate_to_string(&mut ctx).unwrap(), "ABC 4");
//! ```

use regex::Regex;

use crate::{
    coercion::{TargetType, coerce_to_string},
    error::EvalError,
    mapper::{Function, FunctionMapper},
    value::Value,
};

/// Namespace the library registers under.
pub const NAMESPACE: &str = "fn";

/// Registers every library function in `mapper` under [`NAMESPACE`].
///
/// Fails with [`EvalError::Redeclaration`] if one of the names is taken.
pub fn register_standard(mapper: &mut FunctionMapper) -> Result<(), EvalError> {
    for (local, function) in standard() {
        mapper.register(NAMESPACE, local, function)?;
    }
    Ok(())
}

pub(crate) fn standard() -> Vec<(&'static str, Function)> {
    use TargetType::{Any, Integer, String as Str};

    vec![
        ("length", Function::new([Any], |args| length(&args[0]))),
        (
            "toUpperCase",
            Function::new([Str], |args| Ok(text(&args[0]).to_uppercase().into())),
        ),
        (
            "toLowerCase",
            Function::new([Str], |args| Ok(text(&args[0]).to_lowercase().into())),
        ),
        ("trim", Function::new([Str], |args| Ok(text(&args[0]).trim().into()))),
        (
            "contains",
            Function::new([Str, Str], |args| {
                Ok(text(&args[0]).contains(text(&args[1])).into())
            }),
        ),
        (
            "containsIgnoreCase",
            Function::new([Str, Str], |args| {
                let haystack = text(&args[0]).to_lowercase();
                Ok(haystack.contains(&text(&args[1]).to_lowercase()).into())
            }),
        ),
        (
            "startsWith",
            Function::new([Str, Str], |args| {
                Ok(text(&args[0]).starts_with(text(&args[1])).into())
            }),
        ),
        (
            "endsWith",
            Function::new([Str, Str], |args| {
                Ok(text(&args[0]).ends_with(text(&args[1])).into())
            }),
        ),
        (
            "indexOf",
            Function::new([Str, Str], |args| {
                Ok(index_of(text(&args[0]), text(&args[1])).into())
            }),
        ),
        (
            "substring",
            Function::new([Str, Integer, Integer], |args| {
                Ok(substring(text(&args[0]), integer(&args[1]), integer(&args[2])).into())
            }),
        ),
        (
            "substringBefore",
            Function::new([Str, Str], |args| {
                let (input, sub) = (text(&args[0]), text(&args[1]));
                let before = match input.find(sub) {
                    Some(at) if !sub.is_empty() => &input[..at],
                    _ => "",
                };
                Ok(before.into())
            }),
        ),
        (
            "substringAfter",
            Function::new([Str, Str], |args| {
                let (input, sub) = (text(&args[0]), text(&args[1]));
                let after = match input.find(sub) {
                    Some(at) => &input[at + sub.len()..],
                    None => "",
                };
                Ok(after.into())
            }),
        ),
        (
            "replace",
            Function::new([Str, Str, Str], |args| {
                let (input, before, after) = (text(&args[0]), text(&args[1]), text(&args[2]));
                if before.is_empty() {
                    return Ok(input.into());
                }
                Ok(input.replace(before, after).into())
            }),
        ),
        (
            "matches",
            Function::new([Str, Str], |args| {
                let pattern = Regex::new(text(&args[1])).map_err(|e| {
                    EvalError::InvalidArgument(format!("invalid pattern: {e}"))
                })?;
                Ok(pattern.is_match(text(&args[0])).into())
            }),
        ),
        ("escapeXml", Function::new([Str], |args| Ok(escape_xml(text(&args[0])).into()))),
        ("join", Function::new([Any, Str], |args| join(&args[0], text(&args[1])))),
    ]
}

/// Arguments are already coerced to their declared type.
fn text(value: &Value) -> &str {
    match value {
        Value::String(s) => s,
        _ => "",
    }
}

fn integer(value: &Value) -> i64 {
    match value {
        Value::Integer(n) => *n,
        _ => 0,
    }
}

/// Characters in a string, entries in a JSON array or object.
fn length(value: &Value) -> Result<Value, EvalError> {
    let len = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Other(_) => match value.downcast_ref::<serde_json::Value>() {
            Some(serde_json::Value::Array(items)) => items.len(),
            Some(serde_json::Value::Object(map)) => map.len(),
            Some(serde_json::Value::String(s)) => s.chars().count(),
            _ => coerce_to_string(value).chars().count(),
        },
        _ => coerce_to_string(value).chars().count(),
    };
    Ok(Value::Integer(len as i64))
}

/// Character index of the first occurrence, or -1.
fn index_of(input: &str, sub: &str) -> i64 {
    input
        .find(sub)
        .map_or(-1, |byte| input[..byte].chars().count() as i64)
}

/// Characters `begin..end`, clamped; a negative `end` means "to the end".
fn substring(input: &str, begin: i64, end: i64) -> String {
    let len = input.chars().count() as i64;
    let begin = begin.clamp(0, len);
    let end = if end < 0 || end > len { len } else { end };
    if begin >= end {
        return String::new();
    }
    input
        .chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect()
}

fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#034;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn join(items: &Value, separator: &str) -> Result<Value, EvalError> {
    let joined = match items.downcast_ref::<serde_json::Value>() {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(separator),
        Some(_) => {
            return Err(EvalError::InvalidArgument(
                "fn:join expects an array".to_string(),
            ));
        }
        None => coerce_to_string(items),
    };
    Ok(Value::String(joined))
}
