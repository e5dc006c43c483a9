//! JSON documents as a data model.
//!
//! Scalars convert to the matching [`Value`] variant; arrays and objects stay
//! JSON and travel as [`Value::Other`], indexable through [`JsonResolver`].
//!
//! ```
//! use elx_lang::{EvalContext, json::JsonResolver, parse};
//! use serde_json::json;
//!
//! let resolver = JsonResolver::new(json!({"user": {"name": "Ada", "langs": ["en", "fr"]}}));
//! let mut ctx = EvalContext::new(resolver);
//! let node = parse("${user.name} speaks ${user.langs.size()} languages, first ${user.langs[0]}")
//!     .unwrap();
//! assert_eq!(node.evaluate_to_string(&mut ctx).unwrap(), "Ada speaks 2 languages, first en");
//! ```

use std::cell::RefCell;

use serde_json::Map;

use crate::{
    coercion::coerce_to_string,
    context::EvalContext,
    error::EvalError,
    resolver::Resolver,
    value::{Kind, Value},
};

/// Convert serde_json::Value to an expression value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                n.as_f64().map_or(Value::Null, Value::Double)
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        composite @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Value::other(composite)
        }
    }
}

/// Convert an expression value to serde_json::Value
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Enum(e) => serde_json::Value::String(e.name().to_string()),
        Value::Other(_) => match v.downcast_ref::<serde_json::Value>() {
            Some(json) => json.clone(),
            None => serde_json::Value::String(coerce_to_string(v)),
        },
    }
}

/// Resolves top-level identifiers against the keys of a root JSON object.
///
/// Top-level keys can be written (and created); nested JSON is read-only.
#[derive(Debug, Default)]
pub struct JsonResolver {
    root: RefCell<Map<String, serde_json::Value>>,
}

impl JsonResolver {
    /// A non-object document yields an empty root.
    pub fn new(document: serde_json::Value) -> Self {
        let root = match document {
            serde_json::Value::Object(map) => map,
            _ => Map::new(),
        };
        JsonResolver {
            root: RefCell::new(root),
        }
    }

    /// Snapshot of the root object, including writes made by templates.
    pub fn document(&self) -> serde_json::Value {
        serde_json::Value::Object(self.root.borrow().clone())
    }

    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.root.borrow_mut().insert(key.into(), value);
    }
}

/// `None` when `target` cannot be indexed by `property` at all,
/// `Some(None)` when it can but holds nothing there.
fn lookup<'j>(
    target: &'j serde_json::Value,
    property: &Value,
) -> Option<Option<&'j serde_json::Value>> {
    match target {
        serde_json::Value::Object(map) => Some(map.get(&coerce_to_string(property))),
        serde_json::Value::Array(items) => {
            let index = match property {
                Value::Integer(n) => *n,
                Value::String(s) => s.trim().parse::<i64>().ok()?,
                _ => return None,
            };
            Some(usize::try_from(index).ok().and_then(|i| items.get(i)))
        }
        _ => None,
    }
}

impl Resolver for JsonResolver {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError> {
        let found = match target {
            None => self
                .root
                .borrow()
                .get(&coerce_to_string(property))
                .cloned()
                .map(Some),
            Some(target) => target
                .downcast_ref::<serde_json::Value>()
                .and_then(|json| lookup(json, property))
                .map(|found| found.cloned()),
        };

        match found {
            Some(value) => {
                ctx.set_property_resolved(true);
                Ok(value.map_or(Value::Null, json_to_value))
            }
            None => Ok(Value::Null),
        }
    }

    fn get_type(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Kind>, EvalError> {
        let value = self.get_value(ctx, target, property)?;
        Ok(ctx.is_property_resolved().then(|| value.kind()))
    }

    fn set_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
        value: Value,
    ) -> Result<(), EvalError> {
        match target {
            None => {
                ctx.set_property_resolved(true);
                self.set(coerce_to_string(property), value_to_json(&value));
                Ok(())
            }
            Some(target) if target.downcast_ref::<serde_json::Value>().is_some() => {
                ctx.set_property_resolved(true);
                Err(EvalError::ReadOnly(coerce_to_string(property)))
            }
            Some(_) => Err(EvalError::UnsupportedOperation(format!(
                "cannot set '{}'",
                coerce_to_string(property)
            ))),
        }
    }

    fn is_read_only(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        _property: &Value,
    ) -> Result<bool, EvalError> {
        match target {
            None => {
                ctx.set_property_resolved(true);
                Ok(false)
            }
            Some(target) if target.downcast_ref::<serde_json::Value>().is_some() => {
                ctx.set_property_resolved(true);
                Ok(true)
            }
            Some(_) => Ok(true),
        }
    }

    fn invoke(
        &self,
        ctx: &mut EvalContext,
        target: &Value,
        method: &str,
        _params: &[Value],
    ) -> Result<Value, EvalError> {
        let unsupported =
            || EvalError::UnsupportedOperation(format!("cannot invoke '{method}'"));
        let Some(json) = target.downcast_ref::<serde_json::Value>() else {
            return Err(unsupported());
        };

        let len = match json {
            serde_json::Value::Array(items) => items.len(),
            serde_json::Value::Object(map) => map.len(),
            _ => return Err(unsupported()),
        };

        let result = match (method, json) {
            ("size", _) => Value::Integer(len as i64),
            ("isEmpty", _) => Value::Boolean(len == 0),
            ("keys", serde_json::Value::Object(map)) => Value::other(serde_json::Value::Array(
                map.keys().cloned().map(serde_json::Value::String).collect(),
            )),
            _ => return Err(unsupported()),
        };
        ctx.set_property_resolved(true);
        Ok(result)
    }

    fn get_common_property_type(
        &self,
        _ctx: &mut EvalContext,
        target: Option<&Value>,
    ) -> Option<Kind> {
        match target {
            None => Some(Kind::String),
            Some(target) => match target.downcast_ref::<serde_json::Value>()? {
                serde_json::Value::Array(_) => Some(Kind::Integer),
                serde_json::Value::Object(_) => Some(Kind::String),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_convert_and_composites_stay_json() {
        assert_eq!(json_to_value(json!(3)), Value::Integer(3));
        assert_eq!(json_to_value(json!(2.5)), Value::Double(2.5));
        assert_eq!(json_to_value(json!("x")), Value::from("x"));
        let array = json_to_value(json!([1, 2]));
        assert_eq!(array.kind(), Kind::Other);
        assert_eq!(value_to_json(&array), json!([1, 2]));
    }

    #[test]
    fn test_array_lookup_out_of_range_is_resolved_null() {
        let items = json!(["a"]);
        assert_eq!(lookup(&items, &Value::Integer(0)), Some(Some(&json!("a"))));
        assert_eq!(lookup(&items, &Value::Integer(5)), Some(None));
        assert_eq!(lookup(&items, &Value::Integer(-1)), Some(None));
        assert_eq!(lookup(&items, &Value::Boolean(true)), None);
    }
}
