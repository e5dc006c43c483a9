//! The extension point through which hosts expose their data model.
//!
//! Every call must set [`EvalContext::set_property_resolved`] to `true` when
//! (and only when) it handled the request. Callers rely on that flag, not on
//! errors, to tell an unknown name from a known one.

use std::{fmt, rc::Rc};

use crate::{
    coercion::coerce_to_string,
    context::EvalContext,
    error::EvalError,
    value::{Kind, Value},
};

/// Host data-model binding.
///
/// `target` is `None` for top-level identifiers and the value produced by the
/// previous step for designators (`a.b`, `a[k]`).
pub trait Resolver {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError>;

    /// Type that [`Resolver::set_value`] would accept for `property`.
    fn get_type(
        &self,
        _ctx: &mut EvalContext,
        _target: Option<&Value>,
        _property: &Value,
    ) -> Result<Option<Kind>, EvalError> {
        Ok(None)
    }

    fn set_value(
        &self,
        _ctx: &mut EvalContext,
        _target: Option<&Value>,
        property: &Value,
        _value: Value,
    ) -> Result<(), EvalError> {
        Err(EvalError::UnsupportedOperation(format!(
            "cannot set '{}'",
            coerce_to_string(property)
        )))
    }

    fn is_read_only(
        &self,
        _ctx: &mut EvalContext,
        _target: Option<&Value>,
        _property: &Value,
    ) -> Result<bool, EvalError> {
        Ok(true)
    }

    /// Calls `method` on `target` (`a.b(args)`).
    fn invoke(
        &self,
        _ctx: &mut EvalContext,
        _target: &Value,
        method: &str,
        _params: &[Value],
    ) -> Result<Value, EvalError> {
        Err(EvalError::UnsupportedOperation(format!(
            "cannot invoke '{method}'"
        )))
    }

    /// Most general type accepted as a property key of `target`.
    fn get_common_property_type(
        &self,
        _ctx: &mut EvalContext,
        _target: Option<&Value>,
    ) -> Option<Kind> {
        None
    }
}

/// Resolves nothing. Every identifier is unknown to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyResolver;

impl Resolver for EmptyResolver {
    fn get_value(
        &self,
        _ctx: &mut EvalContext,
        _target: Option<&Value>,
        _property: &Value,
    ) -> Result<Value, EvalError> {
        Ok(Value::Null)
    }
}

/// Ordered chain of resolvers. The first one that resolves wins.
///
/// A resolver answering `UnsupportedOperation` without resolving is skipped
/// for writes and invocations.
#[derive(Default, Clone)]
pub struct CompositeResolver {
    resolvers: Vec<Rc<dyn Resolver>>,
}

impl CompositeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resolver: impl Resolver + 'static) {
        self.resolvers.push(Rc::new(resolver));
    }

    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.add(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for CompositeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeResolver")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

fn skippable(result: &Result<(), EvalError>, resolved: bool) -> bool {
    !resolved && matches!(result, Ok(()) | Err(EvalError::UnsupportedOperation(_)))
}

impl Resolver for CompositeResolver {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError> {
        for resolver in &self.resolvers {
            ctx.set_property_resolved(false);
            let value = resolver.get_value(ctx, target, property)?;
            if ctx.is_property_resolved() {
                return Ok(value);
            }
        }
        Ok(Value::Null)
    }

    fn get_type(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Kind>, EvalError> {
        for resolver in &self.resolvers {
            ctx.set_property_resolved(false);
            let kind = resolver.get_type(ctx, target, property)?;
            if ctx.is_property_resolved() {
                return Ok(kind);
            }
        }
        Ok(None)
    }

    fn set_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
        value: Value,
    ) -> Result<(), EvalError> {
        for resolver in &self.resolvers {
            ctx.set_property_resolved(false);
            let result = resolver.set_value(ctx, target, property, value.clone());
            if !skippable(&result, ctx.is_property_resolved()) {
                return result;
            }
        }
        ctx.set_property_resolved(false);
        Ok(())
    }

    fn is_read_only(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<bool, EvalError> {
        for resolver in &self.resolvers {
            ctx.set_property_resolved(false);
            let read_only = resolver.is_read_only(ctx, target, property)?;
            if ctx.is_property_resolved() {
                return Ok(read_only);
            }
        }
        Ok(false)
    }

    fn invoke(
        &self,
        ctx: &mut EvalContext,
        target: &Value,
        method: &str,
        params: &[Value],
    ) -> Result<Value, EvalError> {
        for resolver in &self.resolvers {
            ctx.set_property_resolved(false);
            match resolver.invoke(ctx, target, method, params) {
                Err(EvalError::UnsupportedOperation(_)) if !ctx.is_property_resolved() => continue,
                Ok(_) if !ctx.is_property_resolved() => continue,
                result => return result,
            }
        }
        ctx.set_property_resolved(false);
        Ok(Value::Null)
    }

    fn get_common_property_type(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
    ) -> Option<Kind> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.get_common_property_type(ctx, target))
    }
}
