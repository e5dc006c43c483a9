// tests/resolver_tests.rs
//
// Host resolvers plugged into evaluation.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use elx_lang::coercion::coerce_to_string;
use elx_lang::{
    CompositeResolver, EmptyResolver, EvalContext, EvalError, Kind, Node, Resolver, Value, parse,
};
use pretty_assertions::assert_eq;

/// Top-level names backed by a shared map. Resolves names it holds and
/// accepts writes to any name.
#[derive(Clone, Default)]
struct MapResolver {
    values: Rc<RefCell<HashMap<String, Value>>>,
}

impl MapResolver {
    fn with(entries: &[(&str, Value)]) -> Self {
        let resolver = MapResolver::default();
        for (name, value) in entries {
            resolver
                .values
                .borrow_mut()
                .insert(name.to_string(), value.clone());
        }
        resolver
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }
}

impl Resolver for MapResolver {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError> {
        if target.is_some() {
            return Ok(Value::Null);
        }
        match self.get(&coerce_to_string(property)) {
            Some(value) => {
                ctx.set_property_resolved(true);
                Ok(value)
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
        Ok(Some(value.kind()))
    }

    fn set_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
        value: Value,
    ) -> Result<(), EvalError> {
        if target.is_none() {
            ctx.set_property_resolved(true);
            self.values
                .borrow_mut()
                .insert(coerce_to_string(property), value);
        }
        Ok(())
    }

    fn is_read_only(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        _property: &Value,
    ) -> Result<bool, EvalError> {
        if target.is_none() {
            ctx.set_property_resolved(true);
        }
        Ok(false)
    }

    fn get_common_property_type(
        &self,
        _ctx: &mut EvalContext,
        target: Option<&Value>,
    ) -> Option<Kind> {
        target.is_none().then_some(Kind::String)
    }
}

/// Owns a fixed set of constants that cannot be written.
struct ConstantResolver(HashMap<&'static str, Value>);

impl Resolver for ConstantResolver {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError> {
        let found = target
            .is_none()
            .then(|| self.0.get(coerce_to_string(property).as_str()).cloned())
            .flatten();
        if found.is_some() {
            ctx.set_property_resolved(true);
        }
        Ok(found.unwrap_or(Value::Null))
    }

    fn set_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
        _value: Value,
    ) -> Result<(), EvalError> {
        let name = coerce_to_string(property);
        if target.is_none() && self.0.contains_key(name.as_str()) {
            ctx.set_property_resolved(true);
            return Err(EvalError::ReadOnly(name));
        }
        Err(EvalError::UnsupportedOperation(format!("cannot set '{name}'")))
    }

    fn is_read_only(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<bool, EvalError> {
        if target.is_none() && self.0.contains_key(coerce_to_string(property).as_str()) {
            ctx.set_property_resolved(true);
        }
        Ok(true)
    }
}

fn constants() -> ConstantResolver {
    ConstantResolver(HashMap::from([
        ("ratio", Value::Double(1.5)),
        ("answer", Value::Integer(42)),
    ]))
}

/// Adds `.length` and `.greet(salutation)` to every string.
struct StringMethods;

impl Resolver for StringMethods {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError> {
        match (target, coerce_to_string(property).as_str()) {
            (Some(Value::String(s)), "length") => {
                ctx.set_property_resolved(true);
                Ok(Value::Integer(s.chars().count() as i64))
            }
            _ => Ok(Value::Null),
        }
    }

    fn invoke(
        &self,
        ctx: &mut EvalContext,
        target: &Value,
        method: &str,
        params: &[Value],
    ) -> Result<Value, EvalError> {
        match (target, method, params) {
            (Value::String(name), "greet", [salutation]) => {
                ctx.set_property_resolved(true);
                Ok(Value::String(format!(
                    "{}, {name}",
                    coerce_to_string(salutation)
                )))
            }
            _ => Err(EvalError::UnsupportedOperation(format!(
                "cannot invoke '{method}'"
            ))),
        }
    }
}

fn inner(template: &str) -> Node {
    match parse(template) {
        Ok(Node::Composite(mut parts)) if parts.len() == 1 => parts.remove(0),
        other => panic!("expected one expression in {template:?}, got {other:?}"),
    }
}

fn render(template: &str, ctx: &mut EvalContext) -> Result<String, EvalError> {
    parse(template).unwrap().evaluate_to_string(ctx)
}

// ============================================================================
// Single Resolvers
// ============================================================================

#[test]
fn test_custom_resolver_supplies_identifiers() {
    let map = MapResolver::with(&[("name", Value::from("Ada")), ("age", Value::from(36))]);
    let mut ctx = EvalContext::new(map);
    assert_eq!(
        render("${name} is ${age + 1} next year", &mut ctx).unwrap(),
        "Ada is 37 next year"
    );
    // Resolved names are not bound as variables
    assert!(ctx.variables().is_empty());
}

#[test]
fn test_empty_resolver_resolves_nothing() {
    let mut ctx = EvalContext::new(EmptyResolver);
    assert_eq!(render("[${anything}]", &mut ctx).unwrap(), "[]");
    assert!(ctx.variables().contains("anything"));
}

#[test]
fn test_resolved_null_is_not_auto_bound() {
    let map = MapResolver::with(&[("nothing", Value::Null)]);
    let mut ctx = EvalContext::new(map);
    assert_eq!(inner("${nothing}").value_of(&mut ctx).unwrap(), Value::Null);
    assert_eq!(render("${empty nothing}", &mut ctx).unwrap(), "true");
    assert!(!ctx.variables().contains("nothing"));
}

#[test]
fn test_writes_go_to_the_owning_resolver() {
    let map = MapResolver::default();
    let mut ctx = EvalContext::new(map.clone());

    inner("${total}").set_value(&mut ctx, Value::from(10)).unwrap();
    assert_eq!(map.get("total"), Some(Value::Integer(10)));
    assert_eq!(render("${total * 2}", &mut ctx).unwrap(), "20");
    assert!(!inner("${total}").is_read_only(&mut ctx).unwrap());
    assert_eq!(inner("${total}").type_of(&mut ctx).unwrap(), Kind::Integer);
}

#[test]
fn test_unresolved_property_step_fails() {
    let map = MapResolver::with(&[("user", Value::from("Ada"))]);
    let mut ctx = EvalContext::new(map);
    assert_eq!(
        render("${user.name}", &mut ctx),
        Err(EvalError::PropertyNotFound {
            target: "string value".to_string(),
            property: "name".to_string(),
        })
    );
}

#[test]
fn test_methods_need_a_resolver() {
    let mut ctx = EvalContext::default();
    ctx.variables_mut().set_variable("s", Value::from("x")).unwrap();
    assert!(matches!(
        render("${s.trim()}", &mut ctx),
        Err(EvalError::MethodNotFound { method, .. }) if method == "trim"
    ));
}

// ============================================================================
// Composite Resolvers
// ============================================================================

#[test]
fn test_first_resolver_wins() {
    let resolver = CompositeResolver::new()
        .with(MapResolver::with(&[("x", Value::from("first"))]))
        .with(MapResolver::with(&[("x", Value::from("second")), ("y", Value::from("only"))]));
    assert_eq!(resolver.len(), 2);

    let mut ctx = EvalContext::new(resolver);
    assert_eq!(render("${x} ${y}", &mut ctx).unwrap(), "first only");
}

#[test]
fn test_composite_falls_through_to_auto_binding() {
    let resolver = CompositeResolver::new()
        .with(constants())
        .with(MapResolver::default());
    let mut ctx = EvalContext::new(resolver);
    assert_eq!(render("[${unknown}]", &mut ctx).unwrap(), "[]");
    assert!(ctx.variables().contains("unknown"));
}

#[test]
fn test_composite_write_skips_resolvers_that_cannot_store() {
    let map = MapResolver::default();
    let resolver = CompositeResolver::new()
        .with(EmptyResolver)
        .with(constants())
        .with(map.clone());
    let mut ctx = EvalContext::new(resolver);

    inner("${fresh}").set_value(&mut ctx, Value::from("v")).unwrap();
    assert_eq!(map.get("fresh"), Some(Value::from("v")));

    // The constant's owner answers, even though a later resolver could store it
    assert_eq!(
        inner("${answer}").set_value(&mut ctx, Value::from(0)),
        Err(EvalError::ReadOnly("answer".to_string()))
    );
    assert_eq!(map.get("answer"), None);
    assert_eq!(render("${answer}", &mut ctx).unwrap(), "42");
}

#[test]
fn test_composite_read_only_asks_the_owner() {
    let resolver = CompositeResolver::new()
        .with(constants())
        .with(MapResolver::default());
    let mut ctx = EvalContext::new(resolver);

    assert!(inner("${ratio}").is_read_only(&mut ctx).unwrap());
    assert!(!inner("${other}").is_read_only(&mut ctx).unwrap());
}

#[test]
fn test_composite_common_property_type() {
    let resolver = CompositeResolver::new()
        .with(EmptyResolver)
        .with(MapResolver::default());
    let mut ctx = EvalContext::default();
    assert_eq!(resolver.get_common_property_type(&mut ctx, None), Some(Kind::String));
    assert_eq!(
        resolver.get_common_property_type(&mut ctx, Some(&Value::Null)),
        None
    );
}

#[test]
fn test_composite_invoke_and_properties() {
    let resolver = CompositeResolver::new()
        .with(constants())
        .with(StringMethods);
    let mut ctx = EvalContext::new(resolver);
    ctx.variables_mut().set_variable("who", Value::from("Bob")).unwrap();

    assert_eq!(render("${who.greet('Hi')}", &mut ctx).unwrap(), "Hi, Bob");
    assert_eq!(render("${who.length * 2}", &mut ctx).unwrap(), "6");
    assert!(matches!(
        render("${who.shout()}", &mut ctx),
        Err(EvalError::MethodNotFound { .. })
    ));
    assert!(CompositeResolver::new().is_empty());
}

// ============================================================================
// Context Objects
// ============================================================================

struct Prefix(String);

/// Resolves `greeting` using a `Prefix` registered on the context.
struct GreetingResolver;

impl Resolver for GreetingResolver {
    fn get_value(
        &self,
        ctx: &mut EvalContext,
        target: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvalError> {
        if target.is_some() || coerce_to_string(property) != "greeting" {
            return Ok(Value::Null);
        }
        let prefix = ctx.get_context::<Prefix>()?;
        ctx.set_property_resolved(true);
        Ok(Value::String(format!("{} there", prefix.0)))
    }
}

#[test]
fn test_resolver_reads_context_objects() {
    let mut ctx = EvalContext::new(GreetingResolver);
    assert!(matches!(
        render("${greeting}", &mut ctx),
        Err(EvalError::UnresolvedContext(_))
    ));

    ctx.put_context(Prefix("Hello".to_string()));
    assert_eq!(render("${greeting}!", &mut ctx).unwrap(), "Hello there!");
}
