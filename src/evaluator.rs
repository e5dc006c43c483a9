//! Tree-walking evaluation of parsed templates.
//!
//! ```
//! use elx_lang::{EvalContext, parse};
//!
//! let node = parse("pre ${1 + 2} post").unwrap();
//! let mut ctx = EvalContext::default();
//! assert_eq!(node.evaluate_to_string(&mut ctx).unwrap(), "pre 3 post");
//! ```

use tracing::debug;

use crate::{
    ast::{BinOp, Designator, Node, UnaryOp},
    coercion::{coerce_to_boolean, coerce_to_string},
    context::EvalContext,
    error::EvalError,
    mapper::ValueExpression,
    operations::{
        add, compare, conjunction, disjunction, divide, empty, modulo, multiply, negate, not,
        subtract,
    },
    value::{Kind, Value},
};

/// Where an identifier writes to.
enum Place {
    /// A name bound in the variable mapper
    Variable,
    /// A property the resolver owns
    Property {
        target: Option<Value>,
        property: Value,
    },
    /// A call result or a step past a Null; never writable
    Computed,
}

impl Node {
    /// Evaluates this node against `ctx`.
    ///
    /// Fails fast on the first coercion, comparison or resolution error.
    pub fn value_of(&self, ctx: &mut EvalContext) -> Result<Value, EvalError> {
        match self {
            Node::Literal { value, image } => Ok(match value {
                Value::Integer(_) | Value::Double(_) | Value::Boolean(_) => value.clone(),
                Value::Null => Value::Null,
                _ => Value::String(image.clone()),
            }),

            Node::Identifier { name, designators } => eval_identifier(name, designators, ctx),

            Node::Grouping(inner) => inner.value_of(ctx),

            // Only the selected branch is evaluated
            Node::Choice {
                condition,
                then,
                otherwise,
            } => {
                if coerce_to_boolean(&condition.value_of(ctx)?) {
                    then.value_of(ctx)
                } else {
                    otherwise.value_of(ctx)
                }
            }

            Node::Relation { op, left, right } => {
                let left = left.value_of(ctx)?;
                let right = right.value_of(ctx)?;
                if left.is_null() || right.is_null() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(op.holds(compare(&left, &right)?)))
            }

            Node::Unary { op, operand } => {
                let value = operand.value_of(ctx)?;
                match op {
                    UnaryOp::Minus => negate(&value),
                    UnaryOp::Empty => Ok(empty(&value)),
                    UnaryOp::Not => Ok(not(&value)),
                }
            }

            Node::Binary { op, operands } => eval_binary(*op, operands, ctx),

            Node::Composite(parts) => {
                let mut result = String::new();
                for part in parts {
                    result.push_str(&coerce_to_string(&part.value_of(ctx)?));
                }
                Ok(Value::String(result))
            }
        }
    }

    /// Evaluates and renders the result as text.
    pub fn evaluate_to_string(&self, ctx: &mut EvalContext) -> Result<String, EvalError> {
        Ok(coerce_to_string(&self.value_of(ctx)?))
    }

    /// Type of the value this node produces, or for a resolver-owned
    /// identifier the type the resolver would accept on write.
    pub fn type_of(&self, ctx: &mut EvalContext) -> Result<Kind, EvalError> {
        match self {
            Node::Composite(_) => Ok(Kind::String),
            Node::Grouping(inner) => inner.type_of(ctx),
            Node::Identifier { name, designators } => {
                if let Place::Property { target, property } = locate(name, designators, ctx)? {
                    let resolver = ctx.resolver();
                    ctx.set_property_resolved(false);
                    let kind = resolver.get_type(ctx, target.as_ref(), &property)?;
                    if ctx.is_property_resolved()
                        && let Some(kind) = kind
                    {
                        return Ok(kind);
                    }
                }
                Ok(self.value_of(ctx)?.kind())
            }
            _ => Ok(self.value_of(ctx)?.kind()),
        }
    }

    /// Writes `value` through this node.
    ///
    /// Only identifiers (and groupings around them) are writable; everything
    /// else fails with [`EvalError::ReadOnly`].
    pub fn set_value(&self, ctx: &mut EvalContext, value: Value) -> Result<(), EvalError> {
        match self {
            Node::Grouping(inner) => inner.set_value(ctx, value),
            Node::Identifier { name, designators } => match locate(name, designators, ctx)? {
                Place::Variable => match ctx.variables().resolve(name).cloned() {
                    Some(ValueExpression::Deferred(node)) => node.set_value(ctx, value),
                    _ => ctx.variables_mut().set_variable(name.as_str(), value).map(|_| ()),
                },
                Place::Property { target, property } => {
                    let resolver = ctx.resolver();
                    ctx.set_property_resolved(false);
                    resolver.set_value(ctx, target.as_ref(), &property, value)?;
                    if ctx.is_property_resolved() {
                        Ok(())
                    } else {
                        Err(EvalError::PropertyNotFound {
                            target: describe(target.as_ref()),
                            property: coerce_to_string(&property),
                        })
                    }
                }
                Place::Computed => Err(EvalError::ReadOnly(name.clone())),
            },
            _ => Err(EvalError::ReadOnly(self.image().to_string())),
        }
    }

    pub fn is_read_only(&self, ctx: &mut EvalContext) -> Result<bool, EvalError> {
        match self {
            Node::Grouping(inner) => inner.is_read_only(ctx),
            Node::Identifier { name, designators } => match locate(name, designators, ctx)? {
                Place::Variable => match ctx.variables().resolve(name).cloned() {
                    Some(ValueExpression::Deferred(node)) => node.is_read_only(ctx),
                    _ => Ok(false),
                },
                Place::Property { target, property } => {
                    let resolver = ctx.resolver();
                    ctx.set_property_resolved(false);
                    let read_only = resolver.is_read_only(ctx, target.as_ref(), &property)?;
                    Ok(read_only && ctx.is_property_resolved())
                }
                Place::Computed => Ok(true),
            },
            _ => Ok(true),
        }
    }
}

fn eval_binary(op: BinOp, operands: &[Node], ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let Some((first, rest)) = operands.split_first() else {
        return Ok(Value::Null);
    };

    let mut acc = first.value_of(ctx)?;
    for operand in rest {
        acc = match op {
            BinOp::And => {
                if !coerce_to_boolean(&acc) {
                    return Ok(Value::Boolean(false));
                }
                conjunction(&acc, &operand.value_of(ctx)?)
            }
            BinOp::Or => {
                if coerce_to_boolean(&acc) {
                    return Ok(Value::Boolean(true));
                }
                disjunction(&acc, &operand.value_of(ctx)?)
            }
            BinOp::Add => add(&acc, &operand.value_of(ctx)?)?,
            BinOp::Subtract => subtract(&acc, &operand.value_of(ctx)?)?,
            BinOp::Multiply => multiply(&acc, &operand.value_of(ctx)?)?,
            BinOp::Divide => divide(&acc, &operand.value_of(ctx)?)?,
            BinOp::Modulo => modulo(&acc, &operand.value_of(ctx)?)?,
        };
    }
    Ok(acc)
}

fn eval_identifier(
    name: &str,
    designators: &[Designator],
    ctx: &mut EvalContext,
) -> Result<Value, EvalError> {
    let (base, steps) = match designators.split_first() {
        Some((Designator::Call(args), rest)) => (call_function(name, args, ctx)?, rest),
        _ => (eval_name(name, ctx)?, designators),
    };
    apply_steps(base, steps, ctx)
}

/// Applies designators left to right, each step targeting the previous result.
fn apply_steps(
    mut current: Value,
    steps: &[Designator],
    ctx: &mut EvalContext,
) -> Result<Value, EvalError> {
    let mut steps = steps.iter();
    while let Some(step) = steps.next() {
        if current.is_null() {
            return Ok(Value::Null);
        }
        current = match step {
            Designator::Member(member) => {
                match steps
                    .as_slice()
                    .first()
                    .filter(|next| matches!(next, Designator::Call(_)))
                {
                    Some(Designator::Call(args)) => {
                        steps.next();
                        let params = eval_args(args, ctx)?;
                        invoke_method(&current, member, &params, ctx)?
                    }
                    _ => get_property(&current, Value::String(member.clone()), ctx)?,
                }
            }
            Designator::Index(index) => {
                let key = index.value_of(ctx)?;
                get_property(&current, key, ctx)?
            }
            Designator::Call(_) => {
                return Err(EvalError::UnsupportedOperation(format!(
                    "{} value is not callable",
                    current.kind()
                )));
            }
        };
    }
    Ok(current)
}

/// Top-level name: variables first, then the resolver, then auto-binding.
fn eval_name(name: &str, ctx: &mut EvalContext) -> Result<Value, EvalError> {
    if let Some(bound) = ctx.variables().resolve(name).cloned() {
        return read_binding(bound, ctx);
    }

    let resolver = ctx.resolver();
    ctx.set_property_resolved(false);
    let value = resolver.get_value(ctx, None, &Value::String(name.to_string()))?;
    if ctx.is_property_resolved() {
        return Ok(value);
    }

    if !ctx.auto_bind_unknown() {
        return Ok(Value::Null);
    }
    debug!(name, "binding unknown identifier to an empty variable");
    let bound = ctx
        .variables_mut()
        .resolve_or_bind(name, Value::String(String::new()))
        .clone();
    read_binding(bound, ctx)
}

fn read_binding(bound: ValueExpression, ctx: &mut EvalContext) -> Result<Value, EvalError> {
    match bound {
        ValueExpression::Variable(value) => Ok(value),
        ValueExpression::Deferred(node) => node.value_of(ctx),
    }
}

fn eval_args(args: &[Node], ctx: &mut EvalContext) -> Result<Vec<Value>, EvalError> {
    args.iter().map(|arg| arg.value_of(ctx)).collect()
}

fn call_function(name: &str, args: &[Node], ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let functions = ctx.functions();
    let function = functions
        .resolve_qualified(name)
        .ok_or_else(|| EvalError::FunctionNotFound(name.to_string()))?;
    let params = eval_args(args, ctx)?;
    function.invoke(name, &params)
}

fn get_property(target: &Value, key: Value, ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let resolver = ctx.resolver();
    ctx.set_property_resolved(false);
    let value = resolver.get_value(ctx, Some(target), &key)?;
    if !ctx.is_property_resolved() {
        return Err(EvalError::PropertyNotFound {
            target: describe(Some(target)),
            property: coerce_to_string(&key),
        });
    }
    Ok(value)
}

fn invoke_method(
    target: &Value,
    method: &str,
    params: &[Value],
    ctx: &mut EvalContext,
) -> Result<Value, EvalError> {
    let resolver = ctx.resolver();
    ctx.set_property_resolved(false);
    let not_found = || EvalError::MethodNotFound {
        target: describe(Some(target)),
        method: method.to_string(),
    };
    match resolver.invoke(ctx, target, method, params) {
        Ok(value) if ctx.is_property_resolved() => Ok(value),
        Err(EvalError::UnsupportedOperation(_)) | Ok(_) if !ctx.is_property_resolved() => {
            Err(not_found())
        }
        result => result,
    }
}

/// Finds what an identifier addresses, evaluating every step but the last.
fn locate(
    name: &str,
    designators: &[Designator],
    ctx: &mut EvalContext,
) -> Result<Place, EvalError> {
    let Some((last, prefix)) = designators.split_last() else {
        if ctx.variables().contains(name) {
            return Ok(Place::Variable);
        }
        return Ok(Place::Property {
            target: None,
            property: Value::String(name.to_string()),
        });
    };

    if matches!(last, Designator::Call(_)) {
        return Ok(Place::Computed);
    }

    let target = eval_identifier(name, prefix, ctx)?;
    if target.is_null() {
        return Ok(Place::Computed);
    }
    let property = match last {
        Designator::Member(member) => Value::String(member.clone()),
        Designator::Index(index) => index.value_of(ctx)?,
        Designator::Call(_) => return Ok(Place::Computed),
    };
    Ok(Place::Property {
        target: Some(target),
        property,
    })
}

fn describe(target: Option<&Value>) -> String {
    match target {
        None => "the context".to_string(),
        Some(value) => format!("{} value", value.kind()),
    }
}
