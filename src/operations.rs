//! Operators over [`Value`]: equality, ordering, arithmetic and logic.
//!
//! Mixed operands are promoted by one precedence chain shared by equality and
//! ordering: Boolean beats everything, then enum-like, then Double, then
//! Integer, then String. Both operands are coerced to the winning type before
//! they are compared.
//!
//! Arithmetic reads both operands with [`coerce_to_number`] and works in
//! floating point when either side is a Double, in wrapping 64-bit integer
//! arithmetic otherwise.

use std::{cmp::Ordering, rc::Rc};

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    coercion::{
        TargetType, coerce_to_boolean, coerce_to_double, coerce_to_integer, coerce_to_number,
        coerce_to_string, coerce_to_type,
    },
    error::EvalError,
    value::{EnumType, Value},
};

/// Representation both operands are brought to before comparing.
enum Promotion {
    Boolean,
    Enum(Rc<EnumType>),
    Double,
    Integer,
    String,
    Unordered,
}

fn promote(a: &Value, b: &Value) -> Promotion {
    match (a, b) {
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => Promotion::Boolean,
        (Value::Enum(e), _) | (_, Value::Enum(e)) => Promotion::Enum(Rc::clone(e.enum_type())),
        (Value::Double(_), _) | (_, Value::Double(_)) => Promotion::Double,
        (Value::Integer(_), _) | (_, Value::Integer(_)) => Promotion::Integer,
        (Value::String(_), _) | (_, Value::String(_)) => Promotion::String,
        _ => Promotion::Unordered,
    }
}

/// Language equality.
///
/// Identical values are equal; otherwise a Null on either side makes the
/// result false.
pub fn equals(a: &Value, b: &Value) -> bool {
    if a.is_identical(b) {
        return true;
    }
    if a.is_null() || b.is_null() {
        return false;
    }

    match promote(a, b) {
        Promotion::Boolean => coerce_to_boolean(a) == coerce_to_boolean(b),
        Promotion::Enum(ty) => {
            let target = TargetType::Enum(ty);
            match (coerce_to_type(a, &target), coerce_to_type(b, &target)) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            }
        }
        Promotion::Double => coerce_to_double(a) == coerce_to_double(b),
        Promotion::Integer => coerce_to_integer(a) == coerce_to_integer(b),
        Promotion::String => coerce_to_string(a) == coerce_to_string(b),
        Promotion::Unordered => a == b,
    }
}

/// Language ordering.
///
/// Equal values compare as [`Ordering::Equal`]. Fails when neither operand is
/// boolean, enum-like, numeric or a string.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    if equals(a, b) {
        return Ok(Ordering::Equal);
    }

    let ordering = match promote(a, b) {
        Promotion::Boolean => coerce_to_boolean(a).cmp(&coerce_to_boolean(b)),
        Promotion::Enum(ty) => {
            let target = TargetType::Enum(ty);
            let ordinal = |v: &Value| match coerce_to_type(v, &target) {
                Ok(Value::Enum(e)) => Ok(e.ordinal()),
                _ => Err(EvalError::Comparison {
                    left: a.kind(),
                    right: b.kind(),
                }),
            };
            ordinal(a)?.cmp(&ordinal(b)?)
        }
        Promotion::Double => coerce_to_double(a).total_cmp(&coerce_to_double(b)),
        Promotion::Integer => coerce_to_integer(a).cmp(&coerce_to_integer(b)),
        Promotion::String => coerce_to_string(a).cmp(&coerce_to_string(b)),
        Promotion::Unordered => {
            return Err(EvalError::Comparison {
                left: a.kind(),
                right: b.kind(),
            });
        }
    };
    Ok(ordering)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

pub fn add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(Arith::Add, a, b)
}

pub fn subtract(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(Arith::Subtract, a, b)
}

pub fn multiply(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(Arith::Multiply, a, b)
}

/// Integer operands divide with truncation; a zero integer divisor fails.
pub fn divide(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(Arith::Divide, a, b)
}

/// Truncated remainder: `n - d * trunc(n / d)`.
pub fn modulo(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(Arith::Modulo, a, b)
}

fn arithmetic(op: Arith, a: &Value, b: &Value) -> Result<Value, EvalError> {
    if a.is_null() && b.is_null() {
        return Ok(Value::Integer(0));
    }

    match (coerce_to_number(a)?, coerce_to_number(b)?) {
        (Value::Integer(x), Value::Integer(y)) => integer_arithmetic(op, x, y).map(Value::Integer),
        (x, y) => Ok(Value::Double(float_arithmetic(
            op,
            coerce_to_double(&x),
            coerce_to_double(&y),
        ))),
    }
}

fn integer_arithmetic(op: Arith, x: i64, y: i64) -> Result<i64, EvalError> {
    match op {
        Arith::Add => Ok(x.wrapping_add(y)),
        Arith::Subtract => Ok(x.wrapping_sub(y)),
        Arith::Multiply => Ok(x.wrapping_mul(y)),
        Arith::Divide if y == 0 => Err(EvalError::DivisionByZero),
        Arith::Divide => Ok(x.wrapping_div(y)),
        Arith::Modulo if y == 0 => Err(EvalError::DivisionByZero),
        Arith::Modulo => Ok(x.wrapping_rem(y)),
    }
}

fn float_arithmetic(op: Arith, x: f64, y: f64) -> f64 {
    decimal_arithmetic(op, x, y).unwrap_or_else(|| match op {
        Arith::Add => x + y,
        Arith::Subtract => x - y,
        Arith::Multiply => x * y,
        Arith::Divide => x / y,
        Arith::Modulo => x - y * (x / y).trunc(),
    })
}

/// Decimal evaluation, so that `0.1 + 0.2` yields `0.3`. Only taken when both
/// operands survive the trip through `Decimal` unchanged; `None` otherwise, or
/// when the operation overflows or divides by zero.
fn decimal_arithmetic(op: Arith, x: f64, y: f64) -> Option<f64> {
    let dx = exact_decimal(x)?;
    let dy = exact_decimal(y)?;

    let result = match op {
        Arith::Add => dx.checked_add(dy),
        Arith::Subtract => dx.checked_sub(dy),
        Arith::Multiply => dx.checked_mul(dy),
        Arith::Divide => dx.checked_div(dy),
        Arith::Modulo => dx.checked_rem(dy),
    }?;
    result.to_f64()
}

fn exact_decimal(n: f64) -> Option<Decimal> {
    if !(n == 0.0 || (1e-9..1e15).contains(&n.abs())) {
        return None;
    }
    let decimal = Decimal::from_f64(n)?;
    (decimal.to_f64() == Some(n)).then_some(decimal)
}

/// `and`: true when both operands read as true.
pub fn conjunction(a: &Value, b: &Value) -> Value {
    Value::Boolean(coerce_to_boolean(a) && coerce_to_boolean(b))
}

/// `or`: true when either operand reads as true.
pub fn disjunction(a: &Value, b: &Value) -> Value {
    Value::Boolean(coerce_to_boolean(a) || coerce_to_boolean(b))
}

/// `not`
pub fn not(value: &Value) -> Value {
    Value::Boolean(!coerce_to_boolean(value))
}

/// `empty`: Null and the empty string are empty; everything else is not.
pub fn empty(value: &Value) -> Value {
    Value::Boolean(match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    })
}

/// Unary minus.
pub fn negate(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Null => Ok(Value::Integer(0)),
        Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
        Value::Double(n) => Ok(Value::Double(-n)),
        Value::String(_) => negate(&coerce_to_number(value)?),
        _ => Err(EvalError::UnsupportedOperation(format!(
            "cannot negate {} value",
            value.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_path_hides_binary_rounding() {
        assert_eq!(float_arithmetic(Arith::Add, 0.1, 0.2), 0.3);
        assert_eq!(float_arithmetic(Arith::Multiply, 1.1, 3.0), 3.3);
    }

    #[test]
    fn test_float_fallback_out_of_range() {
        assert_eq!(float_arithmetic(Arith::Multiply, 1e20, 2.0), 2e20);
        assert!(float_arithmetic(Arith::Multiply, 1e200, 1e200).is_infinite());
        assert!(float_arithmetic(Arith::Divide, 1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_float_modulo_truncates() {
        assert_eq!(float_arithmetic(Arith::Modulo, 7.5, 2.0), 1.5);
        assert_eq!(float_arithmetic(Arith::Modulo, -7.5, 2.0), -1.5);
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(
            integer_arithmetic(Arith::Divide, 1, 0),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(integer_arithmetic(Arith::Divide, i64::MIN, -1), Ok(i64::MIN));
    }
}
