//! Operator semantics shared by generated evaluators.

use std::cmp::Ordering;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    ast::{BinOp, UnaryOp},
    value::Value,
};

/// Apply a prefix operator. `+` and `-` read an absent operand as zero.
pub fn unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Boolean(!operand.is_truthy()),
        UnaryOp::Plus => numeric(operand),
        UnaryOp::Minus => match numeric(operand) {
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .unwrap_or(Value::Float(-(n as f64))),
            other => Value::Float(-other.to_number()),
        },
    }
}

/// Apply a binary operator to evaluated operands.
pub fn binary(op: BinOp, left: Value, right: Value) -> Value {
    match op {
        BinOp::Add => add(&zero_if_absent(left), &zero_if_absent(right)),
        BinOp::Subtract => arithmetic(op, &zero_if_absent(left), &zero_if_absent(right)),
        BinOp::Multiply | BinOp::Divide | BinOp::Modulo => arithmetic(op, &left, &right),
        BinOp::Equal => Value::Boolean(loose_equals(&left, &right)),
        BinOp::NotEqual => Value::Boolean(!loose_equals(&left, &right)),
        BinOp::StrictEqual => Value::Boolean(left == right),
        BinOp::StrictNotEqual => Value::Boolean(left != right),
        BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
            Value::Boolean(relational(op, &left, &right))
        }
    }
}

/// `==`: nullish values equal only each other, booleans compare as
/// numbers, and a number compared with a string converts the string.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (l, r) if l.is_nullish() || r.is_nullish() => l.is_nullish() && r.is_nullish(),
        (Value::Boolean(_), _) => loose_equals(&Value::Float(left.to_number()), right),
        (_, Value::Boolean(_)) => loose_equals(left, &Value::Float(right.to_number())),
        (Value::String(_), r) if r.is_number() => left.to_number() == right.to_number(),
        (l, Value::String(_)) if l.is_number() => left.to_number() == right.to_number(),
        _ => left == right,
    }
}

fn relational(op: BinOp, left: &Value, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinOp::LessThan => ordering == Ordering::Less,
        BinOp::GreaterThan => ordering == Ordering::Greater,
        BinOp::LessEqual => ordering != Ordering::Greater,
        BinOp::GreaterEqual => ordering != Ordering::Less,
        _ => false,
    }
}

fn zero_if_absent(value: Value) -> Value {
    if value.is_undefined() {
        Value::Integer(0)
    } else {
        value
    }
}

fn numeric(value: &Value) -> Value {
    match value {
        Value::Undefined => Value::Integer(0),
        Value::Integer(_) | Value::Float(_) => value.clone(),
        other => Value::Float(other.to_number()),
    }
}

fn add(left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| {
        matches!(
            v,
            Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Function(_)
        )
    };
    if concatenates(left) || concatenates(right) {
        let mut text = left.to_display_string();
        text.push_str(&right.to_display_string());
        return Value::String(text);
    }
    arithmetic(BinOp::Add, left, right)
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(op, *a, *b),
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            decimal_arithmetic(op, left, right)
                .unwrap_or_else(|| float_arithmetic(op, left.to_number(), right.to_number()))
        }
        _ => float_arithmetic(op, left.to_number(), right.to_number()),
    }
}

fn integer_arithmetic(op: BinOp, a: i64, b: i64) -> Value {
    let exact = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide if a.checked_rem(b) == Some(0) => a.checked_div(b),
        BinOp::Modulo => a.checked_rem(b),
        _ => None,
    };
    exact
        .map(Value::Integer)
        .unwrap_or_else(|| float_arithmetic(op, a as f64, b as f64))
}

/// Mixed integer/float arithmetic in decimal, so `100 * 1.1` is exactly
/// `110`. Whole results collapse back to integers.
fn decimal_arithmetic(op: BinOp, left: &Value, right: &Value) -> Option<Value> {
    let a = to_decimal(left)?;
    let b = to_decimal(right)?;
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => a.checked_div(b),
        BinOp::Modulo => a.checked_rem(b),
        _ => None,
    }?;
    if result.is_integer()
        && let Some(n) = result.to_i64()
    {
        return Some(Value::Integer(n));
    }
    result.to_f64().map(Value::Float)
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Value {
    Value::Float(match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
        _ => f64::NAN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert!(matches!(
            binary(BinOp::Add, 2.into(), 3.into()),
            Value::Integer(5)
        ));
        assert!(matches!(
            binary(BinOp::Divide, 8.into(), 2.into()),
            Value::Integer(4)
        ));
        assert_eq!(binary(BinOp::Divide, 7.into(), 2.into()), Value::Float(3.5));
    }

    #[test]
    fn test_mixed_arithmetic_uses_decimal() {
        assert!(matches!(
            binary(BinOp::Multiply, 100.into(), 1.1.into()),
            Value::Integer(110)
        ));
        assert_eq!(
            binary(BinOp::Add, 1.into(), 0.25.into()),
            Value::Float(1.25)
        );
    }

    #[test]
    fn test_division_by_zero_is_not_an_error() {
        assert_eq!(
            binary(BinOp::Divide, 1.into(), 0.into()),
            Value::Float(f64::INFINITY)
        );
        let Value::Float(n) = binary(BinOp::Modulo, 1.into(), 0.into()) else {
            panic!("expected float");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        assert_eq!(
            binary(BinOp::Add, i64::MAX.into(), 1.into()),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn test_absent_operands_add_as_zero() {
        assert_eq!(
            binary(BinOp::Add, Value::Undefined, Value::Undefined),
            Value::Integer(0)
        );
        assert_eq!(
            binary(BinOp::Subtract, Value::Undefined, 3.into()),
            Value::Integer(-3)
        );
        assert_eq!(unary(UnaryOp::Minus, &Value::Undefined), Value::Integer(0));
        let Value::Float(n) = binary(BinOp::Multiply, Value::Undefined, 2.into()) else {
            panic!("expected float");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(binary(BinOp::Add, "a".into(), 1.into()), Value::from("a1"));
        assert_eq!(binary(BinOp::Add, 1.5.into(), "b".into()), Value::from("1.5b"));
    }

    #[test]
    fn test_equality() {
        assert!(loose_equals(&Value::Null, &Value::Undefined));
        assert!(!loose_equals(&Value::Null, &0.into()));
        assert!(loose_equals(&"1".into(), &1.into()));
        assert!(loose_equals(&true.into(), &1.into()));
        assert_eq!(
            binary(BinOp::StrictEqual, "1".into(), 1.into()),
            Value::Boolean(false)
        );
        assert_eq!(
            binary(BinOp::StrictNotEqual, 1.into(), 1.0.into()),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_relational() {
        assert_eq!(
            binary(BinOp::LessThan, "abc".into(), "abd".into()),
            Value::Boolean(true)
        );
        assert_eq!(
            binary(BinOp::LessThan, "10".into(), 9.into()),
            Value::Boolean(false)
        );
        assert_eq!(
            binary(BinOp::GreaterEqual, Value::Undefined, 0.into()),
            Value::Boolean(false)
        );
        assert_eq!(
            binary(BinOp::LessEqual, 2.into(), 2.0.into()),
            Value::Boolean(true)
        );
    }
}
