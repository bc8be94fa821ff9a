//! `limitTo:limit[:begin]` for arrays and strings.
//!
//! A positive limit takes items from `begin` onwards, a negative one takes
//! the last `|limit|` items before `begin` (or before the end when `begin`
//! is zero). Numbers are limited as their string form. Anything else, or a
//! limit that is not a number, returns the input unchanged.

use crate::{error::EvalError, value::Value};

use super::arg;

pub(super) fn limit_to(args: &[Value]) -> Result<Value, EvalError> {
    let input = arg(args, 0);
    let limit = arg(args, 1).to_number();
    if limit.is_nan() {
        return Ok(input.clone());
    }

    let limited = match input {
        Value::Array(items) => Value::Array(slice(items, limit, arg(args, 2)).to_vec()),
        Value::String(_) | Value::Integer(_) | Value::Float(_) => {
            let chars: Vec<char> = input.to_display_string().chars().collect();
            Value::String(slice(&chars, limit, arg(args, 2)).iter().collect())
        }
        _ => input.clone(),
    };
    Ok(limited)
}

fn slice<'a, T>(items: &'a [T], limit: f64, begin: &Value) -> &'a [T] {
    let len = items.len() as i64;
    let limit = clamp_to_i64(limit);
    let begin = begin.to_number();
    let begin = if begin.is_nan() { 0 } else { clamp_to_i64(begin) };
    let begin = if begin < 0 { (len + begin).max(0) } else { begin.min(len) };

    let (start, end) = if limit >= 0 {
        (begin, begin.saturating_add(limit).min(len))
    } else if begin == 0 {
        ((len + limit).max(0), len)
    } else {
        ((begin + limit).max(0), begin)
    };
    &items[start as usize..end as usize]
}

/// Truncate toward zero; infinities saturate.
fn clamp_to_i64(n: f64) -> i64 {
    // `as` saturates for out-of-range floats
    n.trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers() -> Value {
        Value::Array((1..=5).map(Value::from).collect())
    }

    fn ints(values: &[i64]) -> Value {
        Value::Array(values.iter().copied().map(Value::from).collect())
    }

    #[test]
    fn test_positive_and_negative_limits() {
        assert_eq!(limit_to(&[numbers(), 2.into()]).unwrap(), ints(&[1, 2]));
        assert_eq!(limit_to(&[numbers(), (-2).into()]).unwrap(), ints(&[4, 5]));
        assert_eq!(limit_to(&[numbers(), 10.into()]).unwrap(), numbers());
        assert_eq!(limit_to(&[numbers(), 0.into()]).unwrap(), ints(&[]));
    }

    #[test]
    fn test_begin_offset() {
        assert_eq!(
            limit_to(&[numbers(), 2.into(), 1.into()]).unwrap(),
            ints(&[2, 3])
        );
        assert_eq!(
            limit_to(&[numbers(), (-2).into(), 3.into()]).unwrap(),
            ints(&[2, 3])
        );
        assert_eq!(
            limit_to(&[numbers(), 2.into(), (-2).into()]).unwrap(),
            ints(&[4, 5])
        );
    }

    #[test]
    fn test_strings_and_numbers() {
        assert_eq!(
            limit_to(&["abcdef".into(), 3.into()]).unwrap(),
            Value::from("abc")
        );
        assert_eq!(
            limit_to(&["abcdef".into(), (-2).into()]).unwrap(),
            Value::from("ef")
        );
        assert_eq!(
            limit_to(&[12345.into(), "2".into()]).unwrap(),
            Value::from("12")
        );
    }

    #[test]
    fn test_infinite_and_invalid_limits() {
        assert_eq!(
            limit_to(&[numbers(), f64::INFINITY.into()]).unwrap(),
            numbers()
        );
        assert_eq!(
            limit_to(&[numbers(), f64::NEG_INFINITY.into()]).unwrap(),
            numbers()
        );
        assert_eq!(limit_to(&[numbers(), "x".into()]).unwrap(), numbers());
        assert_eq!(limit_to(&[numbers()]).unwrap(), numbers());
        assert_eq!(
            limit_to(&[Value::Null, 2.into()]).unwrap(),
            Value::Null
        );
    }
}
