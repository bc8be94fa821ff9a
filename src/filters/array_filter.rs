//! The `filter` filter: select array items matching a criterion.
//!
//! `items | filter:criterion[:comparator]`
//!
//! - a function criterion is called as `(item, index, items)` and keeps
//!   items it returns truthy for;
//! - a string, number, boolean or null criterion matches any nested value
//!   of the item; a string starting with `!` negates the match;
//! - a record criterion requires every key to match the same key of the
//!   item, ignoring `Undefined` criterion values, with `$` matching any
//!   property (or the item itself when it is a primitive).
//!
//! The default comparator is a case-insensitive substring test. `true`
//! switches to strict equality; a function comparator is called as
//! `(actual, expected)`.

use crate::{
    error::EvalError,
    guard,
    value::{Function, Value},
};

use super::arg;

enum Comparator {
    Substring,
    Strict,
    Custom(Function),
}

impl Comparator {
    fn from_arg(value: &Value) -> Result<Self, EvalError> {
        Ok(match value {
            Value::Boolean(true) => Comparator::Strict,
            Value::Function(f) => {
                guard::ensure_safe_function(value)?;
                Comparator::Custom(f.clone())
            }
            _ => Comparator::Substring,
        })
    }

    fn matches(&self, actual: &Value, expected: &Value) -> Result<bool, EvalError> {
        match self {
            Comparator::Substring => Ok(substring_match(actual, expected)),
            Comparator::Strict => Ok(actual == expected),
            Comparator::Custom(f) => Ok(f
                .call(&Value::Undefined, &[actual.clone(), expected.clone()])?
                .is_truthy()),
        }
    }
}

pub(super) fn filter(args: &[Value]) -> Result<Value, EvalError> {
    let input = arg(args, 0);
    let Value::Array(items) = input else {
        return Ok(input.clone());
    };
    let criterion = arg(args, 1);
    guard::ensure_safe_function(criterion)?;
    let comparator = Comparator::from_arg(arg(args, 2))?;

    let mut selected = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let keep = match criterion {
            Value::Function(f) => f
                .call(
                    &Value::Undefined,
                    &[item.clone(), Value::Integer(index as i64), input.clone()],
                )?
                .is_truthy(),
            Value::Object(_) => match criterion.get_member("$") {
                any if criterion.has_key("$") && !is_record(item) => {
                    deep_compare(item, &any, &comparator, false, false)?
                }
                _ => deep_compare(item, criterion, &comparator, false, false)?,
            },
            Value::String(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::Boolean(_)
            | Value::Null => deep_compare(item, criterion, &comparator, true, false)?,
            Value::Undefined | Value::Array(_) => return Ok(input.clone()),
        };
        if keep {
            selected.push(item.clone());
        }
    }
    Ok(Value::Array(selected))
}

fn is_record(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn deep_compare(
    actual: &Value,
    expected: &Value,
    comparator: &Comparator,
    match_any_property: bool,
    dont_match_whole_object: bool,
) -> Result<bool, EvalError> {
    if let Value::String(text) = expected
        && let Some(negated) = text.strip_prefix('!')
    {
        let negated = Value::String(negated.to_string());
        return Ok(!deep_compare(
            actual,
            &negated,
            comparator,
            match_any_property,
            false,
        )?);
    }

    match actual {
        Value::Array(items) => {
            for item in items {
                if deep_compare(item, expected, comparator, match_any_property, false)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Object(map) if match_any_property => {
            for (key, value) in map {
                if !key.starts_with('$') && deep_compare(value, expected, comparator, true, false)?
                {
                    return Ok(true);
                }
            }
            if dont_match_whole_object {
                Ok(false)
            } else {
                deep_compare(actual, expected, comparator, false, false)
            }
        }
        Value::Object(_) => match expected {
            Value::Object(criteria) => {
                for (key, expected_value) in criteria {
                    if matches!(expected_value, Value::Undefined | Value::Function(_)) {
                        continue;
                    }
                    let any = key == "$";
                    let actual_value = if any {
                        actual.clone()
                    } else {
                        actual.get_member(key)
                    };
                    if !deep_compare(&actual_value, expected_value, comparator, any, any)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => comparator.matches(actual, expected),
        },
        Value::Function(_) => Ok(false),
        _ => comparator.matches(actual, expected),
    }
}

fn substring_match(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Undefined, _) => false,
        (Value::Null, _) | (_, Value::Null) => actual == expected,
        (a, e) if is_record(a) || is_record(e) => false,
        _ => actual
            .to_display_string()
            .to_lowercase()
            .contains(&expected.to_display_string().to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, phone: &str) -> Value {
        let mut value = Value::object();
        value.insert("name", name);
        value.insert("phone", phone);
        value
    }

    fn names(result: Value) -> Vec<String> {
        let Value::Array(items) = result else {
            panic!("expected array");
        };
        items
            .iter()
            .map(|item| match item {
                Value::Object(_) => item.get_member("name").to_display_string(),
                other => other.to_display_string(),
            })
            .collect()
    }

    fn people() -> Value {
        Value::Array(vec![
            person("Misko", "555-1234"),
            person("Igor", "555-5678"),
            person("Vojta", "555-0000"),
        ])
    }

    #[test]
    fn test_substring_any_property() {
        let result = filter(&[people(), "i".into()]).unwrap();
        assert_eq!(names(result), vec!["Misko", "Igor"]);
        let result = filter(&[people(), "5678".into()]).unwrap();
        assert_eq!(names(result), vec!["Igor"]);
    }

    #[test]
    fn test_negation() {
        let result = filter(&[people(), "!isk".into()]).unwrap();
        assert_eq!(names(result), vec!["Igor", "Vojta"]);
    }

    #[test]
    fn test_record_criterion() {
        let mut criterion = Value::object();
        criterion.insert("name", "o");
        criterion.insert("phone", "0");
        let result = filter(&[people(), criterion]).unwrap();
        assert_eq!(names(result), vec!["Vojta"]);
    }

    #[test]
    fn test_dollar_key_matches_primitives_and_any_property() {
        let mut criterion = Value::object();
        criterion.insert("$", "a");
        let items = Value::Array(vec!["abc".into(), "xyz".into(), person("Vojta", "1")]);
        let result = filter(&[items, criterion]).unwrap();
        assert_eq!(names(result), vec!["abc", "Vojta"]);
    }

    #[test]
    fn test_strict_comparator() {
        let items = Value::Array(vec!["ab".into(), "abc".into()]);
        let result = filter(&[items, "ab".into(), true.into()]).unwrap();
        assert_eq!(names(result), vec!["ab"]);
    }

    #[test]
    fn test_function_criterion_and_comparator() {
        let items = Value::Array(vec![1.into(), 2.into(), 3.into()]);
        let odd = Value::function(|_, args| Ok(Value::Boolean(args[0].to_number() % 2.0 == 1.0)));
        assert_eq!(names(filter(&[items.clone(), odd]).unwrap()), vec!["1", "3"]);

        let greater = Value::function(|_, args| {
            Ok(Value::Boolean(args[0].to_number() > args[1].to_number()))
        });
        let result = filter(&[items, 1.into(), greater]).unwrap();
        assert_eq!(names(result), vec!["2", "3"]);
    }

    #[test]
    fn test_non_array_input_passes_through() {
        assert_eq!(filter(&["abc".into(), "a".into()]).unwrap(), Value::from("abc"));
        assert_eq!(filter(&[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_null_only_matches_null() {
        let items = Value::Array(vec![Value::Null, "null".into()]);
        let result = filter(&[items, Value::Null]).unwrap();
        assert_eq!(result, Value::Array(vec![Value::Null]));
    }
}
