use crate::{error::EvalError, output, value::Value};

use super::arg;

/// `json[:pretty]`: pretty unless the argument is given and falsy.
pub(super) fn json(args: &[Value]) -> Result<Value, EvalError> {
    let value = arg(args, 0);
    if matches!(value, Value::Undefined | Value::Function(_)) {
        return Ok(Value::Undefined);
    }
    let pretty = args.get(1).is_none_or(Value::is_truthy);
    let text = if pretty {
        output::to_json_pretty(value)
    } else {
        output::to_json(value)
    };
    Ok(Value::String(text))
}

pub(super) fn uppercase(args: &[Value]) -> Result<Value, EvalError> {
    Ok(map_string(arg(args, 0), str::to_uppercase))
}

pub(super) fn lowercase(args: &[Value]) -> Result<Value, EvalError> {
    Ok(map_string(arg(args, 0), str::to_lowercase))
}

/// Non-strings pass through untouched.
fn map_string(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_mapping() {
        assert_eq!(uppercase(&["abc".into()]).unwrap(), Value::from("ABC"));
        assert_eq!(lowercase(&["AbC".into()]).unwrap(), Value::from("abc"));
        assert_eq!(uppercase(&[3.into()]).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_json() {
        let arr = Value::Array(vec![1.into(), "a".into()]);
        assert_eq!(
            json(&[arr.clone(), false.into()]).unwrap(),
            Value::from(r#"[1,"a"]"#)
        );
        assert_eq!(
            json(&[arr]).unwrap(),
            Value::from("[\n  1,\n  \"a\"\n]")
        );
        assert_eq!(json(&[Value::Undefined]).unwrap(), Value::Undefined);
    }
}
