//! JSON rendering of runtime values.
//!
//! Used by the `json` filter and the CLI. Output follows the usual
//! serialisation rules for JSON-shaped host data:
//!
//! - object keys are sorted, so output is deterministic,
//! - `Undefined` and function members are dropped from objects and become
//!   `null` inside arrays,
//! - keys starting with `$$` are internal bookkeeping and are skipped,
//! - non-finite floats render as `null`.
//!
//! # Examples
//!
//! ```
//! use parsley::Value;
//! use parsley::output::{to_json, to_json_pretty};
//!
//! let value = Value::Array(vec![Value::Integer(1), Value::Undefined]);
//! assert_eq!(to_json(&value), "[1,null]");
//! assert_eq!(to_json_pretty(&Value::Integer(42)), "42");
//! ```

use std::collections::HashMap;

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Undefined | Value::Null | Value::Function(_) => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            Value::Float(_) => "null".to_string(),
            Value::String(s) => format!("\"{}\"", escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        let items: Vec<String> = arr
            .iter()
            .map(|v| self.print_value(v, indent + 1))
            .collect();
        self.wrap('[', ']', items, indent)
    }

    fn print_object(&self, obj: &HashMap<String, Value>, indent: usize) -> String {
        let mut entries: Vec<(&String, &Value)> = obj
            .iter()
            .filter(|(key, value)| !key.starts_with("$$") && !skipped_member(value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let separator = if self.pretty { ": " } else { ":" };
        let items: Vec<String> = entries
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "\"{}\"{}{}",
                    escape_string(key),
                    separator,
                    self.print_value(value, indent + 1)
                )
            })
            .collect();
        self.wrap('{', '}', items, indent)
    }

    fn wrap(&self, open: char, close: char, items: Vec<String>, indent: usize) -> String {
        if items.is_empty() {
            return format!("{open}{close}");
        }
        if !self.pretty {
            return format!("{open}{}{close}", items.join(","));
        }
        let inner = "  ".repeat(indent + 1);
        let body = items
            .iter()
            .map(|item| format!("{inner}{item}"))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{open}\n{body}\n{}{close}", "  ".repeat(indent))
    }
}

fn skipped_member(value: &Value) -> bool {
    matches!(value, Value::Undefined | Value::Function(_))
}

fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Compact JSON: no whitespace, sorted keys.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Pretty JSON with 2-space indentation.
///
/// ```
/// use parsley::Value;
/// use parsley::output::to_json_pretty;
///
/// let mut obj = Value::object();
/// obj.insert("name", "Alice");
/// obj.insert("age", 30);
///
/// assert_eq!(to_json_pretty(&obj), "{\n  \"age\": 30,\n  \"name\": \"Alice\"\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_that_do_not_serialise_are_dropped() {
        let mut obj = Value::object();
        obj.insert("a", 1);
        obj.insert("b", Value::Undefined);
        obj.insert("c", Value::function(|_, _| Ok(Value::Null)));
        obj.insert("$$hashKey", "x");
        assert_eq!(to_json(&obj), r#"{"a":1}"#);
    }

    #[test]
    fn test_non_finite_floats_are_null() {
        let arr = Value::Array(vec![Value::Float(f64::NAN), Value::Float(1.5)]);
        assert_eq!(to_json(&arr), "[null,1.5]");
    }

    #[test]
    fn test_nested_pretty_output() {
        let mut inner = Value::object();
        inner.insert("x", Value::Array(vec![1.into(), 2.into()]));
        let mut outer = Value::object();
        outer.insert("inner", inner);
        assert_eq!(
            to_json_pretty(&outer),
            "{\n  \"inner\": {\n    \"x\": [\n      1,\n      2\n    ]\n  }\n}"
        );
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(
            to_json(&Value::from("a\"b\\c\n\u{1}")),
            r#""a\"b\\c\n\u0001""#
        );
    }
}
