use std::{collections::HashMap, fmt, sync::Arc};

use crate::error::EvalError;

/// Signature of host functions reachable from expressions.
///
/// The first argument is the receiver: the object a method was read from
/// (`obj.method()`), the locals/context map an identifier was found in
/// (`method()`), or `Undefined`.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync;

/// How the sandbox treats a host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Ordinary callable
    Plain,
    /// The host's function-constructing type; never callable or passable
    Constructor,
    /// Generic call re-binding/forwarding (call/apply/bind analogues);
    /// never callable
    CallForwarder,
}

/// Host function stored in a [`Value`].
///
/// Cloning shares the underlying closure; equality is identity.
#[derive(Clone)]
pub struct Function {
    call: Arc<NativeFn>,
    kind: FunctionKind,
}

impl Function {
    pub fn new(
        f: impl Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(f, FunctionKind::Plain)
    }

    pub fn with_kind(
        f: impl Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
        kind: FunctionKind,
    ) -> Self {
        Function {
            call: Arc::new(f),
            kind,
        }
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn call(&self, receiver: &Value, args: &[Value]) -> Result<Value, EvalError> {
        (self.call)(receiver, args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:?})", self.kind)
    }
}

/// Runtime value flowing through compiled expressions.
///
/// JSON-shaped data plus the absent marker and host functions. Integers and
/// floats are both "numbers": they compare equal when numerically equal and
/// arithmetic keeps integers whenever the result is whole.
///
/// # Examples
///
/// ```
/// use parsley::Value;
///
/// let mut scope = Value::object();
/// scope.insert("answer", 42);
/// assert_eq!(scope.get_member("answer"), Value::Integer(42));
/// assert_eq!(scope.get_member("missing"), Value::Undefined);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value: missing identifiers, members and call results
    #[default]
    Undefined,

    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Record with string keys
    Object(HashMap<String, Value>),

    /// Host function
    Function(Function),
}

impl PartialEq for Value {
    /// Same-kind structural equality, with integers and floats compared
    /// numerically and functions by identity.
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Undefined, Undefined) | (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => (*a as f64) == *b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Function(a), Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Empty record.
    pub fn object() -> Self {
        Value::Object(HashMap::new())
    }

    /// Plain host function taking `(receiver, args)`.
    pub fn function(
        f: impl Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        Value::Function(Function::new(f))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `Undefined` or `Null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Undefined | Null => false,
            Boolean(b) => *b,
            Integer(n) => *n != 0,
            Float(n) => *n != 0.0 && !n.is_nan(),
            String(s) => !s.is_empty(),
            Array(_) | Object(_) | Function(_) => true,
        }
    }

    /// Human-readable kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Numeric conversion used by arithmetic and relational operators.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Integer(n) => *n as f64,
            Value::Float(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::Undefined | Value::Array(_) | Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// String conversion used by concatenation, member keys and filters.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(_) => "function".to_string(),
        }
    }

    /// Whether a record has `key` as an own entry, whatever its value.
    pub fn has_key(&self, key: &str) -> bool {
        matches!(self, Value::Object(map) if map.contains_key(key))
    }

    /// Read a member; absent members and non-container receivers give
    /// `Undefined`.
    ///
    /// Arrays are indexed by canonical integer keys, and arrays and strings
    /// expose `length`.
    pub fn get_member(&self, key: &str) -> Value {
        match self {
            Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
            Value::Array(items) => {
                if key == "length" {
                    return Value::Integer(items.len() as i64);
                }
                parse_index(key)
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or_default()
            }
            Value::String(s) => {
                if key == "length" {
                    return Value::Integer(s.chars().count() as i64);
                }
                parse_index(key)
                    .and_then(|index| s.chars().nth(index))
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or_default()
            }
            _ => Value::Undefined,
        }
    }

    /// Insert into a record. No-op on anything else.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if let Value::Object(map) = self {
            map.insert(key.into(), value.into());
        }
    }

    /// Write a member, growing arrays as needed.
    pub fn set_member(&mut self, key: &str, value: Value) -> Result<(), EvalError> {
        match self {
            Value::Object(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
            Value::Array(items) => {
                let index = parse_index(key).ok_or_else(|| {
                    EvalError::Type(format!("Cannot set non-index key '{key}' on array"))
                })?;
                if index >= items.len() {
                    let len = index
                        .checked_add(1)
                        .filter(|len| len - items.len() <= MAX_ARRAY_GROWTH)
                        .ok_or_else(|| {
                            EvalError::Type(format!(
                                "Array index {key} is too far past the end (length {})",
                                items.len()
                            ))
                        })?;
                    items.resize(len, Value::Undefined);
                }
                items[index] = value;
                Ok(())
            }
            other => Err(EvalError::Type(format!(
                "Cannot set property '{}' on {}",
                key,
                other.type_name()
            ))),
        }
    }

    /// Mutable access to a member, materialising an empty record when it
    /// is absent and `create` is set.
    pub fn member_mut(&mut self, key: &str, create: bool) -> Result<&mut Value, EvalError> {
        let missing = match &*self {
            Value::Object(map) => map.get(key).is_none_or(Value::is_nullish),
            Value::Array(items) => parse_index(key)
                .and_then(|index| items.get(index))
                .is_none_or(Value::is_nullish),
            _ => true,
        };
        if missing {
            if !create {
                return Err(EvalError::Type(format!(
                    "Cannot set property of missing member '{key}'"
                )));
            }
            self.set_member(key, Value::object())?;
        }
        match self {
            Value::Object(map) => map
                .get_mut(key)
                .ok_or_else(|| EvalError::Type(format!("Missing member '{key}'"))),
            Value::Array(items) => parse_index(key)
                .and_then(|index| items.get_mut(index))
                .ok_or_else(|| EvalError::Type(format!("Missing index '{key}'"))),
            other => Err(EvalError::Type(format!(
                "Cannot read property '{}' of {}",
                key,
                other.type_name()
            ))),
        }
    }
}

/// Shortest JavaScript-style rendering of a float.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if !(1e-6..1e21).contains(&n.abs()) {
        // exponent form with an explicit sign, as in `1e+21` and `1.5e-7`
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}

/// Most slots a single write may append to an array.
pub const MAX_ARRAY_GROWTH: usize = 10_000;

/// Canonical array index: ASCII digits without a leading zero.
fn parse_index(key: &str) -> Option<usize> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical { key.parse().ok() } else { None }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Value {
    /// Convert to a JSON document.
    ///
    /// Non-finite floats become `null`; `Undefined` and functions are
    /// dropped from records and become `null` elsewhere.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .filter(|(_, v)| !matches!(v, Value::Undefined | Value::Function(_)))
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}
