//! Named value transformations applied with the pipe operator.
//!
//! A registry is handed to the [`Engine`](crate::Engine) explicitly, so
//! independent engines never share filters. Filters are resolved by name
//! while compiling; the compiled expression holds the filter itself.
//!
//! ```
//! use parsley::{Engine, Value};
//! use parsley::filters::{Filter, FilterRegistry};
//!
//! let mut filters = FilterRegistry::with_builtins();
//! filters.register("double", Filter::new(|args| {
//!     Ok(Value::Float(args.first().map(Value::to_number).unwrap_or(f64::NAN) * 2.0))
//! }));
//!
//! let engine = Engine::new(filters);
//! let expr = engine.parse("21 | double").unwrap();
//! assert_eq!(expr.eval(&mut Value::Undefined).unwrap(), Value::Integer(42));
//! ```

mod array_filter;
mod limit_to;
mod text;

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{error::EvalError, value::Value};

/// Filter body. `args[0]` is the piped value, the rest are the `:`
/// arguments in order.
pub type FilterFn = dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("Unknown filter: {0}")]
    NotFound(String),
}

#[derive(Clone)]
pub struct Filter {
    func: Arc<FilterFn>,
    stateful: bool,
}

impl Filter {
    pub fn new(f: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static) -> Self {
        Filter {
            func: Arc::new(f),
            stateful: false,
        }
    }

    /// A filter whose output may change between calls with equal inputs.
    /// Expressions using it are never reported as constant.
    pub fn stateful(
        f: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        Filter {
            func: Arc::new(f),
            stateful: true,
        }
    }

    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    pub fn apply(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("stateful", &self.stateful)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Filter>,
}

impl FilterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `filter`, `limitTo`, `json`, `uppercase` and
    /// `lowercase`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("filter", Filter::new(array_filter::filter))
            .register("limitTo", Filter::new(limit_to::limit_to))
            .register("json", Filter::new(text::json))
            .register("uppercase", Filter::new(text::uppercase))
            .register("lowercase", Filter::new(text::lowercase));
        registry
    }

    /// Add or replace a filter.
    pub fn register(&mut self, name: impl Into<String>, filter: Filter) -> &mut Self {
        let name = name.into();
        tracing::debug!(filter = %name, stateful = filter.is_stateful(), "registering filter");
        self.filters.insert(name, filter);
        self
    }

    /// Register the filter built by `factory`. The factory runs once, now.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl FnOnce() -> Filter,
    ) -> &mut Self {
        self.register(name, factory())
    }

    pub fn lookup(&self, name: &str) -> Result<Filter, FilterError> {
        self.filters
            .get(name)
            .cloned()
            .ok_or_else(|| FilterError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Piped value and `:` arguments by position; missing ones are `Undefined`.
fn arg(args: &[Value], index: usize) -> &Value {
    const UNDEFINED: &Value = &Value::Undefined;
    args.get(index).unwrap_or(UNDEFINED)
}
