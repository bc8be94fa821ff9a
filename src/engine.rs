//! Compile-once entry point with a per-engine expression cache.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, trace};

use crate::{
    compiler::Compiler,
    constant,
    error::Error,
    expression::Expression,
    filters::FilterRegistry,
    lexer::lex,
    parser::Parser,
};

/// What [`Engine::parse`] accepts.
#[derive(Debug, Clone)]
pub enum Source {
    /// Expression text, compiled through the cache.
    Text(String),
    /// An already built evaluator, returned as is.
    Expression(Arc<Expression>),
    /// Nothing to evaluate: yields a no-op evaluator.
    Empty,
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<&String> for Source {
    fn from(text: &String) -> Self {
        Source::Text(text.clone())
    }
}

impl From<Arc<Expression>> for Source {
    fn from(expression: Arc<Expression>) -> Self {
        Source::Expression(expression)
    }
}

impl From<Expression> for Source {
    fn from(expression: Expression) -> Self {
        Source::Expression(Arc::new(expression))
    }
}

impl<T: Into<Source>> From<Option<T>> for Source {
    fn from(source: Option<T>) -> Self {
        source.map_or(Source::Empty, Into::into)
    }
}

/// Expression engine: a filter registry plus the cache of everything
/// compiled against it.
///
/// Safe to share between threads. Two threads missing the cache for the
/// same text may both compile it; the first insert wins and both return
/// that entry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use parsley::{Engine, Value};
///
/// let engine = Engine::default();
/// let first = engine.parse("2 + 3 * 4").unwrap();
/// let second = engine.parse("2 + 3 * 4").unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(first.eval(&mut Value::Undefined).unwrap(), Value::Integer(14));
/// ```
#[derive(Debug)]
pub struct Engine {
    filters: FilterRegistry,
    cache: RwLock<HashMap<String, Arc<Expression>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(FilterRegistry::with_builtins())
    }
}

impl Engine {
    pub fn new(filters: FilterRegistry) -> Self {
        Engine {
            filters,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Resolve `source` to an evaluator, compiling text on a cache miss.
    pub fn parse(&self, source: impl Into<Source>) -> Result<Arc<Expression>, Error> {
        match source.into() {
            Source::Text(text) => self.parse_text(text),
            Source::Expression(expression) => Ok(expression),
            Source::Empty => Ok(Arc::new(Expression::noop())),
        }
    }

    fn parse_text(&self, text: String) -> Result<Arc<Expression>, Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(&text) {
                trace!(source = %text, "expression cache hit");
                return Ok(Arc::clone(cached));
            }
        }

        debug!(source = %text, "expression cache miss");
        let compiled = Arc::new(self.compile(&text)?);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.entry(text).or_insert(compiled);
        Ok(Arc::clone(entry))
    }

    /// Run the full pipeline without touching the cache.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compile(&self, source: &str) -> Result<Expression, Error> {
        let tokens = lex(source)?;
        let mut ast = Parser::new(tokens).parse()?;
        let constant = constant::analyze(&mut ast);
        let expression = Compiler::new(&self.filters).compile(source, &ast)?;
        debug!(
            constant,
            literal = expression.is_literal(),
            assignable = expression.is_assignable(),
            "compiled expression"
        );
        Ok(expression)
    }

    /// Number of cached expressions.
    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached expression. Evaluators already handed out stay
    /// valid.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_failed_compiles_are_not_cached() {
        let engine = Engine::default();
        assert!(engine.parse("a +").is_err());
        assert!(engine.is_empty());
        engine.parse("a + 1").unwrap();
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_passthrough_and_empty_sources() {
        let engine = Engine::default();
        let custom = Arc::new(Expression::from_fn(|_| Ok(Value::Integer(7))));
        let returned = engine.parse(Arc::clone(&custom)).unwrap();
        assert!(Arc::ptr_eq(&custom, &returned));

        let noop = engine.parse(None::<&str>).unwrap();
        assert_eq!(noop.eval(&mut Value::object()).unwrap(), Value::Undefined);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_compile_bypasses_cache() {
        let engine = Engine::default();
        engine.compile("1 + 1").unwrap();
        assert!(engine.is_empty());
    }

    #[test]
    fn test_clear() {
        let engine = Engine::default();
        let before = engine.parse("a").unwrap();
        engine.clear();
        let after = engine.parse("a").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
