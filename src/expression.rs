use std::fmt;

use crate::{error::EvalError, value::Value};

/// Evaluation state handed to every compiled node: the primary context and
/// the optional locals that shadow it.
pub struct Frame<'a> {
    context: &'a mut Value,
    locals: Option<&'a mut Value>,
}

impl<'a> Frame<'a> {
    pub fn new(context: &'a mut Value, locals: Option<&'a mut Value>) -> Self {
        Frame { context, locals }
    }

    pub fn context(&self) -> &Value {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut Value {
        &mut *self.context
    }

    pub fn locals(&self) -> Option<&Value> {
        self.locals.as_deref()
    }

    /// Whether `name` resolves to the locals rather than the context.
    ///
    /// An own entry wins even when its value is falsy or `Undefined`.
    pub fn in_locals(&self, name: &str) -> bool {
        self.locals.as_ref().is_some_and(|locals| locals.has_key(name))
    }

    /// Identifier lookup: locals first, then the context.
    pub fn lookup(&self, name: &str) -> Value {
        self.scope_of(name).get_member(name)
    }

    /// The map `name` resolves in, used as the receiver of `name(...)`.
    pub fn scope_of(&self, name: &str) -> &Value {
        match self.locals.as_deref() {
            Some(locals) if locals.has_key(name) => locals,
            _ => &*self.context,
        }
    }

    pub fn scope_of_mut(&mut self, name: &str) -> &mut Value {
        if self.in_locals(name)
            && let Some(locals) = self.locals.as_deref_mut()
        {
            return locals;
        }
        &mut *self.context
    }
}

pub(crate) type ReadFn = dyn Fn(&mut Frame<'_>) -> Result<Value, EvalError> + Send + Sync;
pub(crate) type AssignFn = dyn Fn(&mut Frame<'_>, Value) -> Result<Value, EvalError> + Send + Sync;

/// A compiled, reusable evaluator.
///
/// Produced once per distinct source text by [`crate::Engine::parse`] and
/// then invoked any number of times with different contexts.
///
/// # Examples
///
/// ```
/// use parsley::{Engine, Value};
///
/// let engine = Engine::default();
/// let expr = engine.parse("a.b").unwrap();
///
/// let mut scope = Value::object();
/// expr.assign(&mut scope, Value::Integer(5)).unwrap();
/// assert_eq!(expr.eval(&mut scope).unwrap(), Value::Integer(5));
/// ```
pub struct Expression {
    source: Option<String>,
    read: Box<ReadFn>,
    assign: Option<Box<AssignFn>>,
    literal: bool,
    constant: bool,
}

impl Expression {
    pub(crate) fn compiled(
        source: &str,
        read: Box<ReadFn>,
        assign: Option<Box<AssignFn>>,
        literal: bool,
        constant: bool,
    ) -> Self {
        Expression {
            source: Some(source.to_string()),
            read,
            assign,
            literal,
            constant,
        }
    }

    /// Wrap a hand-written evaluator so it can be passed wherever a compiled
    /// expression is expected.
    pub fn from_fn(
        f: impl Fn(&mut Frame<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        Expression {
            source: None,
            read: Box::new(f),
            assign: None,
            literal: false,
            constant: false,
        }
    }

    /// Evaluator that always yields `Undefined`.
    pub fn noop() -> Self {
        Self::from_fn(|_| Ok(Value::Undefined))
    }

    pub fn eval(&self, context: &mut Value) -> Result<Value, EvalError> {
        self.evaluate(context, None)
    }

    pub fn eval_with_locals(
        &self,
        context: &mut Value,
        locals: &mut Value,
    ) -> Result<Value, EvalError> {
        self.evaluate(context, Some(locals))
    }

    /// Run the evaluator. Pass `Value::Undefined` as context when there is
    /// none; every identifier then reads as `Undefined`.
    pub fn evaluate(
        &self,
        context: &mut Value,
        locals: Option<&mut Value>,
    ) -> Result<Value, EvalError> {
        let mut frame = Frame::new(context, locals);
        (self.read)(&mut frame)
    }

    /// Store `value` at the place this expression names, creating missing
    /// intermediate records. Returns the stored value.
    pub fn assign(&self, context: &mut Value, value: Value) -> Result<Value, EvalError> {
        self.assign_in(context, None, value)
    }

    pub fn assign_with_locals(
        &self,
        context: &mut Value,
        locals: &mut Value,
        value: Value,
    ) -> Result<Value, EvalError> {
        self.assign_in(context, Some(locals), value)
    }

    fn assign_in(
        &self,
        context: &mut Value,
        locals: Option<&mut Value>,
        value: Value,
    ) -> Result<Value, EvalError> {
        let Some(assign) = &self.assign else {
            return Err(EvalError::NotAssignable(
                self.source.clone().unwrap_or_default(),
            ));
        };
        let mut frame = Frame::new(context, locals);
        assign(&mut frame, value)
    }

    pub fn is_assignable(&self) -> bool {
        self.assign.is_some()
    }

    /// True when the program is empty or a single literal, array literal
    /// or object literal.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// True when the result cannot depend on the context or on a stateful
    /// filter.
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Source text this expression was compiled from, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("assignable", &self.assign.is_some())
            .field("literal", &self.literal)
            .field("constant", &self.constant)
            .finish()
    }
}
