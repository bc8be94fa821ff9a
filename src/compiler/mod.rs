//! Code generation by closure composition.
//!
//! Every AST node becomes a boxed closure over the closures of its
//! children. Compiling runs once per distinct source text; evaluating is a
//! call of the root closure with a [`Frame`].
//!
//! Static member names are checked against the sandbox here, once. Values
//! and computed keys are checked by the closures on every evaluation.

mod operators;
mod place;

use std::collections::HashMap;

use place::{Key, Place, Root};

use crate::{
    ast::{Expr, Literal, LogicalOp, Node},
    error::{Error, EvalError, GenerationError},
    expression::{AssignFn, Expression, Frame},
    filters::FilterRegistry,
    guard,
    parser::ParseError,
    value::Value,
};

/// Generated evaluator for one node.
pub(crate) type Thunk = Box<dyn Fn(&mut Frame<'_>) -> Result<Value, EvalError> + Send + Sync>;

pub struct Compiler<'r> {
    filters: &'r FilterRegistry,
    stateful: bool,
}

impl<'r> Compiler<'r> {
    pub fn new(filters: &'r FilterRegistry) -> Self {
        Compiler {
            filters,
            stateful: false,
        }
    }

    /// Turn an annotated program into an [`Expression`].
    ///
    /// Filters are resolved from the registry now, not per evaluation, so
    /// an unknown filter fails here.
    pub fn compile(mut self, source: &str, program: &Node) -> Result<Expression, Error> {
        let Expr::Program(body) = &program.expr else {
            return Err(GenerationError("root node must be a program".into()).into());
        };

        let statements = body
            .iter()
            .map(|statement| self.compile_node(statement))
            .collect::<Result<Vec<_>, _>>()?;
        let read: Thunk = Box::new(move |frame| {
            let mut last = Value::Undefined;
            for statement in &statements {
                last = statement(frame)?;
            }
            Ok(last)
        });

        let assign = match body.as_slice() {
            [single] if matches!(single.expr, Expr::Identifier(_) | Expr::Member { .. }) => {
                let place = self.compile_place(single)?;
                let assign: Box<AssignFn> = Box::new(move |frame, value| {
                    guard::ensure_safe_object(&value)?;
                    place.store(frame, value.clone())?;
                    Ok(value)
                });
                Some(assign)
            }
            _ => None,
        };

        let literal = match body.as_slice() {
            [] => true,
            [single] => matches!(
                single.expr,
                Expr::Literal(_) | Expr::Array(_) | Expr::Object(_)
            ),
            _ => false,
        };
        let constant = program.constant && !self.stateful;

        Ok(Expression::compiled(source, read, assign, literal, constant))
    }

    fn compile_all(&mut self, nodes: &[Node]) -> Result<Vec<Thunk>, Error> {
        nodes.iter().map(|node| self.compile_node(node)).collect()
    }

    fn compile_node(&mut self, node: &Node) -> Result<Thunk, Error> {
        match &node.expr {
            Expr::Program(_) => Err(GenerationError("nested program".into()).into()),

            Expr::Literal(literal) => {
                let value = literal_value(literal);
                Ok(Box::new(move |_| Ok(value.clone())))
            }

            Expr::Array(elements) => {
                let elements = self.compile_all(elements)?;
                Ok(Box::new(move |frame| {
                    let mut items = Vec::with_capacity(elements.len());
                    for element in &elements {
                        items.push(element(frame)?);
                    }
                    Ok(Value::Array(items))
                }))
            }

            Expr::Object(properties) => {
                let entries = properties
                    .iter()
                    .map(|property| -> Result<(String, Thunk), Error> {
                        Ok((property.key.name(), self.compile_node(&property.value)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(move |frame| {
                    let mut map = HashMap::with_capacity(entries.len());
                    for (key, value) in &entries {
                        map.insert(key.clone(), value(frame)?);
                    }
                    Ok(Value::Object(map))
                }))
            }

            Expr::Identifier(name) => {
                guard::ensure_safe_member_name(name)?;
                let name = name.clone();
                Ok(Box::new(move |frame| {
                    let value = frame.lookup(&name);
                    guard::ensure_safe_object(&value)?;
                    Ok(value)
                }))
            }

            Expr::This => Ok(Box::new(|frame| Ok(frame.context().clone()))),

            Expr::Member {
                object,
                property,
                computed,
            } => {
                let object = self.compile_node(object)?;
                let key = self.compile_key(property, *computed)?;
                Ok(Box::new(move |frame| {
                    let target = object(frame)?;
                    if target.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                    guard::ensure_safe_object(&target)?;
                    let value = target.get_member(&key.resolve(frame)?);
                    guard::ensure_safe_object(&value)?;
                    Ok(value)
                }))
            }

            Expr::Call {
                callee,
                arguments,
                filter: true,
            } => self.compile_filter_call(callee, arguments),

            Expr::Call {
                callee,
                arguments,
                filter: false,
            } => self.compile_call(callee, arguments),

            Expr::Assignment { left, right } => {
                let place = self.compile_place(left)?;
                let right = self.compile_node(right)?;
                Ok(Box::new(move |frame| {
                    let target = place.resolve(frame)?;
                    let value = right(frame)?;
                    guard::ensure_safe_object(&value)?;
                    place.write(frame, target, value.clone())?;
                    Ok(value)
                }))
            }

            Expr::Unary { op, argument } => {
                let op = *op;
                let argument = self.compile_node(argument)?;
                Ok(Box::new(move |frame| {
                    Ok(operators::unary(op, &argument(frame)?))
                }))
            }

            Expr::Binary { op, left, right } => {
                let op = *op;
                let left = self.compile_node(left)?;
                let right = self.compile_node(right)?;
                Ok(Box::new(move |frame| {
                    let left = left(frame)?;
                    let right = right(frame)?;
                    Ok(operators::binary(op, left, right))
                }))
            }

            Expr::Logical { op, left, right } => {
                let op = *op;
                let left = self.compile_node(left)?;
                let right = self.compile_node(right)?;
                Ok(Box::new(move |frame| {
                    let value = left(frame)?;
                    let short_circuit = match op {
                        LogicalOp::And => !value.is_truthy(),
                        LogicalOp::Or => value.is_truthy(),
                    };
                    if short_circuit {
                        Ok(value)
                    } else {
                        right(frame)
                    }
                }))
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.compile_node(test)?;
                let consequent = self.compile_node(consequent)?;
                let alternate = self.compile_node(alternate)?;
                Ok(Box::new(move |frame| {
                    if test(frame)?.is_truthy() {
                        consequent(frame)
                    } else {
                        alternate(frame)
                    }
                }))
            }
        }
    }

    fn compile_key(&mut self, property: &Node, computed: bool) -> Result<Key, Error> {
        if computed {
            return Ok(Key::Computed(self.compile_node(property)?));
        }
        match &property.expr {
            Expr::Identifier(name) => {
                guard::ensure_safe_member_name(name)?;
                Ok(Key::Static(name.clone()))
            }
            _ => Err(GenerationError("non-computed member key must be an identifier".into()).into()),
        }
    }

    fn compile_call(&mut self, callee: &Node, arguments: &[Node]) -> Result<Thunk, Error> {
        let arguments = self.compile_all(arguments)?;
        match &callee.expr {
            Expr::Member {
                object,
                property,
                computed,
            } => {
                let object = self.compile_node(object)?;
                let key = self.compile_key(property, *computed)?;
                Ok(Box::new(move |frame| {
                    let receiver = object(frame)?;
                    if receiver.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                    guard::ensure_safe_object(&receiver)?;
                    let function = receiver.get_member(&key.resolve(frame)?);
                    if function.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                    guard::ensure_safe_function(&function)?;
                    let args = evaluate_arguments(frame, &arguments)?;
                    invoke(&function, &receiver, &args)
                }))
            }
            Expr::Identifier(name) => {
                guard::ensure_safe_member_name(name)?;
                let name = name.clone();
                Ok(Box::new(move |frame| {
                    let function = frame.lookup(&name);
                    if function.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                    guard::ensure_safe_function(&function)?;
                    let args = evaluate_arguments(frame, &arguments)?;
                    invoke(&function, frame.scope_of(&name), &args)
                }))
            }
            _ => {
                let callee = self.compile_node(callee)?;
                Ok(Box::new(move |frame| {
                    let function = callee(frame)?;
                    if function.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                    guard::ensure_safe_function(&function)?;
                    let args = evaluate_arguments(frame, &arguments)?;
                    invoke(&function, &Value::Undefined, &args)
                }))
            }
        }
    }

    fn compile_filter_call(&mut self, callee: &Node, arguments: &[Node]) -> Result<Thunk, Error> {
        let Expr::Identifier(name) = &callee.expr else {
            return Err(GenerationError("filter name must be an identifier".into()).into());
        };
        let filter = self.filters.lookup(name)?;
        self.stateful |= filter.is_stateful();
        let arguments = self.compile_all(arguments)?;
        Ok(Box::new(move |frame| {
            let args = arguments
                .iter()
                .map(|argument| argument(frame))
                .collect::<Result<Vec<_>, _>>()?;
            let result = filter.apply(&args)?;
            guard::ensure_safe_object(&result)?;
            Ok(result)
        }))
    }

    /// Compile the left side of an assignment. Only identifiers and member
    /// chains are places.
    fn compile_place(&mut self, node: &Node) -> Result<Place, Error> {
        match &node.expr {
            Expr::Identifier(name) => {
                guard::ensure_safe_member_name(name)?;
                Ok(Place::new(Root::Scope(name.clone())))
            }
            Expr::Member {
                object,
                property,
                computed,
            } => {
                let mut place = match &object.expr {
                    Expr::Identifier(_) | Expr::Member { .. } => self.compile_place(object)?,
                    Expr::This => Place::new(Root::This),
                    _ => Place::new(Root::Temporary(self.compile_node(object)?)),
                };
                place.path.push(self.compile_key(property, *computed)?);
                Ok(place)
            }
            _ => Err(ParseError::InvalidAssignmentTarget.into()),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn evaluate_arguments(frame: &mut Frame<'_>, arguments: &[Thunk]) -> Result<Vec<Value>, EvalError> {
    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        let value = argument(frame)?;
        guard::ensure_safe_object(&value)?;
        values.push(value);
    }
    Ok(values)
}

fn invoke(function: &Value, receiver: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let Value::Function(f) = function else {
        return Err(EvalError::type_error(format!(
            "{} is not a function",
            function.type_name()
        )));
    };
    let result = f.call(receiver, args)?;
    guard::ensure_safe_object(&result)?;
    Ok(result)
}
