//! Sandboxed expression engine for template bindings.
//!
//! Source text goes through four stages, once per distinct text:
//!
//! 1. [`lexer`] turns it into tokens,
//! 2. [`parser`] builds the AST by recursive descent,
//! 3. [`constant`] marks context-independent nodes,
//! 4. [`compiler`] composes one closure per node into an [`Expression`].
//!
//! [`Engine`] caches the result, so evaluating is just calling the root
//! closure against a context.
//!
//! ```
//! use parsley::{Engine, Value};
//!
//! let engine = Engine::default();
//! let mut scope = Value::from(serde_json::json!({
//!     "user": {"name": "ada"},
//!     "items": [1, 2, 3, 4],
//! }));
//!
//! let expr = engine.parse("(user.name | uppercase) + ': ' + (items | limitTo:2)").unwrap();
//! assert_eq!(expr.eval(&mut scope).unwrap(), Value::from("ADA: 1,2"));
//!
//! // missing data reads as undefined instead of failing
//! let expr = engine.parse("user.address.street").unwrap();
//! assert_eq!(expr.eval(&mut scope).unwrap(), Value::Undefined);
//! ```

pub mod ast;
pub mod cli;
pub mod compiler;
pub mod constant;
pub mod engine;
pub mod error;
pub mod expression;
pub mod filters;
pub mod guard;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Expr, Node, Token};
pub use engine::{Engine, Source};
pub use error::{Error, EvalError, GenerationError};
pub use expression::{Expression, Frame};
pub use filters::{Filter, FilterError, FilterRegistry};
pub use guard::SecurityError;
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use value::{Function, FunctionKind, Value};
