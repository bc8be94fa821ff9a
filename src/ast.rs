//! # Parsley Expressions - Abstract Syntax Tree
//!
//! Types shared by the three compile stages: the lexer produces [`Token`]s,
//! the parser builds a tree of [`Node`]s, and the constant analyzer and
//! compiler walk that tree.
//!
//! - **[tokens]** - Lexical tokens
//! - **[expressions]** - Expression nodes and literals
//! - **[operators]** - Unary, binary and logical operators
//!
//! ## Quick Start
//!
//! ```text
//! items | filter:{done: false} | limitTo:3
//! ```
//!
//! ## Grammar
//!
//! Lowest to highest precedence:
//!
//! ```text
//! program    := filter (';' filter)*
//! filter     := assignment ('|' IDENT (':' assignment)*)*
//! assignment := ternary ('=' ternary)?
//! ternary    := logicalOR ('?' assignment ':' assignment)?
//! logicalOR  := logicalAND ('||' logicalAND)*
//! logicalAND := equality ('&&' equality)*
//! equality   := relational (('=='|'!='|'==='|'!==') relational)*
//! relational := additive (('<'|'>'|'<='|'>=') additive)*
//! additive   := multiplicative (('+'|'-') multiplicative)*
//! multiplicative := unary (('*'|'/'|'%') unary)*
//! unary      := ('+'|'-'|'!') unary | primary
//! primary    := literal | 'this' | IDENT | '(' filter ')' | '[' array ']' | '{' object '}'
//!               ( '.' IDENT | '[' filter ']' | '(' args ')' )*
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, Literal, Node, Property, PropertyKey};
pub use operators::{BinOp, LogicalOp, UnaryOp};
pub use tokens::{Token, TokenKind};
