use crate::ast::{BinOp, LogicalOp, UnaryOp};

/// Constant value appearing in source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Number without fraction or exponent, e.g. `42`
    Integer(i64),
    /// Number with fraction or exponent, e.g. `4.2`, `42e3`
    Float(f64),
    /// Quoted string with escapes already decoded
    String(String),
}

/// Key of an object literal entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// `{a: 1}`
    Identifier(String),
    /// `{"a key": 1}` or `{1: 2}`
    Literal(Literal),
}

impl PropertyKey {
    /// The string key this entry is stored under.
    pub fn name(&self) -> String {
        match self {
            PropertyKey::Identifier(name) => name.clone(),
            PropertyKey::Literal(Literal::String(s)) => s.clone(),
            PropertyKey::Literal(Literal::Integer(n)) => n.to_string(),
            PropertyKey::Literal(Literal::Float(n)) => n.to_string(),
            PropertyKey::Literal(Literal::Boolean(b)) => b.to_string(),
            PropertyKey::Literal(Literal::Null) => "null".to_string(),
        }
    }
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Node,
}

/// AST node: an expression plus its derived constancy flag.
///
/// The parser always produces `constant: false`; [`crate::constant::analyze`]
/// fills the flag in bottom-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub expr: Expr,
    pub constant: bool,
}

impl Node {
    pub fn new(expr: Expr) -> Self {
        Node {
            expr,
            constant: false,
        }
    }

    pub fn boxed(expr: Expr) -> Box<Self> {
        Box::new(Node::new(expr))
    }
}

impl From<Expr> for Node {
    fn from(expr: Expr) -> Self {
        Node::new(expr)
    }
}

/// Abstract Syntax Tree of one expression source.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Semicolon separated statements; only ever the root.
    ///
    /// # Example
    /// ```text
    /// a = 1; b = 2; a + b
    /// ```
    Program(Vec<Node>),

    /// Literal constant
    Literal(Literal),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, "two", [3], true, ]
    /// ```
    Array(Vec<Node>),

    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {a: 1, "b c": [2, 3]}
    /// ```
    Object(Vec<Property>),

    /// Name looked up in locals, then in the context
    Identifier(String),

    /// `this`, the primary context itself
    This,

    /// Member access
    ///
    /// # Examples
    /// ```text
    /// a.b        // computed: false, property: Identifier("b")
    /// a["b"]     // computed: true
    /// lock[key]  // computed: true
    /// ```
    Member {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },

    /// Function call, or filter application when `filter` is set.
    ///
    /// For filters the piped value is the first argument.
    ///
    /// # Examples
    /// ```text
    /// aFn(37, n)          // filter: false
    /// arr | limitTo:2     // filter: true, callee: Identifier("limitTo"), arguments: [arr, 2]
    /// ```
    Call {
        callee: Box<Node>,
        arguments: Vec<Node>,
        filter: bool,
    },

    /// `left = right`; `left` is validated as assignable when compiled
    Assignment { left: Box<Node>, right: Box<Node> },

    /// `+x`, `-x`, `!x`
    Unary { op: UnaryOp, argument: Box<Node> },

    /// Arithmetic, relational and equality operators
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `&&` and `||`
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
}
