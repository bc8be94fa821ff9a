use crate::ast::Literal;

/// What kind of lexeme a [`Token`] carries.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric or string constant, already decoded.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// .42e2
    /// 'a\'b'
    /// " "
    /// ```
    Constant(Literal),

    /// Identifier made of letters, digits, `_` and `$`.
    ///
    /// Keywords such as `true`, `null` and `this` are lexed as identifiers;
    /// the parser gives them meaning.
    Identifier,

    /// Structural symbol (`[ ] , { } : . ( ) ? ;`) or operator
    /// (`+ - ! * / % = == != === !== > < >= <= && || |`).
    Symbol,
}

/// Smallest lexical unit produced by the lexer.
///
/// `text` is the exact source slice, which the parser matches against when
/// it peeks for symbols and operators.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Character offset of the first character of the token.
    pub position: usize,
}

impl Token {
    pub fn symbol(text: impl Into<String>, position: usize) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Symbol,
            position,
        }
    }

    pub fn identifier(text: impl Into<String>, position: usize) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Identifier,
            position,
        }
    }

    pub fn constant(text: impl Into<String>, value: Literal, position: usize) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Constant(value),
            position,
        }
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier)
    }

    /// The decoded constant value, if this token is a literal.
    pub fn value(&self) -> Option<&Literal> {
        match &self.kind {
            TokenKind::Constant(value) => Some(value),
            _ => None,
        }
    }
}
