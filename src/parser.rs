use crate::ast::{
    BinOp, Expr, Literal, LogicalOp, Node, Property, PropertyKey, Token, TokenKind, UnaryOp,
};

/// Errors raised when the token stream does not match the grammar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: usize,
    },

    #[error("Unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: String },

    #[error("'{text}' at position {position} is not a valid identifier")]
    InvalidIdentifier { text: String, position: usize },

    #[error("Trying to assign a value to a non l-value")]
    InvalidAssignmentTarget,
}

/// Recursive-descent parser producing a `Program` node.
///
/// Each grammar rule is one method, ordered from loosest to tightest
/// binding; see [`crate::ast`] for the grammar.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    /// Parse the whole token stream.
    ///
    /// Trailing tokens that no rule consumes are an error.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let program = self.parse_program()?;
        if let Some(token) = self.tokens.get(self.position) {
            return Err(ParseError::UnexpectedToken {
                found: token.text.clone(),
                expected: "end of expression".to_string(),
                position: token.position,
            });
        }
        Ok(program)
    }

    // ========================================
    // Token primitives
    // ========================================

    fn head(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Head token if its text is one of `expected` (any token when empty).
    fn peek(&self, expected: &[&str]) -> Option<&Token> {
        self.head()
            .filter(|token| expected.is_empty() || expected.contains(&token.text.as_str()))
    }

    /// Like [`Self::peek`], but removes the matched token.
    fn expect(&mut self, expected: &[&str]) -> Option<Token> {
        let token = self.peek(expected)?.clone();
        self.position += 1;
        Some(token)
    }

    /// Like [`Self::expect`], but a missing match is an error.
    fn consume(&mut self, expected: &str) -> Result<Token, ParseError> {
        if let Some(token) = self.expect(&[expected]) {
            return Ok(token);
        }
        Err(self.unexpected(&format!("'{expected}'")))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.head() {
            Some(token) => ParseError::UnexpectedToken {
                found: token.text.clone(),
                expected: expected.to_string(),
                position: token.position,
            },
            None => ParseError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    // ========================================
    // Grammar rules
    // ========================================

    fn parse_program(&mut self) -> Result<Node, ParseError> {
        let mut body = vec![];
        loop {
            if self.head().is_some() && self.peek(&["}", ")", ";", "]"]).is_none() {
                body.push(self.parse_filter_chain()?);
            }
            if self.expect(&[";"]).is_none() {
                return Ok(Node::new(Expr::Program(body)));
            }
        }
    }

    fn parse_filter_chain(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_assignment()?;
        while self.expect(&["|"]).is_some() {
            left = self.parse_filter(left)?;
        }
        Ok(left)
    }

    /// One `name:arg:arg` stage; the piped value becomes the first argument.
    fn parse_filter(&mut self, input: Node) -> Result<Node, ParseError> {
        let callee = self.parse_identifier()?;
        let mut arguments = vec![input];
        while self.expect(&[":"]).is_some() {
            arguments.push(self.parse_assignment()?);
        }
        Ok(Node::new(Expr::Call {
            callee: Box::new(callee),
            arguments,
            filter: true,
        }))
    }

    fn parse_assignment(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_ternary()?;
        if self.expect(&["="]).is_some() {
            let right = self.parse_ternary()?;
            return Ok(Node::new(Expr::Assignment {
                left: Box::new(left),
                right: Box::new(right),
            }));
        }
        Ok(left)
    }

    fn parse_ternary(&mut self) -> Result<Node, ParseError> {
        let test = self.parse_logical_or()?;
        if self.expect(&["?"]).is_some() {
            let consequent = self.parse_assignment()?;
            self.consume(":")?;
            let alternate = self.parse_assignment()?;
            return Ok(Node::new(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            }));
        }
        Ok(test)
    }

    fn parse_logical_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.expect(&["||"]).is_some() {
            let right = self.parse_logical_and()?;
            left = Node::new(Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_equality()?;
        while self.expect(&["&&"]).is_some() {
            let right = self.parse_equality()?;
            left = Node::new(Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    /// Left-associative chain of binary operators drawn from `symbols`.
    fn parse_binary_chain(
        &mut self,
        symbols: &[&str],
        next: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        let mut left = next(self)?;
        while let Some(op) = self
            .peek(symbols)
            .and_then(|token| BinOp::from_symbol(&token.text))
        {
            self.position += 1;
            let right = next(self)?;
            left = Node::new(Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_chain(&["==", "!=", "===", "!=="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_chain(&["<", ">", "<=", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_chain(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, ParseError> {
        self.parse_binary_chain(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        if let Some(op) = self
            .peek(&["+", "-", "!"])
            .and_then(|token| UnaryOp::from_symbol(&token.text))
        {
            self.position += 1;
            let argument = self.parse_unary()?; // Right-associative
            return Ok(Node::new(Expr::Unary {
                op,
                argument: Box::new(argument),
            }));
        }
        self.parse_primary()
    }

    /// Parse primary expressions (atoms) followed by `.name`, `[key]` and
    /// `(args)` postfixes.
    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let mut primary = if self.expect(&["("]).is_some() {
            let inner = self.parse_filter_chain()?;
            self.consume(")")?;
            inner
        } else if self.expect(&["["]).is_some() {
            self.parse_array_literal()?
        } else if self.expect(&["{"]).is_some() {
            self.parse_object_literal()?
        } else {
            self.parse_atom()?
        };

        while let Some(token) = self.expect(&["(", "[", "."]) {
            primary = match token.text.as_str() {
                "(" => {
                    let arguments = self.parse_arguments()?;
                    self.consume(")")?;
                    Node::new(Expr::Call {
                        callee: Box::new(primary),
                        arguments,
                        filter: false,
                    })
                }
                "[" => {
                    let property = self.parse_filter_chain()?;
                    self.consume("]")?;
                    Node::new(Expr::Member {
                        object: Box::new(primary),
                        property: Box::new(property),
                        computed: true,
                    })
                }
                _ => {
                    let property = self.parse_identifier()?;
                    Node::new(Expr::Member {
                        object: Box::new(primary),
                        property: Box::new(property),
                        computed: false,
                    })
                }
            };
        }
        Ok(primary)
    }

    /// Keywords, identifiers and literal constants.
    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.head() else {
            return Err(self.unexpected("an expression"));
        };

        if token.is_identifier() {
            let keyword = match token.text.as_str() {
                "null" => Some(Expr::Literal(Literal::Null)),
                "true" => Some(Expr::Literal(Literal::Boolean(true))),
                "false" => Some(Expr::Literal(Literal::Boolean(false))),
                "this" => Some(Expr::This),
                _ => None,
            };
            if let Some(expr) = keyword {
                self.position += 1;
                return Ok(Node::new(expr));
            }
            return self.parse_identifier();
        }

        if let TokenKind::Constant(value) = &token.kind {
            let value = value.clone();
            self.position += 1;
            return Ok(Node::new(Expr::Literal(value)));
        }

        Err(self.unexpected("an expression"))
    }

    fn parse_identifier(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.head() else {
            return Err(self.unexpected("an identifier"));
        };
        if !token.is_identifier() {
            return Err(ParseError::InvalidIdentifier {
                text: token.text.clone(),
                position: token.position,
            });
        }
        let name = token.text.clone();
        self.position += 1;
        Ok(Node::new(Expr::Identifier(name)))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut arguments = vec![];
        if self.peek(&[")"]).is_none() {
            loop {
                arguments.push(self.parse_filter_chain()?);
                if self.expect(&[","]).is_none() {
                    break;
                }
            }
        }
        Ok(arguments)
    }

    fn parse_array_literal(&mut self) -> Result<Node, ParseError> {
        let mut elements = vec![];
        if self.peek(&["]"]).is_none() {
            loop {
                // trailing comma
                if self.peek(&["]"]).is_some() {
                    break;
                }
                elements.push(self.parse_assignment()?);
                if self.expect(&[","]).is_none() {
                    break;
                }
            }
        }
        self.consume("]")?;
        Ok(Node::new(Expr::Array(elements)))
    }

    fn parse_object_literal(&mut self) -> Result<Node, ParseError> {
        let mut properties = vec![];
        if self.peek(&["}"]).is_none() {
            loop {
                if self.peek(&["}"]).is_some() {
                    break;
                }
                let key = self.parse_property_key()?;
                self.consume(":")?;
                let value = self.parse_assignment()?;
                properties.push(Property { key, value });
                if self.expect(&[","]).is_none() {
                    break;
                }
            }
        }
        self.consume("}")?;
        Ok(Node::new(Expr::Object(properties)))
    }

    fn parse_property_key(&mut self) -> Result<PropertyKey, ParseError> {
        let Some(token) = self.head() else {
            return Err(self.unexpected("an object key"));
        };
        let key = match &token.kind {
            TokenKind::Constant(value) => PropertyKey::Literal(value.clone()),
            TokenKind::Identifier => PropertyKey::Identifier(token.text.clone()),
            TokenKind::Symbol => return Err(self.unexpected("an object key")),
        };
        self.position += 1;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse(source: &str) -> Result<Node, ParseError> {
        Parser::new(lex(source).unwrap()).parse()
    }

    fn single(source: &str) -> Expr {
        match parse(source).unwrap().expr {
            Expr::Program(mut body) if body.len() == 1 => body.remove(0).expr,
            other => panic!("expected a single statement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse("").unwrap().expr, Expr::Program(vec![]));
    }

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        let Expr::Binary { op, right, .. } = single("2 + 3 * 4") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(right.expr, Expr::Binary { op: BinOp::Multiply, .. }));
    }

    #[test]
    fn test_filter_is_lowest_precedence() {
        let Expr::Call {
            filter, arguments, ..
        } = single("a + b | f:1")
        else {
            panic!("expected filter call");
        };
        assert!(filter);
        assert_eq!(arguments.len(), 2);
        assert!(matches!(arguments[0].expr, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_chained_assignment_is_rejected() {
        assert!(parse("a = b = 1").is_err());
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            parse("(1 + 2"),
            Err(ParseError::UnexpectedEnd {
                expected: "')'".to_string()
            })
        );
    }

    #[test]
    fn test_member_after_dot_must_be_identifier() {
        assert!(matches!(
            parse("a.1"),
            Err(ParseError::UnexpectedToken { .. }) | Err(ParseError::InvalidIdentifier { .. })
        ));
    }
}
