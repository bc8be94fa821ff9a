//! Dump the token stream of an expression

use super::CliError;
use crate::{ast::TokenKind, lexer::lex};

/// One token as shown by `parsley tokens`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub position: usize,
    pub kind: &'static str,
    pub text: String,
}

pub fn execute_tokens(source: &str) -> Result<Vec<TokenInfo>, CliError> {
    let tokens = lex(source).map_err(crate::Error::from)?;
    Ok(tokens
        .into_iter()
        .map(|token| TokenInfo {
            position: token.position,
            kind: match token.kind {
                TokenKind::Constant(_) => "constant",
                TokenKind::Identifier => "identifier",
                TokenKind::Symbol => "symbol",
            },
            text: token.text,
        })
        .collect())
}
