use crate::{filters::FilterError, guard::SecurityError, lexer::LexError, parser::ParseError};

/// Errors raised while an evaluator runs.
///
/// Each aborts only the evaluation that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The sandbox blocked a member, object or call target
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// Invalid operation for the given value (calling a non-function,
    /// assigning through a primitive)
    #[error("Type error: {0}")]
    Type(String),

    /// `assign` called on an expression that is not a place
    #[error("Expression '{0}' is not assignable")]
    NotAssignable(String),

    /// A filter or host function reported a failure
    #[error("Filter error: {0}")]
    Filter(String),
}

impl EvalError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }
}

/// Internal invariant violation in the code generator.
///
/// Trees produced by the parser never trigger it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Cannot generate code: {0}")]
pub struct GenerationError(pub String);

/// Anything that can go wrong turning source text into an evaluator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        let lex = Error::from(LexError::UnterminatedString { position: 0 });
        assert!(lex.to_string().starts_with("Lex error:"));

        let parse = Error::from(ParseError::InvalidAssignmentTarget);
        assert!(parse.to_string().starts_with("Parse error:"));

        assert!(
            EvalError::type_error("x")
                .to_string()
                .contains("Type error:")
        );
        assert!(EvalError::filter("x").to_string().contains("Filter error:"));
    }
}
