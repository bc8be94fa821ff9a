//! Validate an expression without evaluating it

use super::CliError;
use crate::Engine;

/// What compiling an expression revealed about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub literal: bool,
    pub constant: bool,
    pub assignable: bool,
}

/// Lex, parse and compile `source`, resolving every filter it names.
pub fn execute_check(engine: &Engine, source: &str) -> Result<CheckReport, CliError> {
    let expression = engine.compile(source)?;
    Ok(CheckReport {
        literal: expression.is_literal(),
        constant: expression.is_constant(),
        assignable: expression.is_assignable(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reports_flags() {
        let engine = Engine::default();
        assert_eq!(
            execute_check(&engine, "[1, 2] | limitTo:1").unwrap(),
            CheckReport {
                literal: false,
                constant: true,
                assignable: false,
            }
        );
        assert_eq!(
            execute_check(&engine, "a.b").unwrap(),
            CheckReport {
                literal: false,
                constant: false,
                assignable: true,
            }
        );
    }

    #[test]
    fn test_check_rejects_syntax_errors() {
        let engine = Engine::default();
        assert!(matches!(
            execute_check(&engine, "a +"),
            Err(CliError::Compile(crate::Error::Parse(_)))
        ));
        assert!(matches!(
            execute_check(&engine, "a | unknown"),
            Err(CliError::Compile(crate::Error::Filter(_)))
        ));
    }
}
