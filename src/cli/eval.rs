//! Evaluate an expression against JSON context and locals

use super::CliError;
use crate::{Engine, Value};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Expression source text
    pub expression: String,
    /// JSON document used as the context
    pub context: Option<String>,
    /// JSON record used as locals
    pub locals: Option<String>,
}

/// Result of an evaluation, plus the context as the expression left it
#[derive(Debug)]
pub struct EvalOutput {
    pub result: Value,
    pub context: Value,
}

fn parse_json(text: Option<&str>) -> Result<Option<Value>, CliError> {
    text.map(|text| serde_json::from_str::<serde_json::Value>(text).map(Value::from))
        .transpose()
        .map_err(CliError::from)
}

pub fn execute_eval(engine: &Engine, options: &EvalOptions) -> Result<EvalOutput, CliError> {
    let expression = engine.parse(options.expression.as_str())?;
    let mut context = parse_json(options.context.as_deref())?.unwrap_or_default();
    let mut locals = parse_json(options.locals.as_deref())?;

    let result = expression.evaluate(&mut context, locals.as_mut())?;
    Ok(EvalOutput { result, context })
}
