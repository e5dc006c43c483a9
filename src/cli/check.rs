//! Render templates against JSON input

use std::rc::Rc;

use super::CliError;
use crate::{EvalContext, FunctionMapper, Lexer, Parser, Value, json::JsonResolver};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The template to render
    pub template: String,
    /// JSON document whose top-level keys become identifiers
    pub input: Option<String>,
    /// `name=value` string variables, bound before rendering
    pub vars: Vec<(String, String)>,
    /// Only validate syntax, don't render
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Rendered template text
    Rendered(String),
}

/// Splits a `name=value` argument.
pub fn parse_var(arg: &str) -> Result<(String, String), CliError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(CliError::InvalidVar(arg.to_string())),
    }
}

/// Execute an elx check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let functions = Rc::new(FunctionMapper::with_standard_functions());

    let node = Parser::new(Lexer::new(&options.template))
        .with_functions(&functions)
        .parse_strict()?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let document = match &options.input {
        Some(json) => serde_json::from_str(json)?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };

    let mut ctx =
        EvalContext::new(JsonResolver::new(document)).with_shared_functions(Rc::clone(&functions));
    for (name, value) in &options.vars {
        ctx.variables_mut()
            .set_variable(name.as_str(), Value::from(value.as_str()))?;
    }

    Ok(CheckResult::Rendered(node.evaluate_to_string(&mut ctx)?))
}
