use thiserror::Error;

use crate::{diagnostics::Diagnostic, value::Kind};

/// Errors raised while evaluating an expression.
///
/// Evaluation is fail-fast: the first error aborts the walk and propagates to
/// the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// No conversion exists between the value and the requested representation
    #[error("cannot coerce {from} value '{value}' to {to}")]
    Coercion {
        from: Kind,
        to: String,
        value: String,
    },

    /// Neither operand has an ordering
    #[error("cannot compare {left} with {right}")]
    Comparison { left: Kind, right: Kind },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// `set_value` on a node or property that cannot be written
    #[error("'{0}' is read-only")]
    ReadOnly(String),

    /// The context-object registry has no entry for the requested type
    #[error("no context object of type {0}")]
    UnresolvedContext(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("property '{property}' not found on {target}")]
    PropertyNotFound { target: String, property: String },

    #[error("method '{method}' not found on {target}")]
    MethodNotFound { target: String, method: String },

    #[error("function '{0}' is not registered")]
    FunctionNotFound(String),

    #[error("function '{function}' takes {expected} parameter(s), got {found}")]
    TooManyParameters {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' is already declared")]
    Redeclaration(String),

    #[error("division by zero")]
    DivisionByZero,
}

impl EvalError {
    pub(crate) fn coercion(value: &crate::Value, to: impl Into<String>) -> Self {
        EvalError::Coercion {
            from: value.kind(),
            to: to.into(),
            value: crate::coercion::coerce_to_string(value),
        }
    }
}

/// A template that produced at least one diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render(.diagnostics))]
pub struct ParseError {
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Anything that can go wrong between template source and rendered text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
