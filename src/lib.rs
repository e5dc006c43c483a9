//! Embeddable expression language for `${...}` / `#{...}` templates.
//!
//! Source text goes through the dual-mode [`Lexer`], the recursive-descent
//! [`Parser`] builds a [`Node`] tree, and the tree is evaluated against an
//! [`EvalContext`] whose [`Resolver`] binds identifiers to the host's data.
//!
//! ```
//! use elx_lang::{EvalContext, parse};
//!
//! let template = parse("${1 < 2 ? 'yes' : 'no'}, ${10 mod 3}").unwrap();
//! let mut ctx = EvalContext::default();
//! assert_eq!(template.evaluate_to_string(&mut ctx).unwrap(), "yes, 1");
//! ```

pub mod ast;
pub mod cache;
pub mod cli;
pub mod coercion;
pub mod context;
pub mod diagnostics;
pub mod error;
mod evaluator;
pub mod functions;
pub mod json;
pub mod lexer;
pub mod mapper;
pub mod operations;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::{BinOp, Designator, Node, RelOp, Token, UnaryOp};
pub use cache::ExpressionCache;
pub use coercion::TargetType;
pub use context::EvalContext;
pub use diagnostics::{Diagnostic, ErrorCode, ErrorKind};
pub use error::{EvalError, ParseError, TemplateError};
pub use lexer::Lexer;
pub use mapper::{Function, FunctionMapper, ValueExpression, VariableMapper};
pub use parser::{MAX_NESTING_DEPTH, Parser, parse};
pub use resolver::{CompositeResolver, EmptyResolver, Resolver};
pub use value::{EnumType, EnumValue, Kind, Object, Value};
