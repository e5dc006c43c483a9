//! # Expression Language - Abstract Syntax Tree
//!
//! This module defines the tree the [parser](crate::parser) builds from a
//! template and the evaluator walks on every evaluation.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - AST nodes and designator steps
//! - **[operators]** - Binary, relational and unary operators
//!
//! ## Quick Start
//!
//! ```text
//! Hello ${user.name}, you have ${count > 0 ? count : 'no'} messages
//! ```
//!
//! parses to a `Composite` whose children are the literal text segments and
//! the two expression bodies, in order.
//!
//! ## Precedence (lowest to highest)
//!
//! ```text
//! ?:                                  Choice
//! == != < > <= >= eq ne lt gt le ge   Relation (at most one)
//! + - || or                           Simple expression (chained)
//! * / div % mod && and                Term (chained)
//! not, literals, identifiers, ( )     Factor
//! ```
//!
//! Note that `and` binds tighter than relations, so compound conditions need
//! parentheses: `(a < b) and (c < d)`.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Designator, Node};
pub use operators::{BinOp, RelOp, UnaryOp};
pub use tokens::Token;
