//! Parser diagnostics: numbered error codes with fixed messages, delivered to a
//! pluggable callback as they are found.

use std::fmt;

/// Whether a diagnostic comes from the grammar or from a semantic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Semantic,
}

/// Registered diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    IdentifierExpected = 1,
    Redeclaration = 2,
    OperatorExpected = 3,
    NotAnArray = 4,
    TooManyParameters = 5,
    BraceExpected = 6,
    OperandExpected = 7,
    RParenExpected = 8,
    RBracketExpected = 9,
    ColonExpected = 10,
    InvalidSymbol = 11,
    NestingTooDeep = 12,
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Message for a diagnostic code; unknown codes get a generic fallback.
pub fn message(code: u32) -> &'static str {
    match code {
        1 => "identifier expected",
        2 => "redeclaration",
        3 => "operator expected",
        4 => "not an array",
        5 => "too many parameters",
        6 => "'}' expected",
        7 => "operand expected",
        8 => "')' expected",
        9 => "']' expected",
        10 => "':' expected",
        11 => "invalid symbol",
        12 => "expression nested too deeply",
        _ => "unregistered error",
    }
}

/// One problem found while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: u32,
    pub kind: ErrorKind,
    /// Character offset of the offending token
    pub position: usize,
    /// Source text of the offending token
    pub found: String,
}

impl Diagnostic {
    pub fn message(&self) -> &'static str {
        message(self.code)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Semantic => "semantic",
        };
        write!(f, "{kind} error {} at {}: {}", self.code, self.position, self.message())?;
        if !self.found.is_empty() {
            write!(f, " (found '{}')", self.found)?;
        }
        Ok(())
    }
}

/// Callback invoked for every diagnostic.
pub type ErrorHandler<'a> = Box<dyn FnMut(&Diagnostic) + 'a>;
