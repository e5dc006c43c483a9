use std::fmt;

/// Binary (chainable) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Term level
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`, `div`)
    Divide,
    /// Remainder (`%`, `mod`)
    Modulo,
    /// Logical AND (`&&`, `and`)
    And,

    // Simple-expression level
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Logical OR (`||`, `or`)
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::And => "&&",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Or => "||",
        }
    }
}

/// Relational operators. At most one per relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    /// `==`, `eq`
    Equal,
    /// `!=`, `<>`, `ne`
    NotEqual,
    /// `<`, `lt`
    LessThan,
    /// `>`, `gt`
    GreaterThan,
    /// `<=`, `le`
    LessEqual,
    /// `>=`, `ge`
    GreaterEqual,
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Equal => "==",
            RelOp::NotEqual => "!=",
            RelOp::LessThan => "<",
            RelOp::GreaterThan => ">",
            RelOp::LessEqual => "<=",
            RelOp::GreaterEqual => ">=",
        }
    }

    /// Maps the sign of a comparison to the truth of this relation.
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            RelOp::Equal => ordering == Equal,
            RelOp::NotEqual => ordering != Equal,
            RelOp::LessThan => ordering == Less,
            RelOp::GreaterThan => ordering == Greater,
            RelOp::LessEqual => ordering != Greater,
            RelOp::GreaterEqual => ordering != Less,
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`)
    Minus,
    /// Emptiness test (`empty`)
    Empty,
    /// Logical negation (`!`, `not`)
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Empty => "empty",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
