/// Lexical tokens produced by the [`Lexer`](crate::lexer::Lexer).
///
/// Literal-carrying variants hold their decoded value; the raw source slice of
/// the most recent token is available through
/// [`Lexer::current_source_slice`](crate::lexer::Lexer::current_source_slice).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Text mode
    /// Literal template text between expressions
    ///
    /// # Examples
    /// ```text
    /// Hello, ${name}!   // Text("Hello, "), ..., Text("!")
    /// ```
    Text(String),

    /// Immediate expression opener `${`
    DollarBrace,

    /// Deferred expression opener `#{`
    HashBrace,

    /// Expression closer `}`
    RBrace,

    // Literals
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// Floating point literal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1.5E3
    /// ```
    Double(f64),

    /// Single- or double-quoted string literal, escapes decoded
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// "tab\there"
    /// ```
    String(String),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    /// Identifier, possibly namespace-qualified (`fn:length`)
    ///
    /// Starts with a letter or underscore, continues with letters, digits or
    /// underscores. Case-sensitive.
    Ident(String),

    // Relational
    /// `==` or `eq`
    Eq,
    /// `!=`, `<>` or `ne`
    Ne,
    /// `<` or `lt`
    Lt,
    /// `>` or `gt`
    Gt,
    /// `<=` or `le`
    Le,
    /// `>=` or `ge`
    Ge,

    // Arithmetic
    Plus,
    Minus,
    Star,
    /// `/` or `div`
    Slash,
    /// `%` or `mod`
    Percent,

    // Logical
    /// `&&` or `and`
    And,
    /// `||` or `or`
    Or,
    /// `!` or `not`
    Not,
    /// `empty`
    Empty,
    /// `instanceof` (reserved, not part of the grammar)
    InstanceOf,

    // Punctuation
    Question,
    Colon,
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    /// Character that does not start any token
    NoSym(char),

    /// End of input
    Eof,
}

impl Token {
    /// Whether this token can begin a primary expression.
    ///
    /// Used by the parser to resynchronize after a syntax error.
    pub fn starts_primary(&self) -> bool {
        matches!(
            self,
            Token::Ident(_)
                | Token::Integer(_)
                | Token::Double(_)
                | Token::String(_)
                | Token::Boolean(_)
                | Token::Null
                | Token::LParen
                | Token::Not
        )
    }
}
