use std::mem;

use tracing::debug;

use crate::{
    ast::{BinOp, Designator, Node, RelOp, Token, UnaryOp},
    diagnostics::{Diagnostic, ErrorCode, ErrorHandler, ErrorKind},
    error::ParseError,
    lexer::Lexer,
    mapper::FunctionMapper,
    value::Value,
};

/// Deepest nesting of sub-expressions (groupings, indexes, arguments, choice
/// branches, `not` operands) the parser descends into.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive-descent parser with one token of lookahead.
///
/// Never fails: every problem is recorded as a [`Diagnostic`], handed to the
/// error handler if one is installed, and the parser resynchronizes by
/// skipping tokens. The returned tree is best effort when
/// [`Parser::error_count`] is non-zero.
pub struct Parser<'a> {
    lexer: Lexer,
    current_token: Token,
    diagnostics: Vec<Diagnostic>,
    error_handler: Option<ErrorHandler<'a>>,
    functions: Option<&'a FunctionMapper>,
    depth: usize,
}

/// Parses `source`, failing if any diagnostic was raised.
///
/// ```
/// use elx_lang::parse;
///
/// assert!(parse("${a + }").is_err());
/// assert!(parse("Hello ${name}!").is_ok());
/// ```
pub fn parse(source: &str) -> Result<Node, ParseError> {
    Parser::new(Lexer::new(source)).parse_strict()
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer) -> Self {
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            diagnostics: Vec::new(),
            error_handler: None,
            functions: None,
            depth: 0,
        }
    }

    /// Installs a callback that sees every diagnostic as it is raised.
    pub fn with_error_handler(mut self, handler: impl FnMut(&Diagnostic) + 'a) -> Self {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Enables call-arity checks against the given functions.
    pub fn with_functions(mut self, functions: &'a FunctionMapper) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn report(&mut self, code: ErrorCode, kind: ErrorKind) {
        let diagnostic = Diagnostic {
            code: code.code(),
            kind,
            position: self.lexer.token_position(),
            found: self.lexer.current_source_slice(),
        };
        debug!(
            code = diagnostic.code,
            position = diagnostic.position,
            found = %diagnostic.found,
            "{}",
            diagnostic.message()
        );
        if let Some(handler) = self.error_handler.as_mut() {
            handler(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    fn syntax_error(&mut self, code: ErrorCode) {
        self.report(code, ErrorKind::Syntax);
    }

    fn semantic_error(&mut self, code: ErrorCode) {
        self.report(code, ErrorKind::Semantic);
    }

    /// Consumes `closing` or reports `code` without consuming anything.
    fn expect_closing(&mut self, closing: Token, code: ErrorCode) {
        if self.check(&closing) {
            self.advance();
        } else {
            self.syntax_error(code);
        }
    }

    /// Parses a whole template into a Composite node.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn parse(&mut self) -> Node {
        let mut parts = Vec::new();

        loop {
            match mem::replace(&mut self.current_token, Token::Eof) {
                Token::Eof => break,
                Token::Text(text) => {
                    parts.push(Node::text(text));
                    self.advance();
                }
                Token::DollarBrace | Token::HashBrace => {
                    self.advance();
                    parts.push(self.parse_choice());
                    self.close_expression();
                }
                other => {
                    self.current_token = other;
                    self.syntax_error(ErrorCode::OperandExpected);
                    self.advance();
                }
            }
        }

        Node::Composite(parts)
    }

    /// Like [`Parser::parse`], but any diagnostic turns into an error.
    pub fn parse_strict(&mut self) -> Result<Node, ParseError> {
        let node = self.parse();
        if self.diagnostics.is_empty() {
            Ok(node)
        } else {
            Err(ParseError {
                diagnostics: self.diagnostics.clone(),
            })
        }
    }

    /// Expects the `}` closing an expression body, then hands the scanner back
    /// to text mode. The closing brace must be the lookahead when the mode
    /// flips, so nothing past it has been scanned as an expression token.
    fn close_expression(&mut self) {
        if !self.check(&Token::RBrace) {
            let code = if self.current_token.starts_primary() {
                ErrorCode::OperatorExpected
            } else {
                ErrorCode::BraceExpected
            };
            self.syntax_error(code);
            while !matches!(self.current_token, Token::RBrace | Token::Eof) {
                self.advance();
            }
        }

        if self.check(&Token::RBrace) {
            self.lexer.set_text_mode();
            self.advance();
        }
    }

    /// Runs `parse` one nesting level deeper. Past [`MAX_NESTING_DEPTH`] the
    /// rest of the expression body is skipped and an empty text node stands in.
    fn nested(&mut self, parse: fn(&mut Self) -> Node) -> Node {
        if self.depth >= MAX_NESTING_DEPTH {
            self.syntax_error(ErrorCode::NestingTooDeep);
            while !matches!(self.current_token, Token::RBrace | Token::Eof) {
                self.advance();
            }
            return Node::text("");
        }

        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    fn parse_choice(&mut self) -> Node {
        self.nested(Self::parse_conditional)
    }

    /// choice := relation ('?' choice ':' choice)?
    fn parse_conditional(&mut self) -> Node {
        let condition = self.parse_relation();
        if !self.check(&Token::Question) {
            return condition;
        }
        self.advance();

        let then = self.parse_choice();
        self.expect_closing(Token::Colon, ErrorCode::ColonExpected);
        let otherwise = self.parse_choice();

        Node::Choice {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// relation := simple (relop simple)?
    fn parse_relation(&mut self) -> Node {
        let left = self.parse_simple();

        let op = match self.current_token {
            Token::Eq => RelOp::Equal,
            Token::Ne => RelOp::NotEqual,
            Token::Lt => RelOp::LessThan,
            Token::Gt => RelOp::GreaterThan,
            Token::Le => RelOp::LessEqual,
            Token::Ge => RelOp::GreaterEqual,
            _ => return left,
        };
        self.advance();
        let right = self.parse_simple();

        Node::Relation {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// simple := ('+' | '-' | 'empty')? term (('+' | '-' | 'or') term)*
    fn parse_simple(&mut self) -> Node {
        let mut node = match self.current_token {
            // Unary plus is a no-op
            Token::Plus => {
                self.advance();
                self.parse_term()
            }
            Token::Minus => {
                self.advance();
                Node::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(self.parse_term()),
                }
            }
            Token::Empty => {
                self.advance();
                Node::Unary {
                    op: UnaryOp::Empty,
                    operand: Box::new(self.parse_term()),
                }
            }
            _ => self.parse_term(),
        };

        loop {
            let op = match self.current_token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                Token::Or => BinOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_term();
            node = fold(node, op, right);
        }
        node
    }

    /// term := factor (('*' | '/' | '%' | 'and') factor)*
    fn parse_term(&mut self) -> Node {
        let mut node = self.parse_factor();

        loop {
            let op = match self.current_token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                Token::And => BinOp::And,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor();
            node = fold(node, op, right);
        }
        node
    }

    fn parse_factor(&mut self) -> Node {
        let image = self.lexer.current_source_slice();

        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Ident(name) => {
                self.advance();
                self.parse_designators(name)
            }
            Token::Integer(n) => {
                self.advance();
                self.reject_literal_index(Node::literal(Value::Integer(n), image))
            }
            Token::Double(n) => {
                self.advance();
                self.reject_literal_index(Node::literal(Value::Double(n), image))
            }
            Token::String(s) => {
                self.advance();
                self.reject_literal_index(Node::text(s))
            }
            Token::Boolean(b) => {
                self.advance();
                self.reject_literal_index(Node::literal(Value::Boolean(b), image))
            }
            Token::Null => {
                self.advance();
                self.reject_literal_index(Node::literal(Value::Null, image))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_choice();
                self.expect_closing(Token::RParen, ErrorCode::RParenExpected);
                Node::Grouping(Box::new(inner))
            }
            Token::Not => {
                self.advance();
                Node::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(self.nested(Self::parse_factor)),
                }
            }
            other => {
                self.current_token = other;
                self.recover_operand()
            }
        }
    }

    /// Reports a missing operand and skips ahead to something that can start
    /// one. Yields an empty text node when the expression body ends first.
    fn recover_operand(&mut self) -> Node {
        let code = if matches!(self.current_token, Token::NoSym(_)) {
            ErrorCode::InvalidSymbol
        } else {
            ErrorCode::OperandExpected
        };
        self.syntax_error(code);

        while !self.current_token.starts_primary()
            && !matches!(self.current_token, Token::RBrace | Token::Eof)
        {
            self.advance();
        }

        if self.current_token.starts_primary() {
            self.parse_factor()
        } else {
            Node::text("")
        }
    }

    /// Literals cannot be indexed; the index is parsed for recovery only.
    fn reject_literal_index(&mut self, literal: Node) -> Node {
        while self.check(&Token::LBracket) {
            self.semantic_error(ErrorCode::NotAnArray);
            self.advance();
            self.parse_choice();
            self.expect_closing(Token::RBracket, ErrorCode::RBracketExpected);
        }
        literal
    }

    /// designator := '.' ident | '[' choice ']' | '(' (choice (',' choice)*)? ')'
    fn parse_designators(&mut self, name: String) -> Node {
        let mut designators = Vec::new();

        loop {
            match self.current_token {
                Token::Dot => {
                    self.advance();
                    match mem::replace(&mut self.current_token, Token::Eof) {
                        Token::Ident(member) => {
                            self.advance();
                            designators.push(Designator::Member(member));
                        }
                        other => {
                            self.current_token = other;
                            self.syntax_error(ErrorCode::IdentifierExpected);
                            break;
                        }
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_choice();
                    self.expect_closing(Token::RBracket, ErrorCode::RBracketExpected);
                    designators.push(Designator::Index(index));
                }
                Token::LParen => {
                    self.advance();
                    let args = self.parse_args();
                    if designators.is_empty() {
                        self.check_arity(&name, args.len());
                    }
                    designators.push(Designator::Call(args));
                }
                _ => break,
            }
        }

        Node::Identifier { name, designators }
    }

    fn parse_args(&mut self) -> Vec<Node> {
        let mut args = Vec::new();
        if self.check(&Token::RParen) {
            self.advance();
            return args;
        }

        loop {
            args.push(self.parse_choice());
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect_closing(Token::RParen, ErrorCode::RParenExpected);
        args
    }

    fn check_arity(&mut self, name: &str, count: usize) {
        let too_many = self
            .functions
            .and_then(|functions| functions.resolve_qualified(name))
            .is_some_and(|function| !function.accepts(count));
        if too_many {
            self.semantic_error(ErrorCode::TooManyParameters);
        }
    }
}

/// Appends `right` to a chain of the same operator, or starts a new chain
/// with `left` as its first operand.
fn fold(left: Node, op: BinOp, right: Node) -> Node {
    match left {
        Node::Binary {
            op: chained,
            mut operands,
        } if chained == op => {
            operands.push(right);
            Node::Binary { op, operands }
        }
        left => Node::Binary {
            op,
            operands: vec![left, right],
        },
    }
}
