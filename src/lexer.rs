use tracing::debug;

use crate::ast::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Raw template text up to the next `${` / `#{`
    Text,
    /// Expression tokens up to the closing `}`
    Expression,
}

/// Dual-mode scanner.
///
/// Starts in text mode. Seeing `${` or `#{` switches to expression mode; the
/// parser switches back with [`Lexer::set_text_mode`] once it has consumed the
/// closing `}`. Scanning never fails: malformed input produces
/// [`Token::NoSym`] or a truncated literal.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
    mode: Mode,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
            mode: Mode::Text,
        }
    }

    /// Switches back to literal-text scanning.
    pub fn set_text_mode(&mut self) {
        self.mode = Mode::Text;
    }

    pub fn is_text_mode(&self) -> bool {
        self.mode == Mode::Text
    }

    /// Raw source of the most recently scanned token.
    pub fn current_source_slice(&self) -> String {
        self.input[self.token_start..self.position].iter().collect()
    }

    /// Character offset where the most recently scanned token starts.
    pub fn token_position(&self) -> usize {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn at_opener(&self) -> bool {
        matches!(self.current_char(), Some('$' | '#')) && self.peek_char(1) == Some('{')
    }

    pub fn next_token(&mut self) -> Token {
        match self.mode {
            Mode::Text => self.next_text_token(),
            Mode::Expression => self.next_expression_token(),
        }
    }

    fn next_text_token(&mut self) -> Token {
        self.token_start = self.position;

        if self.at_opener() {
            let token = if self.current_char() == Some('$') {
                Token::DollarBrace
            } else {
                Token::HashBrace
            };
            self.advance();
            self.advance();
            self.mode = Mode::Expression;
            return token;
        }

        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if self.at_opener() {
                break;
            }
            // `\${` and `\#{` stand for the opener itself
            if ch == '\\'
                && let Some(sigil @ ('$' | '#')) = self.peek_char(1)
                && self.peek_char(2) == Some('{')
            {
                text.push(sigil);
                text.push('{');
                self.position += 3;
                continue;
            }
            text.push(ch);
            self.advance();
        }

        if text.is_empty() {
            Token::Eof
        } else {
            Token::Text(text)
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Length of a `:local` suffix (colon included) that makes the identifier
    /// just read a namespace prefix. Only taken when the qualified name is
    /// called, so `a ? b:c` keeps its ternary reading.
    fn qualified_suffix_len(&self) -> Option<usize> {
        if self.current_char() != Some(':') {
            return None;
        }
        if !self.peek_char(1).is_some_and(|c| c.is_alphabetic() || c == '_') {
            return None;
        }

        let mut len = 2;
        while self.peek_char(len).is_some_and(|c| c.is_alphanumeric() || c == '_') {
            len += 1;
        }
        let mut look = len;
        while self.peek_char(look).is_some_and(char::is_whitespace) {
            look += 1;
        }
        (self.peek_char(look) == Some('(')).then_some(len)
    }

    fn read_string(&mut self, quote: char) -> String {
        let mut result = String::new();
        self.advance(); // Consume opening quote

        loop {
            match self.current_char() {
                Some(c) if c == quote => {
                    self.advance();
                    return result;
                }
                Some('\n' | '\r') | None => {
                    debug!(
                        position = self.token_start,
                        "unterminated string literal truncated"
                    );
                    return result;
                }
                Some('\\') => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('b') => result.push('\u{8}'),
                        Some('t') => result.push('\t'),
                        Some('n') => result.push('\n'),
                        Some('f') => result.push('\u{c}'),
                        Some('r') => result.push('\r'),
                        Some(ch) => result.push(ch),
                        None => continue,
                    }
                    self.advance();
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn read_digits(&mut self, number: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        self.read_digits(&mut number);

        let mut is_float = false;
        if self.current_char() == Some('.')
            && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            number.push('.');
            self.advance();
            self.read_digits(&mut number);

            if matches!(self.current_char(), Some('e' | 'E'))
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                number.push('e');
                self.advance();
                self.read_digits(&mut number);
            }
        }

        if is_float {
            Token::Double(number.parse::<f64>().unwrap_or(0.0))
        } else {
            match number.parse::<i64>() {
                Ok(n) => Token::Integer(n),
                // Too large for 64 bits
                Err(_) => Token::Double(number.parse::<f64>().unwrap_or(f64::INFINITY)),
            }
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn pair(&mut self, token: Token) -> Token {
        self.advance();
        self.advance();
        token
    }

    fn next_expression_token(&mut self) -> Token {
        self.skip_whitespace();
        self.token_start = self.position;

        match self.current_char() {
            None => Token::Eof,
            Some('$') if self.peek_char(1) == Some('{') => self.pair(Token::DollarBrace),
            Some('#') if self.peek_char(1) == Some('{') => self.pair(Token::HashBrace),
            Some('}') => self.single(Token::RBrace),
            Some('|') if self.peek_char(1) == Some('|') => self.pair(Token::Or),
            Some('&') if self.peek_char(1) == Some('&') => self.pair(Token::And),
            Some('=') if self.peek_char(1) == Some('=') => self.pair(Token::Eq),
            Some('>') => match self.peek_char(1) {
                Some('=') => self.pair(Token::Ge),
                _ => self.single(Token::Gt),
            },
            Some('<') => match self.peek_char(1) {
                Some('=') => self.pair(Token::Le),
                Some('>') => self.pair(Token::Ne),
                _ => self.single(Token::Lt),
            },
            Some('!') => match self.peek_char(1) {
                Some('=') => self.pair(Token::Ne),
                _ => self.single(Token::Not),
            },
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('%') => self.single(Token::Percent),
            Some('?') => self.single(Token::Question),
            Some(':') => self.single(Token::Colon),
            Some('.') => self.single(Token::Dot),
            Some(',') => self.single(Token::Comma),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some(quote @ ('"' | '\'')) => Token::String(self.read_string(quote)),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let mut ident = self.read_identifier();

                if let Some(len) = self.qualified_suffix_len() {
                    ident.extend(&self.input[self.position..self.position + len]);
                    self.position += len;
                    return Token::Ident(ident);
                }

                match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "div" => Token::Slash,
                    "mod" => Token::Percent,
                    "eq" => Token::Eq,
                    "ne" => Token::Ne,
                    "lt" => Token::Lt,
                    "gt" => Token::Gt,
                    "le" => Token::Le,
                    "ge" => Token::Ge,
                    "instanceof" => Token::InstanceOf,
                    "empty" => Token::Empty,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    _ => Token::Ident(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => self.single(Token::NoSym(ch)),
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("${and or not div mod eq ne lt gt le ge empty null}");
    assert_eq!(lexer.next_token(), Token::DollarBrace);
    assert_eq!(lexer.next_token(), Token::And);
    assert_eq!(lexer.next_token(), Token::Or);
    assert_eq!(lexer.next_token(), Token::Not);
    assert_eq!(lexer.next_token(), Token::Slash);
    assert_eq!(lexer.next_token(), Token::Percent);
    assert_eq!(lexer.next_token(), Token::Eq);
    assert_eq!(lexer.next_token(), Token::Ne);
    assert_eq!(lexer.next_token(), Token::Lt);
    assert_eq!(lexer.next_token(), Token::Gt);
    assert_eq!(lexer.next_token(), Token::Le);
    assert_eq!(lexer.next_token(), Token::Ge);
    assert_eq!(lexer.next_token(), Token::Empty);
    assert_eq!(lexer.next_token(), Token::Null);
    assert_eq!(lexer.next_token(), Token::RBrace);
}

#[test]
fn test_source_slice_tracks_last_token() {
    let mut lexer = Lexer::new("ab ${ x1 >= 2.50 }");
    assert_eq!(lexer.next_token(), Token::Text("ab ".to_string()));
    assert_eq!(lexer.current_source_slice(), "ab ");
    assert_eq!(lexer.next_token(), Token::DollarBrace);
    assert_eq!(lexer.next_token(), Token::Ident("x1".to_string()));
    assert_eq!(lexer.current_source_slice(), "x1");
    assert_eq!(lexer.next_token(), Token::Ge);
    assert_eq!(lexer.next_token(), Token::Double(2.5));
    assert_eq!(lexer.current_source_slice(), "2.50");
    assert_eq!(lexer.token_position(), 12);
}

#[test]
fn test_qualified_name_needs_call() {
    let mut lexer = Lexer::new("${fn:length(x) ? a:b}");
    assert_eq!(lexer.next_token(), Token::DollarBrace);
    assert_eq!(lexer.next_token(), Token::Ident("fn:length".to_string()));
    assert_eq!(lexer.next_token(), Token::LParen);
    assert_eq!(lexer.next_token(), Token::Ident("x".to_string()));
    assert_eq!(lexer.next_token(), Token::RParen);
    assert_eq!(lexer.next_token(), Token::Question);
    assert_eq!(lexer.next_token(), Token::Ident("a".to_string()));
    assert_eq!(lexer.next_token(), Token::Colon);
    assert_eq!(lexer.next_token(), Token::Ident("b".to_string()));
}
