use crate::decimal::Decimal;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    /// Prefix minus.
    Neg,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Rem => "%",
            Operator::Pow => "^",
            Operator::Neg => "neg",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Neg)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Decimal),
    /// Variable reference, stored without the leading `$`.
    Variable(String),
    /// Bare identifier; only meaningful as a function name.
    Ident(String),
    Operator(Operator),
    LParen,
    RParen,
    Comma,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n.to_trimmed_string()),
            Token::Variable(name) => write!(f, "${}", name),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Join tokens with spaces, for trace output.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
}

/// Remove thousands separators: a comma between a digit and a group of exactly
/// three digits (`1,000,000` -> `1000000`). Argument commas such as `max(1,2,3)`
/// are left alone.
pub fn strip_thousands_separators(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' && is_group_separator(&chars, i) {
            continue;
        }
        out.push(c);
    }
    out
}

fn is_group_separator(chars: &[char], i: usize) -> bool {
    let digit_at = |j: usize| chars.get(j).map_or(false, |c| c.is_ascii_digit());
    i > 0 && digit_at(i - 1) && digit_at(i + 1) && digit_at(i + 2) && digit_at(i + 3) && !digit_at(i + 4)
}

#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    /// Last token produced, used to tell prefix from infix minus.
    prev: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input: input.as_bytes(), pos: 0, prev: None }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) {
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize) -> &'a str {
        // Token bytes are ASCII, so any boundary chosen here is a char boundary
        let input: &'a [u8] = self.input;
        std::str::from_utf8(&input[start..self.pos]).unwrap_or_default()
    }

    fn in_prefix_position(&self) -> bool {
        matches!(self.prev, None | Some(Token::Operator(_) | Token::LParen | Token::Comma))
    }

    /// `\d*\.\d+ | \d+`, entered on a digit or on a `.` that precedes a digit.
    fn number(&mut self, start: usize) -> Option<Token> {
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.pos += 1;
            self.take_while(|c| c.is_ascii_digit());
        }
        let text = self.slice(start);
        match text.parse::<Decimal>() {
            Ok(n) => Some(Token::Number(n)),
            Err(e) => {
                log::warn!("dropping number '{}': {}", text, e);
                None
            }
        }
    }

    fn identifier(&mut self, start: usize) -> Token {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        Token::Ident(self.slice(start).to_string())
    }

    fn variable(&mut self) -> Option<Token> {
        if !matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_')) {
            log::warn!("ignoring '$' at position {}: not followed by a variable name", self.pos - 1);
            return None;
        }
        let start = self.pos;
        self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        Some(Token::Variable(self.slice(start).to_string()))
    }

    /// Next token, or `None` at end of input. Characters outside the grammar are
    /// skipped with a warning.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_ws();
            let start = self.pos;
            let ch = self.bump()?;

            let tok = match ch {
                b'0'..=b'9' => self.number(start),
                b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => self.number(start),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => Some(self.identifier(start)),
                b'$' => self.variable(),
                b'+' if self.in_prefix_position() => None,
                b'-' if self.in_prefix_position() => Some(Token::Operator(Operator::Neg)),
                b'+' => Some(Token::Operator(Operator::Add)),
                b'-' => Some(Token::Operator(Operator::Sub)),
                b'*' => Some(Token::Operator(Operator::Mul)),
                b'/' => Some(Token::Operator(Operator::Div)),
                b'%' => Some(Token::Operator(Operator::Rem)),
                b'^' => Some(Token::Operator(Operator::Pow)),
                b'(' => Some(Token::LParen),
                b')' => Some(Token::RParen),
                b',' => Some(Token::Comma),
                _ => {
                    // Skip the whole UTF-8 sequence so the warning shows the real character
                    while matches!(self.peek(), Some(b) if b & 0xC0 == 0x80) {
                        self.pos += 1;
                    }
                    log::warn!("ignoring unrecognised input '{}' at position {}", self.slice(start), start);
                    None
                }
            };

            if let Some(tok) = tok {
                self.prev = Some(tok.clone());
                return Some(tok);
            }
        }
    }
}

/// Tokenize a raw expression, thousands separators included.
pub fn tokenize(input: &str) -> Vec<Token> {
    let cleaned = strip_thousands_separators(input);
    let mut lexer = Lexer::new(&cleaned);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token() {
        tokens.push(tok);
    }
    log::debug!("tokens: {}", render_tokens(&tokens));
    tokens
}
