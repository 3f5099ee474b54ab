//! Lexical analysis: turns a UTF-8 source string into a token stream.

mod token;
mod token_kind;

pub use token::*;
pub use token_kind::*;

use std::collections::HashMap;
use std::{error::Error, fmt::Display};

use once_cell::sync::Lazy;

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("&", TokenKind::And),
        ("←", TokenKind::Assign),
        ("Ɵ", TokenKind::Break),
        ("○", TokenKind::False),
        ("ƒ", TokenKind::Func),
        ("¿", TokenKind::If),
        ("∞", TokenKind::Loop),
        ("ø", TokenKind::Nil),
        ("|", TokenKind::Or),
        ("✉", TokenKind::Print),
        ("↵", TokenKind::Return),
        ("●", TokenKind::True),
        ("•", TokenKind::Var),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}.", self.message, self.line)
    }
}

impl Error for LexError {}

/// Single-pass scanner over the decoded code points of a source string.
///
/// Errors are collected, not raised: a stray character or an unterminated
/// string is recorded and scanning continues, so one run reports as many
/// problems as possible.
#[derive(Debug, Clone)]
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: vec![],
            errors: vec![],
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scan the whole source, always terminating the stream with a single
    /// EOF token on the final line.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<LexError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", None, self.line));

        (self.tokens, self.errors)
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LParen),
            ')' => self.add_token(TokenKind::RParen),
            '{' => self.add_token(TokenKind::LBrace),
            '}' => self.add_token(TokenKind::RBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            ';' => self.add_token(TokenKind::Semicolon),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            '÷' => self.add_token(TokenKind::Divide),
            '×' => self.add_token(TokenKind::Multiply),
            '!' => self.add_token(TokenKind::Bang),
            '=' => self.add_token(TokenKind::Equal),
            '≠' => self.add_token(TokenKind::NotEqual),
            '>' => self.add_token(TokenKind::Greater),
            '≥' => self.add_token(TokenKind::GreaterEqual),
            '<' => self.add_token(TokenKind::Less),
            '≤' => self.add_token(TokenKind::LessEqual),
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            _ => {
                if is_digit(c) {
                    self.number();
                } else if is_alpha(c) {
                    self.identifier();
                } else {
                    self.errors.push(LexError {
                        message: format!("Unexpected character '{c}'"),
                        line: self.line,
                    });
                }
            }
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.errors.push(LexError {
                message: "Unterminated string".into(),
                line: self.line,
            });
            return;
        }

        // The closing quote.
        self.advance();

        let value = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect::<String>();
        self.add_token_literal(TokenKind::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while is_digit(self.peek()) {
            self.advance();
        }

        if self.peek() == '.' && is_digit(self.peek_next()) {
            self.advance();
            while is_digit(self.peek()) {
                self.advance();
            }
        }

        let text = self.source[self.start..self.current]
            .iter()
            .collect::<String>();
        match text.parse::<f64>() {
            Ok(number) => self.add_token_literal(TokenKind::Number, Some(Literal::Number(number))),
            Err(_) => self.errors.push(LexError {
                message: format!("Could not parse number '{text}'"),
                line: self.line,
            }),
        }
    }

    fn identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let text = self.source[self.start..self.current]
            .iter()
            .collect::<String>();
        match KEYWORDS.get(text.as_str()) {
            Some(kind) => self.add_token(*kind),
            None => self.add_token_literal(TokenKind::Identifier, Some(Literal::String(text))),
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_literal(kind, None);
    }

    fn add_token_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.source[self.start..self.current]
            .iter()
            .collect::<String>();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// ASCII letters, underscore, and the keyword glyphs all count as "alpha",
/// so a keyword glyph directly followed by letters scans as one identifier.
fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(
            c,
            '_' | '&' | '←' | 'Ɵ' | '○' | 'ƒ' | '¿' | '∞' | 'ø' | '|' | '✉' | '↵' | '●' | '•'
        )
}

fn is_alpha_numeric(c: char) -> bool {
    is_alpha(c) || is_digit(c)
}
