//! Lexer for indicator formulas.
//!
//! Converts formula text into a stream of [`Token`]s terminated by a single
//! [`TokenKind::End`].

use lazy_static::lazy_static;
use regex::Regex;

use super::error::FormulaError;
use super::token::{Token, TokenKind};

lazy_static! {
    static ref FIELD_RE: Regex = Regex::new(r"^\$[A-Za-z_][A-Za-z0-9_]*").unwrap();
    static ref STRING_RE: Regex = Regex::new(r#"(?s)^"(?:[^"\\]|\\.)*""#).unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"^[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?").unwrap();
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, FormulaError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            let Some(ch) = self.peek() else {
                tokens.push(Token::end(self.pos));
                break;
            };

            let token = match ch {
                '(' => self.single_char(TokenKind::LParen),
                ')' => self.single_char(TokenKind::RParen),
                '[' => self.single_char(TokenKind::LBracket),
                ']' => self.single_char(TokenKind::RBracket),
                ',' => self.single_char(TokenKind::Comma),
                '+' => self.single_char(TokenKind::Plus),
                '-' => self.single_char(TokenKind::Minus),
                '*' => self.single_char(TokenKind::Star),
                '/' => self.single_char(TokenKind::Slash),
                '<' => self.with_optional_eq(TokenKind::Less, TokenKind::LessEqual),
                '>' => self.with_optional_eq(TokenKind::Greater, TokenKind::GreaterEqual),
                '=' => self.with_optional_eq(TokenKind::Equal, TokenKind::Equal),
                '!' => self.with_optional_eq(TokenKind::Bang, TokenKind::NotEqual),
                '$' => self.lex_field()?,
                '"' => self.lex_string()?,
                '0'..='9' => self.lex_match(&NUMBER_RE, TokenKind::Number)?,
                'a'..='z' | 'A'..='Z' | '_' => self.lex_match(&IDENT_RE, TokenKind::Identifier)?,
                _ => {
                    return Err(FormulaError::UnrecognizedToken {
                        offset: self.pos,
                        remainder: self.rest().to_string(),
                    });
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let offset = self.pos;
        self.pos += len;
        Token::new(kind, &self.source[offset..self.pos], offset)
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        self.take(kind, 1)
    }

    /// `<`, `>`, `=` and `!` absorb one following `=`.
    fn with_optional_eq(&mut self, bare: TokenKind, extended: TokenKind) -> Token {
        if self.rest()[1..].starts_with('=') {
            self.take(extended, 2)
        } else {
            self.take(bare, 1)
        }
    }

    fn lex_field(&mut self) -> Result<Token, FormulaError> {
        match FIELD_RE.find(self.rest()) {
            Some(m) => Ok(self.take(TokenKind::Field, m.end())),
            None => Err(FormulaError::InvalidField {
                offset: self.pos,
                remainder: self.rest().to_string(),
            }),
        }
    }

    fn lex_string(&mut self) -> Result<Token, FormulaError> {
        match STRING_RE.find(self.rest()) {
            Some(m) => Ok(self.take(TokenKind::Str, m.end())),
            None => Err(FormulaError::UnterminatedString {
                offset: self.pos,
                remainder: self.rest().to_string(),
            }),
        }
    }

    fn lex_match(&mut self, re: &Regex, kind: TokenKind) -> Result<Token, FormulaError> {
        match re.find(self.rest()) {
            Some(m) => Ok(self.take(kind, m.end())),
            None => Err(FormulaError::UnrecognizedToken {
                offset: self.pos,
                remainder: self.rest().to_string(),
            }),
        }
    }
}

/// Tokenize a whole formula.
pub fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    Lexer::new(source).tokenize()
}
