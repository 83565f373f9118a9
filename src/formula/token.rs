//! Token types for the formula lexer.

use std::fmt;
use std::ops::RangeInclusive;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact text matched from the formula. Empty only for [`TokenKind::End`].
    pub text: String,
    /// Byte offset of the token in the formula.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    pub fn end(offset: usize) -> Self {
        Self::new(TokenKind::End, "", offset)
    }

    /// True for a bare identifier spelled exactly `word`.
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == word
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::End {
            write!(f, "<end>")
        } else {
            write!(f, "{}", self.text)
        }
    }
}

/// The kind of token.
///
/// The order of variants matters: the operators that pass through to the
/// output unchanged sit in one contiguous run from `Plus` to `GreaterEqual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    End,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    // Transparent binary operators
    Plus,
    Minus,
    Star,
    Slash,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Operators that need rewriting
    Equal,
    NotEqual,
    Bang,

    // Operands
    Field,
    Str,
    Number,
    Identifier,
}

const TRANSPARENT_OPERATORS: RangeInclusive<TokenKind> = TokenKind::Plus..=TokenKind::GreaterEqual;

impl TokenKind {
    /// Binary operators copied verbatim into the translation.
    pub fn is_transparent_operator(self) -> bool {
        TRANSPARENT_OPERATORS.contains(&self)
    }

    pub fn is_sign(self) -> bool {
        matches!(self, TokenKind::Plus | TokenKind::Minus)
    }

    /// Tokens that close a list, making it empty when seen first.
    pub fn is_closer(self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBracket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_range_covers_arithmetic_and_relational() {
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
        ] {
            assert!(kind.is_transparent_operator(), "{kind:?}");
        }
    }

    #[test]
    fn rewritten_operators_are_outside_range() {
        for kind in [
            TokenKind::Equal,
            TokenKind::NotEqual,
            TokenKind::Bang,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::End,
        ] {
            assert!(!kind.is_transparent_operator(), "{kind:?}");
        }
    }

    #[test]
    fn display_uses_source_text() {
        assert_eq!(Token::new(TokenKind::Field, "$age", 0).to_string(), "$age");
        assert_eq!(Token::end(4).to_string(), "<end>");
    }

    #[test]
    fn is_word_matches_identifiers_only() {
        assert!(Token::new(TokenKind::Identifier, "AND", 0).is_word("AND"));
        assert!(!Token::new(TokenKind::Str, "AND", 0).is_word("AND"));
        assert!(!Token::new(TokenKind::Identifier, "and", 0).is_word("AND"));
    }
}
