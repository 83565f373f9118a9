//! Error types for the formula translator.

use thiserror::Error;

/// Which stage rejected the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Syntax,
}

/// An error that occurred while translating a formula.
///
/// Lexical variants carry the remainder of the input from the offending
/// character onward; syntax variants carry the offending token and, where
/// one exists, the unparsed text that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("unterminated string literal at {offset}: {remainder}")]
    UnterminatedString { offset: usize, remainder: String },

    #[error("invalid field reference at {offset}: {remainder}")]
    InvalidField { offset: usize, remainder: String },

    #[error("unrecognized token at {offset}: {remainder}")]
    UnrecognizedToken { offset: usize, remainder: String },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unexpected token '{found}' at {offset}, remaining: {remaining}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        remaining: String,
    },

    #[error("consecutive sign operators at {offset}: {remaining}")]
    ConsecutiveSigns { offset: usize, remaining: String },

    #[error("formula nested too deeply at {offset}")]
    NestingTooDeep { offset: usize },

    #[error("unsupported function: {name}")]
    UnsupportedFunction { name: String },

    #[error("{function} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("invalid argument to {function}: {message}")]
    InvalidArgument { function: String, message: String },
}

impl FormulaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::UnterminatedString { .. }
            | FormulaError::InvalidField { .. }
            | FormulaError::UnrecognizedToken { .. } => ErrorKind::Lex,
            _ => ErrorKind::Syntax,
        }
    }
}
