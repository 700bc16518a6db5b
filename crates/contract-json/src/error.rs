//! Error type shared by the tokenizer, writer, contracts and engine.

use std::fmt;

use contract_json_buffers::BufferError;
use thiserror::Error;

use crate::token::TokenKind;

/// 1-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Every failure a (de)serialize call can report.
///
/// Lexical and structural variants carry the [`Position`] of the offending
/// input. None of them are retried; they propagate straight to the caller.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid literal: expected `{expected}`, found `{actual}` at {position}")]
    InvalidLiteral {
        expected: &'static str,
        actual: String,
        position: Position,
    },
    #[error("invalid number: {reason} at {position}")]
    InvalidNumber {
        reason: &'static str,
        position: Position,
    },
    #[error("unexpected character {character:?} at {position}")]
    UnexpectedCharacter { character: char, position: Position },
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },
    #[error("invalid string: {reason} in string starting at {position}")]
    InvalidString {
        reason: &'static str,
        position: Position,
    },
    #[error("unexpected token: expected {expected}, found {actual} at {position}")]
    UnexpectedToken {
        expected: TokenKind,
        actual: TokenKind,
        position: Position,
    },
    #[error("expected a value, found {actual} at {position}")]
    ExpectedValue { actual: TokenKind, position: Position },
    #[error("trailing comma before {closing} at {position}")]
    TrailingComma {
        closing: TokenKind,
        position: Position,
    },
    #[error("number `{text}` does not fit in {target} at {position}")]
    NumberOverflow {
        text: String,
        target: &'static str,
        position: Position,
    },
    #[error("number `{text}` has a fractional part and cannot be read as {target} at {position}")]
    FractionalNumber {
        text: String,
        target: &'static str,
        position: Position,
    },
    #[error("unexpected content after the root value at {position}")]
    TrailingContent { position: Position },
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },
    #[error("nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
    #[error("cannot write non-finite number {0}")]
    NonFiniteNumber(f64),
    #[error("no contract registered for {key}")]
    ContractNotFound { key: String },
    #[error("a contract is already registered for {key}")]
    DuplicateContract { key: String },
    #[error("contract for {key} was handed a value of another type")]
    TypeMismatch { key: String },
    #[error("fallback contract failed: {0}")]
    Fallback(#[from] serde_json::Error),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl JsonError {
    /// Source position for lexical and structural errors.
    pub fn position(&self) -> Option<Position> {
        match self {
            JsonError::InvalidLiteral { position, .. }
            | JsonError::InvalidNumber { position, .. }
            | JsonError::UnexpectedCharacter { position, .. }
            | JsonError::UnterminatedString { position }
            | JsonError::InvalidString { position, .. }
            | JsonError::UnexpectedToken { position, .. }
            | JsonError::ExpectedValue { position, .. }
            | JsonError::TrailingComma { position, .. }
            | JsonError::NumberOverflow { position, .. }
            | JsonError::FractionalNumber { position, .. }
            | JsonError::TrailingContent { position } => Some(*position),
            _ => None,
        }
    }
}

pub type Result<T, E = JsonError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_error_names_expected_and_actual() {
        let err = JsonError::InvalidLiteral {
            expected: "false",
            actual: "fals".into(),
            position: Position::new(1, 1),
        };
        assert_eq!(
            err.to_string(),
            "invalid literal: expected `false`, found `fals` at line 1, column 1"
        );
        assert_eq!(err.position(), Some(Position::new(1, 1)));
    }

    #[test]
    fn configuration_errors_have_no_position() {
        let err = JsonError::ContractNotFound {
            key: "u8".into(),
        };
        assert_eq!(err.position(), None);
        assert_eq!(err.to_string(), "no contract registered for u8");
    }
}
