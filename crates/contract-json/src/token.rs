//! Token kinds and zero-copy tokens.

use std::borrow::Cow;
use std::fmt;

use crate::encoding::CodeUnit;
use crate::error::{JsonError, Position, Result};
use crate::unescape::unescape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    String,
    IntegerNumber,
    FloatingPointNumber,
    True,
    False,
    Null,
    /// `:`
    NameValueSeparator,
    /// `,`
    EntrySeparator,
    EndOfDocument,
}

impl TokenKind {
    pub fn is_number(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerNumber | TokenKind::FloatingPointNumber
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::BeginObject => "`{`",
            TokenKind::EndObject => "`}`",
            TokenKind::BeginArray => "`[`",
            TokenKind::EndArray => "`]`",
            TokenKind::String => "string",
            TokenKind::IntegerNumber => "integer number",
            TokenKind::FloatingPointNumber => "floating point number",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::NameValueSeparator => "`:`",
            TokenKind::EntrySeparator => "`,`",
            TokenKind::EndOfDocument => "end of document",
        };
        f.write_str(text)
    }
}

/// A classified slice of the source with its location.
///
/// Tokens borrow from the tokenizer's input and own no memory. String
/// tokens include their quotes and are not unescaped until
/// [`Token::unescape`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a, U> {
    pub kind: TokenKind,
    pub span: &'a [U],
    /// Offset of the first unit of `span` in the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl<'a, U: CodeUnit> Token<'a, U> {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Raw contents of a string token, without the quotes.
    pub fn string_contents(&self) -> &'a [U] {
        if self.kind == TokenKind::String && self.span.len() >= 2 {
            &self.span[1..self.span.len() - 1]
        } else {
            self.span
        }
    }

    /// Decodes the escapes of a string token. UTF-8 strings without escapes
    /// are borrowed from the source.
    pub fn unescape(&self) -> Result<Cow<'a, str>> {
        unescape(self.string_contents()).map_err(|reason| JsonError::InvalidString {
            reason,
            position: self.position(),
        })
    }

    /// Fails with [`JsonError::UnexpectedToken`] unless the kind matches.
    pub fn expect(self, expected: TokenKind) -> Result<Self> {
        if self.kind == expected {
            Ok(self)
        } else {
            Err(JsonError::UnexpectedToken {
                expected,
                actual: self.kind,
                position: self.position(),
            })
        }
    }
}
