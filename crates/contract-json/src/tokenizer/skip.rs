//! Skipping whole values.

use crate::encoding::CodeUnit;
use crate::error::{JsonError, Result};
use crate::token::{Token, TokenKind};

use super::Tokenizer;

impl<'a, U: CodeUnit> Tokenizer<'a, U> {
    /// Skips one complete value, e.g. the value of an unknown object field.
    pub fn skip_value(&mut self) -> Result<()> {
        self.read_raw_value().map(drop)
    }

    /// Consumes one complete value and returns its source span.
    ///
    /// Nesting is tracked on the heap, so deeply nested input cannot exhaust
    /// the call stack.
    pub fn read_raw_value(&mut self) -> Result<&'a [U]> {
        let first = self.next_token()?;
        let Some(closing) = closing_kind(&first)? else {
            return Ok(first.span);
        };
        let mut open = vec![(closing, 0usize)];
        while let Some((closing, count)) = open.last_mut() {
            let closing = *closing;
            if self.try_read_end_or_separator(closing, count)? {
                open.pop();
                continue;
            }
            if closing == TokenKind::EndObject {
                self.read_name_token()?;
            }
            let token = self.next_token()?;
            if let Some(inner) = closing_kind(&token)? {
                open.push((inner, 0));
            }
        }
        let source = self.source;
        Ok(&source[first.offset..self.offset])
    }
}

fn closing_kind<U: CodeUnit>(token: &Token<'_, U>) -> Result<Option<TokenKind>> {
    match token.kind {
        TokenKind::BeginObject => Ok(Some(TokenKind::EndObject)),
        TokenKind::BeginArray => Ok(Some(TokenKind::EndArray)),
        TokenKind::String
        | TokenKind::IntegerNumber
        | TokenKind::FloatingPointNumber
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Null => Ok(None),
        actual => Err(JsonError::ExpectedValue {
            actual,
            position: token.position(),
        }),
    }
}
