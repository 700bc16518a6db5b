//! Typed read helpers: fetch a token and check its kind in one call.

use std::borrow::Cow;

use crate::encoding::{source_text, CodeUnit};
use crate::error::{JsonError, Result};
use crate::number::{
    try_parse_i32, try_parse_i64, try_parse_u32, try_parse_u64, ParseStatus, Parsed,
};
use crate::token::{Token, TokenKind};

use super::Tokenizer;

impl<'a, U: CodeUnit> Tokenizer<'a, U> {
    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token<'a, U>> {
        self.skip_insignificant()?;
        self.clone().next_token()
    }

    pub fn peek_kind(&mut self) -> Result<TokenKind> {
        Ok(self.peek_token()?.kind)
    }

    pub fn expect_token(&mut self, kind: TokenKind) -> Result<Token<'a, U>> {
        self.next_token()?.expect(kind)
    }

    pub fn read_begin_object(&mut self) -> Result<()> {
        self.expect_token(TokenKind::BeginObject).map(drop)
    }

    pub fn read_end_object(&mut self) -> Result<()> {
        self.expect_token(TokenKind::EndObject).map(drop)
    }

    pub fn read_begin_array(&mut self) -> Result<()> {
        self.expect_token(TokenKind::BeginArray).map(drop)
    }

    pub fn read_end_array(&mut self) -> Result<()> {
        self.expect_token(TokenKind::EndArray).map(drop)
    }

    pub fn read_name_value_separator(&mut self) -> Result<()> {
        self.expect_token(TokenKind::NameValueSeparator).map(drop)
    }

    pub fn read_entry_separator(&mut self) -> Result<()> {
        self.expect_token(TokenKind::EntrySeparator).map(drop)
    }

    /// Reads a string token and decodes it into an owned `String`.
    pub fn read_string(&mut self) -> Result<String> {
        self.read_str().map(Cow::into_owned)
    }

    /// Reads a string token, borrowing from the source when possible.
    pub fn read_str(&mut self) -> Result<Cow<'a, str>> {
        self.expect_token(TokenKind::String)?.unescape()
    }

    /// Reads an object key and the `:` after it, returning the raw key token.
    pub fn read_name_token(&mut self) -> Result<Token<'a, U>> {
        let token = self.expect_token(TokenKind::String)?;
        self.read_name_value_separator()?;
        Ok(token)
    }

    /// Reads an object key and the `:` after it, decoded.
    pub fn read_property_name(&mut self) -> Result<Cow<'a, str>> {
        self.read_name_token()?.unescape()
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::True => Ok(true),
            TokenKind::False => Ok(false),
            _ => token.expect(TokenKind::True).map(|_| true),
        }
    }

    pub fn read_null(&mut self) -> Result<()> {
        self.expect_token(TokenKind::Null).map(drop)
    }

    /// Consumes a `null` if one comes next.
    pub fn try_read_null(&mut self) -> Result<bool> {
        let token = self.peek_token()?;
        if token.kind == TokenKind::Null {
            self.consume(&token);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_integer(try_parse_i32, "i32")
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_integer(try_parse_i64, "i64")
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_integer(try_parse_u32, "u32")
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_integer(try_parse_u64, "u64")
    }

    /// Reads an integer or decimal token as `f64`.
    pub fn read_f64(&mut self) -> Result<f64> {
        let token = self.number_token()?;
        U::parse_f64(token.span).ok_or(JsonError::InvalidNumber {
            reason: "not a representable decimal number",
            position: token.position(),
        })
    }

    /// Drives an object loop: returns `true` once `}` is consumed, otherwise
    /// consumes the `,` before every entry after the first and returns
    /// `false`.
    pub fn try_read_end_object_or_separator(&mut self, count: &mut usize) -> Result<bool> {
        self.try_read_end_or_separator(TokenKind::EndObject, count)
    }

    /// Array counterpart of [`Tokenizer::try_read_end_object_or_separator`].
    pub fn try_read_end_array_or_separator(&mut self, count: &mut usize) -> Result<bool> {
        self.try_read_end_or_separator(TokenKind::EndArray, count)
    }

    /// Fails unless only whitespace and comments remain.
    pub fn expect_end_of_document(&mut self) -> Result<()> {
        let token = self.next_token()?;
        if token.kind != TokenKind::EndOfDocument {
            return Err(JsonError::TrailingContent {
                position: token.position(),
            });
        }
        Ok(())
    }

    pub(crate) fn try_read_end_or_separator(
        &mut self,
        closing: TokenKind,
        count: &mut usize,
    ) -> Result<bool> {
        let token = self.peek_token()?;
        if token.kind == closing {
            self.consume(&token);
            return Ok(true);
        }
        if *count > 0 {
            self.consume(&token.expect(TokenKind::EntrySeparator)?);
            let next = self.peek_token()?;
            if next.kind == closing {
                return Err(JsonError::TrailingComma {
                    closing,
                    position: next.position(),
                });
            }
        }
        *count += 1;
        Ok(false)
    }

    fn number_token(&mut self) -> Result<Token<'a, U>> {
        let token = self.next_token()?;
        if token.kind.is_number() {
            Ok(token)
        } else {
            token.expect(TokenKind::IntegerNumber)
        }
    }

    fn read_integer<T: Default>(
        &mut self,
        parse: fn(&[U]) -> Parsed<T>,
        target: &'static str,
    ) -> Result<T> {
        let token = self.number_token()?;
        let parsed = parse(token.span);
        let text = || {
            source_text(token.span)
                .map(Cow::into_owned)
                .unwrap_or_default()
        };
        match parsed.status {
            ParseStatus::ParsingSuccessful => {}
            ParseStatus::Overflow => {
                return Err(JsonError::NumberOverflow {
                    text: text(),
                    target,
                    position: token.position(),
                })
            }
            ParseStatus::NoNumber => {
                return Err(JsonError::InvalidNumber {
                    reason: "expected a digit",
                    position: token.position(),
                })
            }
        }
        // The tokenizer guarantees the remainder is `.` followed by digits.
        let fraction = &token.span[parsed.consumed..];
        let all_zero = fraction
            .iter()
            .skip(1)
            .all(|unit| unit.ascii() == Some(b'0'));
        if !all_zero {
            return Err(JsonError::FractionalNumber {
                text: text(),
                target,
                position: token.position(),
            });
        }
        Ok(parsed.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut tokenizer = Tokenizer::new(b" [1]".as_slice());
        assert_eq!(tokenizer.peek_kind().unwrap(), TokenKind::BeginArray);
        assert_eq!(tokenizer.peek_kind().unwrap(), TokenKind::BeginArray);
        tokenizer.read_begin_array().unwrap();
        assert_eq!(tokenizer.read_i32().unwrap(), 1);
        tokenizer.read_end_array().unwrap();
        tokenizer.expect_end_of_document().unwrap();
    }

    #[test]
    fn integers_from_decimal_tokens() {
        let mut tokenizer = Tokenizer::new(b"12.000 12.5".as_slice());
        assert_eq!(tokenizer.read_i64().unwrap(), 12);
        let err = tokenizer.read_i64().unwrap_err();
        assert!(matches!(err, JsonError::FractionalNumber { ref text, target: "i64", .. } if text == "12.5"));
    }

    #[test]
    fn overflow_names_the_target() {
        let mut tokenizer = Tokenizer::new(b"4294967296".as_slice());
        let err = tokenizer.read_u32().unwrap_err();
        assert_eq!(
            err.to_string(),
            "number `4294967296` does not fit in u32 at line 1, column 1"
        );
    }

    #[test]
    fn reads_floats_and_bools() {
        let units: Vec<u16> = "[-1.5, 2, true, false, null]".encode_utf16().collect();
        let mut tokenizer = Tokenizer::new(&units);
        let mut count = 0;
        let mut seen = Vec::new();
        tokenizer.read_begin_array().unwrap();
        assert!(!tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        seen.push(tokenizer.read_f64().unwrap());
        assert!(!tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        seen.push(tokenizer.read_f64().unwrap());
        assert_eq!(seen, vec![-1.5, 2.0]);
        assert!(!tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        assert!(tokenizer.read_bool().unwrap());
        assert!(!tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        assert!(!tokenizer.read_bool().unwrap());
        assert!(!tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        assert!(tokenizer.try_read_null().unwrap());
        assert!(tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        assert_eq!(count, 5);
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let mut tokenizer = Tokenizer::new(b"[1,]".as_slice());
        let mut count = 0;
        tokenizer.read_begin_array().unwrap();
        assert!(!tokenizer.try_read_end_array_or_separator(&mut count).unwrap());
        tokenizer.read_i32().unwrap();
        let err = tokenizer
            .try_read_end_array_or_separator(&mut count)
            .unwrap_err();
        assert!(matches!(err, JsonError::TrailingComma { closing: TokenKind::EndArray, .. }));
    }

    #[test]
    fn missing_separator_is_reported() {
        let mut tokenizer = Tokenizer::new(br#"{"a":1 "b":2}"#.as_slice());
        let mut count = 0;
        tokenizer.read_begin_object().unwrap();
        assert!(!tokenizer.try_read_end_object_or_separator(&mut count).unwrap());
        assert_eq!(tokenizer.read_property_name().unwrap(), "a");
        tokenizer.read_i32().unwrap();
        let err = tokenizer
            .try_read_end_object_or_separator(&mut count)
            .unwrap_err();
        assert!(matches!(
            err,
            JsonError::UnexpectedToken {
                expected: TokenKind::EntrySeparator,
                actual: TokenKind::String,
                ..
            }
        ));
    }

    #[test]
    fn trailing_content_after_root() {
        let mut tokenizer = Tokenizer::new(b"1 2".as_slice());
        tokenizer.read_i32().unwrap();
        let err = tokenizer.expect_end_of_document().unwrap_err();
        assert!(matches!(err, JsonError::TrailingContent { position } if position.column == 3));
    }
}
