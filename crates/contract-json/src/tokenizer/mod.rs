//! Pull tokenizer over an in-memory UTF-8 or UTF-16 buffer.
//!
//! Whitespace and `//` line comments are skipped before every token. Columns
//! are 1-based and count code units of the source encoding; `\n` and `\r\n`
//! each end a line.

mod read;
mod skip;

use crate::encoding::{CodeUnit, Encoding};
use crate::error::{JsonError, Position, Result};
use crate::token::{Token, TokenKind};

/// Scans JSON tokens out of a borrowed buffer.
///
/// After an error the tokenizer must not be used again for the same parse.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a, U> {
    source: &'a [U],
    offset: usize,
    line: usize,
    column: usize,
}

pub type Utf8Tokenizer<'a> = Tokenizer<'a, u8>;
pub type Utf16Tokenizer<'a> = Tokenizer<'a, u16>;

impl<'a, U: CodeUnit> Tokenizer<'a, U> {
    pub fn new(source: &'a [U]) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn source(&self) -> &'a [U] {
        self.source
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Position of the next unread unit.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Result<Token<'a, U>> {
        self.skip_insignificant()?;
        let Some(&unit) = self.source.get(self.offset) else {
            return Ok(self.emit(TokenKind::EndOfDocument, 0));
        };
        let kind = match unit.ascii() {
            Some(b'{') => TokenKind::BeginObject,
            Some(b'}') => TokenKind::EndObject,
            Some(b'[') => TokenKind::BeginArray,
            Some(b']') => TokenKind::EndArray,
            Some(b',') => TokenKind::EntrySeparator,
            Some(b':') => TokenKind::NameValueSeparator,
            Some(b'"') => return self.scan_string(),
            Some(b't') => return self.scan_literal("true", TokenKind::True),
            Some(b'f') => return self.scan_literal("false", TokenKind::False),
            Some(b'n') => return self.scan_literal("null", TokenKind::Null),
            Some(b'-' | b'0'..=b'9') => return self.scan_number(),
            _ => {
                return Err(JsonError::UnexpectedCharacter {
                    character: U::char_at(self.source, self.offset),
                    position: self.position(),
                })
            }
        };
        Ok(self.emit(kind, 1))
    }

    /// Moves past a token obtained from [`Tokenizer::peek_token`].
    pub(crate) fn consume(&mut self, token: &Token<'a, U>) {
        self.offset = token.offset + token.len();
        self.line = token.line;
        self.column = token.column + token.len();
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token<'a, U> {
        let source = self.source;
        let token = Token {
            kind,
            span: &source[self.offset..self.offset + len],
            offset: self.offset,
            line: self.line,
            column: self.column,
        };
        self.offset += len;
        self.column += len;
        token
    }

    fn ascii_at(&self, index: usize) -> Option<u8> {
        self.source.get(index).and_then(|unit| unit.ascii())
    }

    fn is_digit_at(&self, index: usize) -> bool {
        self.ascii_at(index).is_some_and(|b| b.is_ascii_digit())
    }

    fn skip_insignificant(&mut self) -> Result<()> {
        while let Some(&unit) = self.source.get(self.offset) {
            match unit.ascii() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.offset += 1;
                    self.column += 1;
                }
                Some(b'\n') => {
                    self.offset += 1;
                    self.line += 1;
                    self.column = 1;
                }
                Some(b'/') => {
                    if self.ascii_at(self.offset + 1) != Some(b'/') {
                        return Err(JsonError::UnexpectedCharacter {
                            character: '/',
                            position: self.position(),
                        });
                    }
                    let rest = &self.source[self.offset..];
                    let len = rest
                        .iter()
                        .position(|unit| matches!(unit.ascii(), Some(b'\n' | b'\r')))
                        .unwrap_or(rest.len());
                    self.offset += len;
                    self.column += len;
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_string(&mut self) -> Result<Token<'a, U>> {
        let body = &self.source[self.offset + 1..];
        let mut i = 0;
        while i < body.len() {
            match body[i].ascii() {
                Some(b'"') => return Ok(self.emit(TokenKind::String, i + 2)),
                Some(b'\\') => {
                    // A control character after the backslash is rejected on the next pass.
                    let printable = body
                        .get(i + 1)
                        .and_then(|unit| unit.ascii())
                        .map_or(true, |b| b >= 0x20);
                    i += if printable { 2 } else { 1 };
                }
                Some(0x00..=0x1F) => {
                    return Err(JsonError::InvalidString {
                        reason: "unescaped control character",
                        position: Position::new(self.line, self.column + 1 + i),
                    })
                }
                _ => i += 1,
            }
        }
        Err(JsonError::UnterminatedString {
            position: self.position(),
        })
    }

    fn scan_literal(&mut self, expected: &'static str, kind: TokenKind) -> Result<Token<'a, U>> {
        let rest = &self.source[self.offset..];
        let len = rest
            .iter()
            .take_while(|unit| unit.ascii().is_some_and(|b| b.is_ascii_alphanumeric()))
            .count();
        let fragment = &rest[..len];
        let matches = len == expected.len()
            && fragment
                .iter()
                .zip(expected.bytes())
                .all(|(unit, b)| unit.ascii() == Some(b));
        if matches {
            return Ok(self.emit(kind, len));
        }
        Err(JsonError::InvalidLiteral {
            expected,
            actual: fragment
                .iter()
                .filter_map(|unit| unit.ascii().map(char::from))
                .collect(),
            position: self.position(),
        })
    }

    fn scan_number(&mut self) -> Result<Token<'a, U>> {
        let start = self.offset;
        let mut i = start;
        if self.ascii_at(i) == Some(b'-') {
            i += 1;
            if !self.is_digit_at(i) {
                return Err(JsonError::InvalidNumber {
                    reason: "expected a digit after the minus sign",
                    position: Position::new(self.line, self.column + 1),
                });
            }
        }
        while self.is_digit_at(i) {
            i += 1;
        }
        let mut kind = TokenKind::IntegerNumber;
        if self.ascii_at(i) == Some(b'.') {
            i += 1;
            if !self.is_digit_at(i) {
                return Err(JsonError::InvalidNumber {
                    reason: "expected a digit after the decimal separator '.'",
                    position: Position::new(self.line, self.column + (i - start)),
                });
            }
            while self.is_digit_at(i) {
                i += 1;
            }
            kind = TokenKind::FloatingPointNumber;
        }
        Ok(self.emit(kind, i - start))
    }
}

/// A tokenizer of either encoding, for object-typed contract calls.
pub enum AnyTokenizer<'t, 'a> {
    Utf8(&'t mut Utf8Tokenizer<'a>),
    Utf16(&'t mut Utf16Tokenizer<'a>),
}

impl AnyTokenizer<'_, '_> {
    pub fn encoding(&self) -> Encoding {
        match self {
            AnyTokenizer::Utf8(_) => Encoding::Utf8,
            AnyTokenizer::Utf16(_) => Encoding::Utf16,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            AnyTokenizer::Utf8(tokenizer) => tokenizer.position(),
            AnyTokenizer::Utf16(tokenizer) => tokenizer.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            out.push(token.kind);
            if token.kind == TokenKind::EndOfDocument {
                return out;
            }
        }
    }

    #[test]
    fn structural_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("{ } [ ] , :"),
            vec![
                BeginObject,
                EndObject,
                BeginArray,
                EndArray,
                EntrySeparator,
                NameValueSeparator,
                EndOfDocument
            ]
        );
    }

    #[test]
    fn number_classification() {
        use TokenKind::*;
        assert_eq!(kinds("-12"), vec![IntegerNumber, EndOfDocument]);
        assert_eq!(kinds("3.25"), vec![FloatingPointNumber, EndOfDocument]);
        assert_eq!(kinds("007"), vec![IntegerNumber, EndOfDocument]);
    }

    #[test]
    fn tracks_lines_and_columns() {
        let mut tokenizer = Tokenizer::new(b"\r\n  [\n\t1]".as_slice());
        let open = tokenizer.next_token().unwrap();
        assert_eq!((open.line, open.column), (2, 3));
        let one = tokenizer.next_token().unwrap();
        assert_eq!((one.line, one.column), (3, 2));
        let close = tokenizer.next_token().unwrap();
        assert_eq!((close.line, close.column), (3, 3));
        let end = tokenizer.next_token().unwrap();
        assert_eq!(end.kind, TokenKind::EndOfDocument);
        assert!(end.is_empty());
    }

    #[test]
    fn lone_carriage_return_is_not_a_line_break() {
        let mut tokenizer = Tokenizer::new(b"\r1".as_slice());
        let token = tokenizer.next_token().unwrap();
        assert_eq!((token.line, token.column), (1, 2));
    }

    #[test]
    fn string_span_covers_quotes_and_skips_escaped_quotes() {
        let mut tokenizer = Tokenizer::new(br#""a\"b" 1"#.as_slice());
        let token = tokenizer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.span, br#""a\"b""#);
        assert_eq!(tokenizer.next_token().unwrap().column, 8);
    }

    #[test]
    fn raw_control_characters_end_the_string_scan() {
        let err = Tokenizer::new(b" \"ab\ncd\"".as_slice()).next_token().unwrap_err();
        assert!(matches!(
            err,
            JsonError::InvalidString { reason: "unescaped control character", position }
                if position == Position::new(1, 5)
        ));

        let err = Tokenizer::new(b"\"a\\\n\"".as_slice()).next_token().unwrap_err();
        assert_eq!(err.position(), Some(Position::new(1, 4)));

        let units: Vec<u16> = "\"x\ty\"".encode_utf16().collect();
        let err = Tokenizer::new(&units).next_token().unwrap_err();
        assert_eq!(err.position(), Some(Position::new(1, 3)));
    }

    #[test]
    fn lexical_errors_carry_positions() {
        let err = Tokenizer::new(b"-x".as_slice()).next_token().unwrap_err();
        assert_eq!(err.position(), Some(Position::new(1, 2)));

        let err = Tokenizer::new(b" 12.".as_slice()).next_token().unwrap_err();
        assert!(err.to_string().contains("'.'"));
        assert_eq!(err.position(), Some(Position::new(1, 5)));

        let err = Tokenizer::new(b"\n  \"abc".as_slice()).next_token().unwrap_err();
        assert!(matches!(err, JsonError::UnterminatedString { position } if position == Position::new(2, 3)));

        let err = Tokenizer::new(b"/x".as_slice()).next_token().unwrap_err();
        assert!(matches!(err, JsonError::UnexpectedCharacter { character: '/', .. }));
    }

    #[test]
    fn unexpected_non_ascii_character_is_decoded() {
        let err = Tokenizer::new("é".as_bytes()).next_token().unwrap_err();
        assert!(matches!(err, JsonError::UnexpectedCharacter { character: 'é', .. }));
    }
}
