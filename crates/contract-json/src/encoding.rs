//! UTF-8 and UTF-16 code units.
//!
//! The tokenizer and writer are generic over [`CodeUnit`] and monomorphized
//! for `u8` (UTF-8) and `u16` (UTF-16). Everything encoding-specific lives
//! behind this trait; the structural JSON logic is shared.

use std::borrow::Cow;
use std::str;

use contract_json_buffers::{Buffer, PoolElement};

use crate::constant::ConstantValue;
use crate::tokenizer::{AnyTokenizer, Tokenizer};
use crate::writer::{AnyWriter, BufferWriter};

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// Text encoding of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16,
}

/// A code unit of a supported text encoding.
pub trait CodeUnit: sealed::Sealed + PoolElement + Eq + std::fmt::Debug {
    const ENCODING: Encoding;

    fn from_ascii(byte: u8) -> Self;

    fn to_u32(self) -> u32;

    /// The unit as an ASCII byte, if it is one.
    #[inline]
    fn ascii(self) -> Option<u8> {
        let value = self.to_u32();
        if value < 0x80 {
            Some(value as u8)
        } else {
            None
        }
    }

    /// The pre-encoded form of `constant` in this encoding.
    fn select(constant: &ConstantValue) -> &[Self];

    /// Encodes text that needs no escaping. `out` must have room for
    /// `text.len()` units.
    fn put_str(text: &str, out: &mut Buffer<Self>);

    /// Appends a run of unescaped string content to `out`.
    fn decode_run(units: &[Self], out: &mut String) -> Result<(), &'static str>;

    /// Borrows `units` as text when no decoding step is needed.
    fn borrow_str(units: &[Self]) -> Option<&str>;

    /// The character starting at `index`, for error messages.
    fn char_at(units: &[Self], index: usize) -> char;

    /// Parses an ASCII numeral span.
    fn parse_f64(units: &[Self]) -> Option<f64>;

    fn erase_tokenizer<'t, 'a>(tokenizer: &'t mut Tokenizer<'a, Self>) -> AnyTokenizer<'t, 'a>;

    fn erase_writer(writer: &mut BufferWriter<Self>) -> AnyWriter<'_>;
}

impl CodeUnit for u8 {
    const ENCODING: Encoding = Encoding::Utf8;

    #[inline]
    fn from_ascii(byte: u8) -> Self {
        byte
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn select(constant: &ConstantValue) -> &[Self] {
        constant.utf8()
    }

    #[inline]
    fn put_str(text: &str, out: &mut Buffer<Self>) {
        out.put_slice(text.as_bytes());
    }

    fn decode_run(units: &[Self], out: &mut String) -> Result<(), &'static str> {
        let text = str::from_utf8(units).map_err(|_| "invalid UTF-8")?;
        out.push_str(text);
        Ok(())
    }

    fn borrow_str(units: &[Self]) -> Option<&str> {
        str::from_utf8(units).ok()
    }

    fn char_at(units: &[Self], index: usize) -> char {
        (1..=4)
            .find_map(|len| {
                let bytes = units.get(index..index + len)?;
                str::from_utf8(bytes).ok()?.chars().next()
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn parse_f64(units: &[Self]) -> Option<f64> {
        str::from_utf8(units).ok()?.parse().ok()
    }

    fn erase_tokenizer<'t, 'a>(tokenizer: &'t mut Tokenizer<'a, Self>) -> AnyTokenizer<'t, 'a> {
        AnyTokenizer::Utf8(tokenizer)
    }

    fn erase_writer(writer: &mut BufferWriter<Self>) -> AnyWriter<'_> {
        AnyWriter::Utf8(writer)
    }
}

impl CodeUnit for u16 {
    const ENCODING: Encoding = Encoding::Utf16;

    #[inline]
    fn from_ascii(byte: u8) -> Self {
        byte as u16
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn select(constant: &ConstantValue) -> &[Self] {
        constant.utf16()
    }

    fn put_str(text: &str, out: &mut Buffer<Self>) {
        for unit in text.encode_utf16() {
            out.put(unit);
        }
    }

    fn decode_run(units: &[Self], out: &mut String) -> Result<(), &'static str> {
        for ch in char::decode_utf16(units.iter().copied()) {
            out.push(ch.map_err(|_| "invalid UTF-16")?);
        }
        Ok(())
    }

    fn borrow_str(_units: &[Self]) -> Option<&str> {
        None
    }

    fn char_at(units: &[Self], index: usize) -> char {
        units
            .get(index..)
            .and_then(|rest| char::decode_utf16(rest.iter().copied()).next())
            .and_then(Result::ok)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn parse_f64(units: &[Self]) -> Option<f64> {
        String::from_utf16(units).ok()?.parse().ok()
    }

    fn erase_tokenizer<'t, 'a>(tokenizer: &'t mut Tokenizer<'a, Self>) -> AnyTokenizer<'t, 'a> {
        AnyTokenizer::Utf16(tokenizer)
    }

    fn erase_writer(writer: &mut BufferWriter<Self>) -> AnyWriter<'_> {
        AnyWriter::Utf16(writer)
    }
}

/// Decodes raw JSON text into a `str`, borrowing when the encoding allows.
pub fn source_text<U: CodeUnit>(units: &[U]) -> Result<Cow<'_, str>, &'static str> {
    if let Some(text) = U::borrow_str(units) {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(units.len());
    U::decode_run(units, &mut out)?;
    Ok(Cow::Owned(out))
}
