//! JSON writers over pooled UTF-8 and UTF-16 buffers.
//!
//! Contracts are generic over [`JsonWriter`], so each contract is compiled
//! once per output encoding and every call is direct. [`AnyWriter`] is the
//! narrow dynamic boundary used by object-typed contract calls.

mod buffer_writer;
pub(crate) mod escape;

pub use buffer_writer::{BufferWriter, Utf16Writer, Utf8Writer};

use crate::constant::ConstantValue;
use crate::encoding::{CodeUnit, Encoding};
use crate::error::Result;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Constants up to this many units are copied unit by unit; longer ones go
/// through a single slice copy.
pub const SMALL_CONSTANT_LEN: usize = 16;

/// Output settings of a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    /// Emit every non-ASCII character as `\uXXXX`.
    pub escape_non_ascii: bool,
}

/// Appends JSON syntax to an output buffer.
///
/// Every method reserves the room it needs before writing; growth failures
/// surface as [`JsonError::Buffer`](crate::JsonError::Buffer). The writer
/// does not track structure: contracts are responsible for emitting
/// separators in the right places.
pub trait JsonWriter: sealed::Sealed {
    type Unit: CodeUnit;

    fn options(&self) -> WriterOptions;

    /// Makes room for `required` more units.
    fn ensure_capacity(&mut self, required: usize) -> Result<()>;

    /// Copies already-encoded units.
    fn write_raw(&mut self, units: &[Self::Unit]) -> Result<()>;

    /// Copies a short ASCII literal of known length.
    fn write_raw_n<const N: usize>(&mut self, ascii: &[u8; N]) -> Result<()>;

    /// Copies the form of `constant` matching this writer's encoding.
    fn write_constant(&mut self, constant: &ConstantValue) -> Result<()> {
        let units = <Self::Unit as CodeUnit>::select(constant);
        if units.len() > SMALL_CONSTANT_LEN {
            return self.write_constant_large(constant);
        }
        self.write_raw(units)
    }

    /// Copies `constant` with one slice copy.
    fn write_constant_large(&mut self, constant: &ConstantValue) -> Result<()>;

    /// Writes a precomputed `"name":` key.
    fn write_constant_as_object_key(&mut self, key: &ConstantValue) -> Result<()> {
        self.write_constant(key)
    }

    fn write_begin_object(&mut self) -> Result<()> {
        self.write_raw_n(b"{")
    }

    fn write_end_object(&mut self) -> Result<()> {
        self.write_raw_n(b"}")
    }

    fn write_begin_array(&mut self) -> Result<()> {
        self.write_raw_n(b"[")
    }

    fn write_end_array(&mut self) -> Result<()> {
        self.write_raw_n(b"]")
    }

    /// `:`
    fn write_key_value_separator(&mut self) -> Result<()> {
        self.write_raw_n(b":")
    }

    /// `,`
    fn write_value_separator(&mut self) -> Result<()> {
        self.write_raw_n(b",")
    }

    fn write_null(&mut self) -> Result<()> {
        self.write_raw_n(b"null")
    }

    fn write_true(&mut self) -> Result<()> {
        self.write_raw_n(b"true")
    }

    fn write_false(&mut self) -> Result<()> {
        self.write_raw_n(b"false")
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        if value {
            self.write_true()
        } else {
            self.write_false()
        }
    }

    /// Writes `text` as a quoted, escaped JSON string.
    fn write_string(&mut self, text: &str) -> Result<()>;

    /// Writes an object key followed by `:`.
    fn write_property_name(&mut self, name: &str) -> Result<()> {
        self.write_string(name)?;
        self.write_key_value_separator()
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        if value == i32::MIN {
            return self.write_raw_n(b"-2147483648");
        }
        self.write_i64(i64::from(value))
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_u64(u64::from(value))
    }

    fn write_i64(&mut self, value: i64) -> Result<()>;

    fn write_u64(&mut self, value: u64) -> Result<()>;

    /// Writes a finite float in plain decimal notation.
    fn write_f64(&mut self, value: f64) -> Result<()>;

    /// Writes JSON text that has already been validated, without escaping.
    fn write_verbatim(&mut self, json: &str) -> Result<()>;

    /// Whether precomputed fragments may be blitted into this writer.
    fn is_compatible_with_optimized_contract(&self) -> bool;

    /// Everything written so far.
    fn written(&self) -> &[Self::Unit];

    fn as_any_writer(&mut self) -> AnyWriter<'_>;
}

/// A writer of either encoding, for object-typed contract calls.
pub enum AnyWriter<'w> {
    Utf8(&'w mut Utf8Writer),
    Utf16(&'w mut Utf16Writer),
}

impl AnyWriter<'_> {
    pub fn encoding(&self) -> Encoding {
        match self {
            AnyWriter::Utf8(_) => Encoding::Utf8,
            AnyWriter::Utf16(_) => Encoding::Utf16,
        }
    }
}
