use std::fmt;
use std::mem;
use std::sync::Arc;

use contract_json_buffers::{Buffer, BufferProvider, PooledBufferProvider};

use super::escape::{escape_char, needs_escape, MAX_ESCAPE_LEN};
use super::{sealed, AnyWriter, JsonWriter, WriterOptions};
use crate::constant::ConstantValue;
use crate::encoding::CodeUnit;
use crate::error::{JsonError, Result};
use crate::number::{digit_count, render_u64};

/// A [`JsonWriter`] that owns one buffer from a [`BufferProvider`].
///
/// The buffer goes back to the provider when the writer is dropped, so
/// failure paths release it without extra bookkeeping. A successful call
/// hands the buffer on through [`BufferWriter::into_parts`].
pub struct BufferWriter<U: CodeUnit> {
    buffer: Buffer<U>,
    provider: Arc<dyn BufferProvider<U>>,
    options: WriterOptions,
}

pub type Utf8Writer = BufferWriter<u8>;
pub type Utf16Writer = BufferWriter<u16>;

impl<U: CodeUnit> BufferWriter<U> {
    pub fn new(provider: Arc<dyn BufferProvider<U>>) -> Self {
        Self::with_options(provider, WriterOptions::default())
    }

    pub fn with_options(provider: Arc<dyn BufferProvider<U>>, options: WriterOptions) -> Self {
        let buffer = provider.initial_buffer();
        Self {
            buffer,
            provider,
            options,
        }
    }

    /// A writer on the process-wide pool.
    pub fn pooled() -> Self {
        Self::new(Arc::new(PooledBufferProvider::<U>::new()))
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Gives up the buffer and the provider it must be returned to.
    pub fn into_parts(mut self) -> (Buffer<U>, Arc<dyn BufferProvider<U>>) {
        let buffer = mem::take(&mut self.buffer);
        (buffer, Arc::clone(&self.provider))
    }

    #[cold]
    fn grow(&mut self, required: usize) -> Result<()> {
        let current = mem::take(&mut self.buffer);
        self.buffer = self.provider.grow(current, required)?;
        Ok(())
    }

    #[inline]
    fn write_ascii(&mut self, ascii: &[u8]) -> Result<()> {
        self.ensure_capacity(ascii.len())?;
        for &byte in ascii {
            self.buffer.put(U::from_ascii(byte));
        }
        Ok(())
    }

    /// Writes text that needs no escaping.
    #[inline]
    fn write_run(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        // A UTF-8 length is an upper bound for the UTF-16 length too.
        self.ensure_capacity(text.len())?;
        U::put_str(text, &mut self.buffer);
        Ok(())
    }

    fn write_escaped(&mut self, text: &str) -> Result<()> {
        let escape_non_ascii = self.options.escape_non_ascii;
        let mut scratch = [0u8; MAX_ESCAPE_LEN];
        let mut run_start = 0;
        if escape_non_ascii {
            for (index, ch) in text.char_indices() {
                if needs_escape(ch, true) {
                    self.write_run(&text[run_start..index])?;
                    let len = escape_char(ch, &mut scratch);
                    self.write_ascii(&scratch[..len])?;
                    run_start = index + ch.len_utf8();
                }
            }
        } else {
            // Bytes of multi-byte sequences are never below 0x80, so a byte
            // scan finds exactly the characters that need escaping.
            for (index, &byte) in text.as_bytes().iter().enumerate() {
                if byte < 0x20 || byte == b'"' || byte == b'\\' {
                    self.write_run(&text[run_start..index])?;
                    let len = escape_char(char::from(byte), &mut scratch);
                    self.write_ascii(&scratch[..len])?;
                    run_start = index + 1;
                }
            }
        }
        self.write_run(&text[run_start..])
    }
}

impl<U: CodeUnit> Drop for BufferWriter<U> {
    fn drop(&mut self) {
        self.provider.finish(mem::take(&mut self.buffer));
    }
}

impl<U: CodeUnit> fmt::Debug for BufferWriter<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferWriter")
            .field("encoding", &U::ENCODING)
            .field("len", &self.buffer.len())
            .field("capacity", &self.buffer.capacity())
            .field("options", &self.options)
            .finish()
    }
}

impl<U: CodeUnit> sealed::Sealed for BufferWriter<U> {}

impl<U: CodeUnit> JsonWriter for BufferWriter<U> {
    type Unit = U;

    fn options(&self) -> WriterOptions {
        self.options
    }

    #[inline]
    fn ensure_capacity(&mut self, required: usize) -> Result<()> {
        if self.buffer.remaining() >= required {
            return Ok(());
        }
        self.grow(required)
    }

    fn write_raw(&mut self, units: &[U]) -> Result<()> {
        self.ensure_capacity(units.len())?;
        for &unit in units {
            self.buffer.put(unit);
        }
        Ok(())
    }

    #[inline]
    fn write_raw_n<const N: usize>(&mut self, ascii: &[u8; N]) -> Result<()> {
        self.ensure_capacity(N)?;
        for &byte in ascii {
            self.buffer.put(U::from_ascii(byte));
        }
        Ok(())
    }

    fn write_constant_large(&mut self, constant: &ConstantValue) -> Result<()> {
        let units = U::select(constant);
        self.ensure_capacity(units.len())?;
        self.buffer.put_slice(units);
        Ok(())
    }

    fn write_string(&mut self, text: &str) -> Result<()> {
        self.write_raw_n(b"\"")?;
        self.write_escaped(text)?;
        self.write_raw_n(b"\"")
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        if value == i64::MIN {
            return self.write_raw_n(b"-9223372036854775808");
        }
        if value < 0 {
            self.write_raw_n(b"-")?;
        }
        self.write_u64(value.unsigned_abs())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        let len = digit_count(value);
        self.ensure_capacity(len)?;
        render_u64(value, &mut self.buffer.spare_mut()[..len]);
        self.buffer.advance(len);
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(JsonError::NonFiniteNumber(value));
        }
        let mut sink = FmtSink {
            writer: self,
            error: None,
        };
        // `Display` for floats never uses exponent notation.
        if fmt::Write::write_fmt(&mut sink, format_args!("{value}")).is_err() {
            return Err(sink.error.take().unwrap_or(JsonError::NonFiniteNumber(value)));
        }
        Ok(())
    }

    fn write_verbatim(&mut self, json: &str) -> Result<()> {
        self.write_run(json)
    }

    fn is_compatible_with_optimized_contract(&self) -> bool {
        !self.options.escape_non_ascii
    }

    fn written(&self) -> &[U] {
        self.buffer.written()
    }

    fn as_any_writer(&mut self) -> AnyWriter<'_> {
        U::erase_writer(self)
    }
}

/// Routes `fmt::Write` output into a writer, keeping the real error.
struct FmtSink<'w, U: CodeUnit> {
    writer: &'w mut BufferWriter<U>,
    error: Option<JsonError>,
}

impl<U: CodeUnit> fmt::Write for FmtSink<'_, U> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.writer.write_run(text).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
