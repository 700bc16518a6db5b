//! Contracts for primitives and the standard containers.

use std::borrow::Cow;

use super::{DeserializeContract, SerializeContract};
use crate::context::{DeserializeContext, SerializeContext};
use crate::encoding::CodeUnit;
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::writer::JsonWriter;

macro_rules! primitive_contract {
    ($(#[$meta:meta])* $name:ident, $t:ty, $write:ident, $read:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl SerializeContract<$t> for $name {
            #[inline]
            fn serialize<W: JsonWriter>(
                &self,
                value: &$t,
                _ctx: &mut SerializeContext<'_>,
                writer: &mut W,
            ) -> Result<()> {
                writer.$write(*value)
            }
        }

        impl DeserializeContract<$t> for $name {
            #[inline]
            fn deserialize<U: CodeUnit>(
                &self,
                tokenizer: &mut Tokenizer<'_, U>,
                _ctx: &mut DeserializeContext<'_>,
            ) -> Result<$t> {
                tokenizer.$read()
            }
        }
    };
}

primitive_contract!(I32Contract, i32, write_i32, read_i32);
primitive_contract!(I64Contract, i64, write_i64, read_i64);
primitive_contract!(U32Contract, u32, write_u32, read_u32);
primitive_contract!(U64Contract, u64, write_u64, read_u64);
primitive_contract!(
    /// Writes finite floats only; NaN and infinities are errors.
    F64Contract,
    f64,
    write_f64,
    read_f64
);
primitive_contract!(BoolContract, bool, write_bool, read_bool);

#[derive(Debug, Clone, Copy, Default)]
pub struct StringContract;

impl SerializeContract<String> for StringContract {
    fn serialize<W: JsonWriter>(
        &self,
        value: &String,
        _ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        writer.write_string(value)
    }
}

impl SerializeContract<str> for StringContract {
    fn serialize<W: JsonWriter>(
        &self,
        value: &str,
        _ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        writer.write_string(value)
    }
}

impl SerializeContract<Cow<'static, str>> for StringContract {
    fn serialize<W: JsonWriter>(
        &self,
        value: &Cow<'static, str>,
        _ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        writer.write_string(value)
    }
}

impl DeserializeContract<String> for StringContract {
    fn deserialize<U: CodeUnit>(
        &self,
        tokenizer: &mut Tokenizer<'_, U>,
        _ctx: &mut DeserializeContext<'_>,
    ) -> Result<String> {
        tokenizer.read_string()
    }
}

/// A JSON array of elements handled by `C`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VecContract<C>(pub C);

impl<T, C: SerializeContract<T>> SerializeContract<Vec<T>> for VecContract<C> {
    fn serialize<W: JsonWriter>(
        &self,
        value: &Vec<T>,
        ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        writer.write_begin_array()?;
        for (index, item) in value.iter().enumerate() {
            if index > 0 {
                writer.write_value_separator()?;
            }
            self.0.serialize(item, ctx, writer)?;
        }
        writer.write_end_array()
    }
}

impl<T, C: DeserializeContract<T>> DeserializeContract<Vec<T>> for VecContract<C> {
    fn deserialize<U: CodeUnit>(
        &self,
        tokenizer: &mut Tokenizer<'_, U>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Vec<T>> {
        tokenizer.read_begin_array()?;
        let mut items = Vec::new();
        let mut count = 0;
        while !tokenizer.try_read_end_array_or_separator(&mut count)? {
            items.push(self.0.deserialize(tokenizer, ctx)?);
        }
        Ok(items)
    }
}

/// `null` for `None`; an absent object field also reads as `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionContract<C>(pub C);

impl<T, C: SerializeContract<T>> SerializeContract<Option<T>> for OptionContract<C> {
    fn serialize<W: JsonWriter>(
        &self,
        value: &Option<T>,
        ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        match value {
            Some(value) => self.0.serialize(value, ctx, writer),
            None => writer.write_null(),
        }
    }
}

impl<T, C: DeserializeContract<T>> DeserializeContract<Option<T>> for OptionContract<C> {
    fn deserialize<U: CodeUnit>(
        &self,
        tokenizer: &mut Tokenizer<'_, U>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Option<T>> {
        if tokenizer.try_read_null()? {
            return Ok(None);
        }
        self.0.deserialize(tokenizer, ctx).map(Some)
    }

    fn missing_value(&self, _field: &'static str) -> Result<Option<T>> {
        Ok(None)
    }
}

/// Resolves the value's contract through the context's provider at run
/// time, optionally under a discriminator. Needed for recursive types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nested {
    discriminator: Option<&'static str>,
}

impl Nested {
    pub const fn new() -> Self {
        Self {
            discriminator: None,
        }
    }

    pub const fn keyed(discriminator: &'static str) -> Self {
        Self {
            discriminator: Some(discriminator),
        }
    }
}

impl<T: 'static> SerializeContract<T> for Nested {
    fn serialize<W: JsonWriter>(
        &self,
        value: &T,
        ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        match self.discriminator {
            Some(discriminator) => ctx.serialize_child_keyed(discriminator, value, writer),
            None => ctx.serialize_child(value, writer),
        }
    }
}

impl<T: 'static> DeserializeContract<T> for Nested {
    fn deserialize<U: CodeUnit>(
        &self,
        tokenizer: &mut Tokenizer<'_, U>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<T> {
        match self.discriminator {
            Some(discriminator) => ctx.deserialize_child_keyed(discriminator, tokenizer),
            None => ctx.deserialize_child(tokenizer),
        }
    }
}
