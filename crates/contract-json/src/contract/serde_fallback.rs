//! Fallback contracts backed by `serde_json`.
//!
//! Slower than a hand-written or generated contract: values go through an
//! intermediate `String` in both directions. Meant for types that have serde
//! impls but no contract yet. `serde_json` may render large floats with an
//! exponent, which the tokenizer does not read back.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::dynamic::ContractCompiler;
use super::{ContractEntry, DeserializeContract, SerializeContract, TypeKey};
use crate::context::{DeserializeContext, SerializeContext};
use crate::encoding::{source_text, CodeUnit};
use crate::error::{JsonError, Result};
use crate::tokenizer::Tokenizer;
use crate::writer::escape::{escape_char, MAX_ESCAPE_LEN};
use crate::writer::JsonWriter;

/// Serializes `T` through its serde implementation.
pub struct SerdeContract<T>(PhantomData<fn() -> T>);

impl<T> SerdeContract<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for SerdeContract<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeContract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerdeContract<{}>", std::any::type_name::<T>())
    }
}

impl<T: Serialize + 'static> SerializeContract<T> for SerdeContract<T> {
    fn serialize<W: JsonWriter>(
        &self,
        value: &T,
        _ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()> {
        let json = serde_json::to_string(value)?;
        if writer.options().escape_non_ascii && !json.is_ascii() {
            return writer.write_verbatim(&escape_non_ascii_json(&json));
        }
        writer.write_verbatim(&json)
    }
}

impl<T: DeserializeOwned + 'static> DeserializeContract<T> for SerdeContract<T> {
    fn deserialize<U: CodeUnit>(
        &self,
        tokenizer: &mut Tokenizer<'_, U>,
        _ctx: &mut DeserializeContext<'_>,
    ) -> Result<T> {
        let position = tokenizer.position();
        let raw = tokenizer.read_raw_value()?;
        let text = source_text(raw).map_err(|reason| JsonError::InvalidString { reason, position })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Non-ASCII characters only occur inside string literals in serde_json
/// output, so escaping each one keeps the document valid.
fn escape_non_ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() + 16);
    let mut scratch = [0u8; MAX_ESCAPE_LEN];
    for ch in json.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let len = escape_char(ch, &mut scratch);
            out.extend(scratch[..len].iter().map(|&b| char::from(b)));
        }
    }
    out
}

type Factory = fn(TypeKey) -> ContractEntry;

/// Compiles [`SerdeContract`]s for the types registered with it.
///
/// Only unkeyed lookups are served; keyed variants are expected to be real
/// contracts.
#[derive(Default)]
pub struct SerdeContractCompiler {
    factories: HashMap<TypeId, Factory>,
}

impl SerdeContractCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(mut self) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.factories.insert(TypeId::of::<T>(), |key| {
            ContractEntry::two_way::<T, _>(key, SerdeContract::<T>::new())
        });
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ContractCompiler for SerdeContractCompiler {
    fn compile(&self, key: &TypeKey) -> Option<ContractEntry> {
        if key.discriminator().is_some() {
            return None;
        }
        let factory = self.factories.get(&key.type_id())?;
        Some(factory(key.clone()))
    }
}
