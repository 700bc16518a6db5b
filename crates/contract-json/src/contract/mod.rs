//! Contracts: per-type serialize and deserialize logic.
//!
//! A contract is written once against the generic [`JsonWriter`] and
//! [`Tokenizer`] and is therefore compiled per encoding with direct calls.
//! The registry stores each contract next to an object-typed wrapper
//! ([`ObjectSerializeContract`], [`ObjectDeserializeContract`]) for call
//! sites that only know a value's runtime type.

mod builtin;
mod dynamic;
mod key;
mod macros;
mod provider;
mod serde_fallback;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub use builtin::{
    BoolContract, F64Contract, I32Contract, I64Contract, Nested, OptionContract, StringContract,
    U32Contract, U64Contract, VecContract,
};
pub use dynamic::{ContractCompiler, DynamicContractProvider};
pub use key::TypeKey;
pub use provider::{
    ContractProvider, ContractProviderExt, ImmutableContractProvider,
    ImmutableContractProviderBuilder,
};
pub use serde_fallback::{SerdeContract, SerdeContractCompiler};

use crate::constant::ConstantValue;
use crate::context::{DeserializeContext, SerializeContext};
use crate::encoding::CodeUnit;
use crate::error::{JsonError, Result};
use crate::token::Token;
use crate::tokenizer::{AnyTokenizer, Tokenizer};
use crate::writer::escape::escape_str;
use crate::writer::{AnyWriter, JsonWriter};

/// Writes values of `T`.
pub trait SerializeContract<T: ?Sized>: Send + Sync + 'static {
    fn serialize<W: JsonWriter>(
        &self,
        value: &T,
        ctx: &mut SerializeContext<'_>,
        writer: &mut W,
    ) -> Result<()>;
}

/// Reads values of `T` by pulling tokens.
pub trait DeserializeContract<T>: Send + Sync + 'static {
    fn deserialize<U: CodeUnit>(
        &self,
        tokenizer: &mut Tokenizer<'_, U>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<T>;

    /// Value used when an object field is absent from the input.
    fn missing_value(&self, field: &'static str) -> Result<T> {
        Err(JsonError::MissingField { field })
    }
}

/// Object-typed serialization, for values known only as `dyn Any`.
pub trait ObjectSerializeContract: Send + Sync {
    fn serialize_object(
        &self,
        value: &dyn Any,
        ctx: &mut SerializeContext<'_>,
        writer: AnyWriter<'_>,
    ) -> Result<()>;
}

/// Object-typed deserialization; the result downcasts to the contract's type.
pub trait ObjectDeserializeContract: Send + Sync {
    fn deserialize_object(
        &self,
        tokenizer: AnyTokenizer<'_, '_>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Box<dyn Any>>;
}

/// Narrows `&dyn Any` to `T` and forwards to the typed contract.
struct SerializeErased<T, C> {
    key: TypeKey,
    contract: Arc<C>,
    _marker: PhantomData<fn(&T)>,
}

impl<T, C> ObjectSerializeContract for SerializeErased<T, C>
where
    T: 'static,
    C: SerializeContract<T>,
{
    fn serialize_object(
        &self,
        value: &dyn Any,
        ctx: &mut SerializeContext<'_>,
        writer: AnyWriter<'_>,
    ) -> Result<()> {
        let value = value.downcast_ref::<T>().ok_or_else(|| JsonError::TypeMismatch {
            key: self.key.to_string(),
        })?;
        match writer {
            AnyWriter::Utf8(writer) => self.contract.serialize(value, ctx, writer),
            AnyWriter::Utf16(writer) => self.contract.serialize(value, ctx, writer),
        }
    }
}

struct DeserializeErased<T, C> {
    contract: Arc<C>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> ObjectDeserializeContract for DeserializeErased<T, C>
where
    T: 'static,
    C: DeserializeContract<T>,
{
    fn deserialize_object(
        &self,
        tokenizer: AnyTokenizer<'_, '_>,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Box<dyn Any>> {
        let value = match tokenizer {
            AnyTokenizer::Utf8(tokenizer) => self.contract.deserialize(tokenizer, ctx)?,
            AnyTokenizer::Utf16(tokenizer) => self.contract.deserialize(tokenizer, ctx)?,
        };
        Ok(Box::new(value))
    }
}

/// Which directions a registered contract supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    SerializeOnly,
    DeserializeOnly,
    TwoWay,
}

/// One registry slot: a key, the typed contract, and its object-typed halves.
#[derive(Clone)]
pub struct ContractEntry {
    key: TypeKey,
    contract: Arc<dyn Any + Send + Sync>,
    serializer: Option<Arc<dyn ObjectSerializeContract>>,
    deserializer: Option<Arc<dyn ObjectDeserializeContract>>,
}

impl ContractEntry {
    pub fn two_way<T, C>(key: TypeKey, contract: C) -> Self
    where
        T: 'static,
        C: SerializeContract<T> + DeserializeContract<T>,
    {
        let contract = Arc::new(contract);
        Self {
            serializer: Some(serialize_half::<T, C>(&key, &contract)),
            deserializer: Some(deserialize_half::<T, C>(&contract)),
            contract,
            key,
        }
    }

    pub fn serialize_only<T, C>(key: TypeKey, contract: C) -> Self
    where
        T: 'static,
        C: SerializeContract<T>,
    {
        let contract = Arc::new(contract);
        Self {
            serializer: Some(serialize_half::<T, C>(&key, &contract)),
            deserializer: None,
            contract,
            key,
        }
    }

    pub fn deserialize_only<T, C>(key: TypeKey, contract: C) -> Self
    where
        T: 'static,
        C: DeserializeContract<T>,
    {
        let contract = Arc::new(contract);
        Self {
            serializer: None,
            deserializer: Some(deserialize_half::<T, C>(&contract)),
            contract,
            key,
        }
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn kind(&self) -> ContractKind {
        match (&self.serializer, &self.deserializer) {
            (Some(_), Some(_)) => ContractKind::TwoWay,
            (Some(_), None) => ContractKind::SerializeOnly,
            _ => ContractKind::DeserializeOnly,
        }
    }

    /// The typed contract, if it is a `C`.
    pub fn contract<C: Any + Send + Sync>(&self) -> Option<Arc<C>> {
        Arc::clone(&self.contract).downcast::<C>().ok()
    }

    pub fn serializer(&self) -> Option<&Arc<dyn ObjectSerializeContract>> {
        self.serializer.as_ref()
    }

    pub fn deserializer(&self) -> Option<&Arc<dyn ObjectDeserializeContract>> {
        self.deserializer.as_ref()
    }

    pub(crate) fn require_serializer(&self) -> Result<&Arc<dyn ObjectSerializeContract>> {
        self.serializer().ok_or_else(|| JsonError::ContractNotFound {
            key: format!("{} (serialize)", self.key),
        })
    }

    pub(crate) fn require_deserializer(&self) -> Result<&Arc<dyn ObjectDeserializeContract>> {
        self.deserializer().ok_or_else(|| JsonError::ContractNotFound {
            key: format!("{} (deserialize)", self.key),
        })
    }
}

impl fmt::Debug for ContractEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractEntry")
            .field("key", &self.key)
            .field("kind", &self.kind())
            .finish()
    }
}

fn serialize_half<T, C>(key: &TypeKey, contract: &Arc<C>) -> Arc<dyn ObjectSerializeContract>
where
    T: 'static,
    C: SerializeContract<T>,
{
    Arc::new(SerializeErased::<T, C> {
        key: key.clone(),
        contract: Arc::clone(contract),
        _marker: PhantomData,
    })
}

fn deserialize_half<T, C>(contract: &Arc<C>) -> Arc<dyn ObjectDeserializeContract>
where
    T: 'static,
    C: DeserializeContract<T>,
{
    Arc::new(DeserializeErased::<T, C> {
        contract: Arc::clone(contract),
        _marker: PhantomData,
    })
}

/// Per-field data of an [`object_contract!`](crate::object_contract)
/// contract: the field's contract plus its precomputed key fragments.
#[doc(hidden)]
pub struct FieldSlot<C> {
    pub contract: C,
    pub name: &'static str,
    /// The unescaped name in both encodings, for matching input keys.
    pub name_units: ConstantValue,
    /// `{"name":` for the first field, `,"name":` for the rest.
    pub fragment: ConstantValue,
}

impl<C: Default> FieldSlot<C> {
    pub fn new(name: &'static str, first: bool) -> Self {
        let mut fragment = String::with_capacity(name.len() + 4);
        fragment.push_str(if first { "{\"" } else { ",\"" });
        escape_str(name, false, &mut fragment);
        fragment.push_str("\":");
        Self {
            contract: C::default(),
            name,
            name_units: ConstantValue::raw(name),
            fragment: ConstantValue::raw(&fragment),
        }
    }
}

/// An input object key, decoded only when it contains escapes.
#[doc(hidden)]
pub struct PropertyName<'a, U> {
    raw: &'a [U],
    decoded: Option<Cow<'a, str>>,
}

impl<'a, U: CodeUnit> PropertyName<'a, U> {
    pub fn new(token: &Token<'a, U>) -> Result<Self> {
        let raw = token.string_contents();
        let escaped = raw.iter().any(|unit| unit.ascii() == Some(b'\\'));
        let decoded = if escaped {
            Some(token.unescape()?)
        } else {
            None
        };
        Ok(Self { raw, decoded })
    }

    pub fn is<C>(&self, slot: &FieldSlot<C>) -> bool {
        match &self.decoded {
            Some(text) => text == slot.name,
            None => self.raw == U::select(&slot.name_units),
        }
    }
}
