//! Per-call handles that let contracts dispatch nested values.

use std::any::Any;

use crate::contract::{ContractProvider, ContractProviderExt, TypeKey};
use crate::encoding::CodeUnit;
use crate::error::{JsonError, Result};
use crate::tokenizer::Tokenizer;
use crate::writer::{AnyWriter, JsonWriter};

/// Guards nesting depth across registry dispatches.
#[derive(Debug, Clone, Copy)]
struct Depth {
    current: usize,
    max: usize,
}

impl Depth {
    fn enter(&mut self) -> Result<()> {
        if self.current >= self.max {
            return Err(JsonError::DepthLimitExceeded { limit: self.max });
        }
        self.current += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.current -= 1;
    }
}

/// Handed to every [`SerializeContract`](crate::SerializeContract) call.
///
/// Each child dispatched through the provider counts as one level of
/// nesting; going past `max_depth` fails with
/// [`JsonError::DepthLimitExceeded`].
pub struct SerializeContext<'p> {
    provider: &'p dyn ContractProvider,
    depth: Depth,
}

impl<'p> SerializeContext<'p> {
    pub fn new(provider: &'p dyn ContractProvider, max_depth: usize) -> Self {
        Self {
            provider,
            depth: Depth {
                current: 0,
                max: max_depth,
            },
        }
    }

    pub fn provider(&self) -> &'p dyn ContractProvider {
        self.provider
    }

    pub fn depth(&self) -> usize {
        self.depth.current
    }

    /// Serializes `value` with the contract registered for `T`.
    pub fn serialize_child<T: 'static, W: JsonWriter>(
        &mut self,
        value: &T,
        writer: &mut W,
    ) -> Result<()> {
        self.dispatch(TypeKey::of::<T>(), value, writer.as_any_writer())
    }

    /// Serializes `value` with the contract registered for `T` under
    /// `discriminator`.
    pub fn serialize_child_keyed<T: 'static, W: JsonWriter>(
        &mut self,
        discriminator: &'static str,
        value: &T,
        writer: &mut W,
    ) -> Result<()> {
        self.dispatch(
            TypeKey::keyed::<T>(discriminator),
            value,
            writer.as_any_writer(),
        )
    }

    /// Serializes a value whose type is only known at run time.
    pub fn serialize_runtime<W: JsonWriter>(
        &mut self,
        value: &dyn Any,
        writer: &mut W,
    ) -> Result<()> {
        self.dispatch(TypeKey::of_val(value), value, writer.as_any_writer())
    }

    pub(crate) fn dispatch(
        &mut self,
        key: TypeKey,
        value: &dyn Any,
        writer: AnyWriter<'_>,
    ) -> Result<()> {
        let entry = self.provider.require_entry(&key)?;
        let serializer = entry.require_serializer()?;
        self.depth.enter()?;
        let result = serializer.serialize_object(value, self, writer);
        self.depth.leave();
        result
    }
}

/// Handed to every [`DeserializeContract`](crate::DeserializeContract) call.
pub struct DeserializeContext<'p> {
    provider: &'p dyn ContractProvider,
    depth: Depth,
}

impl<'p> DeserializeContext<'p> {
    pub fn new(provider: &'p dyn ContractProvider, max_depth: usize) -> Self {
        Self {
            provider,
            depth: Depth {
                current: 0,
                max: max_depth,
            },
        }
    }

    pub fn provider(&self) -> &'p dyn ContractProvider {
        self.provider
    }

    pub fn depth(&self) -> usize {
        self.depth.current
    }

    /// Reads a `T` with the contract registered for it.
    pub fn deserialize_child<T: 'static, U: CodeUnit>(
        &mut self,
        tokenizer: &mut Tokenizer<'_, U>,
    ) -> Result<T> {
        self.dispatch(TypeKey::of::<T>(), tokenizer)
    }

    pub fn deserialize_child_keyed<T: 'static, U: CodeUnit>(
        &mut self,
        discriminator: &'static str,
        tokenizer: &mut Tokenizer<'_, U>,
    ) -> Result<T> {
        self.dispatch(TypeKey::keyed::<T>(discriminator), tokenizer)
    }

    pub(crate) fn dispatch<T: 'static, U: CodeUnit>(
        &mut self,
        key: TypeKey,
        tokenizer: &mut Tokenizer<'_, U>,
    ) -> Result<T> {
        let entry = self.provider.require_entry(&key)?;
        let deserializer = entry.require_deserializer()?;
        self.depth.enter()?;
        let result = deserializer.deserialize_object(U::erase_tokenizer(tokenizer), self);
        self.depth.leave();
        let value = result?
            .downcast::<T>()
            .map_err(|_| JsonError::TypeMismatch {
                key: key.to_string(),
            })?;
        Ok(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ImmutableContractProvider, Nested, VecContract};
    use crate::writer::Utf8Writer;
    use crate::{DeserializeContract, SerializeContract};

    #[derive(Debug, PartialEq)]
    struct Chain(Vec<Chain>);

    struct ChainContract;

    impl SerializeContract<Chain> for ChainContract {
        fn serialize<W: JsonWriter>(
            &self,
            value: &Chain,
            ctx: &mut SerializeContext<'_>,
            writer: &mut W,
        ) -> Result<()> {
            VecContract(Nested::new()).serialize(&value.0, ctx, writer)
        }
    }

    impl DeserializeContract<Chain> for ChainContract {
        fn deserialize<U: CodeUnit>(
            &self,
            tokenizer: &mut Tokenizer<'_, U>,
            ctx: &mut DeserializeContext<'_>,
        ) -> Result<Chain> {
            VecContract(Nested::new()).deserialize(tokenizer, ctx).map(Chain)
        }
    }

    fn provider() -> ImmutableContractProvider {
        ImmutableContractProvider::builder()
            .two_way::<Chain, _>(ChainContract)
            .with_builtin_contracts()
            .build()
            .unwrap()
    }

    fn chain(depth: usize) -> Chain {
        (0..depth).fold(Chain(vec![]), |inner, _| Chain(vec![inner]))
    }

    #[test]
    fn depth_limit_applies_to_reading() {
        let provider = provider();
        let input = format!("{}{}", "[".repeat(5), "]".repeat(5));

        let mut ctx = DeserializeContext::new(&provider, 5);
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        assert_eq!(ctx.deserialize_child::<Chain, _>(&mut tokenizer).unwrap(), chain(4));
        assert_eq!(ctx.depth(), 0);

        let mut ctx = DeserializeContext::new(&provider, 4);
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let err = ctx.deserialize_child::<Chain, _>(&mut tokenizer).unwrap_err();
        assert!(matches!(err, JsonError::DepthLimitExceeded { limit: 4 }));
    }

    #[test]
    fn depth_limit_applies_to_writing() {
        let provider = provider();
        let mut writer = Utf8Writer::pooled();
        let mut ctx = SerializeContext::new(&provider, 3);
        let err = ctx.serialize_child(&chain(3), &mut writer).unwrap_err();
        assert!(matches!(err, JsonError::DepthLimitExceeded { limit: 3 }));
    }

    #[test]
    fn runtime_dispatch_uses_the_value_type() {
        let provider = provider();
        let values: Vec<Box<dyn Any>> = vec![Box::new(1i32), Box::new(true), Box::new("s".to_string())];
        let mut writer = Utf8Writer::pooled();
        let mut ctx = SerializeContext::new(&provider, 3);
        for value in &values {
            ctx.serialize_runtime(value.as_ref(), &mut writer).unwrap();
        }
        assert_eq!(writer.written(), br#"1true"s""#);
    }
}
