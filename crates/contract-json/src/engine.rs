//! Top-level serialize and deserialize calls.

use std::fmt;
use std::sync::Arc;

use contract_json_buffers::{
    Buffer, BufferProvider, PoolElement, PooledBufferProvider, DEFAULT_INITIAL_LEN, MAX_BUFFER_LEN,
};
use serde::Deserialize;

use crate::context::{DeserializeContext, SerializeContext};
use crate::contract::{ContractProvider, DeserializeContract, SerializeContract, TypeKey};
use crate::encoding::CodeUnit;
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::writer::{BufferWriter, JsonWriter, WriterOptions};

/// Engine settings.
///
/// Deserializable so hosts can embed it in their own configuration files;
/// absent keys take their defaults.
///
/// ```
/// use contract_json::EngineOptions;
///
/// let options: EngineOptions = serde_json::from_str(r#"{"max_depth": 16}"#).unwrap();
/// assert_eq!(options.max_depth, 16);
/// assert!(!options.escape_non_ascii);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Maximum nesting of contracts dispatched through the provider.
    pub max_depth: usize,
    /// Emit every non-ASCII character as `\uXXXX`.
    pub escape_non_ascii: bool,
    /// Initial length, in code units, of pooled output buffers.
    pub initial_buffer_len: usize,
    /// Hard cap, in code units, on output buffer growth.
    pub max_buffer_len: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            escape_non_ascii: false,
            initial_buffer_len: DEFAULT_INITIAL_LEN,
            max_buffer_len: MAX_BUFFER_LEN,
        }
    }
}

impl EngineOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_escape_non_ascii(mut self, escape_non_ascii: bool) -> Self {
        self.escape_non_ascii = escape_non_ascii;
        self
    }

    pub fn with_initial_buffer_len(mut self, initial_buffer_len: usize) -> Self {
        self.initial_buffer_len = initial_buffer_len;
        self
    }

    pub fn with_max_buffer_len(mut self, max_buffer_len: usize) -> Self {
        self.max_buffer_len = max_buffer_len;
        self
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            escape_non_ascii: self.escape_non_ascii,
        }
    }

    fn buffer_provider<U: PoolElement>(&self) -> Arc<dyn BufferProvider<U>> {
        Arc::new(PooledBufferProvider::with_limits(
            Arc::clone(U::shared_pool()),
            self.initial_buffer_len,
            self.max_buffer_len,
        ))
    }
}

/// Runs (de)serialize calls against a contract provider and pooled buffers.
///
/// The engine is immutable and can be shared between threads; every call
/// gets its own writer or tokenizer and context.
///
/// ```
/// use std::sync::Arc;
/// use contract_json::{ImmutableContractProvider, JsonEngine};
///
/// let provider = ImmutableContractProvider::builder()
///     .with_builtin_contracts()
///     .build()
///     .unwrap();
/// let engine = JsonEngine::new(Arc::new(provider));
///
/// let json = engine.serialize_utf8(&String::from("hi")).unwrap();
/// assert_eq!(json.as_str().unwrap(), r#""hi""#);
/// let back: String = engine.deserialize_str(r#""hi""#).unwrap();
/// assert_eq!(back, "hi");
/// ```
pub struct JsonEngine {
    provider: Arc<dyn ContractProvider>,
    utf8: Arc<dyn BufferProvider<u8>>,
    utf16: Arc<dyn BufferProvider<u16>>,
    options: EngineOptions,
}

impl JsonEngine {
    pub fn new(provider: Arc<dyn ContractProvider>) -> Self {
        Self::with_options(provider, EngineOptions::default())
    }

    pub fn with_options(provider: Arc<dyn ContractProvider>, options: EngineOptions) -> Self {
        let utf8 = options.buffer_provider::<u8>();
        let utf16 = options.buffer_provider::<u16>();
        Self::with_buffer_providers(provider, utf8, utf16, options)
    }

    /// Uses caller-supplied buffer providers. The buffer sizes in `options`
    /// are ignored.
    pub fn with_buffer_providers(
        provider: Arc<dyn ContractProvider>,
        utf8: Arc<dyn BufferProvider<u8>>,
        utf16: Arc<dyn BufferProvider<u16>>,
        options: EngineOptions,
    ) -> Self {
        Self {
            provider,
            utf8,
            utf16,
            options,
        }
    }

    pub fn provider(&self) -> &Arc<dyn ContractProvider> {
        &self.provider
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn serialize_utf8<T: 'static>(&self, value: &T) -> Result<Serialized<u8>> {
        self.serialize_keyed(&self.utf8, TypeKey::of::<T>(), value)
    }

    pub fn serialize_utf16<T: 'static>(&self, value: &T) -> Result<Serialized<u16>> {
        self.serialize_keyed(&self.utf16, TypeKey::of::<T>(), value)
    }

    pub fn serialize_utf8_keyed<T: 'static>(
        &self,
        discriminator: &'static str,
        value: &T,
    ) -> Result<Serialized<u8>> {
        self.serialize_keyed(&self.utf8, TypeKey::keyed::<T>(discriminator), value)
    }

    pub fn serialize_utf16_keyed<T: 'static>(
        &self,
        discriminator: &'static str,
        value: &T,
    ) -> Result<Serialized<u16>> {
        self.serialize_keyed(&self.utf16, TypeKey::keyed::<T>(discriminator), value)
    }

    /// Serializes with a known contract; no registry lookup for the root.
    pub fn serialize_utf8_with<T: ?Sized, C: SerializeContract<T>>(
        &self,
        contract: &C,
        value: &T,
    ) -> Result<Serialized<u8>> {
        self.serialize_static(&self.utf8, contract, value)
    }

    pub fn serialize_utf16_with<T: ?Sized, C: SerializeContract<T>>(
        &self,
        contract: &C,
        value: &T,
    ) -> Result<Serialized<u16>> {
        self.serialize_static(&self.utf16, contract, value)
    }

    pub fn deserialize_utf8<T: 'static>(&self, input: &[u8]) -> Result<T> {
        self.deserialize_keyed(TypeKey::of::<T>(), input)
    }

    pub fn deserialize_utf16<T: 'static>(&self, input: &[u16]) -> Result<T> {
        self.deserialize_keyed(TypeKey::of::<T>(), input)
    }

    pub fn deserialize_str<T: 'static>(&self, input: &str) -> Result<T> {
        self.deserialize_utf8(input.as_bytes())
    }

    pub fn deserialize_utf8_keyed<T: 'static>(
        &self,
        discriminator: &'static str,
        input: &[u8],
    ) -> Result<T> {
        self.deserialize_keyed(TypeKey::keyed::<T>(discriminator), input)
    }

    pub fn deserialize_utf16_keyed<T: 'static>(
        &self,
        discriminator: &'static str,
        input: &[u16],
    ) -> Result<T> {
        self.deserialize_keyed(TypeKey::keyed::<T>(discriminator), input)
    }

    /// Deserializes with a known contract; no registry lookup for the root.
    pub fn deserialize_utf8_with<T, C: DeserializeContract<T>>(
        &self,
        contract: &C,
        input: &[u8],
    ) -> Result<T> {
        self.deserialize_static(contract, input)
    }

    pub fn deserialize_utf16_with<T, C: DeserializeContract<T>>(
        &self,
        contract: &C,
        input: &[u16],
    ) -> Result<T> {
        self.deserialize_static(contract, input)
    }

    fn writer<U: CodeUnit>(&self, buffers: &Arc<dyn BufferProvider<U>>) -> BufferWriter<U> {
        BufferWriter::with_options(Arc::clone(buffers), self.options.writer_options())
    }

    fn serialize_keyed<U: CodeUnit, T: 'static>(
        &self,
        buffers: &Arc<dyn BufferProvider<U>>,
        key: TypeKey,
        value: &T,
    ) -> Result<Serialized<U>> {
        let mut writer = self.writer(buffers);
        let mut ctx = SerializeContext::new(self.provider.as_ref(), self.options.max_depth);
        ctx.dispatch(key, value, writer.as_any_writer())?;
        Ok(Serialized::from_writer(writer))
    }

    fn serialize_static<U: CodeUnit, T: ?Sized, C: SerializeContract<T>>(
        &self,
        buffers: &Arc<dyn BufferProvider<U>>,
        contract: &C,
        value: &T,
    ) -> Result<Serialized<U>> {
        let mut writer = self.writer(buffers);
        let mut ctx = SerializeContext::new(self.provider.as_ref(), self.options.max_depth);
        contract.serialize(value, &mut ctx, &mut writer)?;
        Ok(Serialized::from_writer(writer))
    }

    fn deserialize_keyed<U: CodeUnit, T: 'static>(&self, key: TypeKey, input: &[U]) -> Result<T> {
        let mut tokenizer = Tokenizer::new(input);
        let mut ctx = DeserializeContext::new(self.provider.as_ref(), self.options.max_depth);
        let value = ctx.dispatch(key, &mut tokenizer)?;
        tokenizer.expect_end_of_document()?;
        Ok(value)
    }

    fn deserialize_static<U: CodeUnit, T, C: DeserializeContract<T>>(
        &self,
        contract: &C,
        input: &[U],
    ) -> Result<T> {
        let mut tokenizer = Tokenizer::new(input);
        let mut ctx = DeserializeContext::new(self.provider.as_ref(), self.options.max_depth);
        let value = contract.deserialize(&mut tokenizer, &mut ctx)?;
        tokenizer.expect_end_of_document()?;
        Ok(value)
    }
}

impl fmt::Debug for JsonEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Output of a serialize call, still backed by a pooled buffer.
///
/// Dropping it (or calling [`Serialized::release`]) returns the buffer to
/// its pool; copy the contents out with [`Serialized::to_vec`] to keep them
/// longer.
pub struct Serialized<U: CodeUnit> {
    buffer: Buffer<U>,
    provider: Arc<dyn BufferProvider<U>>,
}

impl<U: CodeUnit> Serialized<U> {
    fn from_writer(writer: BufferWriter<U>) -> Self {
        let (buffer, provider) = writer.into_parts();
        Self { buffer, provider }
    }

    pub fn as_slice(&self) -> &[U] {
        self.buffer.written()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn to_vec(&self) -> Vec<U> {
        self.as_slice().to_vec()
    }

    /// Returns the buffer to its pool now.
    pub fn release(self) {}
}

impl Serialized<u8> {
    pub fn as_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_slice())
    }
}

impl Serialized<u16> {
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.as_slice())
    }
}

impl<U: CodeUnit> AsRef<[U]> for Serialized<U> {
    fn as_ref(&self) -> &[U] {
        self.as_slice()
    }
}

impl<U: CodeUnit> Drop for Serialized<U> {
    fn drop(&mut self) {
        self.provider.finish(std::mem::take(&mut self.buffer));
    }
}

impl<U: CodeUnit> fmt::Debug for Serialized<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serialized")
            .field("encoding", &U::ENCODING)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{I32Contract, ImmutableContractProvider, VecContract};
    use crate::error::JsonError;
    use contract_json_buffers::BufferPool;

    fn engine() -> JsonEngine {
        let provider = ImmutableContractProvider::builder()
            .with_builtin_contracts()
            .two_way::<Vec<i32>, _>(VecContract(I32Contract))
            .build()
            .unwrap();
        JsonEngine::new(Arc::new(provider))
    }

    #[test]
    fn both_encodings_round_trip() {
        let engine = engine();
        let value = vec![1, -2, i32::MAX];
        let utf8 = engine.serialize_utf8(&value).unwrap();
        assert_eq!(utf8.as_str().unwrap(), "[1,-2,2147483647]");
        let utf16 = engine.serialize_utf16(&value).unwrap();
        assert_eq!(utf16.to_string_lossy(), "[1,-2,2147483647]");
        assert_eq!(engine.deserialize_utf8::<Vec<i32>>(utf8.as_slice()).unwrap(), value);
        assert_eq!(engine.deserialize_utf16::<Vec<i32>>(utf16.as_slice()).unwrap(), value);
    }

    #[test]
    fn trailing_content_is_rejected() {
        let err = engine().deserialize_str::<i32>("1 2").unwrap_err();
        assert!(matches!(err, JsonError::TrailingContent { .. }));
    }

    #[test]
    fn missing_contract_wins_over_lexical_errors() {
        let err = engine().deserialize_str::<char>("}{").unwrap_err();
        assert!(matches!(err, JsonError::ContractNotFound { .. }));
        let err = engine().serialize_utf8(&'c').unwrap_err();
        assert!(matches!(err, JsonError::ContractNotFound { .. }));
    }

    #[test]
    fn buffers_return_to_the_pool_on_success_and_failure() {
        let pool = Arc::new(BufferPool::<u8>::new());
        let utf8: Arc<dyn BufferProvider<u8>> =
            Arc::new(PooledBufferProvider::with_limits(Arc::clone(&pool), 4, 32));
        let provider = ImmutableContractProvider::builder()
            .with_builtin_contracts()
            .build()
            .unwrap();
        let engine = JsonEngine::with_buffer_providers(
            Arc::new(provider),
            utf8,
            Arc::new(PooledBufferProvider::<u16>::new()),
            EngineOptions::default(),
        );

        let ok = engine.serialize_utf8(&String::from("fits")).unwrap();
        assert_eq!(pool.stats().outstanding(), 1);
        ok.release();
        assert_eq!(pool.stats().outstanding(), 0);

        let err = engine.serialize_utf8(&"x".repeat(64)).unwrap_err();
        assert!(matches!(err, JsonError::Buffer(_)));
        assert_eq!(pool.stats().outstanding(), 0);
    }

    #[test]
    fn options_builders() {
        let options = EngineOptions::default()
            .with_max_depth(3)
            .with_escape_non_ascii(true)
            .with_initial_buffer_len(16)
            .with_max_buffer_len(1024);
        assert_eq!(options.max_depth, 3);
        assert!(options.writer_options().escape_non_ascii);
        let engine = JsonEngine::with_options(
            Arc::new(ImmutableContractProvider::builder().with_builtin_contracts().build().unwrap()),
            options,
        );
        let json = engine.serialize_utf8(&String::from("ü")).unwrap();
        assert_eq!(json.as_str().unwrap(), r#""\u00FC""#);
    }
}
