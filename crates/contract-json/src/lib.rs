//! Contract-driven JSON for UTF-8 and UTF-16 buffers.
//!
//! Every type is (de)serialized by a *contract* bound to its [`TypeKey`].
//! Contracts are generic over the [`JsonWriter`] and [`Tokenizer`] they
//! drive, so each one compiles to direct calls per encoding. A
//! [`ContractProvider`] maps keys to contracts, and the [`JsonEngine`] ties
//! providers, pooled buffers and contracts together.
//!
//! # Modules
//!
//! - [`tokenizer`] - pull tokenizer with typed `read_*` helpers
//! - [`number`] - integer parsing with explicit overflow status
//! - [`writer`] - JSON writers with a pre-encoded constant fast path
//! - [`contract`] - contract traits, registry providers, built-in contracts
//! - [`engine`] - top-level calls and configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use contract_json::{
//!     object_contract, I32Contract, ImmutableContractProvider, JsonEngine, StringContract,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! pub struct User {
//!     pub id: i32,
//!     pub name: String,
//! }
//!
//! object_contract! {
//!     pub struct UserContract for User {
//!         id: i32 => "id" with I32Contract,
//!         name: String => "name" with StringContract,
//!     }
//! }
//!
//! let provider = ImmutableContractProvider::builder()
//!     .two_way::<User, _>(UserContract::new())
//!     .build()
//!     .unwrap();
//! let engine = JsonEngine::new(Arc::new(provider));
//!
//! let user = User { id: 7, name: "Ada".into() };
//! let json = engine.serialize_utf8(&user).unwrap();
//! assert_eq!(json.as_str().unwrap(), r#"{"id":7,"name":"Ada"}"#);
//!
//! let utf16: Vec<u16> = r#"{"name":"Ada", "id":7}"#.encode_utf16().collect();
//! assert_eq!(engine.deserialize_utf16::<User>(&utf16).unwrap(), user);
//! ```

mod constant;
mod context;
pub mod contract;
pub mod encoding;
pub mod engine;
mod error;
pub mod number;
mod token;
pub mod tokenizer;
mod unescape;
pub mod writer;

pub use constant::ConstantValue;
pub use context::{DeserializeContext, SerializeContext};
pub use contract::{
    BoolContract, ContractCompiler, ContractEntry, ContractKind, ContractProvider,
    ContractProviderExt, DeserializeContract, DynamicContractProvider, F64Contract, I32Contract,
    I64Contract, ImmutableContractProvider, ImmutableContractProviderBuilder, Nested,
    ObjectDeserializeContract, ObjectSerializeContract, OptionContract, SerdeContract,
    SerdeContractCompiler, SerializeContract, StringContract, TypeKey, U32Contract, U64Contract,
    VecContract,
};
pub use encoding::{CodeUnit, Encoding};
pub use engine::{EngineOptions, JsonEngine, Serialized};
pub use error::{JsonError, Position, Result};
pub use token::{Token, TokenKind};
pub use tokenizer::{AnyTokenizer, Tokenizer, Utf16Tokenizer, Utf8Tokenizer};
pub use writer::{AnyWriter, BufferWriter, JsonWriter, Utf16Writer, Utf8Writer, WriterOptions};

pub use contract_json_buffers as buffers;
