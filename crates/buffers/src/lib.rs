//! Pooled write buffers for contract-json.
//!
//! # Overview
//!
//! - [`Buffer`] - a fixed-capacity region with a write cursor
//! - [`BufferPool`] - a thread-safe free list of buffer storage
//! - [`BufferProvider`] - hands out buffers and grows them for writers
//! - [`PooledBufferProvider`] - the default provider, doubling on growth
//!
//! # Example
//!
//! ```
//! use contract_json_buffers::{BufferProvider, PooledBufferProvider};
//!
//! let provider = PooledBufferProvider::<u8>::new();
//! let mut buf = provider.initial_buffer();
//! buf.put_slice(b"[]");
//! assert_eq!(buf.written(), b"[]");
//! provider.finish(buf);
//! ```

mod buffer;
mod error;
mod pool;
mod provider;

pub use buffer::Buffer;
pub use error::BufferError;
pub use pool::{BufferPool, PoolElement, PoolStats, DEFAULT_MAX_RETAINED};
pub use provider::{BufferProvider, PooledBufferProvider, DEFAULT_INITIAL_LEN, MAX_BUFFER_LEN};
