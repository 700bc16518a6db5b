//! Buffer error type.

use thiserror::Error;

/// Errors raised while acquiring or growing a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Growth would exceed the provider's hard maximum length.
    #[error("buffer cannot grow to {requested} units, maximum is {max}")]
    MaxSizeExceeded { requested: usize, max: usize },
}
