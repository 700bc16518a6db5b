//! Buffer acquisition and growth strategy.

use std::sync::Arc;

use crate::{Buffer, BufferError, BufferPool, PoolElement};

/// Largest buffer length a provider will hand out by default.
pub const MAX_BUFFER_LEN: usize = 0x7FFF_FFC7;

/// Initial buffer length used by [`PooledBufferProvider::new`].
pub const DEFAULT_INITIAL_LEN: usize = 4096;

/// Supplies write buffers and grows them on demand.
///
/// Every buffer obtained from `initial_buffer` or `grow` must eventually be
/// passed to `finish` exactly once, on success and failure paths alike.
pub trait BufferProvider<T>: Send + Sync {
    /// A fresh, empty buffer.
    fn initial_buffer(&self) -> Buffer<T>;

    /// Exchanges `current` for a buffer with room for `required` more units.
    ///
    /// The written prefix of `current` is copied into the new buffer and the
    /// old storage goes back to the pool. On error `current` has already been
    /// released.
    fn grow(&self, current: Buffer<T>, required: usize) -> Result<Buffer<T>, BufferError>;

    /// Releases a buffer back to the pool.
    fn finish(&self, buffer: Buffer<T>);
}

/// Default provider: rents from a [`BufferPool`] and doubles on growth.
pub struct PooledBufferProvider<T> {
    pool: Arc<BufferPool<T>>,
    initial_len: usize,
    max_len: usize,
}

impl<T: PoolElement> Default for PooledBufferProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PoolElement> PooledBufferProvider<T> {
    /// Uses the process-wide shared pool and default sizes.
    pub fn new() -> Self {
        Self::with_limits(
            Arc::clone(T::shared_pool()),
            DEFAULT_INITIAL_LEN,
            MAX_BUFFER_LEN,
        )
    }
}

impl<T: Copy + Default> PooledBufferProvider<T> {
    pub fn with_limits(pool: Arc<BufferPool<T>>, initial_len: usize, max_len: usize) -> Self {
        let initial_len = initial_len.clamp(1, max_len.max(1));
        Self {
            pool,
            initial_len,
            max_len,
        }
    }

    pub fn pool(&self) -> &Arc<BufferPool<T>> {
        &self.pool
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Capacity chosen when growing from `capacity` to hold `needed` units.
    fn next_capacity(&self, capacity: usize, needed: usize) -> usize {
        capacity.saturating_mul(2).max(needed).min(self.max_len)
    }
}

impl<T: Copy + Default + Send + Sync> BufferProvider<T> for PooledBufferProvider<T> {
    fn initial_buffer(&self) -> Buffer<T> {
        Buffer::from_storage(self.pool.rent_within(self.initial_len, self.max_len))
    }

    fn grow(&self, current: Buffer<T>, required: usize) -> Result<Buffer<T>, BufferError> {
        let needed = match current.len().checked_add(required) {
            Some(needed) if needed <= self.max_len => needed,
            other => {
                let requested = other.unwrap_or(usize::MAX);
                tracing::warn!(requested, max = self.max_len, "buffer growth hit the hard cap");
                self.finish(current);
                return Err(BufferError::MaxSizeExceeded {
                    requested,
                    max: self.max_len,
                });
            }
        };
        let capacity = self.next_capacity(current.capacity(), needed);
        tracing::trace!(from = current.capacity(), to = capacity, "growing buffer");

        let mut next = Buffer::from_storage(self.pool.rent_within(capacity, self.max_len));
        next.put_slice(current.written());
        self.finish(current);
        Ok(next)
    }

    fn finish(&self, buffer: Buffer<T>) {
        self.pool.give_back(buffer.into_storage());
    }
}
