//! Thread-safe pool of reusable buffer storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// Default number of idle buffers a pool keeps around.
pub const DEFAULT_MAX_RETAINED: usize = 64;

/// A free list of boxed slices shared between unrelated (de)serialize calls.
///
/// `rent` and `give_back` may be called concurrently from any thread. The
/// free list is guarded by a mutex held only for the list operation itself;
/// allocation of fresh storage happens outside the lock.
pub struct BufferPool<T> {
    free: Mutex<Vec<Box<[T]>>>,
    max_retained: usize,
    rented: AtomicUsize,
    returned: AtomicUsize,
    allocated: AtomicUsize,
}

/// Point-in-time counters of a [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total `rent` calls.
    pub rented: usize,
    /// Total `give_back` calls that carried storage.
    pub returned: usize,
    /// Rents that had to allocate because no idle buffer was large enough.
    pub allocated: usize,
    /// Idle buffers currently held.
    pub retained: usize,
}

impl PoolStats {
    /// Buffers rented and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.rented.saturating_sub(self.returned)
    }
}

impl<T: Copy + Default> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> BufferPool<T> {
    pub fn new() -> Self {
        Self::with_max_retained(DEFAULT_MAX_RETAINED)
    }

    pub fn with_max_retained(max_retained: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_retained,
            rented: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        }
    }

    /// Returns storage of at least `min_len` units, reusing an idle buffer
    /// when one is large enough.
    pub fn rent(&self, min_len: usize) -> Box<[T]> {
        self.rent_within(min_len, usize::MAX)
    }

    /// Like [`BufferPool::rent`], but never hands out storage longer than
    /// `max_len` units. Idle buffers outside the range stay in the pool.
    pub fn rent_within(&self, min_len: usize, max_len: usize) -> Box<[T]> {
        self.rented.fetch_add(1, Ordering::Relaxed);
        let reused = {
            let mut free = self.free.lock();
            free.iter()
                .position(|storage| (min_len..=max_len).contains(&storage.len()))
                .map(|index| free.swap_remove(index))
        };
        match reused {
            Some(storage) => {
                tracing::trace!(len = storage.len(), min_len, "reused pooled buffer");
                storage
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(min_len, "allocated pooled buffer");
                vec![T::default(); min_len].into_boxed_slice()
            }
        }
    }

    /// Hands storage back. Storage beyond the retention limit is dropped.
    pub fn give_back(&self, storage: Box<[T]>) {
        if storage.is_empty() {
            return;
        }
        self.returned.fetch_add(1, Ordering::Relaxed);
        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(storage);
        }
    }

    /// Drops every idle buffer, returning how many units were released.
    pub fn clear(&self) -> usize {
        let mut free = self.free.lock();
        let released = free.iter().map(|storage| storage.len()).sum();
        free.clear();
        released
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rented: self.rented.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            retained: self.free.lock().len(),
        }
    }
}

/// Element types that have a process-wide shared pool.
pub trait PoolElement: Copy + Default + Send + Sync + 'static {
    /// The shared singleton pool for this element type.
    fn shared_pool() -> &'static Arc<BufferPool<Self>>;
}

impl PoolElement for u8 {
    fn shared_pool() -> &'static Arc<BufferPool<u8>> {
        static POOL: OnceLock<Arc<BufferPool<u8>>> = OnceLock::new();
        POOL.get_or_init(|| Arc::new(BufferPool::new()))
    }
}

impl PoolElement for u16 {
    fn shared_pool() -> &'static Arc<BufferPool<u16>> {
        static POOL: OnceLock<Arc<BufferPool<u16>>> = OnceLock::new();
        POOL.get_or_init(|| Arc::new(BufferPool::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rent_reuses_large_enough_storage() {
        let pool = BufferPool::<u8>::new();
        let storage = pool.rent(32);
        assert_eq!(storage.len(), 32);
        pool.give_back(storage);

        let again = pool.rent(16);
        assert_eq!(again.len(), 32);
        let stats = pool.stats();
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.rented, 2);
        assert_eq!(stats.retained, 0);
    }

    #[test]
    fn rent_allocates_when_idle_buffers_are_too_small() {
        let pool = BufferPool::<u16>::new();
        pool.give_back(vec![0u16; 4].into_boxed_slice());
        let storage = pool.rent(8);
        assert_eq!(storage.len(), 8);
        assert_eq!(pool.stats().retained, 1);
    }

    #[test]
    fn rent_within_leaves_oversized_storage_idle() {
        let pool = BufferPool::<u8>::new();
        pool.give_back(vec![0u8; 4096].into_boxed_slice());
        let storage = pool.rent_within(16, 32);
        assert_eq!(storage.len(), 16);
        assert_eq!(pool.stats().allocated, 1);
        assert_eq!(pool.stats().retained, 1);

        pool.give_back(storage);
        assert_eq!(pool.rent_within(8, 32).len(), 16);
    }

    #[test]
    fn retention_is_bounded() {
        let pool = BufferPool::<u8>::with_max_retained(2);
        for _ in 0..5 {
            pool.give_back(vec![0u8; 4].into_boxed_slice());
        }
        assert_eq!(pool.stats().retained, 2);
        assert_eq!(pool.clear(), 8);
        assert_eq!(pool.stats().retained, 0);
    }

    #[test]
    fn empty_storage_is_ignored() {
        let pool = BufferPool::<u8>::new();
        pool.give_back(Box::default());
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn shared_pool_is_a_singleton() {
        assert!(Arc::ptr_eq(u8::shared_pool(), u8::shared_pool()));
        assert!(Arc::ptr_eq(u16::shared_pool(), u16::shared_pool()));
    }
}
