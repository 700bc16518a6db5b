//! Fixed-capacity write region with a cursor.

/// An owned, fixed-capacity region of `T` with a write cursor.
///
/// The cursor `x` marks the end of the written prefix. It never exceeds the
/// capacity: callers reserve room through their
/// [`BufferProvider`](crate::BufferProvider) before writing, the same way a
/// writer calls `ensure_capacity` before touching the storage.
///
/// # Example
///
/// ```
/// use contract_json_buffers::Buffer;
///
/// let mut buf = Buffer::from_storage(vec![0u8; 8].into_boxed_slice());
/// buf.put(b'{');
/// buf.put_slice(b"}");
/// assert_eq!(buf.written(), b"{}");
/// assert_eq!(buf.remaining(), 6);
/// ```
#[derive(Debug, Default)]
pub struct Buffer<T> {
    storage: Box<[T]>,
    x: usize,
}

impl<T: Copy> Buffer<T> {
    /// Wraps pooled storage; the cursor starts at zero.
    pub fn from_storage(storage: Box<[T]>) -> Self {
        Self { storage, x: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of units written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.x
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.x
    }

    /// The written prefix.
    #[inline]
    pub fn written(&self) -> &[T] {
        &self.storage[..self.x]
    }

    /// Appends one unit. Capacity must have been reserved.
    #[inline]
    pub fn put(&mut self, unit: T) {
        debug_assert!(self.x < self.storage.len(), "write past buffer capacity");
        self.storage[self.x] = unit;
        self.x += 1;
    }

    /// Appends a slice. Capacity must have been reserved.
    #[inline]
    pub fn put_slice(&mut self, src: &[T]) {
        let end = self.x + src.len();
        debug_assert!(end <= self.storage.len(), "write past buffer capacity");
        self.storage[self.x..end].copy_from_slice(src);
        self.x = end;
    }

    /// Unwritten tail of the storage, for writers that render in place.
    #[inline]
    pub fn spare_mut(&mut self) -> &mut [T] {
        &mut self.storage[self.x..]
    }

    /// Moves the cursor forward after writing into [`Buffer::spare_mut`].
    #[inline]
    pub fn advance(&mut self, n: usize) {
        assert!(n <= self.remaining(), "advance past buffer capacity");
        self.x += n;
    }

    pub fn clear(&mut self) {
        self.x = 0;
    }

    /// Gives up the storage, e.g. to return it to a pool.
    pub fn into_storage(self) -> Box<[T]> {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_buffer_has_no_capacity() {
        let buf: Buffer<u16> = Buffer::default();
        assert_eq!(buf.capacity(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn spare_and_advance() {
        let mut buf = Buffer::from_storage(vec![0u16; 4].into_boxed_slice());
        buf.spare_mut()[..2].copy_from_slice(&[1, 2]);
        buf.advance(2);
        buf.put(3);
        assert_eq!(buf.written(), &[1, 2, 3]);
        buf.clear();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    #[should_panic(expected = "advance past buffer capacity")]
    fn advance_is_checked() {
        let mut buf = Buffer::from_storage(vec![0u8; 2].into_boxed_slice());
        buf.advance(3);
    }
}
