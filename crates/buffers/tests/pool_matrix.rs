//! Pool and provider behavior under growth and concurrent use.

use std::sync::Arc;

use contract_json_buffers::{
    Buffer, BufferError, BufferPool, BufferProvider, PooledBufferProvider, MAX_BUFFER_LEN,
};
use proptest::prelude::*;

fn write_all(provider: &PooledBufferProvider<u16>, mut buf: Buffer<u16>, data: &[u16]) -> Buffer<u16> {
    for chunk in data.chunks(3) {
        if buf.remaining() < chunk.len() {
            buf = provider.grow(buf, chunk.len()).expect("grow");
        }
        buf.put_slice(chunk);
    }
    buf
}

#[test]
fn default_provider_uses_the_shared_pool() {
    let provider = PooledBufferProvider::<u8>::new();
    assert_eq!(provider.max_len(), MAX_BUFFER_LEN);
    let buf = provider.initial_buffer();
    assert!(buf.capacity() >= 1);
    provider.finish(buf);
}

#[test]
fn concurrent_rent_and_return_balance_out() {
    let pool = Arc::new(BufferPool::<u8>::with_max_retained(8));
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let pool = Arc::clone(&pool);
            scope.spawn(move || {
                let provider = PooledBufferProvider::with_limits(pool, 2, 1 << 16);
                for round in 0..200 {
                    let mut buf = provider.initial_buffer();
                    let payload = vec![worker as u8; round % 17 + 1];
                    if buf.remaining() < payload.len() {
                        buf = provider.grow(buf, payload.len()).expect("grow");
                    }
                    buf.put_slice(&payload);
                    assert_eq!(buf.written(), payload.as_slice());
                    provider.finish(buf);
                }
            });
        }
    });
    let stats = pool.stats();
    assert_eq!(stats.outstanding(), 0);
    assert!(stats.retained <= 8);
}

#[test]
fn growth_failure_reports_requested_and_max() {
    let provider = PooledBufferProvider::with_limits(Arc::new(BufferPool::<u16>::new()), 4, 6);
    let buf = write_all(&provider, provider.initial_buffer(), &[1, 2, 3, 4, 5, 6]);
    assert_eq!(buf.capacity(), 6);
    match provider.grow(buf, 4) {
        Err(BufferError::MaxSizeExceeded { requested, max }) => {
            assert_eq!(requested, 10);
            assert_eq!(max, 6);
        }
        Ok(_) => panic!("growth past the cap must fail"),
    }
    assert_eq!(provider.pool().stats().outstanding(), 0);
}

proptest! {
    #[test]
    fn growth_preserves_written_prefix(data in proptest::collection::vec(any::<u16>(), 0..500)) {
        let provider = PooledBufferProvider::with_limits(Arc::new(BufferPool::<u16>::new()), 1, 1 << 20);
        let buf = write_all(&provider, provider.initial_buffer(), &data);
        prop_assert_eq!(buf.written(), data.as_slice());
        prop_assert!(buf.len() <= buf.capacity());
        provider.finish(buf);
        prop_assert_eq!(provider.pool().stats().outstanding(), 0);
    }
}
