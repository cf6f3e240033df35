//! Process-wide convenience pools.
//!
//! Each sized pool is an ordinary [`PoolRegistry`] built from an explicit
//! [`PoolConfig`] on first access. Nothing in the crate depends on them;
//! callers that want their own bounds or lifetimes construct registries
//! directly.

use std::sync::OnceLock;

use bytes::BytesMut;

use crate::pool::config::{PoolConfig, DEFAULT_MAX_CAPACITY};
use crate::pool::registry::PoolRegistry;
use crate::pool::{BufferPool, CursorPool, SinglePool, SlicePool};

/// Bounds of [`default_buffer_pool`].
pub const DEFAULT_BUFFER_POOL_CONFIG: PoolConfig = PoolConfig {
    min_capacity: 16,
    max_capacity: DEFAULT_MAX_CAPACITY,
    bucket_depth: 256,
};

/// Bounds of [`default_slice_pool`] and [`default_cursor_pool`].
pub const DEFAULT_SLICE_POOL_CONFIG: PoolConfig = PoolConfig {
    min_capacity: 64,
    max_capacity: DEFAULT_MAX_CAPACITY,
    bucket_depth: 256,
};

static BUFFER_POOL: OnceLock<BufferPool> = OnceLock::new();
static SLICE_POOL: OnceLock<SlicePool> = OnceLock::new();
static CURSOR_POOL: OnceLock<CursorPool> = OnceLock::new();
static SINGLE_BUFFER_POOL: OnceLock<SinglePool<BytesMut>> = OnceLock::new();

/// Shared pool of growable `BytesMut` buffers, 16 B to 1 GiB.
pub fn default_buffer_pool() -> &'static BufferPool {
    BUFFER_POOL.get_or_init(|| PoolRegistry::with_config(DEFAULT_BUFFER_POOL_CONFIG))
}

/// Shared pool of raw byte slices, 64 B to 1 GiB.
pub fn default_slice_pool() -> &'static SlicePool {
    SLICE_POOL.get_or_init(|| PoolRegistry::with_config(DEFAULT_SLICE_POOL_CONFIG))
}

/// Shared pool of [`BufferCursor`](crate::codec::BufferCursor)s, 64 B to 1 GiB.
pub fn default_cursor_pool() -> &'static CursorPool {
    CURSOR_POOL.get_or_init(|| PoolRegistry::with_config(DEFAULT_SLICE_POOL_CONFIG))
}

/// Shared unsized pool of `BytesMut` buffers.
pub fn default_single_buffer_pool() -> &'static SinglePool<BytesMut> {
    SINGLE_BUFFER_POOL.get_or_init(SinglePool::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pools_bounds() {
        assert_eq!(default_buffer_pool().min_class(), 4);
        assert_eq!(default_buffer_pool().max_class(), 30);
        assert_eq!(default_slice_pool().min_class(), 6);
        assert_eq!(default_cursor_pool().max_class(), 30);
    }

    #[test]
    fn test_default_pool_is_shared() {
        assert!(std::ptr::eq(default_slice_pool(), default_slice_pool()));

        let mut cur = default_cursor_pool().get_pooled(128);
        cur.encode_uvarint(300);
        assert_eq!(cur.decode_uvarint().unwrap(), 300);
    }

    #[test]
    fn test_default_single_pool_reuses() {
        let pool = default_single_buffer_pool();
        assert!(std::ptr::eq(pool, default_single_buffer_pool()));

        let mut buf = pool.get();
        buf.extend_from_slice(b"stale");
        pool.put(buf);
        assert!(pool.get().is_empty());
    }
}
