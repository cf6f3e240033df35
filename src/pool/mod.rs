//! Size-classed pooling of reusable byte storage.
//!
//! A [`PoolRegistry`] keeps one lazily created bucket per power-of-two size
//! class. It is generic over the pooled kind through [`Poolable`]; the three
//! kinds used across the crate have aliases below. [`SinglePool`] is the
//! unsized variant for storage that is reused at whatever size it grew to.

mod config;
mod defaults;
mod poolable;
mod registry;
mod single;
pub mod size_class;

use bytes::BytesMut;

use crate::codec::BufferCursor;

pub use config::{PoolConfig, DEFAULT_BUCKET_DEPTH, DEFAULT_MAX_CAPACITY, DEFAULT_MIN_CAPACITY};
pub use defaults::{
    default_buffer_pool, default_cursor_pool, default_single_buffer_pool, default_slice_pool,
    DEFAULT_BUFFER_POOL_CONFIG, DEFAULT_SLICE_POOL_CONFIG,
};
pub use poolable::Poolable;
pub use registry::{PoolRegistry, PoolStats, Pooled};
pub use single::SinglePool;

/// Pool of growable buffers, handed out empty.
pub type BufferPool = PoolRegistry<BytesMut>;

/// Pool of raw byte slices, handed out at the requested length.
pub type SlicePool = PoolRegistry<Vec<u8>>;

/// Pool of codec cursors, handed out empty and rewound.
pub type CursorPool = PoolRegistry<BufferCursor>;
