pub mod codec;
pub mod config;
pub mod error;
pub mod pool;

pub use codec::{BufferCursor, ByteRead, ByteWrite, StreamReader, StreamWriter};
pub use config::Config;
pub use error::{Error, Result};
pub use pool::{
    BufferPool, CursorPool, PoolConfig, PoolRegistry, PoolStats, Poolable, Pooled, SinglePool,
    SlicePool,
};
