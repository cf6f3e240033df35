use crate::pool::size_class::class_of;

/// Default smallest pooled capacity.
pub const DEFAULT_MIN_CAPACITY: usize = 64;

/// Default largest pooled capacity (1 GiB).
pub const DEFAULT_MAX_CAPACITY: usize = 1 << 30;

/// Default number of idle objects kept per size class.
pub const DEFAULT_BUCKET_DEPTH: usize = 256;

/// Configuration for a [`PoolRegistry`](super::PoolRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Smallest capacity served; rounded up to a size class (default: 64)
    pub min_capacity: usize,

    /// Largest capacity served; rounded up to a size class (default: 1 GiB)
    pub max_capacity: usize,

    /// Idle objects retained per size class before returns are dropped (default: 256)
    pub bucket_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_capacity: DEFAULT_MIN_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
            bucket_depth: DEFAULT_BUCKET_DEPTH,
        }
    }
}

impl PoolConfig {
    /// Create a config for the given capacity range with default depth.
    pub fn new(min_capacity: usize, max_capacity: usize) -> Self {
        Self {
            min_capacity,
            max_capacity,
            ..Default::default()
        }
    }

    pub fn with_bucket_depth(mut self, bucket_depth: usize) -> Self {
        self.bucket_depth = bucket_depth;
        self
    }

    /// Size class of the smallest capacity.
    pub fn min_class(&self) -> u32 {
        class_of(self.min_capacity)
    }

    /// Size class of the largest capacity.
    pub fn max_class(&self) -> u32 {
        class_of(self.max_capacity)
    }
}
