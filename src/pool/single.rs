//! Unsized pool: one queue, no size classes.
//!
//! For callers that reuse whatever storage comes back and let it grow as
//! needed. Objects are reset on `put` and handed out as they were left.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::ArrayQueue;

use crate::pool::config::DEFAULT_BUCKET_DEPTH;
use crate::pool::poolable::Poolable;
use crate::pool::registry::PoolStats;

/// Lock-free pool of interchangeable `T`, regardless of capacity.
pub struct SinglePool<T> {
    idle: ArrayQueue<T>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    returns: AtomicUsize,
    drops: AtomicUsize,
}

impl<T: Poolable> SinglePool<T> {
    /// Create a pool keeping at most [`DEFAULT_BUCKET_DEPTH`] idle objects.
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_BUCKET_DEPTH)
    }

    /// # Panics
    ///
    /// Panics if `depth` is zero.
    #[track_caller]
    pub fn with_depth(depth: usize) -> Self {
        assert!(depth > 0, "single pool: depth must be positive");
        Self {
            idle: ArrayQueue::new(depth),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            returns: AtomicUsize::new(0),
            drops: AtomicUsize::new(0),
        }
    }

    /// Take an idle object, or allocate an empty one.
    #[inline]
    pub fn get(&self) -> T {
        match self.idle.pop() {
            Some(obj) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                obj
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                T::allocate(0)
            }
        }
    }

    /// Reset `obj` and keep it for reuse. Dropped if the pool is full.
    #[inline]
    pub fn put(&self, mut obj: T) {
        obj.reset();
        if self.idle.push(obj).is_ok() {
            self.returns.fetch_add(1, Ordering::Relaxed);
        } else {
            self.drops.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
            buckets: 1,
            idle: self.idle.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.idle.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty()
    }
}

impl<T: Poolable> Default for SinglePool<T> {
    fn default() -> Self {
        Self::new()
    }
}
