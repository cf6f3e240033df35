//! Size-classed pool of reusable objects.
//!
//! One bucket per power-of-two class between the configured bounds. Buckets
//! are created on first demand under the registry's creation lock; once a
//! bucket exists, `get` and `put` only touch its lock-free queue.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::pool::config::PoolConfig;
use crate::pool::poolable::Poolable;
use crate::pool::size_class::{class_capacity, class_of, floor_class, MAX_CLASS};

/// Relaxed ordering for counters (eventual visibility is fine for stats).
const RELAXED: Ordering = Ordering::Relaxed;

/// Idle objects of one size class.
struct Bucket<T> {
    idle: ArrayQueue<T>,
}

/// Pool of `T` partitioned into power-of-two size classes.
///
/// `get` and `put` may be called concurrently. Objects are exclusively owned
/// by the caller between `get` and `put`.
///
/// # Panics
///
/// Misuse is a programming error and panics: an inverted capacity range at
/// construction, a request above the largest class, or returning an object
/// whose capacity falls outside the configured classes.
pub struct PoolRegistry<T> {
    min_class: u32,
    max_class: u32,
    bucket_depth: usize,
    buckets: Box<[OnceLock<Bucket<T>>]>,
    create_lock: Mutex<()>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    returns: AtomicUsize,
    drops: AtomicUsize,
    created: AtomicUsize,
}

impl<T: Poolable> PoolRegistry<T> {
    /// Create a registry serving capacities from `min_capacity` to
    /// `max_capacity`, both rounded up to their size class.
    #[track_caller]
    pub fn new(min_capacity: usize, max_capacity: usize) -> Self {
        Self::with_config(PoolConfig::new(min_capacity, max_capacity))
    }

    #[track_caller]
    pub fn with_config(config: PoolConfig) -> Self {
        let min_class = config.min_class();
        let max_class = config.max_class();
        assert!(
            max_class >= min_class,
            "pool registry: max class {} (capacity {}) below min class {} (capacity {})",
            max_class,
            config.max_capacity,
            min_class,
            config.min_capacity
        );
        assert!(
            max_class <= MAX_CLASS,
            "pool registry: max capacity {} not addressable",
            config.max_capacity
        );
        assert!(config.bucket_depth > 0, "pool registry: bucket depth must be positive");

        let buckets = (min_class..=max_class).map(|_| OnceLock::new()).collect();
        Self {
            min_class,
            max_class,
            bucket_depth: config.bucket_depth,
            buckets,
            create_lock: Mutex::new(()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            returns: AtomicUsize::new(0),
            drops: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
        }
    }

    /// Hand out an object able to hold `requested` bytes.
    ///
    /// Its backing capacity is the power of two for the request's class,
    /// raised to the smallest configured class.
    #[track_caller]
    pub fn get(&self, requested: usize) -> T {
        let class = self.class_for_request(requested);
        let mut obj = match self.bucket(class).idle.pop() {
            Some(obj) => {
                self.hits.fetch_add(1, RELAXED);
                obj
            }
            None => {
                self.misses.fetch_add(1, RELAXED);
                T::allocate(class_capacity(class))
            }
        };
        obj.present(requested);
        obj
    }

    /// Like [`get`](Self::get), wrapped in a guard that returns the object on drop.
    #[track_caller]
    pub fn get_pooled(&self, requested: usize) -> Pooled<'_, T> {
        Pooled {
            registry: self,
            obj: Some(self.get(requested)),
        }
    }

    /// Reset `obj` and keep it for reuse.
    ///
    /// The class is taken from the backing capacity, not the visible length.
    /// If the bucket already holds `bucket_depth` idle objects, `obj` is dropped.
    #[track_caller]
    pub fn put(&self, mut obj: T) {
        let capacity = obj.backing_capacity();
        let class = match floor_class(capacity) {
            Some(class) if (self.min_class..=self.max_class).contains(&class) => class,
            _ => panic!(
                "pool registry: object with capacity {} outside classes {}..={}",
                capacity, self.min_class, self.max_class
            ),
        };

        obj.reset();
        if self.bucket(class).idle.push(obj).is_ok() {
            self.returns.fetch_add(1, RELAXED);
        } else {
            self.drops.fetch_add(1, RELAXED);
            trace!("Pool bucket for class {} full, dropping object", class);
        }
    }

    /// Smallest size class served.
    pub fn min_class(&self) -> u32 {
        self.min_class
    }

    /// Largest size class served.
    pub fn max_class(&self) -> u32 {
        self.max_class
    }

    /// Number of buckets created so far.
    pub fn bucket_count(&self) -> usize {
        self.created.load(RELAXED)
    }

    /// Get pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits.load(RELAXED),
            misses: self.misses.load(RELAXED),
            returns: self.returns.load(RELAXED),
            drops: self.drops.load(RELAXED),
            buckets: self.bucket_count(),
            idle: self
                .buckets
                .iter()
                .filter_map(OnceLock::get)
                .map(|b| b.idle.len())
                .sum(),
        }
    }

    #[track_caller]
    fn class_for_request(&self, requested: usize) -> u32 {
        let class = class_of(requested);
        assert!(
            class <= self.max_class,
            "pool registry: requested capacity {} (class {}) above max class {}",
            requested,
            class,
            self.max_class
        );
        class.max(self.min_class)
    }

    /// Bucket for `class`, creating it on first use.
    fn bucket(&self, class: u32) -> &Bucket<T> {
        let slot = &self.buckets[(class - self.min_class) as usize];
        if let Some(bucket) = slot.get() {
            return bucket;
        }

        let _guard = self.create_lock.lock();
        slot.get_or_init(|| {
            debug!(
                "Creating pool bucket for class {} ({} bytes)",
                class,
                class_capacity(class)
            );
            self.created.fetch_add(1, RELAXED);
            Bucket {
                idle: ArrayQueue::new(self.bucket_depth),
            }
        })
    }
}

impl<T> fmt::Debug for PoolRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("min_class", &self.min_class)
            .field("max_class", &self.max_class)
            .field("bucket_depth", &self.bucket_depth)
            .field("buckets", &self.created.load(RELAXED))
            .finish()
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects handed out from a bucket (cache hits).
    pub hits: usize,
    /// Objects allocated fresh (cache misses).
    pub misses: usize,
    /// Objects returned and kept.
    pub returns: usize,
    /// Objects returned and dropped because their bucket was full.
    pub drops: usize,
    /// Buckets created so far.
    pub buckets: usize,
    /// Objects currently idle across all buckets.
    pub idle: usize,
}

impl PoolStats {
    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// RAII guard that returns its object to the registry on drop.
pub struct Pooled<'a, T: Poolable> {
    registry: &'a PoolRegistry<T>,
    obj: Option<T>,
}

impl<T: Poolable> Pooled<'_, T> {
    /// Take the object, preventing return to the pool.
    pub fn take(mut self) -> T {
        self.obj.take().expect("pooled object present until drop")
    }
}

impl<T: Poolable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.obj.as_ref().expect("pooled object present until drop")
    }
}

impl<T: Poolable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.obj.as_mut().expect("pooled object present until drop")
    }
}

impl<T: Poolable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(obj) = self.obj.take() {
            self.registry.put(obj);
        }
    }
}
