//! Power-of-two size classes.
//!
//! Class `n` covers exactly `2^n` bytes. A request for zero bytes is treated
//! as a request for one byte and maps to class 0.

/// Largest class whose capacity fits in a `usize`.
pub const MAX_CLASS: u32 = usize::BITS - 1;

/// Smallest class `n` such that `2^n >= v`.
///
/// Requests above `2^MAX_CLASS` return `usize::BITS`, which no registry can
/// serve.
#[inline]
pub const fn class_of(v: usize) -> u32 {
    if v <= 1 {
        return 0;
    }
    usize::BITS - (v - 1).leading_zeros()
}

/// Largest class `n` such that `2^n <= v`, or `None` for zero.
///
/// Used to file returned storage: an object whose capacity was grown past a
/// power of two still only guarantees the class below it.
#[inline]
pub const fn floor_class(v: usize) -> Option<u32> {
    if v == 0 {
        None
    } else {
        Some(usize::BITS - 1 - v.leading_zeros())
    }
}

/// Capacity covered by class `n`.
#[inline]
pub const fn class_capacity(n: u32) -> usize {
    debug_assert!(n <= MAX_CLASS);
    1usize << n
}

/// Smallest power of two `>= v` (one for zero).
#[inline]
pub const fn round_up(v: usize) -> usize {
    class_capacity(class_of(v))
}
