use bytes::BytesMut;

use crate::codec::BufferCursor;

/// Storage that a [`PoolRegistry`](super::PoolRegistry) can allocate,
/// measure, and recycle.
pub trait Poolable: Send + Sized {
    /// Allocate fresh storage whose backing capacity is `capacity`.
    fn allocate(capacity: usize) -> Self;

    /// Capacity of the backing allocation, independent of visible length.
    fn backing_capacity(&self) -> usize;

    /// Empty the object without releasing its allocation.
    fn reset(&mut self);

    /// Prepare the object for a caller that asked for `requested` bytes.
    ///
    /// Growable kinds are handed out empty and ignore this.
    fn present(&mut self, requested: usize) {
        let _ = requested;
    }
}

impl Poolable for BytesMut {
    fn allocate(capacity: usize) -> Self {
        BytesMut::with_capacity(capacity)
    }

    fn backing_capacity(&self) -> usize {
        self.capacity()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// Raw slices are handed out with their visible length set to the request,
/// zero-filled.
impl Poolable for Vec<u8> {
    fn allocate(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    fn backing_capacity(&self) -> usize {
        self.capacity()
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn present(&mut self, requested: usize) {
        self.resize(requested, 0);
    }
}

impl Poolable for BufferCursor {
    fn allocate(capacity: usize) -> Self {
        BufferCursor::with_capacity(capacity)
    }

    fn backing_capacity(&self) -> usize {
        self.capacity()
    }

    fn reset(&mut self) {
        BufferCursor::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_presented_at_requested_length() {
        let mut v = <Vec<u8> as Poolable>::allocate(1024);
        v.present(1000);
        assert_eq!(v.len(), 1000);
        assert!(v.iter().all(|&b| b == 0));
        assert!(v.backing_capacity() >= 1024);

        v[0] = 0xff;
        Poolable::reset(&mut v);
        v.present(10);
        assert_eq!(v, vec![0u8; 10]);
    }

    #[test]
    fn test_bytes_mut_presented_empty() {
        let mut b = <BytesMut as Poolable>::allocate(64);
        b.present(60);
        assert!(b.is_empty());
        b.extend_from_slice(b"data");
        Poolable::reset(&mut b);
        assert!(b.is_empty());
        assert!(b.backing_capacity() >= 64);
    }

    #[test]
    fn test_cursor_reset_rewinds() {
        let mut c = <BufferCursor as Poolable>::allocate(64);
        c.encode_u32(5);
        c.decode_u8().unwrap();
        Poolable::reset(&mut c);
        assert_eq!(c.offset(), 0);
        assert!(c.is_empty());
    }
}
