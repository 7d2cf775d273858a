//! Shared immutable backing storage for the parallel arrays.

use std::ops::Deref;
use std::sync::Arc;

/// An immutable, reference-counted slice.
///
/// Cloning and [`split_at`](Buffer::split_at) are O(1) and share the backing
/// allocation, which is what keeps the multiplication kernel's recursive
/// slicing allocation-free. A window never grows, so buffers split from the
/// same parent cannot observe each other.
pub(crate) struct Buffer<T> {
    data: Arc<[T]>,
    start: usize,
    len: usize,
}

impl<T> Buffer<T> {
    /// An empty buffer.
    pub fn new() -> Self {
        Buffer {
            data: Vec::new().into(),
            start: 0,
            len: 0,
        }
    }

    /// Take ownership of `v` as the backing allocation.
    pub fn from_vec(v: Vec<T>) -> Self {
        let len = v.len();
        Buffer {
            data: v.into(),
            start: 0,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[self.start..self.start + self.len]
    }

    /// Split into the windows `[0, at)` and `[at, len)`; both halves share
    /// the backing allocation.
    ///
    /// # Panics
    /// Panics if `at > self.len()`.
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        assert!(at <= self.len);
        (
            Buffer {
                data: self.data.clone(),
                start: self.start,
                len: at,
            },
            Buffer {
                data: self.data.clone(),
                start: self.start + at,
                len: self.len - at,
            },
        )
    }
}

impl<T> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Buffer {
            data: self.data.clone(),
            start: self.start,
            len: self.len,
        }
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_shares_storage() {
        let buf = Buffer::from_vec(vec![1, 2, 3, 4, 5]);
        let (left, right) = buf.split_at(2);
        assert_eq!(left.as_slice(), &[1, 2]);
        assert_eq!(right.as_slice(), &[3, 4, 5]);
        // Splitting again narrows the window further.
        let (mid, tail) = right.split_at(1);
        assert_eq!(mid.as_slice(), &[3]);
        assert_eq!(tail.as_slice(), &[4, 5]);
        // The parent window is untouched.
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_split_at_bounds() {
        let buf = Buffer::from_vec(vec![1, 2]);
        let (left, right) = buf.split_at(0);
        assert_eq!(left.len(), 0);
        assert_eq!(right.len(), 2);
        let (left, right) = buf.split_at(2);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 0);
    }
}
