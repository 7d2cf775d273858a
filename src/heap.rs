//! Assembly of partial products into one sorted stream.
//!
//! The multiplication kernel combines sub-results with two disciplines:
//! `mix` when the output regions overlap, and `fby` ("followed by") when the
//! split guarantees every key of the first operand strictly precedes every
//! key of the second. All constructors are O(1); the sorting work happens
//! pull-driven while the final stream is drained, so no partial product is
//! materialized before the final merge. An `fby` node drains as a plain
//! concatenation, without re-comparing keys.

use crate::key::Key;
use crate::merge::{Coalesce, Interleave};

pub(crate) enum Heap<T> {
    /// A single partial product.
    One(Key, T),
    /// Two heaps whose key ranges may overlap.
    Mix(Box<Heap<T>>, Box<Heap<T>>),
    /// Two heaps where every key of the first precedes every key of the
    /// second.
    Fby(Box<Heap<T>>, Box<Heap<T>>),
}

impl<T> Heap<T> {
    pub fn singleton(key: Key, value: T) -> Self {
        Heap::One(key, value)
    }

    pub fn mix(a: Self, b: Self) -> Self {
        Heap::Mix(Box::new(a), Box::new(b))
    }

    /// Concatenation; the caller guarantees `a`'s keys all precede `b`'s.
    pub fn fby(a: Self, b: Self) -> Self {
        Heap::Fby(Box::new(a), Box::new(b))
    }
}

impl<T: 'static> Heap<T> {
    /// The sorted stream of this heap's entries; equal keys come out
    /// adjacent, left operands first.
    fn stream(self) -> Box<dyn Iterator<Item = (Key, T)>> {
        match self {
            Heap::One(k, v) => Box::new(std::iter::once((k, v))),
            Heap::Fby(a, b) => Box::new(a.stream().chain(b.stream())),
            Heap::Mix(a, b) => Box::new(Interleave::new(a.stream(), b.stream())),
        }
    }

    /// Drain into a strictly sorted stream, folding runs of equal keys with
    /// `combine`.
    pub fn drain<F>(self, combine: F) -> impl Iterator<Item = (Key, T)>
    where
        F: FnMut(T, T) -> Option<T>,
    {
        Coalesce::new(self.stream(), combine)
    }
}

/// Combine optional heaps covering the same output region.
pub(crate) fn mix_opt<T>(a: Option<Heap<T>>, b: Option<Heap<T>>) -> Option<Heap<T>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Heap::mix(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Combine optional heaps whose regions are ordered and disjoint.
pub(crate) fn fby_opt<T>(a: Option<Heap<T>>, b: Option<Heap<T>>) -> Option<Heap<T>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Heap::fby(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::non_zero;

    fn k(code: u64) -> Key {
        Key::from_code(code)
    }

    fn drained(heap: Heap<i64>) -> Vec<(Key, i64)> {
        heap.drain(|a, b| non_zero(a + b)).collect()
    }

    #[test]
    fn test_fby_concatenates() {
        let heap = Heap::fby(
            Heap::fby(Heap::singleton(k(0), 1), Heap::singleton(k(3), 2)),
            Heap::singleton(k(7), 3),
        );
        assert_eq!(drained(heap), vec![(k(0), 1), (k(3), 2), (k(7), 3)]);
    }

    #[test]
    fn test_mix_sorts_overlapping_ranges() {
        let heap = Heap::mix(
            Heap::fby(Heap::singleton(k(1), 1), Heap::singleton(k(5), 2)),
            Heap::fby(Heap::singleton(k(0), 3), Heap::singleton(k(9), 4)),
        );
        assert_eq!(
            drained(heap),
            vec![(k(0), 3), (k(1), 1), (k(5), 2), (k(9), 4)]
        );
    }

    #[test]
    fn test_drain_coalesces_collisions() {
        let heap = Heap::mix(Heap::singleton(k(4), 10), Heap::singleton(k(4), 32));
        assert_eq!(drained(heap), vec![(k(4), 42)]);
    }

    #[test]
    fn test_drain_thins_zero_collisions() {
        let heap = Heap::mix(
            Heap::singleton(k(4), 10),
            Heap::fby(Heap::singleton(k(4), -10), Heap::singleton(k(6), 1)),
        );
        assert_eq!(drained(heap), vec![(k(6), 1)]);
    }
}
