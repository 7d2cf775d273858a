//! Sorted-stream adaptors: ordered merge, stable interleave, run coalescing.
//!
//! Every adaptor here consumes streams of `(Key, value)` pairs in ascending
//! code order and produces a stream in the same order. Together they are the
//! whole of the addition path and the drain side of multiplication.

use crate::key::Key;

/// Two-way merge of sorted streams with a combiner on equal keys.
///
/// Keys unique to one side pass through unchanged; keys present on both
/// sides are combined, and a `None` from the combiner drops the pair (the
/// zero-thinning hook). The output is strictly sorted with no duplicates
/// whenever the inputs are.
pub(crate) struct MergeWith<L, R, T, F>
where
    L: Iterator<Item = (Key, T)>,
    R: Iterator<Item = (Key, T)>,
{
    left: L,
    right: R,
    lhead: Option<(Key, T)>,
    rhead: Option<(Key, T)>,
    combine: F,
}

impl<L, R, T, F> MergeWith<L, R, T, F>
where
    L: Iterator<Item = (Key, T)>,
    R: Iterator<Item = (Key, T)>,
{
    pub fn new(mut left: L, mut right: R, combine: F) -> Self {
        let lhead = left.next();
        let rhead = right.next();
        MergeWith {
            left,
            right,
            lhead,
            rhead,
            combine,
        }
    }
}

impl<L, R, T, F> Iterator for MergeWith<L, R, T, F>
where
    L: Iterator<Item = (Key, T)>,
    R: Iterator<Item = (Key, T)>,
    F: FnMut(T, T) -> Option<T>,
{
    type Item = (Key, T);

    fn next(&mut self) -> Option<(Key, T)> {
        loop {
            match (self.lhead.take(), self.rhead.take()) {
                (Some((lk, lv)), Some((rk, rv))) => {
                    if lk < rk {
                        self.lhead = self.left.next();
                        self.rhead = Some((rk, rv));
                        return Some((lk, lv));
                    } else if rk < lk {
                        self.lhead = Some((lk, lv));
                        self.rhead = self.right.next();
                        return Some((rk, rv));
                    } else {
                        self.lhead = self.left.next();
                        self.rhead = self.right.next();
                        if let Some(v) = (self.combine)(lv, rv) {
                            return Some((lk, v));
                        }
                        // combined away; keep pulling
                    }
                }
                (Some(l), None) => {
                    self.lhead = self.left.next();
                    return Some(l);
                }
                (None, Some(r)) => {
                    self.rhead = self.right.next();
                    return Some(r);
                }
                (None, None) => return None,
            }
        }
    }
}

/// Stable merge that keeps equal keys, left side first.
///
/// Used to drain mixed heaps: collisions stay adjacent in the output and are
/// coalesced downstream.
pub(crate) struct Interleave<L, R, T>
where
    L: Iterator<Item = (Key, T)>,
    R: Iterator<Item = (Key, T)>,
{
    left: L,
    right: R,
    lhead: Option<(Key, T)>,
    rhead: Option<(Key, T)>,
}

impl<L, R, T> Interleave<L, R, T>
where
    L: Iterator<Item = (Key, T)>,
    R: Iterator<Item = (Key, T)>,
{
    pub fn new(mut left: L, mut right: R) -> Self {
        let lhead = left.next();
        let rhead = right.next();
        Interleave {
            left,
            right,
            lhead,
            rhead,
        }
    }
}

impl<L, R, T> Iterator for Interleave<L, R, T>
where
    L: Iterator<Item = (Key, T)>,
    R: Iterator<Item = (Key, T)>,
{
    type Item = (Key, T);

    fn next(&mut self) -> Option<(Key, T)> {
        match (self.lhead.take(), self.rhead.take()) {
            (Some((lk, lv)), Some((rk, rv))) => {
                if lk <= rk {
                    self.lhead = self.left.next();
                    self.rhead = Some((rk, rv));
                    Some((lk, lv))
                } else {
                    self.lhead = Some((lk, lv));
                    self.rhead = self.right.next();
                    Some((rk, rv))
                }
            }
            (Some(l), None) => {
                self.lhead = self.left.next();
                Some(l)
            }
            (None, Some(r)) => {
                self.rhead = self.right.next();
                Some(r)
            }
            (None, None) => None,
        }
    }
}

/// Folds runs of equal keys with an `Option`-returning combiner.
///
/// A pair that folds to `None` restarts the accumulation from the next value
/// of the same run; a run whose fold ends as `None` emits nothing. The input
/// must be sorted so that equal keys are adjacent.
pub(crate) struct Coalesce<I, T, F>
where
    I: Iterator<Item = (Key, T)>,
{
    inner: I,
    pending: Option<(Key, T)>,
    combine: F,
}

impl<I, T, F> Coalesce<I, T, F>
where
    I: Iterator<Item = (Key, T)>,
{
    pub fn new(inner: I, combine: F) -> Self {
        Coalesce {
            inner,
            pending: None,
            combine,
        }
    }
}

impl<I, T, F> Iterator for Coalesce<I, T, F>
where
    I: Iterator<Item = (Key, T)>,
    F: FnMut(T, T) -> Option<T>,
{
    type Item = (Key, T);

    fn next(&mut self) -> Option<(Key, T)> {
        loop {
            let (key, first) = match self.pending.take().or_else(|| self.inner.next()) {
                Some(head) => head,
                None => return None,
            };
            let mut acc = Some(first);
            loop {
                match self.inner.next() {
                    Some((k, v)) if k == key => {
                        acc = match acc.take() {
                            Some(a) => (self.combine)(a, v),
                            None => Some(v),
                        };
                    }
                    other => {
                        self.pending = other;
                        break;
                    }
                }
            }
            if let Some(v) = acc {
                return Some((key, v));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::non_zero;

    fn entries(pairs: &[(u64, i64)]) -> Vec<(Key, i64)> {
        pairs
            .iter()
            .map(|&(code, v)| (Key::from_code(code), v))
            .collect()
    }

    #[test]
    fn test_merge_with_combines_collisions() {
        let left = entries(&[(0, 1), (2, 2), (5, 3)]);
        let right = entries(&[(1, 10), (2, 20)]);
        let merged: Vec<_> =
            MergeWith::new(left.into_iter(), right.into_iter(), |a, b| non_zero(a + b)).collect();
        assert_eq!(merged, entries(&[(0, 1), (1, 10), (2, 22), (5, 3)]));
    }

    #[test]
    fn test_merge_with_thins_zero_sums() {
        let left = entries(&[(3, 4)]);
        let right = entries(&[(3, -4), (7, 1)]);
        let merged: Vec<_> =
            MergeWith::new(left.into_iter(), right.into_iter(), |a, b| non_zero(a + b)).collect();
        assert_eq!(merged, entries(&[(7, 1)]));
    }

    #[test]
    fn test_merge_with_one_side_empty() {
        let left = entries(&[(0, 1), (9, 2)]);
        let merged: Vec<_> = MergeWith::new(
            left.clone().into_iter(),
            Vec::new().into_iter(),
            |a, b: i64| non_zero(a + b),
        )
        .collect();
        assert_eq!(merged, left);
    }

    #[test]
    fn test_interleave_keeps_ties_left_first() {
        let left = entries(&[(1, 1), (4, 2)]);
        let right = entries(&[(1, 10), (2, 20)]);
        let merged: Vec<_> = Interleave::new(left.into_iter(), right.into_iter()).collect();
        assert_eq!(merged, entries(&[(1, 1), (1, 10), (2, 20), (4, 2)]));
    }

    #[test]
    fn test_coalesce_folds_runs() {
        let input = entries(&[(1, 1), (1, 2), (1, 3), (4, 9)]);
        let out: Vec<_> = Coalesce::new(input.into_iter(), |a, b| non_zero(a + b)).collect();
        assert_eq!(out, entries(&[(1, 6), (4, 9)]));
    }

    #[test]
    fn test_coalesce_restarts_after_zero() {
        // 5 + (-5) folds to nothing; the run restarts at 7.
        let input = entries(&[(2, 5), (2, -5), (2, 7)]);
        let out: Vec<_> = Coalesce::new(input.into_iter(), |a, b| non_zero(a + b)).collect();
        assert_eq!(out, entries(&[(2, 7)]));
    }

    #[test]
    fn test_coalesce_drops_zero_runs() {
        let input = entries(&[(2, 5), (2, -5), (6, 1)]);
        let out: Vec<_> = Coalesce::new(input.into_iter(), |a, b| non_zero(a + b)).collect();
        assert_eq!(out, entries(&[(6, 1)]));
    }
}
