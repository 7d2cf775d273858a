//! The recursive quadtree multiplication kernel.
//!
//! Operands are Morton-ordered slices, so `low_key`/`high_key` bound every
//! code a slice contains, and the xor of two reference coordinates names the
//! smallest quadtree node covering both. Each step either proves the inner
//! dimensions cannot meet (the overlap test), or splits one operand at its
//! highest varying code bit and combines the two half-products: `fby` when
//! the halves cover disjoint output regions, `mix` when they cover the same
//! one. The comparisons driving those choices are the critical-bit
//! comparisons of [`crate::key`]; their tie behaviour (row plane wins) is
//! what keeps every chosen split bit at the top of the operand's code span,
//! so both halves are contiguous and non-empty.

use crate::heap::{fby_opt, mix_opt, Heap};
use crate::key::{ges, gts, Key};
use crate::matrix::Mat;
use crate::scalar::Scalar;

/// Partial products of two non-empty Morton-ordered slices, or `None` when
/// the product has no entries.
pub(crate) fn product<T, F>(x: &Mat<T>, y: &Mat<T>, times: &mut F) -> Option<Heap<T>>
where
    T: Scalar,
    F: FnMut(&T, &T) -> T,
{
    let xa = x.low_key();
    let xb = x.high_key();
    let ya = y.low_key();
    let yb = y.high_key();

    if x.nnz() == 1 && y.nnz() == 1 {
        // single x single: one product or nothing
        return if xa.col == ya.row {
            Some(Heap::singleton(
                Key::new(xa.row, ya.col),
                times(&x.values()[0], &y.values()[0]),
            ))
        } else {
            None
        };
    }

    let xi = xa.row ^ xb.row;
    let xj = xa.col ^ xb.col;
    let yj = ya.row ^ yb.row;
    let yk = ya.col ^ yb.col;
    let xiyj = xi | yj;
    let ykxj = yk | xj;

    // The left columns and right rows lie in disjoint quadtree nodes: no
    // inner index can match.
    if gts(xa.col ^ ya.row, xiyj | ykxj) {
        return None;
    }

    if ges(xiyj, ykxj) {
        if ges(xi, yj) {
            // Split the left rows; the halves land in disjoint output rows.
            let (x1, x2) = x.split_on_row_bit(xa.row, xb.row);
            fby_opt(product(&x1, y, times), product(&x2, y, times))
        } else {
            // Split the right rows (inner dimension); same output region.
            let (y1, y2) = y.split_on_row_bit(ya.row, yb.row);
            mix_opt(product(x, &y1, times), product(x, &y2, times))
        }
    } else if ges(yk, xj) {
        // Split the right columns; the halves land in disjoint output
        // columns.
        let (y1, y2) = y.split_on_col_bit(ya.col, yb.col);
        fby_opt(product(x, &y1, times), product(x, &y2, times))
    } else {
        // Split the left columns (inner dimension); same output region.
        let (x1, x2) = x.split_on_col_bit(xa.col, xb.col);
        mix_opt(product(&x1, y, times), product(&x2, y, times))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::non_zero;

    fn k(r: u32, c: u32) -> Key {
        Key::new(r, c)
    }

    fn m(entries: &[((u32, u32), i64)]) -> Mat<i64> {
        Mat::from_entries(entries.iter().map(|&((r, c), v)| (k(r, c), v)).collect())
    }

    fn multiply(x: &Mat<i64>, y: &Mat<i64>) -> Vec<(Key, i64)> {
        product(x, y, &mut |a, b| a * b)
            .map(|heap| heap.drain(|a, b| non_zero(a + b)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_single_pair_matches_inner_index() {
        let x = Mat::singleton(k(0, 1), 3);
        let y = Mat::singleton(k(1, 0), 5);
        assert_eq!(multiply(&x, &y), vec![(k(0, 0), 15)]);
    }

    #[test]
    fn test_single_pair_disjoint_inner_index() {
        let x = Mat::singleton(k(0, 1), 3);
        let y = Mat::singleton(k(2, 0), 5);
        assert_eq!(multiply(&x, &y), vec![]);
    }

    #[test]
    fn test_overlap_early_out() {
        // Left columns all below 8, right rows all at or above 8.
        let x = m(&[((0, 0), 1), ((1, 1), 2)]);
        let y = m(&[((8, 0), 3), ((9, 1), 4)]);
        assert_eq!(multiply(&x, &y), vec![]);
    }

    #[test]
    fn test_dense_two_by_two() {
        let x = m(&[((0, 0), 1), ((0, 1), 2), ((1, 0), 3), ((1, 1), 4)]);
        let y = m(&[((0, 0), 5), ((0, 1), 6), ((1, 0), 7), ((1, 1), 8)]);
        assert_eq!(
            multiply(&x, &y),
            vec![
                (k(0, 0), 19),
                (k(0, 1), 22),
                (k(1, 0), 43),
                (k(1, 1), 50)
            ]
        );
    }

    #[test]
    fn test_output_stays_sorted_across_quadrants() {
        // Entries far apart in the key space exercise both fby paths.
        let x = m(&[((0, 3), 1), ((7, 0), 2), ((12, 9), 3)]);
        let y = m(&[((0, 5), 4), ((3, 2), 5), ((9, 12), 6)]);
        let out = multiply(&x, &y);
        assert_eq!(
            out,
            vec![(k(0, 2), 5), (k(7, 5), 8), (k(12, 12), 18)]
        );
        let codes: Vec<u64> = out.iter().map(|(key, _)| key.code()).collect();
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
    }
}
