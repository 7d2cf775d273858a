//! The Morton-ordered sparse matrix type.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::One;

use crate::error::{MatError, Result};
use crate::key::{critical_bit, Key};
use crate::merge::MergeWith;
use crate::mul::product;
use crate::scalar::{non_zero, Eq0, Scalar};
use crate::storage::Buffer;

/// Result rows are reserved up front, bounded by the product of the operand
/// sizes but capped so huge products do not pre-allocate.
const MUL_CAPACITY_CAP: usize = 1 << 16;

/// A two-dimensional sparse matrix stored in Morton (Z-order) key order.
///
/// Entries live in three parallel arrays (row coordinates, column
/// coordinates, values) sorted by strictly ascending Morton code, with no
/// duplicate keys. Matrices are immutable values: every operation returns a
/// new matrix, and slices share the backing arrays, so `clone` and
/// [`split_at`](Mat::split_at) are O(1).
///
/// Addition is an ordered merge of the two entry streams; multiplication
/// recursively bisects the operands along critical key bits — the quadtree
/// structure that Morton order encodes — without materializing a dense
/// intermediate or an explicit tree.
///
/// # Example
/// ```
/// use zmat::{Key, Mat};
///
/// let a = Mat::from_entries(vec![
///     (Key::new(0, 0), 1.0),
///     (Key::new(0, 1), 2.0),
///     (Key::new(1, 0), 3.0),
///     (Key::new(1, 1), 4.0),
/// ]);
/// let id = Mat::identity(2).unwrap();
/// assert_eq!(a.mul(&id), a);
/// ```
pub struct Mat<T> {
    rows: Buffer<u32>,
    cols: Buffer<u32>,
    vals: Buffer<T>,
}

impl<T> Mat<T> {
    /// The empty matrix.
    pub fn new() -> Self {
        Mat {
            rows: Buffer::new(),
            cols: Buffer::new(),
            vals: Buffer::new(),
        }
    }

    /// A matrix with a single entry.
    pub fn singleton(key: Key, value: T) -> Self {
        Mat {
            rows: Buffer::from_vec(vec![key.row]),
            cols: Buffer::from_vec(vec![key.col]),
            vals: Buffer::from_vec(vec![value]),
        }
    }

    /// Build from coordinate-list entries.
    ///
    /// Entries are stably sorted by Morton code; when a key occurs more than
    /// once, the last occurrence wins.
    pub fn from_entries(mut entries: Vec<(Key, T)>) -> Self {
        entries.sort_by_key(|(k, _)| k.code());
        entries.dedup_by(|next, kept| {
            if next.0 == kept.0 {
                std::mem::swap(next, kept);
                true
            } else {
                false
            }
        });
        let hint = entries.len();
        Self::from_sorted(entries.into_iter(), hint)
    }

    /// Rebuild from a stream already in strictly ascending key order.
    pub(crate) fn from_sorted<I>(entries: I, size_hint: usize) -> Self
    where
        I: Iterator<Item = (Key, T)>,
    {
        let mut rows = Vec::with_capacity(size_hint);
        let mut cols = Vec::with_capacity(size_hint);
        let mut vals = Vec::with_capacity(size_hint);
        for (key, value) in entries {
            rows.push(key.row);
            cols.push(key.col);
            vals.push(value);
        }
        Mat {
            rows: Buffer::from_vec(rows),
            cols: Buffer::from_vec(cols),
            vals: Buffer::from_vec(vals),
        }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nnz() == 0
    }

    /// Row coordinates of the stored entries, in Morton order.
    pub fn rows(&self) -> &[u32] {
        self.rows.as_slice()
    }

    /// Column coordinates of the stored entries, in Morton order.
    pub fn cols(&self) -> &[u32] {
        self.cols.as_slice()
    }

    /// Stored values, in Morton order of their keys.
    pub fn values(&self) -> &[T] {
        self.vals.as_slice()
    }

    fn key_at(&self, i: usize) -> Key {
        Key::new(self.rows.as_slice()[i], self.cols.as_slice()[i])
    }

    /// The smallest key in the matrix.
    ///
    /// # Panics
    /// Panics if the matrix is empty.
    pub fn low_key(&self) -> Key {
        self.key_at(0)
    }

    /// The largest key in the matrix.
    ///
    /// # Panics
    /// Panics if the matrix is empty.
    pub fn high_key(&self) -> Key {
        self.key_at(self.nnz() - 1)
    }

    /// Stored keys in ascending Morton order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        (0..self.nnz()).map(move |i| self.key_at(i))
    }

    /// Entries in ascending Morton order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &T)> + '_ {
        let vals = self.vals.as_slice();
        (0..self.nnz()).map(move |i| (self.key_at(i), &vals[i]))
    }

    /// Binary-search point access.
    pub fn get(&self, key: Key) -> Option<&T> {
        let code = key.code();
        let i = search(self.nnz(), |i| self.key_at(i).code() >= code);
        if i < self.nnz() && self.key_at(i) == key {
            Some(&self.vals.as_slice()[i])
        } else {
            None
        }
    }

    /// Split into the first `at` entries and the rest. O(1); both halves
    /// share the backing arrays.
    ///
    /// # Panics
    /// Panics if `at > self.nnz()`.
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        let (r1, r2) = self.rows.split_at(at);
        let (c1, c2) = self.cols.split_at(at);
        let (v1, v2) = self.vals.split_at(at);
        (
            Mat {
                rows: r1,
                cols: c1,
                vals: v1,
            },
            Mat {
                rows: r2,
                cols: c2,
                vals: v2,
            },
        )
    }

    /// Partition at the critical bit of `a_row ^ b_row`: entries whose row
    /// lies in `a_row`'s half-plane first, the others second.
    ///
    /// The caller passes the slice's own low/high rows, so the critical bit
    /// is the slice's highest varying code bit and the partition is a
    /// contiguous prefix/suffix.
    pub(crate) fn split_on_row_bit(&self, a_row: u32, b_row: u32) -> (Self, Self) {
        debug_assert_ne!(a_row, b_row);
        let bit = critical_bit(a_row ^ b_row);
        let rows = self.rows.as_slice();
        let at = search(self.nnz(), |i| (rows[i] & bit) != (a_row & bit));
        self.split_at(at)
    }

    /// Column analogue of [`split_on_row_bit`](Mat::split_on_row_bit).
    pub(crate) fn split_on_col_bit(&self, a_col: u32, b_col: u32) -> (Self, Self) {
        debug_assert_ne!(a_col, b_col);
        let bit = critical_bit(a_col ^ b_col);
        let cols = self.cols.as_slice();
        let at = search(self.nnz(), |i| (cols[i] & bit) != (a_col & bit));
        self.split_at(at)
    }
}

impl<T: Clone> Mat<T> {
    /// Entries with cloned values, in Morton order.
    pub fn to_entries(&self) -> Vec<(Key, T)> {
        self.stream().collect()
    }

    pub(crate) fn stream(&self) -> impl Iterator<Item = (Key, T)> + '_ {
        self.iter().map(|(k, v)| (k, v.clone()))
    }

    /// Apply `f` to every stored value, keeping keys unchanged.
    ///
    /// No zero-thinning is applied; if `f` produces zeros, they stay stored.
    pub fn map<U, F>(&self, mut f: F) -> Mat<U>
    where
        F: FnMut(&T) -> U,
    {
        Mat {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            vals: Buffer::from_vec(self.values().iter().map(|v| f(v)).collect()),
        }
    }

    /// Rows and columns exchanged.
    pub fn transpose(&self) -> Self {
        let entries: Vec<(Key, T)> = self.iter().map(|(k, v)| (k.swapped(), v.clone())).collect();
        Self::from_entries(entries)
    }

    /// A new matrix with `value` stored at `key`, replacing any existing
    /// entry there. O(nnz): the arrays are copied.
    pub fn insert(&self, key: Key, value: T) -> Self {
        let code = key.code();
        let n = self.nnz();
        let at = search(n, |i| self.key_at(i).code() >= code);
        let skip = if at < n && self.key_at(at) == key {
            at + 1
        } else {
            at
        };
        let mut rows = Vec::with_capacity(n + 1);
        let mut cols = Vec::with_capacity(n + 1);
        let mut vals = Vec::with_capacity(n + 1);
        rows.extend_from_slice(&self.rows()[..at]);
        cols.extend_from_slice(&self.cols()[..at]);
        vals.extend(self.values()[..at].iter().cloned());
        rows.push(key.row);
        cols.push(key.col);
        vals.push(value);
        rows.extend_from_slice(&self.rows()[skip..]);
        cols.extend_from_slice(&self.cols()[skip..]);
        vals.extend(self.values()[skip..].iter().cloned());
        Mat {
            rows: Buffer::from_vec(rows),
            cols: Buffer::from_vec(cols),
            vals: Buffer::from_vec(vals),
        }
    }
}

impl<T: Scalar + One> Mat<T> {
    /// The identity matrix with `dim` diagonal ones.
    ///
    /// Fails with [`MatError::DimensionTooLarge`] if `dim` exceeds the u32
    /// coordinate range.
    pub fn identity(dim: usize) -> Result<Self> {
        if dim as u64 > u32::MAX as u64 + 1 {
            return Err(MatError::DimensionTooLarge { dim });
        }
        let mut rows = Vec::with_capacity(dim);
        let mut cols = Vec::with_capacity(dim);
        let mut vals = Vec::with_capacity(dim);
        for i in 0..dim {
            rows.push(i as u32);
            cols.push(i as u32);
            vals.push(T::one());
        }
        Ok(Mat {
            rows: Buffer::from_vec(rows),
            cols: Buffer::from_vec(cols),
            vals: Buffer::from_vec(vals),
        })
    }
}

impl<T: Scalar> Mat<T> {
    /// Elementwise sum with zero-thinning: keys colliding across the
    /// operands combine with `+` and vanish if the sum tests as zero.
    pub fn add(&self, rhs: &Self) -> Self {
        self.add_with0(rhs, |a, b| non_zero(a + b))
    }

    /// Elementwise difference; entries present only in `rhs` come out
    /// negated.
    pub fn sub(&self, rhs: &Self) -> Self {
        let hint = self.nnz() + rhs.nnz();
        let merged = MergeWith::new(self.stream(), rhs.stream().map(|(k, v)| (k, -v)), |a, b| {
            non_zero(a + b)
        });
        Self::from_sorted(merged, hint)
    }

    /// Elementwise sum under a caller-supplied combiner; every combined
    /// value is kept, zero or not.
    pub fn add_with<F>(&self, rhs: &Self, mut combine: F) -> Self
    where
        F: FnMut(T, T) -> T,
    {
        self.add_with0(rhs, move |a, b| Some(combine(a, b)))
    }

    /// Elementwise sum under an `Option`-returning combiner; `None` drops
    /// the colliding key (the zero-thinning hook).
    pub fn add_with0<F>(&self, rhs: &Self, combine: F) -> Self
    where
        F: FnMut(T, T) -> Option<T>,
    {
        let hint = self.nnz() + rhs.nnz();
        Self::from_sorted(MergeWith::new(self.stream(), rhs.stream(), combine), hint)
    }

    /// Matrix product.
    ///
    /// Pointwise products use the element's `*`; colliding partial products
    /// combine with `+`. No value that tests as zero is stored, whether it
    /// arose from a cancelling sum or from a single zero product (a block
    /// product can be empty even when its factors are not).
    pub fn mul(&self, rhs: &Self) -> Self {
        if self.is_empty() || rhs.is_empty() {
            return Self::new();
        }
        let hint = self.nnz().saturating_mul(rhs.nnz()).min(MUL_CAPACITY_CAP);
        match product(self, rhs, &mut |a: &T, b: &T| a.clone() * b.clone()) {
            Some(heap) => Self::from_sorted(
                heap.drain(|a, b| non_zero(a + b))
                    .filter(|(_, v)| !v.is_zero()),
                hint,
            ),
            None => Self::new(),
        }
    }

    /// Matrix product under a caller-supplied pointwise multiply and
    /// collision combiner.
    pub fn mul_with<FT, FC>(&self, rhs: &Self, mut times: FT, combine: FC) -> Self
    where
        FT: FnMut(&T, &T) -> T,
        FC: FnMut(T, T) -> Option<T>,
    {
        if self.is_empty() || rhs.is_empty() {
            return Self::new();
        }
        let hint = self
            .nnz()
            .saturating_mul(rhs.nnz())
            .min(MUL_CAPACITY_CAP);
        match product(self, rhs, &mut times) {
            Some(heap) => Self::from_sorted(heap.drain(combine), hint),
            None => Self::new(),
        }
    }

    /// Negation of every stored value.
    pub fn negate(&self) -> Self {
        self.map(|v| -v.clone())
    }
}

/// First index in `[0, n]` at which the monotone predicate `p` turns true,
/// or `n` if it never does. Half-open bisection.
fn search<P>(n: usize, mut p: P) -> usize
where
    P: FnMut(usize) -> bool,
{
    let (mut lo, mut hi) = (0, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if p(mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

impl<T> Clone for Mat<T> {
    fn clone(&self) -> Self {
        Mat {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            vals: self.vals.clone(),
        }
    }
}

impl<T> Default for Mat<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Eq0 for Mat<T> {
    /// A matrix tests as zero iff it stores no entries.
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: PartialEq> PartialEq for Mat<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows() == other.rows() && self.cols() == other.cols() && self.values() == other.values()
    }
}

impl<T: Eq> Eq for Mat<T> {}

impl<T: fmt::Debug> fmt::Debug for Mat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| ((k.row, k.col), v)))
            .finish()
    }
}

impl<T: Scalar> Add for Mat<T> {
    type Output = Mat<T>;

    fn add(self, rhs: Self) -> Mat<T> {
        Mat::add(&self, &rhs)
    }
}

impl<T: Scalar> Sub for Mat<T> {
    type Output = Mat<T>;

    fn sub(self, rhs: Self) -> Mat<T> {
        Mat::sub(&self, &rhs)
    }
}

impl<T: Scalar> Mul for Mat<T> {
    type Output = Mat<T>;

    fn mul(self, rhs: Self) -> Mat<T> {
        Mat::mul(&self, &rhs)
    }
}

impl<T: Scalar> Neg for Mat<T> {
    type Output = Mat<T>;

    fn neg(self) -> Mat<T> {
        self.negate()
    }
}
