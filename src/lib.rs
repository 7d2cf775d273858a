//! Sparse matrices in Morton (Z-order) key order.
//!
//! A [`Mat`] keeps its entries in three parallel arrays sorted by the Morton
//! code of their `(row, col)` key. That single ordering choice gives the
//! crate its shape:
//!
//! - point access is a binary search ([`Mat::get`]);
//! - addition is an ordered merge with zero-thinning ([`Mat::add`]);
//! - multiplication walks the implicit quadtree that Morton order encodes,
//!   splitting operands at critical key bits and concatenating or merging
//!   the partial results ([`Mat::mul`]) — no dense intermediate and no
//!   explicit tree.
//!
//! Matrices are immutable values: slicing shares storage and all arithmetic
//! returns new matrices. The element contract is the [`Scalar`] trait, which
//! [`Mat`] itself satisfies, so block matrices (`Mat<Mat<T>>`) multiply
//! through the same kernel.
//!
//! # Example
//! ```
//! use zmat::{Key, Mat};
//!
//! let a = Mat::from_entries(vec![
//!     (Key::new(0, 0), 1),
//!     (Key::new(0, 1), 2),
//!     (Key::new(1, 1), 4),
//! ]);
//! let b = Mat::singleton(Key::new(1, 0), 10);
//!
//! let c = a.mul(&b);
//! assert_eq!(c.get(Key::new(0, 0)), Some(&20));
//! assert_eq!(c.get(Key::new(1, 0)), Some(&40));
//! assert_eq!(c.nnz(), 2);
//! ```

mod error;
mod heap;
mod key;
mod matrix;
mod merge;
mod mul;
mod scalar;
mod storage;

pub use error::{MatError, Result};
pub use key::Key;
pub use matrix::Mat;
pub use scalar::{Eq0, Scalar};
