//! Element-type contract: zero-testability plus ring arithmetic.

use std::ops::{Add, Mul, Neg, Sub};

use num_complex::{Complex32, Complex64};

/// Zero-testability for matrix elements.
///
/// `is_zero` decides which arithmetic results are worth storing: the default
/// combiners of [`Mat::add`](crate::Mat::add) and [`Mat::mul`](crate::Mat::mul)
/// drop entries whose combined value tests as zero. The predicate may be
/// conservative (report `false` for a value that happens to be zero) at the
/// cost of keeping such entries around; it must never report `true` for a
/// value that behaves nonzero under addition.
pub trait Eq0 {
    /// Whether this value is the additive identity.
    fn is_zero(&self) -> bool;
}

macro_rules! impl_eq0_primitive {
    ($($t:ty)*) => {$(
        impl Eq0 for $t {
            #[inline]
            fn is_zero(&self) -> bool {
                *self == 0 as $t
            }
        }
    )*};
}

impl_eq0_primitive!(i8 i16 i32 i64 i128 isize f32 f64);

impl Eq0 for Complex32 {
    #[inline]
    fn is_zero(&self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }
}

impl Eq0 for Complex64 {
    #[inline]
    fn is_zero(&self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }
}

/// The element contract for matrix arithmetic.
///
/// Blanket-implemented for every type with the listed bounds, including
/// [`Mat`](crate::Mat) itself — which is what lets block matrices
/// (`Mat<Mat<T>>`) flow through the same addition and multiplication kernels
/// as scalar matrices.
pub trait Scalar:
    Clone
    + Eq0
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + 'static
{
}

impl<T> Scalar for T where
    T: Clone
        + Eq0
        + Add<Output = Self>
        + Sub<Output = Self>
        + Mul<Output = Self>
        + Neg<Output = Self>
        + 'static
{
}

/// Thin a combined value: keep it only if it does not test as zero.
#[inline]
pub(crate) fn non_zero<T: Eq0>(v: T) -> Option<T> {
    if v.is_zero() {
        None
    } else {
        Some(v)
    }
}

/// Macro to instantiate a generic test function at a list of scalar types.
///
/// Each `suffix => Type` pair produces one `#[test]` named after the base
/// name and the suffix.
///
/// # Example
///
/// ```ignore
/// fn test_operation_generic<T: Scalar>() {
///     // test implementation
/// }
///
/// zmat::scalar_tests!(test_operation, test_operation_generic:
///     f64 => f64,
///     c64 => num_complex::Complex64,
/// );
/// // Generates:
/// // #[test] fn test_operation_f64() { test_operation_generic::<f64>(); }
/// // #[test] fn test_operation_c64() { test_operation_generic::<num_complex::Complex64>(); }
/// ```
#[macro_export]
macro_rules! scalar_tests {
    ($name:ident, $test_fn:ident: $($suffix:ident => $t:ty),+ $(,)?) => {
        paste::paste! {
            $(
                #[test]
                fn [<$name _ $suffix>]() {
                    $test_fn::<$t>();
                }
            )+
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_zero() {
        assert!(0i64.is_zero());
        assert!(!3i64.is_zero());
        assert!(0.0f64.is_zero());
        assert!((-0.0f64).is_zero());
        assert!(!1e-300f64.is_zero());
    }

    #[test]
    fn test_complex_zero_is_componentwise() {
        assert!(Complex64::new(0.0, 0.0).is_zero());
        assert!(!Complex64::new(0.0, 1.0).is_zero());
        assert!(!Complex64::new(1.0, 0.0).is_zero());
        assert!(Complex32::new(0.0, -0.0).is_zero());
    }

    #[test]
    fn test_non_zero_thins() {
        assert_eq!(non_zero(0i32), None);
        assert_eq!(non_zero(7i32), Some(7));
    }
}
