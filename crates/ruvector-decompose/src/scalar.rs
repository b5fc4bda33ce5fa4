//! Scalar arithmetic contract consumed by every algorithm in this crate.
//!
//! The engine never touches a concrete number type. Decompositions and
//! solvers only call the operations of [`Scalar`], so the same code runs over
//! machine floats, complex pairs, exact rationals or arbitrary-precision
//! decimals. Nothing here assumes IEEE rounding or a particular bit width.
//!
//! | Operation | Used by |
//! |-----------|---------|
//! | `add`, `sub`, `mul`, `neg` | elimination, reflections, substitution |
//! | `div` | multipliers, substitution |
//! | `magnitude_gt` | partial pivoting, QR self-check |
//! | `is_zero` | sparsity fast paths, singular detection |
//! | `signum`, `sqrt`, `conj` | Householder QR |
//! | `epsilon` | default QR tolerance |

use std::fmt;

use num_complex::Complex;
use num_traits::{Float, NumCast};

/// Element type accepted by the decomposition engine.
///
/// Receivers are borrowed so that heap-allocated scalars work without forcing
/// a copy on every operation.
pub trait Scalar: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    fn add(&self, rhs: &Self) -> Self;
    fn sub(&self, rhs: &Self) -> Self;
    fn mul(&self, rhs: &Self) -> Self;
    fn div(&self, rhs: &Self) -> Self;
    fn neg(&self) -> Self;

    /// `|self| > |other|`.
    fn magnitude_gt(&self, other: &Self) -> bool;

    /// Exact equality with the additive identity.
    fn is_zero(&self) -> bool;

    /// Unit-modulus value with the phase of `self`; zero maps to zero.
    fn signum(&self) -> Self;

    /// Principal square root.
    fn sqrt(&self) -> Self;

    /// Complex conjugate. The identity for real types.
    fn conj(&self) -> Self;

    /// Convert a real constant, used to build tolerance thresholds.
    fn from_f64(v: f64) -> Self;

    /// Relative rounding unit of the type. Zero for exact types.
    fn epsilon() -> f64;
}

macro_rules! impl_scalar_real {
    ($ty:ty) => {
        impl Scalar for $ty {
            #[inline]
            fn zero() -> Self {
                0.0
            }
            #[inline]
            fn one() -> Self {
                1.0
            }
            #[inline]
            fn add(&self, rhs: &Self) -> Self {
                self + rhs
            }
            #[inline]
            fn sub(&self, rhs: &Self) -> Self {
                self - rhs
            }
            #[inline]
            fn mul(&self, rhs: &Self) -> Self {
                self * rhs
            }
            #[inline]
            fn div(&self, rhs: &Self) -> Self {
                self / rhs
            }
            #[inline]
            fn neg(&self) -> Self {
                -*self
            }
            #[inline]
            fn magnitude_gt(&self, other: &Self) -> bool {
                <$ty>::abs(*self) > <$ty>::abs(*other)
            }
            #[inline]
            fn is_zero(&self) -> bool {
                *self == 0.0
            }
            #[inline]
            fn signum(&self) -> Self {
                if *self == 0.0 {
                    0.0
                } else {
                    <$ty>::signum(*self)
                }
            }
            #[inline]
            fn sqrt(&self) -> Self {
                <$ty>::sqrt(*self)
            }
            #[inline]
            fn conj(&self) -> Self {
                *self
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $ty
            }
            #[inline]
            fn epsilon() -> f64 {
                <$ty>::EPSILON as f64
            }
        }
    };
}

impl_scalar_real!(f32);
impl_scalar_real!(f64);

impl<F> Scalar for Complex<F>
where
    F: Float + fmt::Debug + Send + Sync + 'static,
{
    #[inline]
    fn zero() -> Self {
        Complex::new(F::zero(), F::zero())
    }
    #[inline]
    fn one() -> Self {
        Complex::new(F::one(), F::zero())
    }
    #[inline]
    fn add(&self, rhs: &Self) -> Self {
        *self + *rhs
    }
    #[inline]
    fn sub(&self, rhs: &Self) -> Self {
        *self - *rhs
    }
    #[inline]
    fn mul(&self, rhs: &Self) -> Self {
        *self * *rhs
    }
    #[inline]
    fn div(&self, rhs: &Self) -> Self {
        *self / *rhs
    }
    #[inline]
    fn neg(&self) -> Self {
        -*self
    }
    #[inline]
    fn magnitude_gt(&self, other: &Self) -> bool {
        self.norm_sqr() > other.norm_sqr()
    }
    #[inline]
    fn is_zero(&self) -> bool {
        self.re == F::zero() && self.im == F::zero()
    }
    fn signum(&self) -> Self {
        if Scalar::is_zero(self) {
            return Scalar::zero();
        }
        let modulus = self.norm();
        Complex::new(self.re / modulus, self.im / modulus)
    }
    #[inline]
    fn sqrt(&self) -> Self {
        Complex::sqrt(*self)
    }
    #[inline]
    fn conj(&self) -> Self {
        Complex::conj(self)
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        Complex::new(<F as NumCast>::from(v).unwrap_or_else(F::nan), F::zero())
    }
    #[inline]
    fn epsilon() -> f64 {
        num_traits::cast::<F, f64>(<F as Float>::epsilon()).unwrap_or(f64::EPSILON)
    }
}
