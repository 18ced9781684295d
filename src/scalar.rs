use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Neg, Sub},
};

use num_complex::Complex64;

/// Number type the spline value path can run on.
///
/// Implemented for `f64` and for `Complex64`, so the same code that produces the
/// interpolated values can be driven with a complex perturbation for complex-step
/// derivative checks. Branching decisions (segment lookup, absolute value, weight
/// threshold) are taken on the real part only.
pub trait Scalar:
    Copy
    + Debug
    + From<f64>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn re(self) -> f64;
}

impl Scalar for f64 {
    #[inline]
    fn re(self) -> f64 {
        self
    }
}

impl Scalar for Complex64 {
    #[inline]
    fn re(self) -> f64 {
        self.re
    }
}

/// Slope of `|u|` on the branch the value path takes: `u < 0` negates, everything else,
/// zero included, keeps `u`.
#[inline]
pub(crate) fn sign(u: f64) -> f64 {
    if u < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn square_plus_one<T: Scalar>(x: T) -> T {
        x * x + T::from(1.0)
    }

    #[test]
    fn generic_arithmetic() {
        assert_eq!(square_plus_one(3.0), 10.0);

        let h = 1e-30;
        let z = square_plus_one(Complex64::new(3.0, h));
        assert_eq!(z.re(), 10.0);
        assert_approx_eq!(z.im / h, 6.0, 1e-12);
    }

    #[test]
    fn sign_of_zero_follows_positive_branch() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.0), 1.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-1e-300), -1.0);
    }
}
