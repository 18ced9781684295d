use crate::scalar::Scalar;

/// Cubic on one segment `[x0, x0 + h]` given by end values and end slopes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermiteSegment<T> {
    x0: T,
    h: T,
    y0: T,
    y1: T,
    t0: T,
    t1: T,
}

/// Hermite basis `[h00, h10, h01, h11]` at local coordinate `tau`.
///
/// At `tau = 0` and `tau = 1` the basis is exactly `[1, 0, 0, 0]` and `[0, 0, 1, 0]`, so
/// a segment evaluated on one of its knots returns the knot value without rounding.
pub fn hermite_basis<T: Scalar>(tau: T) -> [T; 4] {
    let one = T::from(1.0);
    let two = T::from(2.0);
    let three = T::from(3.0);
    let rest = one - tau;
    [
        (one + two * tau) * rest * rest,
        tau * rest * rest,
        tau * tau * (three - two * tau),
        tau * tau * (tau - one),
    ]
}

/// Derivative of [hermite_basis] with respect to `tau`.
pub fn hermite_basis_derivative(tau: f64) -> [f64; 4] {
    [
        6.0 * tau * tau - 6.0 * tau,
        3.0 * tau * tau - 4.0 * tau + 1.0,
        6.0 * tau - 6.0 * tau * tau,
        3.0 * tau * tau - 2.0 * tau,
    ]
}

impl<T: Scalar> HermiteSegment<T> {
    pub fn new(x0: T, x1: T, y0: T, y1: T, t0: T, t1: T) -> Self {
        HermiteSegment { x0, h: x1 - x0, y0, y1, t0, t1 }
    }

    pub fn local(&self, x: T) -> T {
        (x - self.x0) / self.h
    }

    pub fn evaluate(&self, x: T) -> T {
        let [h00, h10, h01, h11] = hermite_basis(self.local(x));
        h00 * self.y0 + self.h * h10 * self.t0 + h01 * self.y1 + self.h * h11 * self.t1
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use super::*;

    #[test]
    fn evaluate() {
        // cubic f(x) = x^3 - 2x on [0.5, 2.0]
        let eps = 1e-12;
        let f = |x: f64| x.powi(3) - 2.0 * x;
        let df = |x: f64| 3.0 * x.powi(2) - 2.0;
        let segment = HermiteSegment::new(0.5, 2.0, f(0.5), f(2.0), df(0.5), df(2.0));

        assert_approx_eq!(segment.evaluate(1.3), f(1.3), eps);
        assert_approx_eq!(segment.evaluate(-0.4), f(-0.4), eps);
        assert_approx_eq!(segment.evaluate(3.1), f(3.1), 1e-10);
    }

    #[test]
    fn basis_derivative_gives_slope() {
        let f = |x: f64| x.powi(3) - 2.0 * x;
        let df = |x: f64| 3.0 * x.powi(2) - 2.0;
        let (x0, h) = (0.5, 1.5);

        let [d00, d10, d01, d11] = hermite_basis_derivative((1.7 - x0) / h);
        let slope = (d00 * f(x0) + d01 * f(x0 + h)) / h + d10 * df(x0) + d11 * df(x0 + h);
        assert_approx_eq!(slope, df(1.7), 1e-12);
    }

    #[test]
    fn exact_on_knots() {
        let segment = HermiteSegment::new(2.0, 4.0, 12.0, 14.0, 0.7, -3.1);

        assert_eq!(segment.evaluate(2.0), 12.0);
        assert_eq!(segment.evaluate(4.0), 14.0);
    }

    #[test]
    fn basis_partition_of_unity() {
        for tau in [0.0, 0.13, 0.5, 0.87, 1.0] {
            let [h00, _, h01, _] = hermite_basis(tau);
            assert_approx_eq!(h00 + h01, 1.0, 1e-15);
        }
    }
}
