use nalgebra::{DMatrix, DVector};

use crate::{
    error::Result,
    method::{check_row, check_x_cp_partials, SplineEngine, SplineEvaluation},
    options::{invalid_option, InterpOptions},
};

pub const DEFAULT_ORDER: usize = 4;

/// B-spline with a clamped, uniform knot vector.
///
/// The control point values are the B-spline coefficients, so the curve passes through
/// the first and the last control point only. Query points are mapped onto the parameter
/// `t = (x - x_cp[0]) / (x_cp[m - 1] - x_cp[0])`, clamped to `[0, 1]`; B-splines are not
/// extrapolated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSplineEngine {
    order: usize,
}

impl Default for BSplineEngine {
    fn default() -> Self {
        BSplineEngine { order: DEFAULT_ORDER }
    }
}

impl BSplineEngine {
    pub const NAME: &'static str = "bspline";
    pub const OPTIONS: &'static [&'static str] = &["order"];

    /// Reads `order` (default `4`, cubic).
    /// # Errors
    /// Error is returned for unknown option names and for an order that is not an integer `>= 2`.
    pub fn from_options(options: &InterpOptions) -> Result<Self> {
        options.check_recognized(Self::NAME, Self::OPTIONS)?;

        let order = options.get_or("order", DEFAULT_ORDER as f64);
        if !order.is_finite() || order.fract() != 0.0 || order < 2.0 {
            return Err(invalid_option("order", order, "must be an integer >= 2"));
        }
        Ok(BSplineEngine { order: order as usize })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// `(n, m)` matrix of basis function values; `values = B * y_cp`.
    pub fn basis(&self, x_cp: &[f64], x_interp: &[f64]) -> Result<DMatrix<f64>> {
        check_row(Self::NAME, self.order, x_cp, x_cp, x_interp)?;

        let m = x_cp.len();
        let degree = self.order - 1;
        let knots = self.knots(m);
        let (x_min, x_max) = (x_cp[0], x_cp[m - 1]);

        let mut basis = DMatrix::<f64>::zeros(x_interp.len(), m);
        for (q, &x) in x_interp.iter().enumerate() {
            let t = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
            let span = find_span(&knots, degree, m, t);
            let values = basis_functions(&knots, degree, span, t);
            for (r, value) in values.iter().enumerate() {
                basis[(q, span - degree + r)] = *value;
            }
        }
        Ok(basis)
    }

    /// `m + order` knots: `order` zeros, uniform interior knots, `order` ones.
    fn knots(&self, m: usize) -> Vec<f64> {
        let segments = m - self.order + 1;
        let mut knots = vec![0.0; m + self.order];
        for (i, knot) in knots.iter_mut().enumerate().skip(self.order - 1) {
            *knot = if i <= m { (i + 1 - self.order) as f64 / segments as f64 } else { 1.0 };
        }
        knots
    }
}

/// Knot span `mu` with `knots[mu] <= t < knots[mu + 1]`; `t = 1` uses the last span.
fn find_span(knots: &[f64], degree: usize, m: usize, t: f64) -> usize {
    let mut span = degree;
    while span < m - 1 && t >= knots[span + 1] {
        span += 1;
    }
    span
}

/// The `degree + 1` basis functions that do not vanish on `span`, Cox-de Boor recursion.
fn basis_functions(knots: &[f64], degree: usize, span: usize, t: f64) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    values
}

impl SplineEngine for BSplineEngine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_points(&self) -> usize {
        self.order
    }

    fn evaluate(&self, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64], x_cp_partials: bool) -> Result<SplineEvaluation> {
        check_x_cp_partials(self, x_cp_partials)?;
        check_row(Self::NAME, self.order, x_cp, y_cp, x_interp)?;

        let basis = self.basis(x_cp, x_interp)?;
        let values = &basis * DVector::from_column_slice(y_cp);

        Ok(SplineEvaluation { values, d_y_cp: basis, d_x_cp: None })
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::error::InterpolationError;

    #[test]
    fn knot_vector() {
        let engine = BSplineEngine::default();
        assert_eq!(vec![0.0, 0.0, 0.0, 0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 1.0, 1.0, 1.0], engine.knots(6));

        let engine = BSplineEngine::from_options(&InterpOptions::new().set("order", 2.0)).unwrap();
        assert_eq!(vec![0.0, 0.0, 0.5, 1.0, 1.0], engine.knots(3));
    }

    #[test]
    fn partition_of_unity() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let x: Vec<f64> = (0..=24).map(|i| 0.5 * i as f64).collect();
        let basis = BSplineEngine::default().basis(&x_cp, &x).unwrap();

        for row in basis.row_iter() {
            assert_approx_eq!(1.0, row.sum(), 1e-12);
            assert!(row.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn interpolates_end_points_and_clamps() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let y_cp = [5.0, 12.0, 14.0, 16.0, 21.0, 29.0];

        let evaluation = BSplineEngine::default().evaluate(&x_cp, &y_cp, &[0.0, 1.0, 12.0, 15.0], false).unwrap();

        assert_approx_eq!(5.0, evaluation.values[0], 1e-12);
        assert_approx_eq!(5.0, evaluation.values[1], 1e-12);
        assert_approx_eq!(29.0, evaluation.values[2], 1e-12);
        assert_approx_eq!(29.0, evaluation.values[3], 1e-12);
    }

    #[test]
    fn order_two_is_linear_on_uniform_points() {
        let engine = BSplineEngine::from_options(&InterpOptions::new().set("order", 2.0)).unwrap();
        let x_cp = [0.0, 1.0, 2.0, 3.0];
        let y_cp = [1.0, 3.0, 2.0, 5.0];

        let evaluation = engine.evaluate(&x_cp, &y_cp, &[0.5, 1.5, 2.0, 2.75], false).unwrap();

        assert_approx_eq!(2.0, evaluation.values[0], 1e-12);
        assert_approx_eq!(2.5, evaluation.values[1], 1e-12);
        assert_approx_eq!(2.0, evaluation.values[2], 1e-12);
        assert_approx_eq!(4.25, evaluation.values[3], 1e-12);
    }

    #[test]
    fn invalid_order() {
        for order in [1.0, 2.5, f64::NAN] {
            let result = BSplineEngine::from_options(&InterpOptions::new().set("order", order));
            assert!(matches!(result, Err(InterpolationError::InvalidOption { .. })));
        }
    }

    #[test]
    fn fewer_points_than_order() {
        let engine = BSplineEngine::from_options(&InterpOptions::new().set("order", 5.0)).unwrap();
        let result = engine.basis(&[0.0, 1.0, 2.0, 3.0], &[0.5]);
        assert!(matches!(result, Err(InterpolationError::InsufficientPoints { required: 5, actual: 4, .. })));
    }

    #[test]
    fn rejects_unsorted_control_points() {
        let engine = BSplineEngine::default();
        let y_cp = [1.0, 2.0, 0.0, 3.0, 1.0];
        let result = engine.evaluate(&[1.0, 2.0, 2.0, 4.0, 5.0], &y_cp, &[3.0], false);
        assert_eq!(Err(InterpolationError::NonIncreasingX { index: 2 }), result);

        let result = engine.evaluate(&[5.0, 4.0, 3.0, 2.0, 1.0], &y_cp, &[3.0], false);
        assert_eq!(Err(InterpolationError::NonIncreasingX { index: 1 }), result);
    }
}
