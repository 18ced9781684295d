use nalgebra::{DMatrix, DVector};

use crate::{
    control_points::segment_indices,
    error::{InterpolationError, Result},
    method::{check_row, check_x_cp_partials, SplineEngine, SplineEvaluation},
    options::InterpOptions,
};

/// C2 cubic spline with not-a-knot end conditions (third derivative continuous across the
/// second and the second to last control point).
///
/// The spline is linear in the control point values, so the engine builds the basis matrix
/// `B` with `values = B * y_cp`; `B` is also the jacobian with respect to `y_cp`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CubicEngine;

impl CubicEngine {
    pub const NAME: &'static str = "cubic";
    pub const OPTIONS: &'static [&'static str] = &[];
    pub const MIN_POINTS: usize = 4;

    pub fn from_options(options: &InterpOptions) -> Result<Self> {
        options.check_recognized(Self::NAME, Self::OPTIONS)?;
        Ok(CubicEngine)
    }

    /// `(n, m)` matrix mapping control point values to interpolated values.
    pub fn basis(&self, x_cp: &[f64], x_interp: &[f64]) -> Result<DMatrix<f64>> {
        check_row(Self::NAME, Self::MIN_POINTS, x_cp, x_cp, x_interp)?;

        let m = x_cp.len();
        let n = x_interp.len();
        let second_derivatives = self.second_derivative_map(x_cp)?;
        let indices = segment_indices(x_cp, x_interp);

        let mut basis = DMatrix::<f64>::zeros(n, m);
        for (q, (&x, &j)) in x_interp.iter().zip(indices.iter()).enumerate() {
            let h = x_cp[j + 1] - x_cp[j];
            let a = x_cp[j + 1] - x;
            let b = x - x_cp[j];
            let weight_left = a * a * a / (6.0 * h) - h * a / 6.0;
            let weight_right = b * b * b / (6.0 * h) - h * b / 6.0;

            for c in 0..m {
                basis[(q, c)] = weight_left * second_derivatives[(j, c)]
                    + weight_right * second_derivatives[(j + 1, c)];
            }
            basis[(q, j)] += a / h;
            basis[(q, j + 1)] += b / h;
        }
        Ok(basis)
    }

    /// `(m, m)` matrix mapping control point values to the spline's second derivatives at
    /// the control points.
    fn second_derivative_map(&self, x_cp: &[f64]) -> Result<DMatrix<f64>> {
        let m = x_cp.len();
        let h: Vec<f64> = x_cp.windows(2).map(|w| w[1] - w[0]).collect();

        let mut matrix = DMatrix::<f64>::zeros(m, m);
        let mut rhs = DMatrix::<f64>::zeros(m, m);

        // not-a-knot on the left
        matrix[(0, 0)] = h[1];
        matrix[(0, 1)] = -(h[0] + h[1]);
        matrix[(0, 2)] = h[0];

        for i in 1..m - 1 {
            matrix[(i, i - 1)] = h[i - 1];
            matrix[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            matrix[(i, i + 1)] = h[i];

            rhs[(i, i - 1)] = 6.0 / h[i - 1];
            rhs[(i, i)] = -6.0 / h[i - 1] - 6.0 / h[i];
            rhs[(i, i + 1)] = 6.0 / h[i];
        }

        // not-a-knot on the right
        matrix[(m - 1, m - 3)] = h[m - 2];
        matrix[(m - 1, m - 2)] = -(h[m - 3] + h[m - 2]);
        matrix[(m - 1, m - 1)] = h[m - 3];

        match matrix.lu().solve(&rhs) {
            Some(solution) => Ok(solution),
            None => Err(InterpolationError::NumericalError(
                "cubic spline system is singular".to_string(),
            )),
        }
    }
}

impl SplineEngine for CubicEngine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_points(&self) -> usize {
        Self::MIN_POINTS
    }

    fn evaluate(&self, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64], x_cp_partials: bool) -> Result<SplineEvaluation> {
        check_x_cp_partials(self, x_cp_partials)?;
        check_row(Self::NAME, Self::MIN_POINTS, x_cp, y_cp, x_interp)?;

        let basis = self.basis(x_cp, x_interp)?;
        let values = &basis * DVector::from_column_slice(y_cp);

        Ok(SplineEvaluation { values, d_y_cp: basis, d_x_cp: None })
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn cubic(x: f64) -> f64 {
        x.powi(3) - 2.0 * x + 1.0
    }

    #[test]
    fn reproduces_cubic_polynomial() {
        let x_cp = [0.0, 1.0, 2.5, 3.0, 4.5];
        let y_cp: Vec<f64> = x_cp.iter().map(|x| cubic(*x)).collect();
        let x = [-1.0, 0.0, 0.5, 2.0, 3.7, 4.5, 5.0];

        let evaluation = CubicEngine.evaluate(&x_cp, &y_cp, &x, false).unwrap();

        for (q, xq) in x.iter().enumerate() {
            assert_approx_eq!(cubic(*xq), evaluation.values[q], 1e-9);
        }
    }

    #[test]
    fn passes_through_control_points() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let y_cp = [5.0, 12.0, 14.0, 16.0, 21.0, 29.0];

        let evaluation = CubicEngine.evaluate(&x_cp, &y_cp, &x_cp, false).unwrap();
        for (expected, actual) in y_cp.iter().zip(evaluation.values.iter()) {
            assert_approx_eq!(*expected, *actual, 1e-12);
        }
    }

    #[test]
    fn basis_rows_sum_to_one() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let basis = CubicEngine.basis(&x_cp, &[0.0, 1.3, 5.5, 9.0, 12.0, 14.0]).unwrap();

        for row in basis.row_iter() {
            assert_approx_eq!(1.0, row.sum(), 1e-12);
        }
    }

    #[test]
    fn jacobian_is_basis() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let y_cp = [7.0, 13.0, 9.0, 6.0, 12.0, 14.0];
        let x = [1.5, 3.0, 11.0];

        let evaluation = CubicEngine.evaluate(&x_cp, &y_cp, &x, false).unwrap();
        assert_eq!(CubicEngine.basis(&x_cp, &x).unwrap(), evaluation.d_y_cp);
    }

    #[test]
    fn rejects_x_cp_partials() {
        let x_cp = [1.0, 2.0, 4.0, 6.0];
        let result = CubicEngine.evaluate(&x_cp, &[1.0, 2.0, 3.0, 4.0], &[1.5], true);
        assert_eq!(
            Err(InterpolationError::UnsupportedPartials { method: "cubic".to_string() }),
            result
        );
    }

    #[test]
    fn rejects_options() {
        let options = InterpOptions::new().set("delta_x", 0.1);
        assert_eq!(
            "cubic interpolator does not support ['delta_x'] options.",
            CubicEngine::from_options(&options).unwrap_err().to_string()
        );
    }

    #[test]
    fn too_few_points() {
        let result = CubicEngine.basis(&[0.0, 1.0, 2.0], &[0.5]);
        assert!(matches!(result, Err(InterpolationError::InsufficientPoints { required: 4, actual: 3, .. })));
    }

    #[test]
    fn rejects_unsorted_control_points() {
        let y_cp = [1.0, 2.0, 0.0, 3.0, 1.0];
        let result = CubicEngine.evaluate(&[1.0, 2.0, 2.0, 4.0, 5.0], &y_cp, &[3.0], false);
        assert_eq!(Err(InterpolationError::NonIncreasingX { index: 2 }), result);

        let result = CubicEngine.basis(&[5.0, 4.0, 3.0, 2.0, 1.0], &[3.0]);
        assert!(matches!(result, Err(InterpolationError::NonIncreasingX { index: 1 })));
    }
}
