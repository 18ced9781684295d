use nalgebra::{DMatrix, DVector};

use crate::{
    control_points::segment_indices,
    error::Result,
    method::{check_row, check_x_cp_partials, SplineEngine, SplineEvaluation},
    options::InterpOptions,
};

/// Piecewise linear interpolation, boundary segments extended past the control points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearEngine;

impl LinearEngine {
    pub const NAME: &'static str = "slinear";
    pub const OPTIONS: &'static [&'static str] = &[];
    pub const MIN_POINTS: usize = 2;

    pub fn from_options(options: &InterpOptions) -> Result<Self> {
        options.check_recognized(Self::NAME, Self::OPTIONS)?;
        Ok(LinearEngine)
    }
}

impl SplineEngine for LinearEngine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_points(&self) -> usize {
        Self::MIN_POINTS
    }

    fn evaluate(&self, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64], x_cp_partials: bool) -> Result<SplineEvaluation> {
        check_x_cp_partials(self, x_cp_partials)?;
        check_row(Self::NAME, Self::MIN_POINTS, x_cp, y_cp, x_interp)?;

        let indices = segment_indices(x_cp, x_interp);
        let mut values = DVector::<f64>::zeros(x_interp.len());
        let mut d_y_cp = DMatrix::<f64>::zeros(x_interp.len(), x_cp.len());

        for (q, (&x, &j)) in x_interp.iter().zip(indices.iter()).enumerate() {
            let tau = (x - x_cp[j]) / (x_cp[j + 1] - x_cp[j]);
            d_y_cp[(q, j)] = 1.0 - tau;
            d_y_cp[(q, j + 1)] = tau;
            values[q] = if tau == 0.0 { y_cp[j] } else { (1.0 - tau) * y_cp[j] + tau * y_cp[j + 1] };
        }

        Ok(SplineEvaluation { values, d_y_cp, d_x_cp: None })
    }
}
