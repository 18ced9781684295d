use log::trace;
use nalgebra::{DMatrix, DVector};

use crate::{
    control_points::segment_indices,
    error::Result,
    method::{check_row, SplineEngine, SplineEvaluation},
    options::{invalid_option, InterpOptions},
    polynomial::{hermite_basis, hermite_basis_derivative, HermiteSegment},
    scalar::{sign, Scalar},
};

pub const DEFAULT_DELTA_X: f64 = 0.0;
pub const DEFAULT_EPS: f64 = 1e-30;

/// How the absolute value inside Akima's weights is computed.
///
/// - `Exact` - `|u|`, the original Akima weights. Not differentiable where two neighbouring
///   slopes are equal; there the partials follow the `+u` branch, like the complex step.
/// - `Smoothed` - `|u|` replaced by the parabola `u^2 / (2 delta_x) + delta_x / 2` for
///   `|u| < delta_x`, which keeps the partials continuous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbsWeighting {
    Exact,
    Smoothed { delta_x: f64 },
}

impl AbsWeighting {
    /// `Exact` for `delta_x == 0`, `Smoothed` otherwise.
    pub fn from_delta_x(delta_x: f64) -> Self {
        if delta_x > 0.0 {
            AbsWeighting::Smoothed { delta_x }
        } else {
            AbsWeighting::Exact
        }
    }

    pub fn apply<T: Scalar>(self, u: T) -> T {
        match self {
            AbsWeighting::Exact => {
                if u.re() < 0.0 {
                    -u
                } else {
                    u
                }
            }
            AbsWeighting::Smoothed { delta_x } => {
                if u.re() <= -delta_x {
                    -u
                } else if u.re() >= delta_x {
                    u
                } else {
                    u * u / T::from(2.0 * delta_x) + T::from(0.5 * delta_x)
                }
            }
        }
    }

    pub fn derivative(self, u: f64) -> f64 {
        match self {
            AbsWeighting::Exact => sign(u),
            AbsWeighting::Smoothed { delta_x } => {
                if u <= -delta_x {
                    -1.0
                } else if u >= delta_x {
                    1.0
                } else {
                    u / delta_x
                }
            }
        }
    }
}

/// Akima spline: piecewise cubic Hermite interpolation with nodal derivatives taken as a
/// weighted average of the neighbouring segment slopes.
///
/// Two phantom slopes are extrapolated linearly past each end, so every control point,
/// boundaries included, uses the same weighting formula. Query points outside of the
/// control points are evaluated on the boundary segments' cubics.
///
/// # Example
/// ```
/// use diffspline::AkimaEngine;
///
/// let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
/// let y_cp = [5.0, 12.0, 14.0, 16.0, 21.0, 29.0];
/// let akima = AkimaEngine::default();
///
/// let y = akima.interpolate(&x_cp, &y_cp, &[1.0, 3.0, 12.0]).unwrap();
/// assert_eq!(vec![5.0, 13.0, 29.0], y);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AkimaEngine {
    weighting: AbsWeighting,
    eps: f64,
}

impl Default for AkimaEngine {
    fn default() -> Self {
        AkimaEngine::new(AbsWeighting::from_delta_x(DEFAULT_DELTA_X), DEFAULT_EPS)
    }
}

/// Extended slopes and nodal derivatives of one fit.
struct AkimaFit<T> {
    slopes: Vec<T>,
    derivatives: Vec<T>,
}

impl AkimaEngine {
    pub const NAME: &'static str = "akima";
    pub const OPTIONS: &'static [&'static str] = &["delta_x", "eps"];
    pub const MIN_POINTS: usize = 4;

    pub fn new(weighting: AbsWeighting, eps: f64) -> Self {
        AkimaEngine { weighting, eps }
    }

    /// Reads `delta_x` (default `0.0`) and `eps` (default `1e-30`).
    /// # Errors
    /// Error is returned for unknown option names and for negative or non-finite values.
    pub fn from_options(options: &InterpOptions) -> Result<Self> {
        options.check_recognized(Self::NAME, Self::OPTIONS)?;

        let delta_x = options.get_or("delta_x", DEFAULT_DELTA_X);
        if !delta_x.is_finite() || delta_x < 0.0 {
            return Err(invalid_option("delta_x", delta_x, "must be finite and >= 0"));
        }
        let eps = options.get_or("eps", DEFAULT_EPS);
        if !eps.is_finite() || eps < 0.0 {
            return Err(invalid_option("eps", eps, "must be finite and >= 0"));
        }

        Ok(AkimaEngine::new(AbsWeighting::from_delta_x(delta_x), eps))
    }

    pub fn weighting(&self) -> AbsWeighting {
        self.weighting
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Interpolated values only. Generic so it can run on complex numbers for complex-step
    /// derivative checks.
    pub fn interpolate<T: Scalar>(&self, x_cp: &[T], y_cp: &[T], x_interp: &[T]) -> Result<Vec<T>> {
        let x_cp_re: Vec<f64> = x_cp.iter().map(|x| x.re()).collect();
        let y_cp_re: Vec<f64> = y_cp.iter().map(|y| y.re()).collect();
        let x_interp_re: Vec<f64> = x_interp.iter().map(|x| x.re()).collect();
        check_row(Self::NAME, Self::MIN_POINTS, &x_cp_re, &y_cp_re, &x_interp_re)?;

        let fit = self.fit(x_cp, y_cp);
        let indices = segment_indices(&x_cp_re, &x_interp_re);

        Ok(evaluate_fit(x_cp, y_cp, &fit, x_interp, &indices))
    }

    /// Interpolated values together with their partials with respect to `y_cp` and,
    /// if `x_cp_partials` is set, `x_cp`.
    ///
    /// Partials are propagated exactly through every stage of the fit: segment slopes,
    /// phantom slopes, nodal derivatives and the Hermite basis.
    pub fn interpolate_with_partials(
        &self,
        x_cp: &[f64],
        y_cp: &[f64],
        x_interp: &[f64],
        x_cp_partials: bool,
    ) -> Result<SplineEvaluation> {
        check_row(Self::NAME, Self::MIN_POINTS, x_cp, y_cp, x_interp)?;

        let m = x_cp.len();
        let n = x_interp.len();
        let fit = self.fit(x_cp, y_cp);
        let indices = segment_indices(x_cp, x_interp);
        let values = evaluate_fit(x_cp, y_cp, &fit, x_interp, &indices);

        // parameter layout of the gradients: y_cp first, then x_cp
        let parameters = if x_cp_partials { 2 * m } else { m };
        let slope_grads = slope_partials(x_cp, &fit.slopes, parameters, x_cp_partials);
        let derivative_grads = self.derivative_partials(&fit, &slope_grads);

        let mut d_y_cp = DMatrix::<f64>::zeros(n, m);
        let mut d_x_cp = if x_cp_partials { Some(DMatrix::<f64>::zeros(n, m)) } else { None };

        for (q, (&x, &j)) in x_interp.iter().zip(indices.iter()).enumerate() {
            let h = x_cp[j + 1] - x_cp[j];
            let tau = (x - x_cp[j]) / h;
            let (t0, t1) = (fit.derivatives[j], fit.derivatives[j + 1]);
            let [h00, h10, h01, h11] = hermite_basis(tau);

            let mut grad = &derivative_grads[j] * (h * h10) + &derivative_grads[j + 1] * (h * h11);
            grad[j] += h00;
            grad[j + 1] += h01;

            if x_cp_partials {
                // the local coordinate and the segment width move with the knots
                let [d00, d10, d01, d11] = hermite_basis_derivative(tau);
                let dv_dtau = d00 * y_cp[j] + h * d10 * t0 + d01 * y_cp[j + 1] + h * d11 * t1;
                let dv_dh = h10 * t0 + h11 * t1;
                grad[m + j] += dv_dtau * (tau - 1.0) / h - dv_dh;
                grad[m + j + 1] += -dv_dtau * tau / h + dv_dh;
            }

            for c in 0..m {
                d_y_cp[(q, c)] = grad[c];
            }
            if let Some(d_x_cp) = d_x_cp.as_mut() {
                for c in 0..m {
                    d_x_cp[(q, c)] = grad[m + c];
                }
            }
        }

        Ok(SplineEvaluation { values: DVector::from_vec(values), d_y_cp, d_x_cp })
    }

    fn fit<T: Scalar>(&self, x_cp: &[T], y_cp: &[T]) -> AkimaFit<T> {
        let slopes = extended_slopes(x_cp, y_cp);
        let derivatives = (0..x_cp.len())
            .map(|i| {
                let k = i + 2;
                let (w1, w2) = self.weights(&slopes, k);
                if self.is_degenerate((w1 + w2).re()) {
                    trace!("akima weights vanish at control point {i}, using mean of neighbouring slopes");
                    (slopes[k - 1] + slopes[k]) * T::from(0.5)
                } else {
                    (w1 * slopes[k - 1] + w2 * slopes[k]) / (w1 + w2)
                }
            })
            .collect();

        AkimaFit { slopes, derivatives }
    }

    /// Weights of the left and right slope for the control point at extended index `k`.
    fn weights<T: Scalar>(&self, slopes: &[T], k: usize) -> (T, T) {
        (
            self.weighting.apply(slopes[k + 1] - slopes[k]),
            self.weighting.apply(slopes[k - 1] - slopes[k - 2]),
        )
    }

    fn is_degenerate(&self, weight_sum: f64) -> bool {
        weight_sum <= self.eps
    }

    fn derivative_partials(&self, fit: &AkimaFit<f64>, slope_grads: &[DVector<f64>]) -> Vec<DVector<f64>> {
        let slopes = &fit.slopes;

        fit.derivatives
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let k = i + 2;
                let (w1, w2) = self.weights(slopes, k);
                if self.is_degenerate(w1 + w2) {
                    return (&slope_grads[k - 1] + &slope_grads[k]) * 0.5;
                }

                let dw1 = (&slope_grads[k + 1] - &slope_grads[k])
                    * self.weighting.derivative(slopes[k + 1] - slopes[k]);
                let dw2 = (&slope_grads[k - 1] - &slope_grads[k - 2])
                    * self.weighting.derivative(slopes[k - 1] - slopes[k - 2]);

                (dw1 * (slopes[k - 1] - t)
                    + dw2 * (slopes[k] - t)
                    + &slope_grads[k - 1] * w1
                    + &slope_grads[k] * w2)
                    / (w1 + w2)
            })
            .collect()
    }
}

impl SplineEngine for AkimaEngine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_points(&self) -> usize {
        Self::MIN_POINTS
    }

    fn supports_x_cp_partials(&self) -> bool {
        true
    }

    fn evaluate(&self, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64], x_cp_partials: bool) -> Result<SplineEvaluation> {
        self.interpolate_with_partials(x_cp, y_cp, x_interp, x_cp_partials)
    }
}

/// Segment slopes with two linearly extrapolated phantom slopes on each side.
/// Control point `i` sits between extended slopes `i + 1` and `i + 2`.
fn extended_slopes<T: Scalar>(x_cp: &[T], y_cp: &[T]) -> Vec<T> {
    let m = x_cp.len();
    let segment_slopes: Vec<T> = (0..m - 1)
        .map(|i| (y_cp[i + 1] - y_cp[i]) / (x_cp[i + 1] - x_cp[i]))
        .collect();

    let (two, three) = (T::from(2.0), T::from(3.0));
    let (first, second) = (segment_slopes[0], segment_slopes[1]);
    let (last, before_last) = (segment_slopes[m - 2], segment_slopes[m - 3]);

    let mut slopes = Vec::with_capacity(m + 3);
    slopes.push(three * first - two * second);
    slopes.push(two * first - second);
    slopes.extend(segment_slopes);
    slopes.push(two * last - before_last);
    slopes.push(three * last - two * before_last);
    slopes
}

/// Gradients of the extended slopes, same layout as [extended_slopes].
fn slope_partials(x_cp: &[f64], slopes: &[f64], parameters: usize, x_cp_partials: bool) -> Vec<DVector<f64>> {
    let m = x_cp.len();
    let segment_grads: Vec<DVector<f64>> = (0..m - 1)
        .map(|i| {
            let h = x_cp[i + 1] - x_cp[i];
            let s = slopes[i + 2];
            let mut grad = DVector::<f64>::zeros(parameters);
            grad[i] = -1.0 / h;
            grad[i + 1] = 1.0 / h;
            if x_cp_partials {
                grad[m + i] = s / h;
                grad[m + i + 1] = -s / h;
            }
            grad
        })
        .collect();

    let (first, second) = (&segment_grads[0], &segment_grads[1]);
    let (last, before_last) = (&segment_grads[m - 2], &segment_grads[m - 3]);
    let left = [first * 3.0 - second * 2.0, first * 2.0 - second];
    let right = [last * 2.0 - before_last, last * 3.0 - before_last * 2.0];

    let mut grads = Vec::with_capacity(m + 3);
    grads.extend(left);
    grads.extend(segment_grads);
    grads.extend(right);
    grads
}

fn evaluate_fit<T: Scalar>(x_cp: &[T], y_cp: &[T], fit: &AkimaFit<T>, x_interp: &[T], indices: &[usize]) -> Vec<T> {
    x_interp
        .iter()
        .zip(indices.iter())
        .map(|(&x, &j)| {
            HermiteSegment::new(
                x_cp[j],
                x_cp[j + 1],
                y_cp[j],
                y_cp[j + 1],
                fit.derivatives[j],
                fit.derivatives[j + 1],
            )
            .evaluate(x)
        })
        .collect()
}
