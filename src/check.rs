//! Comparison of analytic partials with numerical approximations.

use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::{
    akima::AkimaEngine,
    error::Result,
    method::{Interpolant, SplineEngine},
};

pub const DEFAULT_FD_STEP: f64 = 1e-6;
pub const COMPLEX_STEP: f64 = 1e-30;

/// Largest deviation of the analytic partials from the numerical ones.
/// - `max_abs_error` - largest elementwise difference,
/// - `max_rel_error` - largest `|J_an - J_num| / |J_num|` (Frobenius norms) over the checked
///   inputs; the absolute norm is used when `J_num` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialsCheck {
    pub max_abs_error: f64,
    pub max_rel_error: f64,
}

impl PartialsCheck {
    fn new() -> Self {
        PartialsCheck { max_abs_error: 0.0, max_rel_error: 0.0 }
    }

    fn add(&mut self, analytic: &DMatrix<f64>, numerical: &DMatrix<f64>) {
        let difference = analytic - numerical;
        let abs_error = difference.amax();
        let scale = numerical.norm();
        let rel_error = if scale > 0.0 { difference.norm() / scale } else { difference.norm() };

        self.max_abs_error = self.max_abs_error.max(abs_error);
        self.max_rel_error = self.max_rel_error.max(rel_error);
    }

    pub fn is_within(&self, atol: f64, rtol: f64) -> bool {
        self.max_abs_error <= atol && self.max_rel_error <= rtol
    }
}

/// Checks the partials of any method against central finite differences with `step`.
///
/// Partials with respect to `x_cp` are included when the method provides them. Query points
/// closer than `step` to a control point see the kink of the piecewise polynomial and make
/// the `x_cp` check meaningless.
pub fn check_partials_fd(
    interpolant: &Interpolant,
    x_cp: &[f64],
    y_cp: &[f64],
    x_interp: &[f64],
    step: f64,
) -> Result<PartialsCheck> {
    let with_x = interpolant.supports_x_cp_partials();
    let analytic = interpolant.evaluate(x_cp, y_cp, x_interp, with_x)?;
    let values = |x: &[f64], y: &[f64]| interpolant.evaluate(x, y, x_interp, false).map(|e| e.values);

    let mut numerical = DMatrix::<f64>::zeros(x_interp.len(), x_cp.len());
    let mut perturbed = y_cp.to_vec();
    for j in 0..y_cp.len() {
        perturbed[j] = y_cp[j] + step;
        let forward = values(x_cp, &perturbed)?;
        perturbed[j] = y_cp[j] - step;
        let backward = values(x_cp, &perturbed)?;
        perturbed[j] = y_cp[j];
        numerical.set_column(j, &((forward - backward) / (2.0 * step)));
    }

    let mut check = PartialsCheck::new();
    check.add(&analytic.d_y_cp, &numerical);

    if let Some(d_x_cp) = &analytic.d_x_cp {
        let mut perturbed = x_cp.to_vec();
        for j in 0..x_cp.len() {
            perturbed[j] = x_cp[j] + step;
            let forward = values(&perturbed, y_cp)?;
            perturbed[j] = x_cp[j] - step;
            let backward = values(&perturbed, y_cp)?;
            perturbed[j] = x_cp[j];
            numerical.set_column(j, &((forward - backward) / (2.0 * step)));
        }
        check.add(d_x_cp, &numerical);
    }

    debug!("{} finite difference check: {:?}", interpolant.name(), check);
    Ok(check)
}

/// Checks the Akima partials with respect to `y_cp` and `x_cp` against the complex step.
pub fn check_partials_cs(engine: &AkimaEngine, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64]) -> Result<PartialsCheck> {
    let analytic = engine.interpolate_with_partials(x_cp, y_cp, x_interp, true)?;

    let x_cp_c: Vec<Complex64> = x_cp.iter().map(|v| Complex64::new(*v, 0.0)).collect();
    let y_cp_c: Vec<Complex64> = y_cp.iter().map(|v| Complex64::new(*v, 0.0)).collect();
    let x_interp_c: Vec<Complex64> = x_interp.iter().map(|v| Complex64::new(*v, 0.0)).collect();

    let mut d_y_cp = DMatrix::<f64>::zeros(x_interp.len(), x_cp.len());
    let mut d_x_cp = DMatrix::<f64>::zeros(x_interp.len(), x_cp.len());

    for j in 0..x_cp.len() {
        let mut perturbed = y_cp_c.clone();
        perturbed[j].im = COMPLEX_STEP;
        for (q, value) in engine.interpolate(&x_cp_c, &perturbed, &x_interp_c)?.iter().enumerate() {
            d_y_cp[(q, j)] = value.im / COMPLEX_STEP;
        }

        let mut perturbed = x_cp_c.clone();
        perturbed[j].im = COMPLEX_STEP;
        for (q, value) in engine.interpolate(&perturbed, &y_cp_c, &x_interp_c)?.iter().enumerate() {
            d_x_cp[(q, j)] = value.im / COMPLEX_STEP;
        }
    }

    let mut check = PartialsCheck::new();
    check.add(&analytic.d_y_cp, &d_y_cp);
    if let Some(analytic_x) = &analytic.d_x_cp {
        check.add(analytic_x, &d_x_cp);
    }

    debug!("akima complex step check: {:?}", check);
    Ok(check)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::{akima::AbsWeighting, error::InterpolationError, method::Method, options::InterpOptions};

    fn random_problem(m: usize, n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut rng = rand::thread_rng();

        let mut x_cp = vec![0.0];
        for _ in 1..m {
            let last = x_cp[x_cp.len() - 1];
            x_cp.push(last + rng.gen_range(0.5..2.0));
        }
        let y_cp = (0..m).map(|_| rng.gen_range(-10.0..10.0)).collect();

        // query points strictly inside segments, away from the control points
        let x_interp = (0..n)
            .map(|_| {
                let j = rng.gen_range(0..m - 1);
                x_cp[j] + rng.gen_range(0.1..0.9) * (x_cp[j + 1] - x_cp[j])
            })
            .collect();

        (x_cp, y_cp, x_interp)
    }

    #[test]
    fn complex_step_agrees_with_analytic() {
        for delta_x in [0.0, 0.1, 0.5] {
            let engine = AkimaEngine::new(AbsWeighting::from_delta_x(delta_x), 1e-30);
            let (x_cp, y_cp, x_interp) = random_problem(9, 40);

            let check = check_partials_cs(&engine, &x_cp, &y_cp, &x_interp).unwrap();
            assert!(check.is_within(1e-9, 1e-10), "{:?}", check);
        }
    }

    #[test]
    fn complex_step_with_equal_neighbouring_slopes() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let y_cp = [5.0, 12.0, 14.0, 16.0, 21.0, 29.0];
        let x_interp: Vec<f64> = (1..49).map(|i| 1.0 + 11.0 * i as f64 / 49.0).collect();

        let check = check_partials_cs(&AkimaEngine::default(), &x_cp, &y_cp, &x_interp).unwrap();
        assert!(check.is_within(1e-9, 1e-10), "{:?}", check);
    }

    #[test]
    fn finite_difference_every_method() {
        for (method, options) in [
            (Method::Akima, InterpOptions::new()),
            (Method::Akima, InterpOptions::new().set("delta_x", 0.1)),
            (Method::Cubic, InterpOptions::new()),
            (Method::BSpline, InterpOptions::new()),
            (Method::Slinear, InterpOptions::new()),
        ] {
            let interpolant = Interpolant::new(method, &options).unwrap();
            let (x_cp, y_cp, x_interp) = random_problem(8, 30);

            let check = check_partials_fd(&interpolant, &x_cp, &y_cp, &x_interp, DEFAULT_FD_STEP).unwrap();
            assert!(check.is_within(1e-4, 1e-5), "{}: {:?}", method, check);
        }
    }

    #[test]
    fn unsorted_control_points_are_rejected() {
        let x_cp = [1.0, 2.0, 2.0, 4.0, 5.0];
        let y_cp = [1.0, 2.0, 0.0, 3.0, 1.0];
        let x_interp = [1.5, 3.0];

        for method in [Method::Akima, Method::Cubic, Method::BSpline, Method::Slinear] {
            let interpolant = Interpolant::new(method, &InterpOptions::new()).unwrap();
            let result = check_partials_fd(&interpolant, &x_cp, &y_cp, &x_interp, DEFAULT_FD_STEP);
            assert_eq!(Err(InterpolationError::NonIncreasingX { index: 2 }), result, "{}", method);
        }

        let result = check_partials_cs(&AkimaEngine::default(), &x_cp, &y_cp, &x_interp);
        assert_eq!(Err(InterpolationError::NonIncreasingX { index: 2 }), result);
    }

    #[test]
    fn detects_wrong_partials() {
        let mut check = PartialsCheck::new();
        let analytic = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let numerical = DMatrix::from_row_slice(1, 2, &[1.0, 2.5]);
        check.add(&analytic, &numerical);

        assert_eq!(0.5, check.max_abs_error);
        assert!(!check.is_within(1e-6, 1e-6));
    }

    #[ignore]
    #[test]
    fn performance() {
        use std::time::Instant;

        use crate::{control_points::ControlPointSet, vectorized::evaluate_rows};

        let mut rng = rand::thread_rng();
        let vec_size = 64;
        let m = 30;
        let x_cp: Vec<f64> = (0..m).map(|i| i as f64 * 0.2).collect();
        let y_cp = DMatrix::from_fn(vec_size, m, |_, _| rng.gen_range(0.0..10.0));
        let x_interp: Vec<f64> = (0..=300).map(|i| 6.0 * i as f64 / 300.0).collect();

        let engine = AkimaEngine::default();
        let points = ControlPointSet::new(x_cp.clone(), y_cp).unwrap();

        let now = Instant::now();
        for k in 0..vec_size {
            assert!(engine.interpolate_with_partials(&x_cp, &points.row(k), &x_interp, true).is_ok());
        }
        let elapsed = now.elapsed();
        println!("sequential rows time: {:.2?}", elapsed);

        let now = Instant::now();
        let evaluation = evaluate_rows(&engine, &points, &x_interp, true).unwrap();
        assert_eq!((vec_size, x_interp.len()), evaluation.values.shape());
        let elapsed = now.elapsed();
        println!("evaluate_rows time: {:.2?}", elapsed);
    }
}
