//! Spline interpolation with exact partial derivatives of the interpolated values with
//! respect to the control point values and locations, for use by gradient-based optimizers.
//!
//! The main method is Akima's piecewise cubic with optionally smoothed weights; not-a-knot
//! cubic, clamped B-spline and piecewise linear interpolation share the same interface.
//!
//! # Example
//! ```
//! use diffspline::{interp, InterpOptions};
//! use nalgebra::DMatrix;
//! use assert_approx_eq::assert_approx_eq;
//!
//! let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
//! let y_cp = DMatrix::from_row_slice(1, 6, &[5.0, 12.0, 14.0, 16.0, 21.0, 29.0]);
//!
//! let (y, jacobian) = interp("akima", &x_cp, &y_cp, &[2.0, 3.0], &InterpOptions::new()).unwrap();
//!
//! assert_approx_eq!(12.0, y[(0, 0)], 1e-12);
//! assert_approx_eq!(13.0, y[(0, 1)], 1e-12);
//! assert_approx_eq!(1.0, jacobian.block(0)[(0, 1)], 1e-12);
//! ```

mod akima;
mod bspline;
mod check;
mod component;
mod control_points;
mod cubic;
mod error;
mod linear;
mod method;
mod options;
mod polynomial;
mod scalar;
mod vectorized;

pub use akima::{AbsWeighting, AkimaEngine, DEFAULT_DELTA_X, DEFAULT_EPS};
pub use bspline::{BSplineEngine, DEFAULT_ORDER};
pub use check::{check_partials_cs, check_partials_fd, PartialsCheck, COMPLEX_STEP, DEFAULT_FD_STEP};
pub use component::{interp, Channel, ChannelState, Inputs, SplineComponent, SplineOutputs};
pub use control_points::ControlPointSet;
pub use cubic::CubicEngine;
pub use error::{InterpolationError, Result};
pub use linear::LinearEngine;
pub use method::{Interpolant, Method, SplineEngine, SplineEvaluation};
pub use options::InterpOptions;
pub use polynomial::{hermite_basis, hermite_basis_derivative, HermiteSegment};
pub use scalar::Scalar;
pub use vectorized::{evaluate_channels, evaluate_rows, BatchJacobian, BlockLayout, ChannelEvaluation};
