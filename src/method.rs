use std::{fmt::Display, str::FromStr};

use nalgebra::{DMatrix, DVector};

use crate::{
    akima::AkimaEngine,
    bspline::BSplineEngine,
    control_points::{check_finite, check_increasing},
    cubic::CubicEngine,
    error::{InterpolationError, Result},
    linear::LinearEngine,
    options::InterpOptions,
};

/// Interpolated values of one control point row and their partials.
/// - `values` - one value per query point (`n`),
/// - `d_y_cp` - `(n, m)` partials with respect to the control point values,
/// - `d_x_cp` - `(n, m)` partials with respect to the control point locations, if requested.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineEvaluation {
    pub values: DVector<f64>,
    pub d_y_cp: DMatrix<f64>,
    pub d_x_cp: Option<DMatrix<f64>>,
}

/// Operations every interpolation method provides.
pub trait SplineEngine {
    fn name(&self) -> &'static str;

    /// Fewest control points the method can fit.
    fn min_points(&self) -> usize;

    fn supports_x_cp_partials(&self) -> bool {
        false
    }

    /// Evaluates one row of control point values at every query point.
    fn evaluate(&self, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64], x_cp_partials: bool) -> Result<SplineEvaluation>;
}

/// Interpolation method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Akima,
    Cubic,
    BSpline,
    Slinear,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Akima => AkimaEngine::NAME,
            Method::Cubic => CubicEngine::NAME,
            Method::BSpline => BSplineEngine::NAME,
            Method::Slinear => LinearEngine::NAME,
        }
    }

    /// Option names the method accepts.
    pub fn recognized_options(&self) -> &'static [&'static str] {
        match self {
            Method::Akima => AkimaEngine::OPTIONS,
            Method::Cubic => CubicEngine::OPTIONS,
            Method::BSpline => BSplineEngine::OPTIONS,
            Method::Slinear => LinearEngine::OPTIONS,
        }
    }
}

impl FromStr for Method {
    type Err = InterpolationError;

    /// # Example
    /// ```
    /// use diffspline::Method;
    ///
    /// assert_eq!(Method::Cubic, "scipy_cubic".parse::<Method>().unwrap());
    /// assert!("quintic".parse::<Method>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "akima" => Ok(Method::Akima),
            "cubic" | "scipy_cubic" => Ok(Method::Cubic),
            "bspline" | "bsplines" => Ok(Method::BSpline),
            "slinear" => Ok(Method::Slinear),
            _ => Err(InterpolationError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configured engine of one of the supported methods.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolant {
    Akima(AkimaEngine),
    Cubic(CubicEngine),
    BSpline(BSplineEngine),
    Slinear(LinearEngine),
}

impl Interpolant {
    /// Builds the engine of `method`, rejecting options it does not recognize.
    /// # Example
    /// ```
    /// use diffspline::{Interpolant, InterpOptions, Method};
    ///
    /// let options = InterpOptions::new().set("delta_x", 0.1);
    /// assert!(Interpolant::new(Method::Akima, &options).is_ok());
    ///
    /// let err = Interpolant::new(Method::Cubic, &options).unwrap_err();
    /// assert_eq!("cubic interpolator does not support ['delta_x'] options.", err.to_string());
    /// ```
    pub fn new(method: Method, options: &InterpOptions) -> Result<Self> {
        match method {
            Method::Akima => AkimaEngine::from_options(options).map(Interpolant::Akima),
            Method::Cubic => CubicEngine::from_options(options).map(Interpolant::Cubic),
            Method::BSpline => BSplineEngine::from_options(options).map(Interpolant::BSpline),
            Method::Slinear => LinearEngine::from_options(options).map(Interpolant::Slinear),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Interpolant::Akima(_) => Method::Akima,
            Interpolant::Cubic(_) => Method::Cubic,
            Interpolant::BSpline(_) => Method::BSpline,
            Interpolant::Slinear(_) => Method::Slinear,
        }
    }
}

macro_rules! dispatch {
    ($interpolant:expr, $engine:ident => $call:expr) => {
        match $interpolant {
            Interpolant::Akima($engine) => $call,
            Interpolant::Cubic($engine) => $call,
            Interpolant::BSpline($engine) => $call,
            Interpolant::Slinear($engine) => $call,
        }
    };
}

impl SplineEngine for Interpolant {
    fn name(&self) -> &'static str {
        dispatch!(self, engine => engine.name())
    }

    fn min_points(&self) -> usize {
        dispatch!(self, engine => engine.min_points())
    }

    fn supports_x_cp_partials(&self) -> bool {
        dispatch!(self, engine => engine.supports_x_cp_partials())
    }

    fn evaluate(&self, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64], x_cp_partials: bool) -> Result<SplineEvaluation> {
        dispatch!(self, engine => engine.evaluate(x_cp, y_cp, x_interp, x_cp_partials))
    }
}

/// Entry checks shared by the engines, run before any numeric work: the shapes of
/// [check_shape], then finite values and a strictly increasing `x_cp`.
pub(crate) fn check_row(method: &str, min_points: usize, x_cp: &[f64], y_cp: &[f64], x_interp: &[f64]) -> Result<()> {
    check_shape(method, min_points, x_cp.len(), y_cp.len(), x_interp.len())?;
    check_finite("x_cp", x_cp)?;
    check_increasing(x_cp)?;
    check_finite("y_cp", y_cp)?;
    check_finite("x_interp", x_interp)
}

/// Length checks: non-empty arrays, matching `y_cp`, enough control points.
pub(crate) fn check_shape(method: &str, min_points: usize, m: usize, y_len: usize, n: usize) -> Result<()> {
    if m == 0 {
        return Err(InterpolationError::EmptyInput("x_cp".to_string()));
    }
    if y_len != m {
        return Err(InterpolationError::LengthMismatch { name: "y_cp".to_string(), expected: m, actual: y_len });
    }
    if m < min_points {
        return Err(InterpolationError::InsufficientPoints {
            method: method.to_string(),
            required: min_points,
            actual: m,
        });
    }
    if n == 0 {
        return Err(InterpolationError::EmptyInput("x_interp".to_string()));
    }
    Ok(())
}

/// Rejects x_cp partial requests for methods that cannot provide them.
pub(crate) fn check_x_cp_partials<E: SplineEngine>(engine: &E, x_cp_partials: bool) -> Result<()> {
    if x_cp_partials && !engine.supports_x_cp_partials() {
        return Err(InterpolationError::UnsupportedPartials { method: engine.name().to_string() });
    }
    Ok(())
}
