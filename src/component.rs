use std::collections::HashMap;

use log::debug;
use nalgebra::DMatrix;

use crate::{
    control_points::{check_finite, ControlPointSet},
    error::{InterpolationError, Result},
    method::{check_x_cp_partials, Interpolant, Method},
    options::{invalid_option, InterpOptions},
    vectorized::{evaluate_channels, evaluate_rows, BatchJacobian},
};

pub const DEFAULT_X_CP_NAME: &str = "x_cp";
pub const DEFAULT_X_INTERP_NAME: &str = "x_interp";

/// Whether a channel already has its control point values.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelState {
    /// Values must be supplied by [Inputs] at evaluation time.
    Declared,
    /// Default values, `(vec_size, m)`; [Inputs] may still override them.
    Bound(DMatrix<f64>),
}

/// Named pair of one control point input and one interpolated output.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    y_cp_name: String,
    y_interp_name: String,
    y_units: Option<String>,
    state: ChannelState,
}

impl Channel {
    pub fn y_cp_name(&self) -> &str {
        &self.y_cp_name
    }

    pub fn y_interp_name(&self) -> &str {
        &self.y_interp_name
    }

    pub fn y_units(&self) -> Option<&str> {
        self.y_units.as_deref()
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, ChannelState::Bound(_))
    }
}

/// Values supplied at evaluation time, by input name.
///
/// Vectors are stored as single-row matrices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: HashMap<String, DMatrix<f64>>,
}

impl Inputs {
    pub fn new() -> Self {
        Inputs::default()
    }

    pub fn set_vector(mut self, name: &str, values: &[f64]) -> Self {
        self.values.insert(name.to_string(), DMatrix::from_row_slice(1, values.len(), values));
        self
    }

    pub fn set_matrix(mut self, name: &str, values: DMatrix<f64>) -> Self {
        self.values.insert(name.to_string(), values);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DMatrix<f64>> {
        self.values.get(name)
    }

    /// Input `name` flattened in row-major order.
    fn vector(&self, name: &str) -> Option<Vec<f64>> {
        self.values.get(name).map(|m| m.transpose().iter().copied().collect())
    }
}

/// Interpolated values by output name and partials by (output, input) name pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplineOutputs {
    values: HashMap<String, DMatrix<f64>>,
    partials: HashMap<(String, String), BatchJacobian>,
}

impl SplineOutputs {
    /// `(vec_size, n)` values of output `name`.
    pub fn value(&self, name: &str) -> Option<&DMatrix<f64>> {
        self.values.get(name)
    }

    /// Partials of output `of` with respect to input `wrt`.
    pub fn partials(&self, of: &str, wrt: &str) -> Option<&BatchJacobian> {
        self.partials.get(&(of.to_string(), wrt.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Spline interpolation of any number of named channels over one shared grid.
///
/// Every channel interpolates its control point values `y_cp_name` located at `x_cp`
/// onto `x_interp` and publishes the result as `y_interp_name`, together with the
/// partials with respect to `y_cp_name` and, if enabled, `x_cp`.
///
/// # Example
/// ```
/// use diffspline::{Inputs, InterpOptions, SplineComponent};
/// use nalgebra::DMatrix;
/// use assert_approx_eq::assert_approx_eq;
///
/// let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
/// let y_cp = DMatrix::from_row_slice(1, 6, &[5.0, 12.0, 14.0, 16.0, 21.0, 29.0]);
///
/// let mut comp = SplineComponent::new("akima", &x_cp, &[1.0, 3.0, 12.0], &InterpOptions::new()).unwrap();
/// comp.add_spline("ycp", "y_val", Some(y_cp)).unwrap();
///
/// let outputs = comp.evaluate(&Inputs::new()).unwrap();
/// let y = outputs.value("y_val").unwrap();
/// assert_approx_eq!(5.0, y[(0, 0)]);
/// assert_approx_eq!(13.0, y[(0, 1)]);
/// assert_approx_eq!(29.0, y[(0, 2)]);
/// assert_eq!((3, 6), outputs.partials("y_val", "ycp").unwrap().shape());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SplineComponent {
    interpolant: Interpolant,
    x_cp: Vec<f64>,
    x_interp: Vec<f64>,
    vec_size: usize,
    x_cp_name: String,
    x_interp_name: String,
    x_units: Option<String>,
    x_cp_partials: bool,
    channels: Vec<Channel>,
}

impl SplineComponent {
    /// Creates a component without channels.
    /// # Errors
    /// Error is returned for an unknown `method`, options the method does not recognize,
    /// invalid option values and empty or non-finite grids.
    /// ```
    /// use diffspline::{InterpOptions, SplineComponent};
    ///
    /// let x_cp = [1.0, 2.0, 4.0, 6.0];
    /// let options = InterpOptions::new().set("delta_x", 0.1);
    /// let err = SplineComponent::new("scipy_cubic", &x_cp, &[1.5], &options).unwrap_err();
    /// assert_eq!("cubic interpolator does not support ['delta_x'] options.", err.to_string());
    /// ```
    pub fn new(method: &str, x_cp_val: &[f64], x_interp_val: &[f64], options: &InterpOptions) -> Result<Self> {
        let method = method.parse::<Method>()?;
        let interpolant = Interpolant::new(method, options)?;
        check_finite(DEFAULT_X_CP_NAME, x_cp_val)?;
        check_finite(DEFAULT_X_INTERP_NAME, x_interp_val)?;

        debug!(
            "{} spline component, {} control points, {} interpolation points",
            method,
            x_cp_val.len(),
            x_interp_val.len()
        );

        Ok(SplineComponent {
            interpolant,
            x_cp: x_cp_val.to_vec(),
            x_interp: x_interp_val.to_vec(),
            vec_size: 1,
            x_cp_name: DEFAULT_X_CP_NAME.to_string(),
            x_interp_name: DEFAULT_X_INTERP_NAME.to_string(),
            x_units: None,
            x_cp_partials: false,
            channels: Vec::new(),
        })
    }

    /// Number of independent `y_cp` rows of every channel.
    /// Number of independent control point rows per channel.
    /// # Errors
    /// Error is returned for `0`.
    pub fn with_vec_size(mut self, vec_size: usize) -> Result<Self> {
        if vec_size == 0 {
            return Err(invalid_option("vec_size", 0.0, "must be >= 1"));
        }
        self.vec_size = vec_size;
        Ok(self)
    }

    pub fn with_x_cp_name(mut self, name: &str) -> Self {
        self.x_cp_name = name.to_string();
        self
    }

    pub fn with_x_interp_name(mut self, name: &str) -> Self {
        self.x_interp_name = name.to_string();
        self
    }

    pub fn with_x_units(mut self, units: &str) -> Self {
        self.x_units = Some(units.to_string());
        self
    }

    /// Enables partials with respect to `x_cp`.
    /// # Errors
    /// Error is returned when the method cannot provide them.
    pub fn with_x_cp_partials(mut self, enabled: bool) -> Result<Self> {
        check_x_cp_partials(&self.interpolant, enabled)?;
        self.x_cp_partials = enabled;
        Ok(self)
    }

    /// Adds a channel. Without `y_cp_val` the values must be bound later or supplied
    /// as an input.
    /// # Errors
    /// Error is returned for a name already used by the component and for values that
    /// are not `(vec_size, m)`.
    pub fn add_spline(&mut self, y_cp_name: &str, y_interp_name: &str, y_cp_val: Option<DMatrix<f64>>) -> Result<()> {
        self.push_channel(y_cp_name, y_interp_name, None, y_cp_val)
    }

    /// [SplineComponent::add_spline] with a unit label for both the control point values
    /// and the interpolated values.
    pub fn add_spline_with_units(
        &mut self,
        y_cp_name: &str,
        y_interp_name: &str,
        y_cp_val: Option<DMatrix<f64>>,
        y_units: &str,
    ) -> Result<()> {
        self.push_channel(y_cp_name, y_interp_name, Some(y_units.to_string()), y_cp_val)
    }

    /// Sets the default values of a declared or bound channel.
    pub fn bind_spline(&mut self, y_cp_name: &str, y_cp_val: DMatrix<f64>) -> Result<()> {
        self.check_shape(y_cp_name, &y_cp_val)?;
        let channel = self
            .channels
            .iter_mut()
            .find(|c| c.y_cp_name == y_cp_name)
            .ok_or_else(|| InterpolationError::UnknownChannel(y_cp_name.to_string()))?;
        channel.state = ChannelState::Bound(y_cp_val);
        Ok(())
    }

    fn push_channel(
        &mut self,
        y_cp_name: &str,
        y_interp_name: &str,
        y_units: Option<String>,
        y_cp_val: Option<DMatrix<f64>>,
    ) -> Result<()> {
        for name in [y_cp_name, y_interp_name] {
            if self.is_name_taken(name) {
                return Err(InterpolationError::DuplicateName(name.to_string()));
            }
        }
        if y_cp_name == y_interp_name {
            return Err(InterpolationError::DuplicateName(y_cp_name.to_string()));
        }

        let state = match y_cp_val {
            Some(values) => {
                self.check_shape(y_cp_name, &values)?;
                ChannelState::Bound(values)
            }
            None => ChannelState::Declared,
        };

        debug!("channel {} -> {} ({})", y_cp_name, y_interp_name, state_label(&state));
        self.channels.push(Channel {
            y_cp_name: y_cp_name.to_string(),
            y_interp_name: y_interp_name.to_string(),
            y_units,
            state,
        });
        Ok(())
    }

    fn is_name_taken(&self, name: &str) -> bool {
        name == self.x_cp_name
            || name == self.x_interp_name
            || self.channels.iter().any(|c| c.y_cp_name == name || c.y_interp_name == name)
    }

    fn check_shape(&self, name: &str, values: &DMatrix<f64>) -> Result<()> {
        check_values_shape(name, values, self.vec_size, self.x_cp.len())
    }

    /// Interpolates every channel.
    ///
    /// Inputs named like `x_cp`, `x_interp` or a channel's `y_cp` override the values
    /// given at construction or binding.
    /// # Errors
    /// Error is returned for channels without values, inconsistent shapes, too few control
    /// points, non-finite values and a non-increasing `x_cp`. Nothing is evaluated then.
    pub fn evaluate(&self, inputs: &Inputs) -> Result<SplineOutputs> {
        let x_cp = inputs.vector(&self.x_cp_name).unwrap_or_else(|| self.x_cp.clone());
        let x_interp = inputs.vector(&self.x_interp_name).unwrap_or_else(|| self.x_interp.clone());
        check_finite(&self.x_interp_name, &x_interp)?;

        let mut sets = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let values = match (inputs.get(&channel.y_cp_name), &channel.state) {
                (Some(values), _) => values,
                (None, ChannelState::Bound(values)) => values,
                (None, ChannelState::Declared) => {
                    return Err(InterpolationError::UnboundChannel(channel.y_cp_name.clone()));
                }
            };
            check_values_shape(&channel.y_cp_name, values, self.vec_size, x_cp.len())?;
            sets.push(ControlPointSet::new(x_cp.clone(), values.clone())?);
        }

        debug!(
            "evaluating {} channel(s) of {} row(s) with {}",
            sets.len(),
            self.vec_size,
            self.interpolant.method()
        );
        let evaluations = evaluate_channels(&self.interpolant, &sets, &x_interp, self.x_cp_partials)?;

        let mut outputs = SplineOutputs::default();
        for (channel, evaluation) in self.channels.iter().zip(evaluations) {
            let of = channel.y_interp_name.clone();
            outputs.partials.insert((of.clone(), channel.y_cp_name.clone()), evaluation.d_y_cp);
            if let Some(d_x_cp) = evaluation.d_x_cp {
                outputs.partials.insert((of.clone(), self.x_cp_name.clone()), d_x_cp);
            }
            outputs.values.insert(of, evaluation.values);
        }
        Ok(outputs)
    }

    pub fn method(&self) -> Method {
        self.interpolant.method()
    }

    pub fn vec_size(&self) -> usize {
        self.vec_size
    }

    pub fn x_cp_name(&self) -> &str {
        &self.x_cp_name
    }

    pub fn x_interp_name(&self) -> &str {
        &self.x_interp_name
    }

    pub fn x_units(&self) -> Option<&str> {
        self.x_units.as_deref()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, y_cp_name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.y_cp_name == y_cp_name)
    }
}

fn state_label(state: &ChannelState) -> &'static str {
    match state {
        ChannelState::Declared => "declared",
        ChannelState::Bound(_) => "bound",
    }
}

fn check_values_shape(name: &str, values: &DMatrix<f64>, vec_size: usize, m: usize) -> Result<()> {
    if values.nrows() != vec_size {
        return Err(InterpolationError::RowCountMismatch {
            name: name.to_string(),
            expected: vec_size,
            actual: values.nrows(),
        });
    }
    if values.ncols() != m {
        return Err(InterpolationError::LengthMismatch { name: name.to_string(), expected: m, actual: values.ncols() });
    }
    Ok(())
}

/// One-shot interpolation of `y_cp` (`(vec_size, m)`) at `x_interp`.
///
/// Returns the `(vec_size, n)` values and their block diagonal partials with respect to
/// `y_cp`.
/// # Example
/// ```
/// use diffspline::{interp, InterpOptions};
/// use nalgebra::DMatrix;
/// use assert_approx_eq::assert_approx_eq;
///
/// let y_cp = DMatrix::from_row_slice(1, 4, &[0.0, 1.0, 2.0, 3.0]);
/// let (values, jacobian) = interp("akima", &[0.0, 1.0, 2.0, 3.0], &y_cp, &[0.5, 2.5], &InterpOptions::new()).unwrap();
///
/// assert_approx_eq!(0.5, values[(0, 0)]);
/// assert_approx_eq!(2.5, values[(0, 1)]);
/// assert_eq!((2, 4), jacobian.shape());
/// ```
pub fn interp(
    method: &str,
    x_cp: &[f64],
    y_cp: &DMatrix<f64>,
    x_interp: &[f64],
    options: &InterpOptions,
) -> Result<(DMatrix<f64>, BatchJacobian)> {
    let interpolant = Interpolant::new(method.parse::<Method>()?, options)?;
    check_finite(DEFAULT_X_INTERP_NAME, x_interp)?;
    let points = ControlPointSet::new(x_cp.to_vec(), y_cp.clone())?;

    let evaluation = evaluate_rows(&interpolant, &points, x_interp, false)?;
    Ok((evaluation.values, evaluation.d_y_cp))
}
