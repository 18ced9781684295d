use nalgebra::DMatrix;

use crate::error::{InterpolationError, Result};

/// Snapshot of the control points of one interpolation problem.
///
/// - `x_cp` - strictly increasing control point locations, shared by every row,
/// - `y_cp` - control point values, one row per independent problem (`vec_size` rows),
///   every row has `x_cp.len()` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointSet {
    x_cp: Vec<f64>,
    y_cp: DMatrix<f64>,
}

impl ControlPointSet {
    /// Creates a set with a batch of `y_cp` rows.
    /// # Example
    /// ```
    /// use diffspline::ControlPointSet;
    /// use nalgebra::DMatrix;
    ///
    /// let y_cp = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let points = ControlPointSet::new(vec![0.0, 1.0, 2.0], y_cp).unwrap();
    /// assert_eq!(points.vec_size(), 2);
    /// assert_eq!(points.row(1), vec![4.0, 5.0, 6.0]);
    /// ```
    /// # Errors
    /// Error is returned when arrays are empty or non-finite, `x_cp` is not strictly
    /// increasing or the rows of `y_cp` do not have `x_cp.len()` values.
    /// ```
    /// use diffspline::ControlPointSet;
    /// use nalgebra::DMatrix;
    ///
    /// let y_cp = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
    /// assert!(ControlPointSet::new(vec![0.0, 2.0, 1.0], y_cp).is_err());
    /// ```
    pub fn new(x_cp: Vec<f64>, y_cp: DMatrix<f64>) -> Result<Self> {
        check_finite("x_cp", &x_cp)?;
        check_increasing(&x_cp)?;

        if y_cp.nrows() == 0 || y_cp.ncols() == 0 {
            return Err(InterpolationError::EmptyInput("y_cp".to_string()));
        }
        if y_cp.ncols() != x_cp.len() {
            return Err(InterpolationError::LengthMismatch {
                name: "y_cp".to_string(),
                expected: x_cp.len(),
                actual: y_cp.ncols(),
            });
        }
        if let Some(index) = y_cp.iter().position(|v| !v.is_finite()) {
            return Err(InterpolationError::NonFinite { name: "y_cp".to_string(), index });
        }

        Ok(ControlPointSet { x_cp, y_cp })
    }

    /// Creates a set holding a single row of values.
    pub fn single(x_cp: Vec<f64>, y_cp: &[f64]) -> Result<Self> {
        Self::new(x_cp, DMatrix::from_row_slice(1, y_cp.len(), y_cp))
    }

    pub fn x_cp(&self) -> &[f64] {
        &self.x_cp
    }

    pub fn y_cp(&self) -> &DMatrix<f64> {
        &self.y_cp
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.x_cp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_cp.is_empty()
    }

    /// Number of independent `y_cp` rows.
    pub fn vec_size(&self) -> usize {
        self.y_cp.nrows()
    }

    pub fn row(&self, k: usize) -> Vec<f64> {
        self.y_cp.row(k).iter().copied().collect()
    }
}

pub(crate) fn check_finite(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(InterpolationError::EmptyInput(name.to_string()));
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(InterpolationError::NonFinite { name: name.to_string(), index });
    }
    Ok(())
}

pub(crate) fn check_increasing(x_cp: &[f64]) -> Result<()> {
    match x_cp.windows(2).position(|w| w[1] <= w[0]) {
        Some(index) => Err(InterpolationError::NonIncreasingX { index: index + 1 }),
        None => Ok(()),
    }
}

/// Index of the segment used for `x`: the last control point `<= x`, clamped so that
/// points left of the first or right of the last control point use the boundary segments.
pub(crate) fn segment_index(x_cp: &[f64], x: f64) -> usize {
    let mut min = 0;
    let mut max = x_cp.len() - 1;

    while max - min > 1 {
        let mid = (min + max) / 2;
        if x < x_cp[mid] {
            max = mid;
        } else {
            min = mid;
        }
    }
    min
}

/// Segment lookup for a whole query grid. Sorted grids mostly hit the previous segment or
/// its right neighbour, so the previous index is tried before bisecting.
pub(crate) fn segment_indices(x_cp: &[f64], x_interp: &[f64]) -> Vec<usize> {
    let last = x_cp.len() - 2;
    let mut indices = Vec::with_capacity(x_interp.len());
    let mut hint = 0;

    for &x in x_interp {
        hint = if is_in_segment(x_cp, hint, x) {
            hint
        } else if hint < last && is_in_segment(x_cp, hint + 1, x) {
            hint + 1
        } else {
            segment_index(x_cp, x)
        };
        indices.push(hint);
    }
    indices
}

fn is_in_segment(x_cp: &[f64], index: usize, x: f64) -> bool {
    let last = x_cp.len() - 2;
    let above_left = index == 0 || x_cp[index] <= x;
    let below_right = if index == last { true } else { x < x_cp[index + 1] };
    above_left && below_right
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let y_cp = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let points = ControlPointSet::new(vec![0.0, 1.0, 2.5], y_cp).unwrap();

        assert_eq!(3, points.len());
        assert_eq!(2, points.vec_size());
        assert_eq!(vec![1.0, 2.0, 3.0], points.row(0));
        assert_eq!(vec![4.0, 5.0, 6.0], points.row(1));
        assert_eq!(&[0.0, 1.0, 2.5], points.x_cp());
    }

    #[test]
    fn test_single() {
        let points = ControlPointSet::single(vec![0.0, 1.0], &[3.0, 4.0]).unwrap();
        assert_eq!(1, points.vec_size());
        assert_eq!(vec![3.0, 4.0], points.row(0));
    }

    #[test]
    fn test_equal_x_values() {
        let result = ControlPointSet::single(vec![0.0, 0.0, 1.0], &[2.0, 1.0, 4.0]);
        assert_eq!(Err(InterpolationError::NonIncreasingX { index: 1 }), result);
    }

    #[test]
    fn test_decreasing_x_values() {
        let result = ControlPointSet::single(vec![0.0, 1.0, 3.0, 2.0], &[2.0, 1.0, 4.0, 0.0]);
        assert_eq!(Err(InterpolationError::NonIncreasingX { index: 3 }), result);
    }

    #[test]
    fn test_length_mismatch() {
        let result = ControlPointSet::single(vec![0.0, 1.0, 2.0], &[2.0, 1.0]);
        assert_eq!(
            Err(InterpolationError::LengthMismatch { name: "y_cp".to_string(), expected: 3, actual: 2 }),
            result
        );
    }

    #[test]
    fn test_empty() {
        let result = ControlPointSet::single(vec![], &[]);
        assert_eq!(Err(InterpolationError::EmptyInput("x_cp".to_string())), result);
    }

    #[test]
    fn test_non_finite() {
        let result = ControlPointSet::single(vec![0.0, 1.0, 2.0], &[2.0, f64::NAN, 1.0]);
        assert_eq!(Err(InterpolationError::NonFinite { name: "y_cp".to_string(), index: 1 }), result);
    }

    #[test]
    fn test_segment_index() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];

        assert_eq!(0, segment_index(&x_cp, -3.0));
        assert_eq!(0, segment_index(&x_cp, 1.0));
        assert_eq!(0, segment_index(&x_cp, 1.5));
        assert_eq!(1, segment_index(&x_cp, 2.0));
        assert_eq!(2, segment_index(&x_cp, 5.9));
        assert_eq!(4, segment_index(&x_cp, 10.0));
        assert_eq!(4, segment_index(&x_cp, 12.0));
        assert_eq!(4, segment_index(&x_cp, 40.0));
    }

    #[test]
    fn test_segment_indices_match_bisection() {
        let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
        let x_interp = [0.0, 1.0, 1.5, 2.0, 2.2, 5.0, 4.0, 11.0, 12.0, 13.0, 1.2, 6.0];

        let indices = segment_indices(&x_cp, &x_interp);
        let expected: Vec<usize> = x_interp.iter().map(|x| segment_index(&x_cp, *x)).collect();
        assert_eq!(expected, indices);
    }
}
