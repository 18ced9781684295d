use thiserror::Error;

pub type Result<T> = std::result::Result<T, InterpolationError>;

/// Errors raised while configuring or evaluating splines.
///
/// Configuration and shape errors are detected before any numeric work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("unsupported interpolation method '{0}'")]
    UnsupportedMethod(String),

    #[error("{method} interpolator does not support [{}] options.", quoted(.names))]
    UnsupportedOptions { method: String, names: Vec<String> },

    #[error("invalid value {value} for option '{name}': {reason}")]
    InvalidOption { name: String, value: f64, reason: String },

    #[error("{method} interpolator does not provide partials with respect to x_cp")]
    UnsupportedPartials { method: String },

    #[error("name '{0}' is already in use")]
    DuplicateName(String),

    #[error("no spline with control point input '{0}'")]
    UnknownChannel(String),

    #[error("no value bound for control point input '{0}'")]
    UnboundChannel(String),

    #[error("empty input array '{0}'")]
    EmptyInput(String),

    #[error("non-finite value in '{name}' at index {index}")]
    NonFinite { name: String, index: usize },

    #[error("x_cp must be strictly increasing (index {index})")]
    NonIncreasingX { index: usize },

    #[error("length mismatch for '{name}': expected {expected}, got {actual}")]
    LengthMismatch { name: String, expected: usize, actual: usize },

    #[error("expected {expected} rows for '{name}', got {actual}")]
    RowCountMismatch { name: String, expected: usize, actual: usize },

    #[error("{method} interpolator requires at least {required} control points, got {actual}")]
    InsufficientPoints { method: String, required: usize, actual: usize },

    #[error("numerical error: {0}")]
    NumericalError(String),
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_options_message() {
        let err = InterpolationError::UnsupportedOptions {
            method: "cubic".to_string(),
            names: vec!["delta_x".to_string(), "eps".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "cubic interpolator does not support ['delta_x', 'eps'] options."
        );
    }

    #[test]
    fn insufficient_points_message() {
        let err = InterpolationError::InsufficientPoints {
            method: "akima".to_string(),
            required: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "akima interpolator requires at least 4 control points, got 3"
        );
    }
}
