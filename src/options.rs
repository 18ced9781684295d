use std::collections::BTreeMap;

use crate::error::{InterpolationError, Result};

/// Method specific options, option name to value.
///
/// Names are kept sorted so every validation message lists them in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpOptions {
    values: BTreeMap<String, f64>,
}

impl InterpOptions {
    pub fn new() -> Self {
        InterpOptions::default()
    }

    /// Builder style setter.
    /// # Example
    /// ```
    /// use diffspline::InterpOptions;
    ///
    /// let options = InterpOptions::new().set("delta_x", 0.1).set("eps", 1e-30);
    /// assert_eq!(Some(0.1), options.get("delta_x"));
    /// assert_eq!(None, options.get("order"));
    /// ```
    pub fn set(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rejects every option whose name is not in `recognized`, all of them in one error.
    pub fn check_recognized(&self, method: &str, recognized: &[&str]) -> Result<()> {
        let names: Vec<String> = self
            .names()
            .filter(|name| !recognized.contains(name))
            .map(|name| name.to_string())
            .collect();

        if names.is_empty() {
            Ok(())
        } else {
            Err(InterpolationError::UnsupportedOptions { method: method.to_string(), names })
        }
    }
}

impl<const N: usize> From<[(&str, f64); N]> for InterpOptions {
    fn from(entries: [(&str, f64); N]) -> Self {
        let mut options = InterpOptions::new();
        for (name, value) in entries {
            options.insert(name, value);
        }
        options
    }
}

pub(crate) fn invalid_option(name: &str, value: f64, reason: &str) -> InterpolationError {
    InterpolationError::InvalidOption {
        name: name.to_string(),
        value,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized() {
        let options = InterpOptions::from([("delta_x", 0.1), ("eps", 1e-30)]);
        assert!(options.check_recognized("akima", &["delta_x", "eps"]).is_ok());
    }

    #[test]
    fn test_unrecognized_all_listed_sorted() {
        let options = InterpOptions::new().set("eps", 1e-30).set("order", 4.0).set("delta_x", 0.1);
        let err = options.check_recognized("cubic", &[]).unwrap_err();

        assert_eq!(
            InterpolationError::UnsupportedOptions {
                method: "cubic".to_string(),
                names: vec!["delta_x".to_string(), "eps".to_string(), "order".to_string()]
            },
            err
        );
        assert_eq!(
            "cubic interpolator does not support ['delta_x', 'eps', 'order'] options.",
            err.to_string()
        );
    }

    #[test]
    fn test_partially_recognized() {
        let options = InterpOptions::from([("delta_x", 0.1), ("order", 3.0)]);
        let err = options.check_recognized("akima", &["delta_x", "eps"]).unwrap_err();
        assert_eq!("akima interpolator does not support ['order'] options.", err.to_string());
    }

    #[test]
    fn test_get_or() {
        let options = InterpOptions::new().set("order", 3.0);
        assert_eq!(3.0, options.get_or("order", 4.0));
        assert_eq!(1e-30, options.get_or("eps", 1e-30));
    }
}
