//! Error types and validation functions for the simulation harness.
//!
//! Every fallible operation in the crate returns [`HarnessResult`]. Configuration
//! problems are detected up front by the validation helpers in this module;
//! numerical failures originate in the statistic evaluator and are propagated
//! unchanged through the replication loop and the sweeps.

use thiserror::Error;

/// Error taxonomy for simulation runs.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HarnessError {
    /// Invalid parameter value in a simulation or collaborator configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Unsupported deterministic-trend specification.
    #[error("Invalid detrend specification '{value}', expected \"c\" or \"ct\"")]
    InvalidDetrend {
        /// The rejected specification string
        value: String,
    },

    /// Too few observations or replications for the requested computation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required number of points
        required: usize,
        /// Number of points actually available
        actual: usize,
    },

    /// Degenerate numerical computation, e.g. a non-positive long-run variance.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed, when known
        operation: Option<String>,
    },
}

impl HarnessError {
    /// True for errors caused by the caller's configuration rather than by
    /// the numerics of a particular replication.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HarnessError::InvalidParameter { .. }
                | HarnessError::InvalidDetrend { .. }
                | HarnessError::InsufficientData { .. }
        )
    }

    /// True for numerical failures that a sentinel policy may absorb.
    pub fn is_numerical_error(&self) -> bool {
        matches!(self, HarnessError::NumericalError { .. })
    }

    pub(crate) fn numerical(operation: &str, reason: impl Into<String>) -> Self {
        HarnessError::NumericalError {
            reason: reason.into(),
            operation: Some(operation.to_string()),
        }
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Validates that a parameter is within `[min, max]`.
///
/// # Example
/// ```rust
/// use nearkpss_sim::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "nominal_power").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "nominal_power").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> HarnessResult<()> {
    if value.is_nan() {
        return Err(HarnessError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(HarnessError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(HarnessError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value lies strictly inside `(min, max)`.
pub fn validate_open_interval(value: f64, min: f64, max: f64, name: &str) -> HarnessResult<()> {
    if value.is_nan() || value <= min || value >= max {
        return Err(HarnessError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("({}, {})", min, max),
        });
    }
    Ok(())
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> HarnessResult<()> {
    if !value.is_finite() {
        Err(HarnessError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must be finite".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a count (replications, steps, simulations) is positive.
pub fn validate_positive_count(count: usize, name: &str) -> HarnessResult<()> {
    if count == 0 {
        return Err(HarnessError::InvalidParameter {
            parameter: name.to_string(),
            value: 0.0,
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validates that a series has at least `min_required` observations.
pub fn validate_data_length(data: &[f64], min_required: usize) -> HarnessResult<()> {
    if data.len() < min_required {
        Err(HarnessError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first offending value and names its index.
pub fn validate_all_finite(data: &[f64], name: &str) -> HarnessResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(HarnessError::NumericalError {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
            operation: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_parameter_range() {
        assert!(validate_parameter(0.0, 0.0, 1.0, "p").is_ok());
        assert!(validate_parameter(1.0, 0.0, 1.0, "p").is_ok());

        match validate_parameter(-0.5, 0.0, 1.0, "c") {
            Err(HarnessError::InvalidParameter {
                parameter,
                value,
                constraint,
            }) => {
                assert_eq!(parameter, "c");
                assert_eq!(value, -0.5);
                assert_eq!(constraint, "[0, 1]");
            }
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_parameter_nan() {
        assert!(matches!(
            validate_parameter(f64::NAN, 0.0, 1.0, "p"),
            Err(HarnessError::InvalidParameter { .. })
        ));
        assert!(matches!(
            validate_parameter(0.5, 1.0, 0.0, "p"),
            Err(HarnessError::NumericalError { operation: None, .. })
        ));
    }

    #[test]
    fn test_validate_open_interval() {
        assert!(validate_open_interval(0.5, 0.0, 1.0, "nominal").is_ok());
        assert!(validate_open_interval(0.0, 0.0, 1.0, "nominal").is_err());
        assert!(validate_open_interval(1.0, 0.0, 1.0, "nominal").is_err());
        assert!(validate_open_interval(f64::NAN, 0.0, 1.0, "nominal").is_err());
    }

    #[test]
    fn test_validate_positive_count() {
        assert!(validate_positive_count(1, "n_replications").is_ok());
        let err = validate_positive_count(0, "n_replications").unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("n_replications"));
    }

    #[test]
    fn test_validate_all_finite_reports_index() {
        assert!(validate_all_finite(&[1.0, 2.0], "y").is_ok());
        match validate_all_finite(&[1.0, 2.0, f64::INFINITY], "y") {
            Err(HarnessError::NumericalError { reason, .. }) => {
                assert!(reason.contains("index 2"));
            }
            other => panic!("Expected NumericalError, got {:?}", other),
        }
    }

    #[test]
    fn test_error_classification() {
        let numeric = HarnessError::numerical("long-run variance", "zero variance");
        assert!(numeric.is_numerical_error());
        assert!(!numeric.is_configuration_error());

        let detrend = HarnessError::InvalidDetrend {
            value: "t".to_string(),
        };
        assert!(detrend.is_configuration_error());
        assert!(detrend.to_string().contains("'t'"));
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = HarnessError::InsufficientData {
            required: 20,
            actual: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("20"));
        assert!(msg.contains("5"));
        assert!(validate_data_length(&[0.0; 5], 20).is_err());
    }
}
