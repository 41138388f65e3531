//! Validation helpers for configuration builders
//!
//! Builders collect field values fluently and check them all when `build()`
//! is called. The helpers here report the first offending field by name.
//!
//! # Example
//!
//! ```
//! use checkout_store::builder::{validate_positive, validate_range};
//!
//! assert!(validate_positive("mean_service_time", 5.0).is_ok());
//! assert!(validate_range("repair_probability", 1.5, 0.0, 1.0).is_err());
//! ```

use checkout_core::SimError;

/// Validation result for builder configuration
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors that can occur during builder validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field '{field}' must be {constraint}")]
    ConstraintViolation { field: String, constraint: String },
}

impl From<ValidationError> for SimError {
    fn from(err: ValidationError) -> Self {
        SimError::Configuration(err.to_string())
    }
}

/// Trait for validating builder configurations
///
/// Implement this trait on your configuration to add the checks `build()`
/// runs.
pub trait Validate {
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first invalid field.
    fn validate_fields(&self) -> ValidationResult<()>;
}

/// Helper for validating that a value lies in `[min, max]`
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> ValidationResult<()> {
    // Written so that NaN fails too.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: format!("between {min} and {max}"),
        })
    }
}

/// Helper for validating that a value is positive
pub fn validate_positive<T: PartialOrd + Default + std::fmt::Display>(
    field: &str,
    value: T,
) -> ValidationResult<()> {
    if value > T::default() {
        Ok(())
    } else {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: "positive".to_string(),
        })
    }
}

/// Helper for validating that a value is non-negative
pub fn validate_non_negative<T: PartialOrd + Default + std::fmt::Display>(
    field: &str,
    value: T,
) -> ValidationResult<()> {
    if value >= T::default() {
        Ok(())
    } else {
        Err(ValidationError::ConstraintViolation {
            field: field.to_string(),
            constraint: "non-negative".to_string(),
        })
    }
}

/// Helper for validating that a float is neither infinite nor NaN
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("{value} is not a finite number"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range() {
        assert!(validate_range("test", 5, 0, 10).is_ok());
        assert!(validate_range("test", 0, 0, 10).is_ok());
        assert!(validate_range("test", 10, 0, 10).is_ok());
        assert!(validate_range("test", -1, 0, 10).is_err());
        assert!(validate_range("test", 11, 0, 10).is_err());
        assert!(validate_range("test", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("test", 1).is_ok());
        assert!(validate_positive("test", 0).is_err());
        assert!(validate_positive("test", -1.5).is_err());
        assert!(validate_positive("test", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("test", 0.0).is_ok());
        assert!(validate_non_negative("test", 2.0).is_ok());
        assert!(validate_non_negative("test", -0.1).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("test", 1.0).is_ok());
        assert!(validate_finite("test", f64::INFINITY).is_err());
        assert!(validate_finite("test", f64::NAN).is_err());
    }

    #[test]
    fn test_error_converts_to_configuration() {
        let err = validate_positive("num_units", 0usize).unwrap_err();
        assert_eq!(err.to_string(), "Field 'num_units' must be positive");
        assert_eq!(
            SimError::from(err),
            SimError::Configuration("Field 'num_units' must be positive".to_string())
        );
    }
}
