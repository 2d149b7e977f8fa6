//! # Validation Errors
//!
//! Structured validation errors for domain primitives, built with
//! `thiserror`. Each variant carries the offending input so that callers
//! can report it without guesswork.

use thiserror::Error;

/// Validation failures for domain primitives and request payloads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Latitude outside [-90, 90].
    #[error("latitude {0} out of range (expected -90..=90)")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180].
    #[error("longitude {0} out of range (expected -180..=180)")]
    LongitudeOutOfRange(f64),

    /// A numeric quantity was negative, zero where positive is required, or not finite.
    #[error("{field} must be {expectation}, got {value}")]
    InvalidQuantity {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable constraint, e.g. "greater than zero".
        expectation: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A date range ends before it starts.
    #[error("{end_field} must not be before {start_field}")]
    InvertedRange {
        /// Field holding the start of the range.
        start_field: &'static str,
        /// Field holding the end of the range.
        end_field: &'static str,
    },

    /// Free-form constraint violation.
    #[error("{0}")]
    Constraint(String),
}

impl ValidationError {
    /// Require `value > 0` and finite.
    pub fn require_positive(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidQuantity {
                field,
                expectation: "greater than zero",
                value,
            })
        }
    }

    /// Require `value >= 0` and finite.
    pub fn require_non_negative(field: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidQuantity {
                field,
                expectation: "zero or greater",
                value,
            })
        }
    }

    /// Require a non-blank string.
    pub fn require_text(field: &'static str, value: &str) -> Result<(), Self> {
        if value.trim().is_empty() {
            Err(Self::EmptyField { field })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(ValidationError::require_positive("weight_kg", 0.0).is_err());
        assert!(ValidationError::require_positive("weight_kg", f64::NAN).is_err());
        assert!(ValidationError::require_positive("weight_kg", 0.5).is_ok());
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(ValidationError::require_non_negative("value", 0.0).is_ok());
        assert!(ValidationError::require_non_negative("value", -1.0).is_err());
    }

    #[test]
    fn messages_name_the_field() {
        let err = ValidationError::require_text("city", "  ").unwrap_err();
        assert_eq!(err.to_string(), "city must not be empty");
    }
}
