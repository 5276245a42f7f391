//! Curve error types.

use calibra_core::types::EvaluationError;
use thiserror::Error;

/// Errors from curve construction and queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// A maturity outside the curve's domain was requested.
    #[error("invalid maturity: {t}")]
    InvalidMaturity {
        /// The offending maturity.
        t: f64,
    },

    /// An empty, reversed, or negative forward period was requested.
    #[error("invalid forward period: [{start}, {end}]")]
    InvalidPeriod {
        /// Period start.
        start: f64,
        /// Period end.
        end: f64,
    },

    /// Too few pillar points to build the curve.
    #[error("insufficient pillars: required {required}, provided {provided}")]
    InsufficientPillars {
        /// Minimum number of pillars required.
        required: usize,
        /// Number of pillars provided.
        provided: usize,
    },

    /// Pillar times are not strictly increasing, or pillar and rate counts
    /// disagree.
    #[error("invalid pillars: {0}")]
    InvalidPillars(String),
}

impl From<CurveError> for EvaluationError {
    fn from(error: CurveError) -> Self {
        EvaluationError::invalid_input(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CurveError::InvalidMaturity { t: -1.0 };
        assert_eq!(format!("{}", err), "invalid maturity: -1");
    }

    #[test]
    fn test_invalid_period_display() {
        let err = CurveError::InvalidPeriod {
            start: 2.0,
            end: 1.0,
        };
        assert_eq!(format!("{}", err), "invalid forward period: [2, 1]");
    }

    #[test]
    fn test_conversion_to_evaluation_error() {
        let err: EvaluationError = CurveError::InsufficientPillars {
            required: 1,
            provided: 0,
        }
        .into();
        assert!(matches!(err, EvaluationError::InvalidInput(_)));
    }
}
