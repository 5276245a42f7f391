//! Calibration error types.

use calibra_core::types::{EvaluationError, ParameterError};
use calibra_optimiser::OptimiserError;
use thiserror::Error;

/// Errors surfaced by the calibration harness.
///
/// A calibration that merely ran out of iterations is reported as
/// [`NotConverged`](CalibrationError::NotConverged) carrying the best
/// parameters found, so the caller may still accept them; everything else
/// is a hard failure.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Parameter, target, or weight vector lengths are inconsistent.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which vector was inconsistent.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// An aggregation over no sub-objects was requested.
    #[error("cannot aggregate an empty set of sub-objects")]
    EmptyAggregation,

    /// Two aggregated sub-objects share an id.
    #[error("duplicate sub-object id '{id}' in aggregation")]
    DuplicateId {
        /// The shared id.
        id: String,
    },

    /// A product failed to evaluate under a trial model.
    #[error("product {index} failed to evaluate: {source}")]
    Evaluation {
        /// Index of the offending product.
        index: usize,
        /// The underlying failure.
        #[source]
        source: EvaluationError,
    },

    /// The model cannot rebind the named sub-object.
    #[error("model cannot rebind sub-object '{id}'")]
    CloneNotSupported {
        /// The sub-object id that could not be rebound.
        id: String,
    },

    /// The optimiser exhausted its iteration budget. Carries the best
    /// parameters found so the caller may accept them regardless.
    #[error("calibration did not converge within {iterations} iterations (error {error:.3e})")]
    NotConverged {
        /// Iterations performed.
        iterations: usize,
        /// Weighted error at the best parameters.
        error: f64,
        /// Best parameters found.
        parameters: Vec<f64>,
    },

    /// The run was cancelled cooperatively.
    #[error("calibration was cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations performed before cancellation.
        iterations: usize,
    },

    /// A parameter slice could not be read or rebound.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// A hard optimiser failure (singular system, numerical fault, ...).
    #[error(transparent)]
    Optimiser(#[from] OptimiserError),
}

impl CalibrationError {
    /// The best parameters of a soft non-convergence failure, if any.
    pub fn best_parameters(&self) -> Option<&[f64]> {
        match self {
            CalibrationError::NotConverged { parameters, .. } => Some(parameters),
            _ => None,
        }
    }

    /// Map a hard optimiser failure, unwrapping the product index the
    /// harness attached to evaluation failures.
    pub(crate) fn from_run_error(error: OptimiserError) -> Self {
        match error {
            OptimiserError::Evaluation {
                source: EvaluationError::Product { index, source },
            } => CalibrationError::Evaluation {
                index,
                source: *source,
            },
            other => CalibrationError::Optimiser(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_converged_carries_parameters() {
        let err = CalibrationError::NotConverged {
            iterations: 400,
            error: 1e-3,
            parameters: vec![1.0, 2.0],
        };
        assert_eq!(err.best_parameters(), Some(&[1.0, 2.0][..]));
        assert!(format!("{}", err).contains("400"));
    }

    #[test]
    fn test_other_errors_have_no_parameters() {
        assert!(CalibrationError::EmptyAggregation.best_parameters().is_none());
    }

    #[test]
    fn test_from_run_error_unwraps_product_index() {
        let inner = EvaluationError::model_failure("bad curve").at_product(2);
        let err =
            CalibrationError::from_run_error(OptimiserError::Evaluation { source: inner });
        assert!(matches!(err, CalibrationError::Evaluation { index: 2, .. }));
    }

    #[test]
    fn test_from_run_error_passes_through_other_failures() {
        let err = CalibrationError::from_run_error(OptimiserError::NumericalFault {
            iteration: 7,
        });
        assert!(matches!(err, CalibrationError::Optimiser(_)));
    }
}
