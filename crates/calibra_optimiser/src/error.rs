//! Optimiser error types.
//!
//! Hard failures are returned as [`OptimiserError`]; soft terminations
//! (exhausted iteration budget, cooperative cancellation) are *not* errors
//! at this level — they come back as a [`Fit`](crate::Fit) whose
//! [`TerminalState`](crate::TerminalState) says what happened, carrying the
//! best parameters found, so the caller may decide to accept them.

use calibra_core::types::EvaluationError;
use thiserror::Error;

/// Hard failures of a Levenberg-Marquardt run.
#[derive(Debug, Error)]
pub enum OptimiserError {
    /// Target, weight, or residual vector lengths are inconsistent.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which vector was inconsistent.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Invalid configuration or input values (e.g. negative weights).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The residual callback failed.
    #[error("residual evaluation failed: {source}")]
    Evaluation {
        /// The underlying evaluation failure.
        #[source]
        source: EvaluationError,
    },

    /// The damped normal matrix stayed non-positive-definite through every
    /// λ-escalation.
    #[error("normal matrix is singular (λ escalated to {lambda:.3e} over {attempts} attempts)")]
    SingularSystem {
        /// The damping value after the final attempt.
        lambda: f64,
        /// Number of solve attempts made.
        attempts: usize,
    },

    /// NaN or infinity appeared in residuals or parameters.
    #[error("non-finite value encountered at iteration {iteration}")]
    NumericalFault {
        /// Iteration at which the fault was detected.
        iteration: usize,
    },

    /// The worker pool for parallel Jacobian evaluation could not be built.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

impl OptimiserError {
    /// Whether this failure might be recoverable with different settings
    /// (starting point, damping, perturbation size).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OptimiserError::SingularSystem { .. } | OptimiserError::NumericalFault { .. }
        )
    }
}

impl From<EvaluationError> for OptimiserError {
    fn from(source: EvaluationError) -> Self {
        OptimiserError::Evaluation { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = OptimiserError::DimensionMismatch {
            what: "weights",
            expected: 3,
            actual: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("weights"));
        assert!(msg.contains("expected 3"));
    }

    #[test]
    fn test_from_evaluation_error() {
        let err: OptimiserError = EvaluationError::model_failure("boom").into();
        assert!(matches!(err, OptimiserError::Evaluation { .. }));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(OptimiserError::SingularSystem {
            lambda: 1.0,
            attempts: 20
        }
        .is_recoverable());
        assert!(OptimiserError::NumericalFault { iteration: 3 }.is_recoverable());
        assert!(!OptimiserError::InvalidInput("x".into()).is_recoverable());
    }
}
