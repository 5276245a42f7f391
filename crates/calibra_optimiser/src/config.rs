//! Configuration for the Levenberg-Marquardt optimiser.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Levenberg-Marquardt optimiser.
///
/// Defaults follow the conventions of the calibration use cases: a tight
/// residual tolerance (calibration residuals are priced in model units and
/// targets are usually met almost exactly), symmetric λ adaptation factors,
/// and central finite differences with a relative step floored by an
/// absolute step.
///
/// # Fields
///
/// * `max_iterations` - Upper iteration bound before the run is reported as
///   exhausted
/// * `error_tolerance` - Convergence bound on the weighted error
///   `E = ½ Σ wᵢ (fᵢ − yᵢ)²`
/// * `step_tolerance` - Convergence bound `‖Δ‖∞ ≤ εₓ·(‖p‖∞ + εₓ)` on the
///   proposed step
/// * `gradient_tolerance` - Convergence bound on `‖JᵀW(y − f)‖∞`
/// * `initial_lambda` - Explicit initial damping; when `None`, λ₀ is set to
///   `1e-3 · maxᵢ (JᵀWJ)ᵢᵢ` after the first Jacobian
/// * `lambda_increase` / `lambda_decrease` - Damping adaptation factors on
///   rejected / accepted steps
/// * `step_relative` / `step_absolute` - Finite-difference perturbation
///   `hⱼ = max(|pⱼ|·rel, abs)`, recomputed each iteration
/// * `max_solve_attempts` - λ-escalations tolerated when the damped normal
///   matrix is not positive definite, before the run fails
/// * `threads` - Worker pool size for Jacobian columns; `None` selects
///   `min(max(available cores, 1), n_parameters)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LmConfig {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Convergence tolerance on the weighted error.
    pub error_tolerance: f64,
    /// Convergence tolerance on the step, relative to the parameter norm.
    pub step_tolerance: f64,
    /// Convergence tolerance on the gradient infinity norm.
    pub gradient_tolerance: f64,
    /// Initial damping factor; `None` derives it from the first Jacobian.
    pub initial_lambda: Option<f64>,
    /// Factor applied to λ when a step is rejected.
    pub lambda_increase: f64,
    /// Factor dividing λ when a step is accepted.
    pub lambda_decrease: f64,
    /// Relative finite-difference step.
    pub step_relative: f64,
    /// Absolute finite-difference step floor.
    pub step_absolute: f64,
    /// Maximum λ-escalations on a non-SPD normal matrix.
    pub max_solve_attempts: usize,
    /// Worker pool size; `None` selects it from the host and problem size.
    pub threads: Option<usize>,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            error_tolerance: 1e-12,
            step_tolerance: 1e-10,
            gradient_tolerance: 1e-12,
            initial_lambda: None,
            lambda_increase: 10.0,
            lambda_decrease: 10.0,
            step_relative: 1e-8,
            step_absolute: 1e-10,
            max_solve_attempts: 20,
            threads: None,
        }
    }
}

impl LmConfig {
    /// Create a configuration with the given iteration bound.
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Default::default()
        }
    }

    /// Set the error tolerance.
    pub fn error_tolerance(mut self, tolerance: f64) -> Self {
        self.error_tolerance = tolerance;
        self
    }

    /// Set an explicit initial damping factor.
    pub fn initial_lambda(mut self, lambda: f64) -> Self {
        self.initial_lambda = Some(lambda);
        self
    }

    /// Set the finite-difference steps.
    pub fn finite_difference_step(mut self, relative: f64, absolute: f64) -> Self {
        self.step_relative = relative;
        self.step_absolute = absolute;
        self
    }

    /// Set the worker pool size.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LmConfig::default();
        assert_eq!(config.max_iterations, 400);
        assert_eq!(config.error_tolerance, 1e-12);
        assert_eq!(config.lambda_increase, 10.0);
        assert_eq!(config.lambda_decrease, 10.0);
        assert_eq!(config.step_relative, 1e-8);
        assert_eq!(config.step_absolute, 1e-10);
        assert_eq!(config.max_solve_attempts, 20);
        assert!(config.initial_lambda.is_none());
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_builder_style() {
        let config = LmConfig::with_max_iterations(50)
            .error_tolerance(1e-8)
            .initial_lambda(0.1)
            .finite_difference_step(1e-6, 1e-9)
            .threads(2);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.error_tolerance, 1e-8);
        assert_eq!(config.initial_lambda, Some(0.1));
        assert_eq!(config.step_relative, 1e-6);
        assert_eq!(config.threads, Some(2));
    }
}
