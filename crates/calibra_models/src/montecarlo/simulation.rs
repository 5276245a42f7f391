//! Simulation contracts.

use super::CovarianceModel;
use calibra_core::stochastic::RandomVariable;
use calibra_core::types::EvaluationError;

/// The read-only surface of a Monte-Carlo simulation that products value
/// against.
///
/// Implementations must be thread-safe: the calibration harness queries a
/// simulation concurrently from the Jacobian worker pool, and every query
/// returns a fresh [`RandomVariable`].
pub trait MonteCarloSimulation: Send + Sync {
    /// Number of simulated paths.
    fn number_of_paths(&self) -> usize;

    /// The numeraire at the given time.
    fn numeraire(&self, time: f64) -> Result<RandomVariable, EvaluationError>;

    /// The Monte-Carlo path probabilities at the given time.
    fn monte_carlo_weights(&self, time: f64) -> Result<RandomVariable, EvaluationError>;
}

/// Builds a simulation for a given covariance model.
///
/// This stands between the calibration harness and the out-of-scope path
/// generation machinery: a factory owns everything frozen during a
/// calibration (initial curve data, time grid, Brownian seed) and rebuilds
/// the simulation for each covariance trial the optimiser probes.
pub trait SimulationFactory<C: CovarianceModel>: Sync {
    /// Build a simulation driven by the given covariance model.
    fn simulation(&self, covariance: &C) -> Result<Box<dyn MonteCarloSimulation>, EvaluationError>;
}
