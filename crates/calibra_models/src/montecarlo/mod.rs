//! Monte-Carlo collaborator contracts and parametric covariance models.
//!
//! Path generation itself (factor decomposition, Brownian increments, Euler
//! stepping) lives outside this library; what calibration needs from it is
//! captured by two contracts:
//!
//! - [`MonteCarloSimulation`]: the read-only quantities a product values
//!   against (numeraire, path weights)
//! - [`SimulationFactory`]: builds a simulation from a covariance model, the
//!   one degree of freedom the Monte-Carlo calibration varies
//!
//! The parametric covariance models themselves are value objects
//! implementing [`Parametric`](calibra_core::traits::Parametric), so the
//! harness can rebind their parameters through the same clone-with-
//! parameters discipline as curves.

mod covariance;
mod simulation;

pub use covariance::{CovarianceModel, ExponentialDecayCorrelation, VolatilityScaledCovariance};
pub use simulation::{MonteCarloSimulation, SimulationFactory};
