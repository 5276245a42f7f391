//! Monte-Carlo products.

use crate::montecarlo::MonteCarloSimulation;
use calibra_core::stochastic::RandomVariable;
use calibra_core::types::EvaluationError;

/// A product valued pathwise against a Monte-Carlo simulation.
pub trait MonteCarloProduct {
    /// The value random variable of this product, observed at
    /// `evaluation_time`, under the given simulation.
    fn value(
        &self,
        evaluation_time: f64,
        simulation: &dyn MonteCarloSimulation,
    ) -> Result<RandomVariable, EvaluationError>;

    /// The expected value at time zero — what the calibration harness
    /// compares against market targets.
    fn expected_value(
        &self,
        simulation: &dyn MonteCarloSimulation,
    ) -> Result<f64, EvaluationError> {
        Ok(self.value(0.0, simulation)?.average())
    }
}

/// A zero coupon bond paying 1 at maturity, valued numeraire-relative.
///
/// The pathwise value at `evaluation_time` is
///
/// ```text
/// N(t_eval)/w(t_eval) · w(T)/N(T)
/// ```
///
/// where `N` is the numeraire and `w` the Monte-Carlo path probabilities,
/// so the time-zero expectation is the model-implied discount factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroCouponBond {
    maturity: f64,
}

impl ZeroCouponBond {
    /// Create a zero coupon bond with the given maturity.
    pub fn new(maturity: f64) -> Self {
        Self { maturity }
    }

    /// The bond maturity.
    pub fn maturity(&self) -> f64 {
        self.maturity
    }
}

impl MonteCarloProduct for ZeroCouponBond {
    fn value(
        &self,
        evaluation_time: f64,
        simulation: &dyn MonteCarloSimulation,
    ) -> Result<RandomVariable, EvaluationError> {
        let numeraire = simulation.numeraire(self.maturity)?;
        let weights = simulation.monte_carlo_weights(self.maturity)?;

        // Numeraire-relative payoff of 1 at maturity.
        let values = RandomVariable::deterministic(self.maturity, 1.0)
            .div(&numeraire)
            .mult(&weights);

        // Convert back to a value observed at evaluation time.
        let numeraire_at_evaluation = simulation.numeraire(evaluation_time)?;
        let weights_at_evaluation = simulation.monte_carlo_weights(evaluation_time)?;
        Ok(values
            .mult(&numeraire_at_evaluation)
            .div(&weights_at_evaluation))
    }
}
