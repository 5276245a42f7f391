//! Calibration harness for Monte-Carlo models.

use super::CalibrationError;
use crate::montecarlo::{CovarianceModel, SimulationFactory};
use crate::products::MonteCarloProduct;
use calibra_core::traits::Parametric;
use calibra_core::types::EvaluationError;
use calibra_optimiser::{CancellationToken, LevenbergMarquardt, LmConfig, TerminalState};
use tracing::debug;

/// The result of a successful covariance calibration.
#[derive(Debug, Clone)]
pub struct CalibratedCovariance<C> {
    /// The calibrated clone of the input covariance model.
    pub covariance: C,
    /// Iterations the optimiser required.
    pub iterations: usize,
    /// Weighted error at the calibrated parameters.
    pub error: f64,
}

/// Calibrates a parametric covariance model so that Monte-Carlo products
/// reprice their market targets.
///
/// For every trial parameter vector the harness rebinds the covariance
/// model, asks the [`SimulationFactory`] for a simulation driven by it, and
/// reduces each product's pathwise value to its time-zero expectation.
/// Unlike curve calibration, targets are externally supplied market values
/// and weights commonly differ per product.
///
/// Monte-Carlo residuals are expensive, so the default worker pool is
/// oversubscribed to `min(max(2·cores, 1), n_products)` threads; the
/// iteration budget defaults to 400.
pub struct CovarianceCalibrator {
    targets: Vec<f64>,
    weights: Option<Vec<f64>>,
    config: LmConfig,
    cancellation: Option<CancellationToken>,
}

impl CovarianceCalibrator {
    /// Create a calibrator for the given market target values.
    pub fn new(targets: Vec<f64>) -> Self {
        Self {
            targets,
            weights: None,
            config: LmConfig::default(),
            cancellation: None,
        }
    }

    /// Set per-product weights (default: all one).
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Replace the optimiser configuration.
    pub fn with_config(mut self, config: LmConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Produce a calibrated clone of the covariance model.
    ///
    /// A model exposing no parameters is returned unchanged with zero
    /// iterations.
    pub fn calibrated_clone<C, F>(
        &self,
        covariance: &C,
        factory: &F,
        products: &[Box<dyn MonteCarloProduct + Send + Sync>],
    ) -> Result<CalibratedCovariance<C>, CalibrationError>
    where
        C: CovarianceModel,
        F: SimulationFactory<C>,
    {
        let m = products.len();
        if self.targets.len() != m {
            return Err(CalibrationError::DimensionMismatch {
                what: "targets",
                expected: m,
                actual: self.targets.len(),
            });
        }

        let initial = covariance.parameters();

        let mut config = self.config;
        if config.threads.is_none() {
            let cores = std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1);
            config.threads = Some((2 * cores).max(1).min(m.max(1)));
        }

        debug!(
            parameters = initial.len(),
            products = m,
            threads = config.threads,
            "starting covariance calibration"
        );

        let residual = |p: &[f64], out: &mut [f64]| -> Result<(), EvaluationError> {
            let trial = covariance
                .with_parameters(p)
                .map_err(|e| EvaluationError::model_failure(e.to_string()))?;
            let simulation = factory.simulation(&trial)?;
            for (index, product) in products.iter().enumerate() {
                out[index] = product
                    .expected_value(simulation.as_ref())
                    .map_err(|e| e.at_product(index))?;
            }
            Ok(())
        };

        let mut optimiser = LevenbergMarquardt::new(self.targets.clone(), config);
        if let Some(weights) = &self.weights {
            optimiser = optimiser.with_weights(weights.clone());
        }
        if let Some(token) = &self.cancellation {
            optimiser = optimiser.with_cancellation(token.clone());
        }

        let fit = optimiser
            .run(&residual, initial)
            .map_err(CalibrationError::from_run_error)?;

        match fit.state {
            TerminalState::Converged => {
                let calibrated = covariance.with_parameters(&fit.parameters)?;
                debug!(
                    iterations = fit.iterations,
                    error = fit.error,
                    parameters = ?fit.parameters,
                    "covariance calibration converged"
                );
                Ok(CalibratedCovariance {
                    covariance: calibrated,
                    iterations: fit.iterations,
                    error: fit.error,
                })
            }
            TerminalState::Exhausted => Err(CalibrationError::NotConverged {
                iterations: fit.iterations,
                error: fit.error,
                parameters: fit.parameters,
            }),
            TerminalState::Cancelled => Err(CalibrationError::Cancelled {
                iterations: fit.iterations,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::montecarlo::{ExponentialDecayCorrelation, MonteCarloSimulation};
    use crate::products::ZeroCouponBond;
    use calibra_core::stochastic::RandomVariable;

    /// A stub world in which the short rate is a function of the front
    /// correlation: r = 0.1·ρ(0, 1). Analytic, deterministic, and cheap —
    /// the calibration plumbing is what is under test, not a pricer.
    struct CorrelationDrivenFactory;

    struct FlatRateSimulation {
        rate: f64,
        paths: usize,
    }

    impl MonteCarloSimulation for FlatRateSimulation {
        fn number_of_paths(&self) -> usize {
            self.paths
        }

        fn numeraire(&self, time: f64) -> Result<RandomVariable, EvaluationError> {
            Ok(RandomVariable::broadcast(
                time,
                self.paths,
                (self.rate * time).exp(),
            ))
        }

        fn monte_carlo_weights(&self, time: f64) -> Result<RandomVariable, EvaluationError> {
            Ok(RandomVariable::broadcast(
                time,
                self.paths,
                1.0 / self.paths as f64,
            ))
        }
    }

    impl SimulationFactory<ExponentialDecayCorrelation> for CorrelationDrivenFactory {
        fn simulation(
            &self,
            covariance: &ExponentialDecayCorrelation,
        ) -> Result<Box<dyn MonteCarloSimulation>, EvaluationError> {
            Ok(Box::new(FlatRateSimulation {
                rate: 0.1 * covariance.correlation(0, 1),
                paths: 16,
            }))
        }
    }

    fn bond_products(maturities: &[f64]) -> Vec<Box<dyn MonteCarloProduct + Send + Sync>> {
        maturities
            .iter()
            .map(|&t| Box::new(ZeroCouponBond::new(t)) as Box<dyn MonteCarloProduct + Send + Sync>)
            .collect()
    }

    fn target_prices(decay: f64, maturities: &[f64]) -> Vec<f64> {
        let rate = 0.1 * (-decay * 1.0f64).exp(); // tenor spacing is 1.0
        maturities.iter().map(|&t| (-rate * t).exp()).collect()
    }

    #[test]
    fn test_recovers_decay_parameter() {
        let maturities = [1.0, 2.0, 5.0];
        let products = bond_products(&maturities);
        let targets = target_prices(0.5, &maturities);

        let initial = ExponentialDecayCorrelation::new(vec![1.0, 2.0, 3.0], 1.5, true);
        let calibrated = CovarianceCalibrator::new(targets)
            .calibrated_clone(&initial, &CorrelationDrivenFactory, &products)
            .unwrap();

        assert!((calibrated.covariance.decay() - 0.5).abs() < 1e-4);
        assert!(calibrated.iterations > 0);
        // The input model keeps its decay (value semantics).
        assert_eq!(initial.decay(), 1.5);
    }

    #[test]
    fn test_uncalibratable_model_returned_unchanged() {
        let maturities = [1.0, 2.0];
        let products = bond_products(&maturities);
        let frozen = ExponentialDecayCorrelation::new(vec![1.0, 2.0], 0.3, false);

        let calibrated = CovarianceCalibrator::new(target_prices(0.9, &maturities))
            .calibrated_clone(&frozen, &CorrelationDrivenFactory, &products)
            .unwrap();

        assert_eq!(calibrated.iterations, 0);
        assert_eq!(calibrated.covariance, frozen);
    }

    #[test]
    fn test_weighted_calibration() {
        let maturities = [1.0, 4.0];
        let products = bond_products(&maturities);
        // Only the long bond's target is honest; the short one is off but
        // carries no weight.
        let mut targets = target_prices(0.5, &maturities);
        targets[0] += 0.05;

        let initial = ExponentialDecayCorrelation::new(vec![1.0, 2.0], 1.0, true);
        let calibrated = CovarianceCalibrator::new(targets)
            .with_weights(vec![0.0, 1.0])
            .calibrated_clone(&initial, &CorrelationDrivenFactory, &products)
            .unwrap();

        assert!((calibrated.covariance.decay() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_targets_dimension_mismatch() {
        let products = bond_products(&[1.0, 2.0]);
        let initial = ExponentialDecayCorrelation::new(vec![1.0, 2.0], 1.0, true);

        let result = CovarianceCalibrator::new(vec![0.9])
            .calibrated_clone(&initial, &CorrelationDrivenFactory, &products);
        assert!(matches!(
            result,
            Err(CalibrationError::DimensionMismatch { what: "targets", .. })
        ));
    }
}
