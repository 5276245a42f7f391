//! Calibration harness for analytic curve models.

use super::{CalibrationError, ParameterAggregation};
use crate::model::CurveModel;
use crate::products::CurveProduct;
use calibra_core::types::EvaluationError;
use calibra_optimiser::{CancellationToken, LevenbergMarquardt, LmConfig, TerminalState};
use tracing::debug;

/// The result of a successful curve calibration.
#[derive(Debug, Clone)]
pub struct CalibratedModel {
    /// The calibrated clone of the input model.
    pub model: CurveModel,
    /// Iterations the optimiser required.
    pub iterations: usize,
    /// Weighted error at the calibrated parameters.
    pub error: f64,
}

/// Calibrates selected curves of a [`CurveModel`] to a basket of products.
///
/// The model and its curves are treated as immutable: for every trial
/// parameter vector the harness asks the model for a clone carrying the
/// rebound curves, values every product against the clone, and hands the
/// deviations from the targets to the Levenberg-Marquardt optimiser.
/// Targets default to zero (products are quoted model-minus-market) and
/// weights to one.
///
/// # Example
///
/// ```
/// use calibra_models::calibration::CurveCalibrator;
/// use calibra_models::curves::{CurveKind, FlatCurve};
/// use calibra_models::model::CurveModel;
/// use calibra_models::products::{CurveProduct, DiscountFactorProduct};
///
/// let model = CurveModel::new()
///     .with_curve(CurveKind::Flat(FlatCurve::new("ois", 0.01)));
/// let products: Vec<Box<dyn CurveProduct + Send + Sync>> = vec![Box::new(
///     DiscountFactorProduct::new("ois", 1.0, (-0.02f64).exp()),
/// )];
///
/// let calibrated = CurveCalibrator::new(products)
///     .calibrate(&model, &["ois"])
///     .unwrap();
/// assert!(calibrated.error <= 1e-12);
/// ```
pub struct CurveCalibrator {
    products: Vec<Box<dyn CurveProduct + Send + Sync>>,
    targets: Option<Vec<f64>>,
    weights: Option<Vec<f64>>,
    config: LmConfig,
    cancellation: Option<CancellationToken>,
}

impl CurveCalibrator {
    /// Create a calibrator for the given product basket.
    ///
    /// Curve calibrations default to a large iteration budget; analytic
    /// residuals are cheap and the curve problems are usually solved in a
    /// handful of iterations anyway.
    pub fn new(products: Vec<Box<dyn CurveProduct + Send + Sync>>) -> Self {
        Self {
            products,
            targets: None,
            weights: None,
            config: LmConfig::with_max_iterations(10_000),
            cancellation: None,
        }
    }

    /// Set explicit target values (default: all zero).
    pub fn with_targets(mut self, targets: Vec<f64>) -> Self {
        self.targets = Some(targets);
        self
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

    /// Calibrate the named curves of the model to the product basket.
    ///
    /// Returns a calibrated clone of the model; the input model is left
    /// untouched. A run that exhausts its iteration budget comes back as
    /// [`CalibrationError::NotConverged`] carrying the best parameters.
    pub fn calibrate(
        &self,
        model: &CurveModel,
        curve_ids: &[&str],
    ) -> Result<CalibratedModel, CalibrationError> {
        let mut curves = Vec::with_capacity(curve_ids.len());
        for &id in curve_ids {
            let curve = model
                .curve(id)
                .cloned()
                .ok_or_else(|| CalibrationError::CloneNotSupported { id: id.to_string() })?;
            curves.push(curve);
        }
        let aggregation = ParameterAggregation::new(curves)?;
        let initial = aggregation.parameter();

        let m = self.products.len();
        let targets = self.targets.clone().unwrap_or_else(|| vec![0.0; m]);
        if targets.len() != m {
            return Err(CalibrationError::DimensionMismatch {
                what: "targets",
                expected: m,
                actual: targets.len(),
            });
        }

        debug!(
            curves = curve_ids.len(),
            parameters = initial.len(),
            products = m,
            "starting curve calibration"
        );

        let residual = |p: &[f64], out: &mut [f64]| -> Result<(), EvaluationError> {
            let slices = aggregation
                .split(p)
                .map_err(|e| EvaluationError::invalid_input(e.to_string()))?;
            let trial = model
                .clone_with_parameters(&slices)
                .map_err(|e| EvaluationError::model_failure(e.to_string()))?;
            for (index, product) in self.products.iter().enumerate() {
                out[index] = product.value(&trial).map_err(|e| e.at_product(index))?;
            }
            Ok(())
        };

        let mut optimiser = LevenbergMarquardt::new(targets, self.config);
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
                let slices = aggregation.split(&fit.parameters)?;
                let calibrated = model.clone_with_parameters(&slices)?;
                debug!(
                    iterations = fit.iterations,
                    error = fit.error,
                    "curve calibration converged"
                );
                Ok(CalibratedModel {
                    model: calibrated,
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
