//! Parametric covariance models.

use calibra_core::traits::Parametric;
use calibra_core::types::ParameterError;

/// A parametric instantaneous covariance structure over tenor components.
///
/// The parameter vector may be empty, which marks the model as not
/// calibratable; the Monte-Carlo calibration then returns it unchanged.
pub trait CovarianceModel: Parametric + Clone + Send + Sync {
    /// Number of tenor components the model covers.
    fn number_of_components(&self) -> usize;

    /// Instantaneous covariance between components `i` and `j` at the given
    /// time.
    fn covariance(&self, time: f64, i: usize, j: usize) -> f64;
}

/// Exponentially decaying instantaneous correlation on a tenor grid:
/// `ρ(i, j) = exp(-a·|tᵢ - tⱼ|)`.
///
/// The single free parameter is the decay `a`. Rebinding it rebuilds the
/// correlation matrix; a non-calibratable instance exposes no parameters
/// and refuses rebinding.
///
/// # Example
///
/// ```
/// use calibra_models::montecarlo::{CovarianceModel, ExponentialDecayCorrelation};
///
/// let correlation = ExponentialDecayCorrelation::new(vec![0.5, 1.0, 2.0], 0.1, true);
/// assert_eq!(correlation.covariance(0.0, 1, 1), 1.0);
/// assert!((correlation.covariance(0.0, 0, 2) - (-0.15f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialDecayCorrelation {
    tenors: Vec<f64>,
    decay: f64,
    calibratable: bool,
    correlation: Vec<Vec<f64>>,
}

impl ExponentialDecayCorrelation {
    /// Create the correlation model on the given tenor grid.
    pub fn new(tenors: Vec<f64>, decay: f64, calibratable: bool) -> Self {
        let correlation = Self::build_matrix(&tenors, decay);
        Self {
            tenors,
            decay,
            calibratable,
            correlation,
        }
    }

    /// The decay parameter `a`.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// The tenor grid.
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// The correlation between components `i` and `j`.
    pub fn correlation(&self, i: usize, j: usize) -> f64 {
        self.correlation[i][j]
    }

    fn build_matrix(tenors: &[f64], decay: f64) -> Vec<Vec<f64>> {
        tenors
            .iter()
            .map(|&ti| {
                tenors
                    .iter()
                    .map(|&tj| (-decay * (ti - tj).abs()).exp())
                    .collect()
            })
            .collect()
    }
}

impl Parametric for ExponentialDecayCorrelation {
    fn id(&self) -> &str {
        "correlation.exponential-decay"
    }

    fn parameters(&self) -> Vec<f64> {
        if self.calibratable {
            vec![self.decay]
        } else {
            Vec::new()
        }
    }

    fn with_parameters(&self, parameters: &[f64]) -> Result<Self, ParameterError> {
        if !self.calibratable {
            if parameters.is_empty() {
                return Ok(self.clone());
            }
            return Err(ParameterError::not_calibratable(self.id()));
        }
        if parameters.len() != 1 {
            return Err(ParameterError::width_mismatch(self.id(), 1, parameters.len()));
        }
        Ok(Self::new(self.tenors.clone(), parameters[0], true))
    }
}

impl CovarianceModel for ExponentialDecayCorrelation {
    fn number_of_components(&self) -> usize {
        self.tenors.len()
    }

    fn covariance(&self, _time: f64, i: usize, j: usize) -> f64 {
        self.correlation[i][j]
    }
}

/// A correlation model scaled by a homogeneous volatility:
/// `cov(i, j) = σ²·ρ(i, j)`.
///
/// Free parameters are `[σ, a]`, demonstrating how composed models
/// concatenate their slices.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityScaledCovariance {
    volatility: f64,
    correlation: ExponentialDecayCorrelation,
}

impl VolatilityScaledCovariance {
    /// Create a covariance model from a volatility and a correlation model.
    pub fn new(volatility: f64, correlation: ExponentialDecayCorrelation) -> Self {
        Self {
            volatility,
            correlation,
        }
    }

    /// The homogeneous volatility σ.
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// The underlying correlation model.
    pub fn correlation_model(&self) -> &ExponentialDecayCorrelation {
        &self.correlation
    }
}

impl Parametric for VolatilityScaledCovariance {
    fn id(&self) -> &str {
        "covariance.volatility-scaled"
    }

    fn parameters(&self) -> Vec<f64> {
        let mut parameters = vec![self.volatility];
        parameters.extend(self.correlation.parameters());
        parameters
    }

    fn with_parameters(&self, parameters: &[f64]) -> Result<Self, ParameterError> {
        let expected = 1 + self.correlation.parameters().len();
        if parameters.len() != expected {
            return Err(ParameterError::width_mismatch(
                self.id(),
                expected,
                parameters.len(),
            ));
        }
        Ok(Self {
            volatility: parameters[0],
            correlation: self.correlation.with_parameters(&parameters[1..])?,
        })
    }
}

impl CovarianceModel for VolatilityScaledCovariance {
    fn number_of_components(&self) -> usize {
        self.correlation.number_of_components()
    }

    fn covariance(&self, time: f64, i: usize, j: usize) -> f64 {
        self.volatility * self.volatility * self.correlation.covariance(time, i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlation() -> ExponentialDecayCorrelation {
        ExponentialDecayCorrelation::new(vec![0.5, 1.0, 2.0], 0.2, true)
    }

    // ========================================
    // Exponential Decay Correlation
    // ========================================

    #[test]
    fn test_unit_diagonal() {
        let model = correlation();
        for i in 0..3 {
            assert_eq!(model.correlation(i, i), 1.0);
        }
    }

    #[test]
    fn test_symmetric_and_decaying() {
        let model = correlation();
        assert_eq!(model.correlation(0, 2), model.correlation(2, 0));
        assert!(model.correlation(0, 1) > model.correlation(0, 2));
        assert!((model.correlation(0, 1) - (-0.2f64 * 0.5).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_rebinding_rebuilds_matrix() {
        let model = correlation();
        let rebound = model.with_parameters(&[0.5]).unwrap();

        assert_eq!(rebound.decay(), 0.5);
        assert!((rebound.correlation(0, 2) - (-0.5f64 * 1.5).exp()).abs() < 1e-15);
        // The original keeps its matrix (value semantics).
        assert_eq!(model.decay(), 0.2);
    }

    #[test]
    fn test_not_calibratable_exposes_nothing() {
        let frozen = ExponentialDecayCorrelation::new(vec![1.0, 2.0], 0.1, false);
        assert!(frozen.parameters().is_empty());
        assert!(frozen.with_parameters(&[]).is_ok());
        assert!(matches!(
            frozen.with_parameters(&[0.3]),
            Err(ParameterError::NotCalibratable { .. })
        ));
    }

    // ========================================
    // Volatility Scaled Covariance
    // ========================================

    #[test]
    fn test_scaled_covariance() {
        let covariance = VolatilityScaledCovariance::new(0.3, correlation());
        assert!((covariance.covariance(0.0, 1, 1) - 0.09).abs() < 1e-15);
        assert_eq!(covariance.number_of_components(), 3);
    }

    #[test]
    fn test_composed_parameters_concatenate() {
        let covariance = VolatilityScaledCovariance::new(0.3, correlation());
        assert_eq!(covariance.parameters(), vec![0.3, 0.2]);

        let rebound = covariance.with_parameters(&[0.4, 0.1]).unwrap();
        assert_eq!(rebound.volatility(), 0.4);
        assert_eq!(rebound.correlation_model().decay(), 0.1);
    }

    #[test]
    fn test_composed_with_frozen_correlation() {
        let frozen = ExponentialDecayCorrelation::new(vec![1.0, 2.0], 0.1, false);
        let covariance = VolatilityScaledCovariance::new(0.3, frozen);
        // Only the volatility remains free.
        assert_eq!(covariance.parameters(), vec![0.3]);
        let rebound = covariance.with_parameters(&[0.5]).unwrap();
        assert_eq!(rebound.volatility(), 0.5);
        assert_eq!(rebound.correlation_model().decay(), 0.1);
    }
}
