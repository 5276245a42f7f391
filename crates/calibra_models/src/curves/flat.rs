//! Flat discount curve.

use super::{CurveError, DiscountCurve};
use calibra_core::traits::Parametric;
use calibra_core::types::ParameterError;
use num_traits::Float;

/// A flat curve with a single continuously compounded rate.
///
/// The simplest calibratable curve: its one free parameter is the rate.
///
/// # Example
///
/// ```
/// use calibra_models::curves::{DiscountCurve, FlatCurve};
///
/// let curve = FlatCurve::new("ois", 0.05_f64);
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCurve<T: Float> {
    name: String,
    rate: T,
}

impl<T: Float> FlatCurve<T> {
    /// Create a flat curve with the given name and rate.
    pub fn new(name: impl Into<String>, rate: T) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }

    /// The curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flat rate.
    pub fn rate(&self) -> T {
        self.rate
    }
}

impl<T: Float> DiscountCurve<T> for FlatCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, CurveError> {
        if t < T::zero() {
            return Err(CurveError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok((-self.rate * t).exp())
    }

    fn zero_rate(&self, t: T) -> Result<T, CurveError> {
        if t <= T::zero() {
            return Err(CurveError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.rate)
    }

    // Every period carries the same rate on a flat curve.
    fn forward_rate(&self, period_start: T, period_end: T) -> Result<T, CurveError> {
        if period_start < T::zero() || period_end <= period_start {
            return Err(CurveError::InvalidPeriod {
                start: period_start.to_f64().unwrap_or(0.0),
                end: period_end.to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.rate)
    }
}

impl Parametric for FlatCurve<f64> {
    fn id(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.rate]
    }

    fn with_parameters(&self, parameters: &[f64]) -> Result<Self, ParameterError> {
        if parameters.len() != 1 {
            return Err(ParameterError::width_mismatch(&self.name, 1, parameters.len()));
        }
        Ok(Self::new(self.name.clone(), parameters[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_factor() {
        let curve = FlatCurve::new("test", 0.03_f64);
        let df = curve.discount_factor(2.0).unwrap();
        assert!((df - (-0.06_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_discount_factor_at_zero_is_one() {
        let curve = FlatCurve::new("test", 0.03_f64);
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_negative_maturity_rejected() {
        let curve = FlatCurve::new("test", 0.03_f64);
        assert!(curve.discount_factor(-1.0).is_err());
    }

    #[test]
    fn test_zero_rate_is_the_flat_rate() {
        let curve = FlatCurve::new("test", 0.03_f64);
        assert_eq!(curve.zero_rate(0.5).unwrap(), 0.03);
        assert_eq!(curve.zero_rate(10.0).unwrap(), 0.03);
        assert!(curve.zero_rate(0.0).is_err());
    }

    #[test]
    fn test_forward_rate_is_the_flat_rate() {
        let curve = FlatCurve::new("test", 0.03_f64);
        assert_eq!(curve.forward_rate(0.0, 1.0).unwrap(), 0.03);
        assert_eq!(curve.forward_rate(1.0, 7.0).unwrap(), 0.03);
    }

    #[test]
    fn test_forward_rate_rejects_bad_periods() {
        let curve = FlatCurve::new("test", 0.03_f64);
        assert!(matches!(
            curve.forward_rate(2.0, 2.0),
            Err(CurveError::InvalidPeriod { .. })
        ));
        assert!(curve.forward_rate(2.0, 1.0).is_err());
        assert!(curve.forward_rate(-1.0, 1.0).is_err());
    }

    #[test]
    fn test_parametric_round_trip() {
        let curve = FlatCurve::new("ois", 0.02);
        let rebuilt = curve.with_parameters(&curve.parameters()).unwrap();
        assert_eq!(rebuilt, curve);
    }

    #[test]
    fn test_parametric_width_mismatch() {
        let curve = FlatCurve::new("ois", 0.02);
        assert!(curve.with_parameters(&[0.01, 0.02]).is_err());
    }
}
