//! Tagged curve variant.

use super::{CurveError, DiscountCurve, FlatCurve, ZeroRateCurve};
use calibra_core::traits::Parametric;
use calibra_core::types::ParameterError;
use num_traits::Float;

/// The concrete curve kinds a [`CurveModel`](crate::model::CurveModel)
/// stores.
///
/// A tagged variant instead of trait objects: the model needs to clone
/// curves and rebind their parameters, both of which stay simple on an
/// enum, and the set of curve kinds is closed within the library.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveKind<T: Float> {
    /// A single-rate flat curve.
    Flat(FlatCurve<T>),
    /// A pillar-interpolated zero rate curve.
    ZeroRate(ZeroRateCurve<T>),
}

impl<T: Float> CurveKind<T> {
    /// The curve name.
    pub fn name(&self) -> &str {
        match self {
            CurveKind::Flat(curve) => curve.name(),
            CurveKind::ZeroRate(curve) => curve.name(),
        }
    }
}

impl<T: Float> DiscountCurve<T> for CurveKind<T> {
    fn discount_factor(&self, t: T) -> Result<T, CurveError> {
        match self {
            CurveKind::Flat(curve) => curve.discount_factor(t),
            CurveKind::ZeroRate(curve) => curve.discount_factor(t),
        }
    }

    fn zero_rate(&self, t: T) -> Result<T, CurveError> {
        match self {
            CurveKind::Flat(curve) => curve.zero_rate(t),
            CurveKind::ZeroRate(curve) => curve.zero_rate(t),
        }
    }

    fn forward_rate(&self, period_start: T, period_end: T) -> Result<T, CurveError> {
        match self {
            CurveKind::Flat(curve) => curve.forward_rate(period_start, period_end),
            CurveKind::ZeroRate(curve) => curve.forward_rate(period_start, period_end),
        }
    }
}

impl Parametric for CurveKind<f64> {
    fn id(&self) -> &str {
        self.name()
    }

    fn parameters(&self) -> Vec<f64> {
        match self {
            CurveKind::Flat(curve) => curve.parameters(),
            CurveKind::ZeroRate(curve) => curve.parameters(),
        }
    }

    fn with_parameters(&self, parameters: &[f64]) -> Result<Self, ParameterError> {
        match self {
            CurveKind::Flat(curve) => curve.with_parameters(parameters).map(CurveKind::Flat),
            CurveKind::ZeroRate(curve) => {
                curve.with_parameters(parameters).map(CurveKind::ZeroRate)
            }
        }
    }
}
