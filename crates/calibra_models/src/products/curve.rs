//! Analytic curve products.

use crate::model::CurveModel;
use calibra_core::types::EvaluationError;

/// A product valued directly off a curve model.
///
/// Calibration products are quoted in *model minus market* form: the value
/// is the deviation of the model-implied quantity from its market quote, so
/// a calibrated model values every product at zero.
pub trait CurveProduct {
    /// Value the product under the given model.
    fn value(&self, model: &CurveModel) -> Result<f64, EvaluationError>;
}

/// Deviation of a model discount factor from its market quote.
///
/// # Example
///
/// ```
/// use calibra_models::curves::{CurveKind, FlatCurve};
/// use calibra_models::model::CurveModel;
/// use calibra_models::products::{CurveProduct, DiscountFactorProduct};
///
/// let model = CurveModel::new()
///     .with_curve(CurveKind::Flat(FlatCurve::new("ois", 0.02)));
/// let product = DiscountFactorProduct::new("ois", 1.0, (-0.02f64).exp());
///
/// // The model already reprices the quote.
/// assert!(product.value(&model).unwrap().abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountFactorProduct {
    curve: String,
    maturity: f64,
    market_discount_factor: f64,
}

impl DiscountFactorProduct {
    /// Create a discount factor product against the named curve.
    pub fn new(
        curve: impl Into<String>,
        maturity: f64,
        market_discount_factor: f64,
    ) -> Self {
        Self {
            curve: curve.into(),
            maturity,
            market_discount_factor,
        }
    }

    /// The quoted maturity.
    pub fn maturity(&self) -> f64 {
        self.maturity
    }
}

impl CurveProduct for DiscountFactorProduct {
    fn value(&self, model: &CurveModel) -> Result<f64, EvaluationError> {
        let model_df = model.discount_factor(&self.curve, self.maturity)?;
        Ok(model_df - self.market_discount_factor)
    }
}

/// Deviation of a model forward rate from its market quote.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRateProduct {
    curve: String,
    start: f64,
    end: f64,
    market_rate: f64,
}

impl ForwardRateProduct {
    /// Create a forward rate product for the period `(start, end)`.
    pub fn new(curve: impl Into<String>, start: f64, end: f64, market_rate: f64) -> Self {
        Self {
            curve: curve.into(),
            start,
            end,
            market_rate,
        }
    }
}

impl CurveProduct for ForwardRateProduct {
    fn value(&self, model: &CurveModel) -> Result<f64, EvaluationError> {
        let model_rate = model.forward_rate(&self.curve, self.start, self.end)?;
        Ok(model_rate - self.market_rate)
    }
}
