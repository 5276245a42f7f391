//! Calibration products.
//!
//! Two product families drive calibrations:
//!
//! - Analytic curve products ([`CurveProduct`]): priced directly off a
//!   [`CurveModel`](crate::model::CurveModel), quoted in model-minus-market
//!   form so curve calibrations target zero.
//! - Monte-Carlo products ([`MonteCarloProduct`]): priced pathwise against a
//!   simulation, reduced to their expectation by the harness.

mod curve;
mod montecarlo;

pub use curve::{CurveProduct, DiscountFactorProduct, ForwardRateProduct};
pub use montecarlo::{MonteCarloProduct, ZeroCouponBond};
