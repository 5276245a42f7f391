//! Discount curve trait definition.

use super::CurveError;
use num_traits::Float;

/// A discount curve mapping maturities to discount factors.
///
/// Implementations are generic over `T: Float` so they stay usable with
/// alternative scalar types; the calibration machinery works on the `f64`
/// instantiation. Every rate query is a required method: each curve
/// derives its zero and forward rates directly from its own
/// parameterisation instead of round-tripping through discount factors, so
/// a flat curve can answer with its rate and a pillar curve with its
/// interpolant.
///
/// # Invariants
///
/// - `D(0) = 1` and `D(t) > 0` for every admissible maturity
/// - `D` is non-increasing in `t` for arbitrage-free curve data
/// - Rate queries are consistent with `discount_factor` under continuous
///   compounding: `D(t) = exp(-r(t)·t)` and
///   `f(t1, t2)·(t2 - t1) = r(t2)·t2 - r(t1)·t1`
///
/// # Example
///
/// ```
/// use calibra_models::curves::{DiscountCurve, FlatCurve};
///
/// let curve = FlatCurve::new("ois", 0.05_f64);
///
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
///
/// let rate = curve.zero_rate(1.0).unwrap();
/// assert!((rate - 0.05).abs() < 1e-10);
///
/// let forward = curve.forward_rate(1.0, 2.0).unwrap();
/// assert!((forward - 0.05).abs() < 1e-10);
/// ```
pub trait DiscountCurve<T: Float> {
    /// Return the discount factor for maturity `t`: the present value of
    /// one unit paid at `t`.
    ///
    /// # Arguments
    ///
    /// * `t` - Time to maturity in years (must be >= 0)
    ///
    /// # Returns
    ///
    /// * `Ok(D(t))` - Discount factor at maturity `t`, with `D(0) = 1`
    /// * `Err(CurveError::InvalidMaturity)` - If `t < 0`
    fn discount_factor(&self, t: T) -> Result<T, CurveError>;

    /// Return the continuously compounded zero rate for maturity `t`: the
    /// constant rate `r` with `D(t) = exp(-r·t)`.
    ///
    /// # Arguments
    ///
    /// * `t` - Time to maturity in years (must be > 0; no rate is implied
    ///   at `t = 0`)
    ///
    /// # Returns
    ///
    /// * `Ok(r(t))` - Zero rate at maturity `t`
    /// * `Err(CurveError::InvalidMaturity)` - If `t <= 0`
    fn zero_rate(&self, t: T) -> Result<T, CurveError>;

    /// Return the forward rate the curve implies over the period from
    /// `period_start` to `period_end`: the break-even rate for lending
    /// over the period.
    ///
    /// # Arguments
    ///
    /// * `period_start` - Period start in years (must be >= 0)
    /// * `period_end` - Period end in years (must exceed `period_start`)
    ///
    /// # Returns
    ///
    /// * `Ok(f)` - Forward rate over the period, satisfying
    ///   `f·(t2 - t1) = r(t2)·t2 - r(t1)·t1`
    /// * `Err(CurveError::InvalidPeriod)` - If the period is empty,
    ///   reversed, or starts before time zero
    fn forward_rate(&self, period_start: T, period_end: T) -> Result<T, CurveError>;
}
