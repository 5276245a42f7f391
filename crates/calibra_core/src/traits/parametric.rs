//! Parameter capability trait for calibratable sub-objects.

use crate::types::ParameterError;

/// A sub-object carrying a flat slice of free parameters.
///
/// Curves, covariance models and similar value objects implement this trait
/// so that the calibration machinery can treat a heterogeneous set of them
/// as one aggregated parameter vector. Implementations are immutable:
/// [`with_parameters`](Parametric::with_parameters) returns a rebuilt value,
/// it never mutates the receiver.
///
/// # Contract
///
/// - `id()` is a stable identity for the lifetime of the object; the
///   aggregation map is keyed by it.
/// - `parameters()` may be empty, which marks the object as not
///   calibratable. Its width must not change over the object's lifetime.
/// - `with_parameters(p)` accepts exactly `parameters().len()` values and
///   yields a value whose `parameters()` returns `p`.
///
/// # Example
///
/// ```
/// use calibra_core::traits::Parametric;
/// use calibra_core::types::ParameterError;
///
/// #[derive(Clone)]
/// struct Level { id: String, value: f64 }
///
/// impl Parametric for Level {
///     fn id(&self) -> &str { &self.id }
///     fn parameters(&self) -> Vec<f64> { vec![self.value] }
///     fn with_parameters(&self, p: &[f64]) -> Result<Self, ParameterError> {
///         if p.len() != 1 {
///             return Err(ParameterError::width_mismatch(&self.id, 1, p.len()));
///         }
///         Ok(Level { id: self.id.clone(), value: p[0] })
///     }
/// }
///
/// let level = Level { id: "r".into(), value: 0.02 };
/// let bumped = level.with_parameters(&[0.03]).unwrap();
/// assert_eq!(bumped.parameters(), vec![0.03]);
/// ```
pub trait Parametric {
    /// Stable identifier of this sub-object.
    fn id(&self) -> &str;

    /// The current free parameters. Empty marks the object uncalibratable.
    fn parameters(&self) -> Vec<f64>;

    /// Rebuild this object with the given parameter slice.
    fn with_parameters(&self, parameters: &[f64]) -> Result<Self, ParameterError>
    where
        Self: Sized;
}
