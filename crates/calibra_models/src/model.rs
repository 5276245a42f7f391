//! The analytic curve model.

use crate::calibration::CalibrationError;
use crate::curves::{CurveKind, DiscountCurve};
use calibra_core::traits::Parametric;
use calibra_core::types::EvaluationError;
use std::collections::{BTreeMap, HashMap};

/// An immutable container of named discount curves.
///
/// The model is a value object: calibration never mutates it. Rebinding
/// curve parameters goes through
/// [`clone_with_parameters`](CurveModel::clone_with_parameters), a single
/// atomic operation producing a fresh model — a half-updated model state is
/// never observable, which is what lets the optimiser's worker pool share
/// the original freely.
///
/// # Example
///
/// ```
/// use calibra_models::curves::{CurveKind, FlatCurve};
/// use calibra_models::model::CurveModel;
///
/// let model = CurveModel::new()
///     .with_curve(CurveKind::Flat(FlatCurve::new("ois", 0.02)));
///
/// let df = model.discount_factor("ois", 1.0).unwrap();
/// assert!((df - (-0.02f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveModel {
    curves: BTreeMap<String, CurveKind<f64>>,
}

impl CurveModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a curve, keyed by its name. Replaces any curve with the same
    /// name.
    pub fn with_curve(mut self, curve: CurveKind<f64>) -> Self {
        self.insert(curve);
        self
    }

    /// Insert a curve, keyed by its name.
    pub fn insert(&mut self, curve: CurveKind<f64>) {
        self.curves.insert(curve.name().to_string(), curve);
    }

    /// Look up a curve by name.
    pub fn curve(&self, name: &str) -> Option<&CurveKind<f64>> {
        self.curves.get(name)
    }

    /// Iterate over the curves in name order.
    pub fn curves(&self) -> impl Iterator<Item = &CurveKind<f64>> {
        self.curves.values()
    }

    /// Number of curves in the model.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the model holds no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Discount factor of the named curve at maturity `t`.
    pub fn discount_factor(&self, curve: &str, t: f64) -> Result<f64, EvaluationError> {
        let curve = self
            .curves
            .get(curve)
            .ok_or_else(|| EvaluationError::model_failure(format!("unknown curve '{}'", curve)))?;
        curve.discount_factor(t).map_err(Into::into)
    }

    /// Forward rate of the named curve over `(t1, t2)`.
    pub fn forward_rate(&self, curve: &str, t1: f64, t2: f64) -> Result<f64, EvaluationError> {
        let curve = self
            .curves
            .get(curve)
            .ok_or_else(|| EvaluationError::model_failure(format!("unknown curve '{}'", curve)))?;
        curve.forward_rate(t1, t2).map_err(Into::into)
    }

    /// Produce a clone of this model with the given curves rebound to new
    /// parameter slices.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::CloneNotSupported`] if a named curve is not in
    ///   the model
    /// * [`CalibrationError::Parameter`] if a slice width does not match its
    ///   curve
    pub fn clone_with_parameters(
        &self,
        parameters: &HashMap<String, Vec<f64>>,
    ) -> Result<CurveModel, CalibrationError> {
        let mut clone = self.clone();
        for (id, slice) in parameters {
            let curve = self
                .curves
                .get(id)
                .ok_or_else(|| CalibrationError::CloneNotSupported { id: id.clone() })?;
            clone.insert(curve.with_parameters(slice)?);
        }
        Ok(clone)
    }
}
