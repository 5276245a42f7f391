//! Aggregation of heterogeneous parameter slices into one flat vector.

use super::CalibrationError;
use calibra_core::traits::Parametric;
use std::collections::{HashMap, HashSet};

/// Bidirectional map between a flat parameter vector and the slices of an
/// ordered set of parameter-bearing sub-objects.
///
/// The ordering and slice widths are snapshotted at construction and stay
/// fixed for the aggregation's lifetime: sub-object `i` owns the index
/// range `[Σ_{j<i} w_j, Σ_{j≤i} w_j)` of the aggregated vector. Sub-objects
/// of width zero are legal; they simply contribute nothing.
///
/// # Example
///
/// ```
/// use calibra_models::calibration::ParameterAggregation;
/// use calibra_models::curves::{CurveKind, FlatCurve};
///
/// let aggregation = ParameterAggregation::new(vec![
///     CurveKind::Flat(FlatCurve::new("ois", 0.02)),
///     CurveKind::Flat(FlatCurve::new("sofr", 0.03)),
/// ]).unwrap();
///
/// assert_eq!(aggregation.parameter(), vec![0.02, 0.03]);
///
/// let slices = aggregation.split(&[0.04, 0.05]).unwrap();
/// assert_eq!(slices["ois"], vec![0.04]);
/// assert_eq!(slices["sofr"], vec![0.05]);
/// ```
#[derive(Debug, Clone)]
pub struct ParameterAggregation<P: Parametric> {
    objects: Vec<P>,
    widths: Vec<usize>,
}

impl<P: Parametric> ParameterAggregation<P> {
    /// Snapshot the ordering and widths of the given sub-objects.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::EmptyAggregation`] for an empty set
    /// * [`CalibrationError::DuplicateId`] if two sub-objects share an id
    pub fn new(sub_objects: Vec<P>) -> Result<Self, CalibrationError> {
        if sub_objects.is_empty() {
            return Err(CalibrationError::EmptyAggregation);
        }
        let mut seen = HashSet::new();
        for object in &sub_objects {
            if !seen.insert(object.id().to_string()) {
                return Err(CalibrationError::DuplicateId {
                    id: object.id().to_string(),
                });
            }
        }
        let widths = sub_objects
            .iter()
            .map(|object| object.parameters().len())
            .collect();
        Ok(Self {
            objects: sub_objects,
            widths,
        })
    }

    /// Total width of the aggregated vector.
    pub fn total_width(&self) -> usize {
        self.widths.iter().sum()
    }

    /// The aggregated sub-objects, in snapshot order.
    pub fn objects(&self) -> &[P] {
        &self.objects
    }

    /// Concatenate the current parameter slices in snapshot order.
    pub fn parameter(&self) -> Vec<f64> {
        let mut parameter = Vec::with_capacity(self.total_width());
        for object in &self.objects {
            parameter.extend(object.parameters());
        }
        parameter
    }

    /// Partition a flat vector into per-sub-object slices keyed by id.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::DimensionMismatch`] if the vector length is not
    /// the total width.
    pub fn split(&self, parameter: &[f64]) -> Result<HashMap<String, Vec<f64>>, CalibrationError> {
        if parameter.len() != self.total_width() {
            return Err(CalibrationError::DimensionMismatch {
                what: "aggregated parameter vector",
                expected: self.total_width(),
                actual: parameter.len(),
            });
        }

        let mut slices = HashMap::with_capacity(self.objects.len());
        let mut offset = 0;
        for (object, &width) in self.objects.iter().zip(&self.widths) {
            slices.insert(
                object.id().to_string(),
                parameter[offset..offset + width].to_vec(),
            );
            offset += width;
        }
        Ok(slices)
    }
}
