//! Error types for structured error handling.
//!
//! This module provides:
//! - `EvaluationError`: Errors raised by valuation oracles (products, models,
//!   simulations) while the optimiser is probing a parameter set
//! - `ParameterError`: Errors from reading or rebinding parameter slices

use thiserror::Error;

/// Categorised valuation errors.
///
/// Raised by any callback the calibration machinery invokes: product
/// valuation, model cloning, simulation queries. The optimiser wraps these
/// with the offending residual index before surfacing them.
///
/// # Examples
/// ```
/// use calibra_core::types::EvaluationError;
///
/// let err = EvaluationError::invalid_input("negative maturity");
/// assert_eq!(format!("{}", err), "Invalid input: negative maturity");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model failed to produce a valid result.
    #[error("Model failure: {0}")]
    ModelFailure(String),

    /// Requested quantity is not supported by the model or simulation.
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    /// A failure attributed to one product of a calibration basket.
    #[error("product {index}: {source}")]
    Product {
        /// Index of the offending product.
        index: usize,
        /// The underlying failure.
        source: Box<EvaluationError>,
    },
}

impl EvaluationError {
    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        EvaluationError::InvalidInput(message.into())
    }

    /// Create a model-failure error.
    pub fn model_failure(message: impl Into<String>) -> Self {
        EvaluationError::ModelFailure(message.into())
    }

    /// Create an unsupported-request error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        EvaluationError::Unsupported(message.into())
    }

    /// Attribute this failure to the product at the given index.
    pub fn at_product(self, index: usize) -> Self {
        EvaluationError::Product {
            index,
            source: Box::new(self),
        }
    }
}

/// Errors from reading or rebinding the parameter slice of a sub-object.
///
/// # Examples
/// ```
/// use calibra_core::types::ParameterError;
///
/// let err = ParameterError::width_mismatch("ois", 3, 2);
/// assert!(format!("{}", err).contains("'ois'"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// A parameter slice has the wrong length for its sub-object.
    #[error("parameter slice for '{id}' has length {actual}, expected {expected}")]
    WidthMismatch {
        /// Identifier of the sub-object.
        id: String,
        /// Width the sub-object exposes.
        expected: usize,
        /// Length of the slice that was supplied.
        actual: usize,
    },

    /// The sub-object exposes no calibratable parameters.
    #[error("'{id}' does not expose calibratable parameters")]
    NotCalibratable {
        /// Identifier of the sub-object.
        id: String,
    },
}

impl ParameterError {
    /// Create a width-mismatch error.
    pub fn width_mismatch(id: impl Into<String>, expected: usize, actual: usize) -> Self {
        ParameterError::WidthMismatch {
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Create a not-calibratable error.
    pub fn not_calibratable(id: impl Into<String>) -> Self {
        ParameterError::NotCalibratable { id: id.into() }
    }
}
