//! # calibra_models
//!
//! Curves, products, covariance models and the calibration harness for
//! Calibra.
//!
//! This crate is the top layer of the 3-crate architecture. It provides the
//! calibratable value objects (discount curves, parametric covariance
//! models), the products whose quoted values drive a calibration, and the
//! harness wiring both into the `calibra_optimiser` Levenberg-Marquardt
//! solver:
//!
//! - `curves`: [`curves::DiscountCurve`] with flat and pillar-interpolated
//!   implementations, all immutable value objects
//! - `model`: [`model::CurveModel`], an id-keyed curve container cloned —
//!   never mutated — when parameters change
//! - `products`: analytic curve products and Monte-Carlo products
//! - `montecarlo`: the simulation contract and parametric covariance models
//! - `calibration`: parameter aggregation and the calibration harness for
//!   the curve and Monte-Carlo paths
//!
//! ## Example
//!
//! ```
//! use calibra_models::calibration::CurveCalibrator;
//! use calibra_models::curves::{CurveKind, FlatCurve};
//! use calibra_models::model::CurveModel;
//! use calibra_models::products::{CurveProduct, DiscountFactorProduct};
//!
//! // One flat curve, one quoted discount factor.
//! let model = CurveModel::new()
//!     .with_curve(CurveKind::Flat(FlatCurve::new("ois", 0.01)));
//! let products: Vec<Box<dyn CurveProduct + Send + Sync>> = vec![Box::new(
//!     DiscountFactorProduct::new("ois", 2.0, (-0.03f64 * 2.0).exp()),
//! )];
//!
//! let calibrated = CurveCalibrator::new(products)
//!     .calibrate(&model, &["ois"])
//!     .unwrap();
//!
//! let df = calibrated.model.discount_factor("ois", 2.0).unwrap();
//! assert!((df - (-0.03f64 * 2.0).exp()).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod curves;
pub mod model;
pub mod montecarlo;
pub mod products;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::{
        CalibratedCovariance, CalibratedModel, CalibrationError, CovarianceCalibrator,
        CurveCalibrator, ParameterAggregation,
    };
    pub use crate::curves::{CurveError, CurveKind, DiscountCurve, FlatCurve, ZeroRateCurve};
    pub use crate::model::CurveModel;
    pub use crate::montecarlo::{
        CovarianceModel, ExponentialDecayCorrelation, MonteCarloSimulation, SimulationFactory,
        VolatilityScaledCovariance,
    };
    pub use crate::products::{
        CurveProduct, DiscountFactorProduct, ForwardRateProduct, MonteCarloProduct, ZeroCouponBond,
    };
}
