//! # calibra_optimiser
//!
//! Parallel damped Gauss-Newton (Levenberg-Marquardt) least-squares
//! optimiser for Calibra.
//!
//! This crate sits between the foundation layer (`calibra_core`) and the
//! model layer (`calibra_models`), solving the inverse problems at the heart
//! of model calibration: find parameters `p` minimising the weighted sum of
//! squared deviations of a residual vector `f(p)` from target values.
//!
//! ## Design
//!
//! - The Jacobian is approximated by central finite differences; the column
//!   evaluations run in parallel on a worker pool sized once per
//!   [`LevenbergMarquardt::run`].
//! - Damping uses Marquardt's scaling: the damped normal matrix is
//!   `JᵀWJ + λ·diag(JᵀWJ)`, solved by Cholesky decomposition with
//!   λ-escalation on non-SPD failures.
//! - Iteration progress is reported through an injected observer callback
//!   and `tracing` events; a cooperative [`CancellationToken`] aborts a run
//!   between column evaluations.
//!
//! ## Example
//!
//! ```
//! use calibra_optimiser::{LevenbergMarquardt, LmConfig};
//!
//! // Fit p to residuals f(p) = [p0 - 2, p1 - 3] against zero targets.
//! use calibra_core::types::EvaluationError;
//!
//! let optimiser = LevenbergMarquardt::new(vec![0.0, 0.0], LmConfig::default());
//! let residual = |p: &[f64], out: &mut [f64]| -> Result<(), EvaluationError> {
//!     out[0] = p[0] - 2.0;
//!     out[1] = p[1] - 3.0;
//!     Ok(())
//! };
//!
//! let fit = optimiser.run(&residual, vec![0.0, 0.0]).unwrap();
//! assert!(fit.converged());
//! assert!((fit.parameters[0] - 2.0).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

mod cancellation;
mod config;
mod error;
mod solver;

pub use cancellation::CancellationToken;
pub use config::LmConfig;
pub use error::OptimiserError;
pub use solver::{Fit, IterationEvent, LevenbergMarquardt, Residual, TerminalState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CancellationToken, Fit, IterationEvent, LevenbergMarquardt, LmConfig, OptimiserError,
        Residual, TerminalState,
    };
}
