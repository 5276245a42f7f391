//! # calibra_core: Foundation for the Calibra Calibration Library
//!
//! ## Layer 1 (Foundation) Role
//!
//! calibra_core is the bottom layer of the 3-crate architecture, providing:
//! - Path-vector algebra: [`stochastic::RandomVariable`], the filtration-timed
//!   scalar-or-path-vector value consumed by pricing oracles
//! - The parameter capability trait: [`traits::Parametric`], the contract
//!   every calibratable sub-object (curve, covariance model) satisfies
//! - Shared error types: [`types::EvaluationError`], [`types::ParameterError`]
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other calibra_* crates, with a single
//! external dependency:
//! - thiserror: Structured error types
//!
//! ## Usage Examples
//!
//! ```rust
//! use calibra_core::stochastic::RandomVariable;
//!
//! let spot = RandomVariable::stochastic(1.0, vec![98.0, 101.0, 103.0, 99.0]);
//! let shifted = spot.add(&RandomVariable::constant(2.0));
//!
//! assert_eq!(shifted.filtration_time(), 1.0);
//! assert_eq!(shifted.size(), 4);
//! assert!((shifted.average() - 102.25).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod stochastic;
pub mod traits;
pub mod types;
