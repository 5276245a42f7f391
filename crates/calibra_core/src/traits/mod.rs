//! Capability traits shared across the Calibra crates.

mod parametric;

pub use parametric::Parametric;
