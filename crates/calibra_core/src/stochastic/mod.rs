//! Path-vector algebra.
//!
//! This module provides [`RandomVariable`], the evaluation of a stochastic
//! quantity at a filtration time: either a deterministic scalar or a vector
//! of Monte-Carlo realizations indexed by path. All operations are
//! elementwise, immutable, and short-circuit to scalar arithmetic when every
//! operand is deterministic, so that calibration loops which mostly touch
//! deterministic quantities never pay for path vectors.

mod random_variable;
mod statistics;

pub use random_variable::RandomVariable;
pub use statistics::CenteredHistogram;
