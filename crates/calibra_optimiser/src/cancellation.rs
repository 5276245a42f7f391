//! Cooperative cancellation of optimiser runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag for cancelling a running optimisation cooperatively.
///
/// Clone the token, hand one copy to
/// [`LevenbergMarquardt::with_cancellation`](crate::LevenbergMarquardt::with_cancellation)
/// and keep the other; calling [`cancel`](CancellationToken::cancel) makes
/// the optimiser abandon the current iteration at the next check point
/// (between Jacobian column evaluations and between iterations). The run
/// then finishes with [`TerminalState::Cancelled`](crate::TerminalState)
/// and the best parameters found so far.
///
/// # Example
///
/// ```
/// use calibra_optimiser::CancellationToken;
///
/// let token = CancellationToken::new();
/// let worker_copy = token.clone();
/// assert!(!worker_copy.is_cancelled());
///
/// token.cancel();
/// assert!(worker_copy.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
