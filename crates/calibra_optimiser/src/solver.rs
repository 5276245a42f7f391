//! The Levenberg-Marquardt solver.
//!
//! One iteration of the damped Gauss-Newton loop:
//!
//! ```text
//! (JᵀWJ + λ·diag(JᵀWJ)) Δ = JᵀW(y − f(p))
//! p_trial = p + Δ
//! ```
//!
//! An improving trial is accepted (λ shrinks, the Jacobian is marked stale),
//! a worsening one rejected (λ grows, the Jacobian is reused). The Jacobian
//! is approximated by central finite differences — chosen over forward
//! differences for accuracy at the price of `2n` residual evaluations — and
//! its columns are evaluated in parallel on a worker pool sized once per
//! run.

use crate::{CancellationToken, LmConfig, OptimiserError};
use calibra_core::types::EvaluationError;
use std::fmt;
use tracing::{debug, trace};

/// The residual callback: fill `residuals` with `f(parameters)`.
///
/// Implemented for any `Fn(&[f64], &mut [f64]) -> Result<(), EvaluationError>`
/// that is `Sync`; the optimiser invokes it concurrently from the Jacobian
/// worker pool, so the callback must be read-only against its captured
/// state.
pub trait Residual: Sync {
    /// Evaluate the residual vector at the given parameters.
    fn evaluate(&self, parameters: &[f64], residuals: &mut [f64]) -> Result<(), EvaluationError>;
}

impl<F> Residual for F
where
    F: Fn(&[f64], &mut [f64]) -> Result<(), EvaluationError> + Sync,
{
    fn evaluate(&self, parameters: &[f64], residuals: &mut [f64]) -> Result<(), EvaluationError> {
        self(parameters, residuals)
    }
}

/// How a run ended.
///
/// Hard failures (singular system, non-finite values, callback errors) are
/// reported as [`OptimiserError`] instead; every `TerminalState` comes with
/// usable best-fit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// A convergence criterion (error, step, or gradient) was met.
    Converged,
    /// The iteration budget ran out; the best parameters so far are
    /// returned and may still be acceptable to the caller.
    Exhausted,
    /// The run was cancelled cooperatively; the best parameters so far are
    /// retained.
    Cancelled,
}

/// Result of a Levenberg-Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    /// Best-fit parameters found (monotone in error across iterations).
    pub parameters: Vec<f64>,
    /// Weighted error `½ Σ wᵢ (fᵢ − yᵢ)²` at the best parameters.
    pub error: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// How the run ended.
    pub state: TerminalState,
    /// Final damping factor.
    pub lambda: f64,
}

impl Fit {
    /// Whether the run met a convergence criterion.
    pub fn converged(&self) -> bool {
        self.state == TerminalState::Converged
    }
}

/// Snapshot of the optimiser state after one iteration, passed to the
/// observer callback.
#[derive(Debug, Clone, Copy)]
pub struct IterationEvent<'a> {
    /// Iteration count so far.
    pub iteration: usize,
    /// Current weighted error (after accept/reject).
    pub error: f64,
    /// Current damping factor.
    pub lambda: f64,
    /// Current parameters.
    pub parameters: &'a [f64],
}

type Observer = Box<dyn Fn(&IterationEvent<'_>) + Send + Sync>;

/// Why a Jacobian column could not be produced.
enum ColumnFault {
    Cancelled,
    Evaluation(EvaluationError),
    NonFinite,
}

/// Parallel damped Gauss-Newton least-squares optimiser.
///
/// Construct with the target values `y` (their length fixes the residual
/// dimension `m`), optionally attach weights, an observer, or a
/// cancellation token, then [`run`](LevenbergMarquardt::run) against a
/// residual callback and a starting point.
///
/// # Example
///
/// ```
/// use calibra_optimiser::{LevenbergMarquardt, LmConfig};
/// use calibra_core::types::EvaluationError;
///
/// // Fit y = a·exp(-b·x) through three samples of a = 2, b = 1.
/// let x = [0.0, 1.0, 2.0];
/// let y = vec![2.0, 2.0 * (-1.0f64).exp(), 2.0 * (-2.0f64).exp()];
///
/// let optimiser = LevenbergMarquardt::new(y, LmConfig::default());
/// let residual = move |p: &[f64], out: &mut [f64]| -> Result<(), EvaluationError> {
///     for (i, &xi) in x.iter().enumerate() {
///         out[i] = p[0] * (-p[1] * xi).exp();
///     }
///     Ok(())
/// };
///
/// let fit = optimiser.run(&residual, vec![1.0, 0.5]).unwrap();
/// assert!(fit.converged());
/// assert!((fit.parameters[0] - 2.0).abs() < 1e-5);
/// assert!((fit.parameters[1] - 1.0).abs() < 1e-5);
/// ```
pub struct LevenbergMarquardt {
    config: LmConfig,
    targets: Vec<f64>,
    weights: Option<Vec<f64>>,
    observer: Option<Observer>,
    cancellation: CancellationToken,
}

impl fmt::Debug for LevenbergMarquardt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevenbergMarquardt")
            .field("config", &self.config)
            .field("targets", &self.targets)
            .field("weights", &self.weights)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

impl LevenbergMarquardt {
    /// Create an optimiser for the given target values.
    pub fn new(targets: Vec<f64>, config: LmConfig) -> Self {
        Self {
            config,
            targets,
            weights: None,
            observer: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Create an optimiser with all-zero targets of the given residual
    /// dimension, the usual setup when products already express
    /// model-minus-market values.
    pub fn with_zero_targets(residual_count: usize, config: LmConfig) -> Self {
        Self::new(vec![0.0; residual_count], config)
    }

    /// The configuration in use.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// The target values.
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Attach per-residual weights (default: all one). Must match the
    /// target length and be non-negative.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Attach an observer invoked after every iteration.
    pub fn with_observer(
        mut self,
        observer: impl Fn(&IterationEvent<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Run the optimisation from the given starting parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(fit)` - Converged, exhausted, or cancelled, always carrying the
    ///   best parameters seen
    /// * `Err(e)` - Hard failure: inconsistent dimensions, a singular
    ///   normal system, non-finite values, or a callback error
    pub fn run<R: Residual>(
        &self,
        residual: &R,
        initial_parameters: Vec<f64>,
    ) -> Result<Fit, OptimiserError> {
        let n = initial_parameters.len();
        let m = self.targets.len();
        let weights = self.checked_weights(m)?;
        self.check_inputs(&initial_parameters)?;

        let mut p = initial_parameters;
        let mut f = vec![0.0; m];
        residual.evaluate(&p, &mut f)?;
        if !is_finite(&f) {
            return Err(OptimiserError::NumericalFault { iteration: 0 });
        }
        let mut error = self.weighted_error(&f, &weights);

        debug!(
            parameters = n,
            residuals = m,
            initial_error = error,
            "starting levenberg-marquardt run"
        );

        let mut best_parameters = p.clone();
        let mut best_error = error;
        let mut lambda = self.config.initial_lambda;

        // Nothing to optimise, or already at the target: report the initial
        // state without spending an iteration.
        if n == 0 || error <= self.config.error_tolerance {
            return Ok(Fit {
                parameters: p,
                error,
                iterations: 0,
                state: TerminalState::Converged,
                lambda: lambda.unwrap_or(0.0),
            });
        }

        #[cfg(feature = "parallel")]
        let pool = self.build_pool(n)?;

        // (JᵀWJ, JᵀW(y − f)); recomputed only when a step was accepted.
        let mut system: Option<(Vec<Vec<f64>>, Vec<f64>)> = None;
        let mut iterations = 0usize;

        let state = loop {
            if iterations >= self.config.max_iterations {
                break TerminalState::Exhausted;
            }
            if self.cancellation.is_cancelled() {
                break TerminalState::Cancelled;
            }

            if system.is_none() {
                #[cfg(feature = "parallel")]
                let columns = self.jacobian_parallel(residual, &p, m, &pool);
                #[cfg(not(feature = "parallel"))]
                let columns = self.jacobian_sequential(residual, &p, m);

                let columns = match columns {
                    Ok(columns) => columns,
                    Err(ColumnFault::Cancelled) => break TerminalState::Cancelled,
                    Err(ColumnFault::Evaluation(source)) => {
                        return Err(OptimiserError::Evaluation { source })
                    }
                    Err(ColumnFault::NonFinite) => {
                        return Err(OptimiserError::NumericalFault {
                            iteration: iterations,
                        })
                    }
                };

                let (normal, gradient) = self.normal_equations(&columns, &f, &weights);

                if lambda.is_none() {
                    let max_diagonal = (0..n).fold(0.0f64, |acc, i| acc.max(normal[i][i]));
                    lambda = Some(if max_diagonal > 0.0 {
                        1e-3 * max_diagonal
                    } else {
                        1e-3
                    });
                }

                if infinity_norm(&gradient) <= self.config.gradient_tolerance {
                    break TerminalState::Converged;
                }

                system = Some((normal, gradient));
            }

            let (normal, gradient) = system.as_ref().expect("system computed above");
            let lambda_value = lambda.as_mut().expect("lambda initialised above");

            // Solve the damped normal equations, escalating λ while the
            // matrix is not positive definite.
            let mut attempts = 0;
            let delta = loop {
                let damped = damp(normal, *lambda_value);
                if let Some(delta) = solve_cholesky(&damped, gradient) {
                    break delta;
                }
                attempts += 1;
                if attempts >= self.config.max_solve_attempts {
                    return Err(OptimiserError::SingularSystem {
                        lambda: *lambda_value,
                        attempts,
                    });
                }
                *lambda_value *= self.config.lambda_increase;
            };

            let p_trial: Vec<f64> = p.iter().zip(&delta).map(|(pi, di)| pi + di).collect();
            if !is_finite(&p_trial) {
                return Err(OptimiserError::NumericalFault {
                    iteration: iterations,
                });
            }

            let mut f_trial = vec![0.0; m];
            residual.evaluate(&p_trial, &mut f_trial)?;
            if !is_finite(&f_trial) {
                return Err(OptimiserError::NumericalFault {
                    iteration: iterations,
                });
            }
            let error_trial = self.weighted_error(&f_trial, &weights);
            iterations += 1;

            let accepted = error_trial < error;
            if accepted {
                p = p_trial;
                f = f_trial;
                error = error_trial;
                if error < best_error {
                    best_error = error;
                    best_parameters = p.clone();
                }
                *lambda_value /= self.config.lambda_decrease;
                system = None;
            } else {
                *lambda_value *= self.config.lambda_increase;
            }

            trace!(
                iteration = iterations,
                error,
                lambda = *lambda_value,
                accepted,
                "levenberg-marquardt step"
            );
            if let Some(observer) = &self.observer {
                observer(&IterationEvent {
                    iteration: iterations,
                    error,
                    lambda: *lambda_value,
                    parameters: &p,
                });
            }

            if error <= self.config.error_tolerance {
                break TerminalState::Converged;
            }
            if infinity_norm(&delta)
                <= self.config.step_tolerance * (infinity_norm(&p) + self.config.step_tolerance)
            {
                break TerminalState::Converged;
            }
        };

        debug!(
            ?state,
            iterations,
            error = best_error,
            "levenberg-marquardt run finished"
        );

        Ok(Fit {
            parameters: best_parameters,
            error: best_error,
            iterations,
            state,
            lambda: lambda.unwrap_or(0.0),
        })
    }

    fn checked_weights(&self, m: usize) -> Result<Vec<f64>, OptimiserError> {
        match &self.weights {
            None => Ok(vec![1.0; m]),
            Some(weights) => {
                if weights.len() != m {
                    return Err(OptimiserError::DimensionMismatch {
                        what: "weights",
                        expected: m,
                        actual: weights.len(),
                    });
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(OptimiserError::InvalidInput(
                        "weights must be finite and non-negative".to_string(),
                    ));
                }
                Ok(weights.clone())
            }
        }
    }

    fn check_inputs(&self, initial_parameters: &[f64]) -> Result<(), OptimiserError> {
        if !is_finite(initial_parameters) {
            return Err(OptimiserError::InvalidInput(
                "initial parameters must be finite".to_string(),
            ));
        }
        if !is_finite(&self.targets) {
            return Err(OptimiserError::InvalidInput(
                "targets must be finite".to_string(),
            ));
        }
        Ok(())
    }

    fn weighted_error(&self, residuals: &[f64], weights: &[f64]) -> f64 {
        0.5 * residuals
            .iter()
            .zip(&self.targets)
            .zip(weights)
            .map(|((f, y), w)| w * (f - y) * (f - y))
            .sum::<f64>()
    }

    /// One central-difference Jacobian column: `∂f/∂pⱼ`.
    fn column<R: Residual>(
        &self,
        residual: &R,
        parameters: &[f64],
        m: usize,
        j: usize,
    ) -> Result<Vec<f64>, ColumnFault> {
        if self.cancellation.is_cancelled() {
            return Err(ColumnFault::Cancelled);
        }

        let step = (parameters[j].abs() * self.config.step_relative).max(self.config.step_absolute);

        let mut shifted = parameters.to_vec();
        shifted[j] = parameters[j] + step;
        let mut f_plus = vec![0.0; m];
        residual
            .evaluate(&shifted, &mut f_plus)
            .map_err(ColumnFault::Evaluation)?;

        shifted[j] = parameters[j] - step;
        let mut f_minus = vec![0.0; m];
        residual
            .evaluate(&shifted, &mut f_minus)
            .map_err(ColumnFault::Evaluation)?;

        let column: Vec<f64> = f_plus
            .iter()
            .zip(&f_minus)
            .map(|(plus, minus)| (plus - minus) / (2.0 * step))
            .collect();
        if !is_finite(&column) {
            return Err(ColumnFault::NonFinite);
        }
        Ok(column)
    }

    #[cfg(feature = "parallel")]
    fn build_pool(&self, n_parameters: usize) -> Result<rayon::ThreadPool, OptimiserError> {
        let available = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        let threads = self
            .config
            .threads
            .unwrap_or_else(|| available.max(1).min(n_parameters))
            .max(1);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| OptimiserError::WorkerPool(e.to_string()))
    }

    #[cfg(feature = "parallel")]
    fn jacobian_parallel<R: Residual>(
        &self,
        residual: &R,
        parameters: &[f64],
        m: usize,
        pool: &rayon::ThreadPool,
    ) -> Result<Vec<Vec<f64>>, ColumnFault> {
        use rayon::prelude::*;

        pool.install(|| {
            (0..parameters.len())
                .into_par_iter()
                .map(|j| self.column(residual, parameters, m, j))
                .collect()
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn jacobian_sequential<R: Residual>(
        &self,
        residual: &R,
        parameters: &[f64],
        m: usize,
    ) -> Result<Vec<Vec<f64>>, ColumnFault> {
        (0..parameters.len())
            .map(|j| self.column(residual, parameters, m, j))
            .collect()
    }

    /// Assemble `JᵀWJ` and the gradient `JᵀW(y − f)` from Jacobian columns.
    fn normal_equations(
        &self,
        columns: &[Vec<f64>],
        residuals: &[f64],
        weights: &[f64],
    ) -> (Vec<Vec<f64>>, Vec<f64>) {
        let n = columns.len();
        let m = residuals.len();

        let mut normal = vec![vec![0.0; n]; n];
        let mut gradient = vec![0.0; n];
        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..m {
                    sum += weights[k] * columns[i][k] * columns[j][k];
                }
                normal[i][j] = sum;
                normal[j][i] = sum;
            }
            let mut sum = 0.0;
            for k in 0..m {
                sum += weights[k] * columns[i][k] * (self.targets[k] - residuals[k]);
            }
            gradient[i] = sum;
        }
        (normal, gradient)
    }
}

/// Apply Marquardt's scaled damping to the normal matrix. A zero diagonal
/// entry (a parameter the residuals do not react to) falls back to identity
/// damping so the solve stays well posed.
fn damp(normal: &[Vec<f64>], lambda: f64) -> Vec<Vec<f64>> {
    let mut damped = normal.to_vec();
    for i in 0..damped.len() {
        let scale = if normal[i][i] > 0.0 { normal[i][i] } else { 1.0 };
        damped[i][i] += lambda * scale;
    }
    damped
}

fn infinity_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
}

fn is_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Solve `Ax = b` for symmetric positive-definite `A` via Cholesky
/// decomposition. Returns `None` if `A` is not positive definite.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Decompose A = L Lᵀ.
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                if l[j][j].abs() < 1e-300 {
                    return None;
                }
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b.
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: Lᵀ x = y.
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
