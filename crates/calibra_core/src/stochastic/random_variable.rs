//! The random variable type and its elementwise algebra.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Internal representation: a constant, or one value per Monte-Carlo path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Scalar(f64),
    Paths(Vec<f64>),
}

/// A random variable: a filtration time together with either a deterministic
/// scalar or a vector of realizations (one per path).
///
/// Instances are immutable; every operation returns a fresh value. Binary
/// operations propagate the *maximum* filtration time of their operands: a
/// quantity measurable at time `t` stays measurable at any later time, so a
/// combination cannot be known earlier than its latest input.
///
/// A deterministic random variable behaves as a broadcast constant:
/// `size()` is 1 and [`get`](RandomVariable::get) ignores the path index.
/// Mixing a deterministic and a stochastic operand broadcasts the constant
/// lazily; no vector is materialized for it.
///
/// # Panics
///
/// Binary operations panic if both operands are stochastic with differing
/// path counts. Operands drawn from the same simulation always agree, so a
/// mismatch is a programming error rather than a data condition.
///
/// # Example
///
/// ```
/// use calibra_core::stochastic::RandomVariable;
///
/// let rate = RandomVariable::stochastic(0.5, vec![0.01, 0.02, 0.03, 0.04]);
/// let notional = RandomVariable::constant(100.0);
/// let accrued = notional.accrue(&rate, 0.5);
///
/// assert_eq!(accrued.filtration_time(), 0.5);
/// assert_eq!(accrued.size(), 4);
/// assert!((accrued.get(1) - 101.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RandomVariable {
    pub(crate) time: f64,
    pub(crate) value: Value,
}

impl RandomVariable {
    /// A deterministic random variable with filtration time zero.
    pub fn constant(value: f64) -> Self {
        Self::deterministic(0.0, value)
    }

    /// A deterministic random variable at the given filtration time.
    pub fn deterministic(time: f64, value: f64) -> Self {
        RandomVariable {
            time,
            value: Value::Scalar(value),
        }
    }

    /// A stochastic random variable from a vector of realizations.
    pub fn stochastic(time: f64, realizations: Vec<f64>) -> Self {
        RandomVariable {
            time,
            value: Value::Paths(realizations),
        }
    }

    /// A stochastic random variable with every path set to `value`.
    pub fn broadcast(time: f64, paths: usize, value: f64) -> Self {
        RandomVariable {
            time,
            value: Value::Paths(vec![value; paths]),
        }
    }

    /// The earliest time at which this value is known.
    pub fn filtration_time(&self) -> f64 {
        self.time
    }

    /// Whether this random variable is a deterministic constant.
    pub fn is_deterministic(&self) -> bool {
        matches!(self.value, Value::Scalar(_))
    }

    /// Number of realizations: 1 for a deterministic value (broadcast),
    /// otherwise the path count.
    pub fn size(&self) -> usize {
        match &self.value {
            Value::Scalar(_) => 1,
            Value::Paths(realizations) => realizations.len(),
        }
    }

    /// The realization on the given path. Deterministic values ignore the
    /// index (broadcast semantics).
    pub fn get(&self, path: usize) -> f64 {
        match &self.value {
            Value::Scalar(value) => *value,
            Value::Paths(realizations) => realizations[path],
        }
    }

    /// The realizations as an owned vector. A deterministic value yields a
    /// one-element vector.
    pub fn realizations(&self) -> Vec<f64> {
        match &self.value {
            Value::Scalar(value) => vec![*value],
            Value::Paths(realizations) => realizations.clone(),
        }
    }

    /// Materialize a deterministic value into a stochastic one of the given
    /// path count. A stochastic value is returned unchanged (its path count
    /// is already fixed by the simulation).
    pub fn expand(&self, paths: usize) -> Self {
        match &self.value {
            Value::Scalar(value) => Self::broadcast(self.time, paths, *value),
            Value::Paths(_) => self.clone(),
        }
    }

    // Elementwise combinators. These carry the whole deterministic fast
    // path; every public operation goes through them.

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let value = match &self.value {
            Value::Scalar(v) => Value::Scalar(f(*v)),
            Value::Paths(r) => Value::Paths(r.iter().map(|&x| f(x)).collect()),
        };
        RandomVariable {
            time: self.time,
            value,
        }
    }

    fn zip(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let time = self.time.max(other.time);
        let value = match (&self.value, &other.value) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(f(*a, *b)),
            (Value::Scalar(a), Value::Paths(b)) => {
                Value::Paths(b.iter().map(|&y| f(*a, y)).collect())
            }
            (Value::Paths(a), Value::Scalar(b)) => {
                Value::Paths(a.iter().map(|&x| f(x, *b)).collect())
            }
            (Value::Paths(a), Value::Paths(b)) => {
                assert_eq!(
                    a.len(),
                    b.len(),
                    "stochastic operands differ in path count ({} vs {})",
                    a.len(),
                    b.len()
                );
                Value::Paths(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
            }
        };
        RandomVariable { time, value }
    }

    fn zip3(&self, second: &Self, third: &Self, f: impl Fn(f64, f64, f64) -> f64) -> Self {
        let time = self.time.max(second.time).max(third.time);
        if self.is_deterministic() && second.is_deterministic() && third.is_deterministic() {
            return RandomVariable {
                time,
                value: Value::Scalar(f(self.get(0), second.get(0), third.get(0))),
            };
        }
        let paths = self.size().max(second.size()).max(third.size());
        for operand in [self, second, third] {
            if !operand.is_deterministic() {
                assert_eq!(
                    operand.size(),
                    paths,
                    "stochastic operands differ in path count ({} vs {})",
                    operand.size(),
                    paths
                );
            }
        }
        let realizations = (0..paths)
            .map(|i| f(self.get(i), second.get(i), third.get(i)))
            .collect();
        RandomVariable {
            time,
            value: Value::Paths(realizations),
        }
    }

    // Unary operations.

    /// Elementwise exponential.
    pub fn exp(&self) -> Self {
        self.map(f64::exp)
    }

    /// Elementwise natural logarithm.
    pub fn log(&self) -> Self {
        self.map(f64::ln)
    }

    /// Elementwise square root.
    pub fn sqrt(&self) -> Self {
        self.map(f64::sqrt)
    }

    /// Elementwise sine.
    pub fn sin(&self) -> Self {
        self.map(f64::sin)
    }

    /// Elementwise cosine.
    pub fn cos(&self) -> Self {
        self.map(f64::cos)
    }

    /// Elementwise square.
    pub fn squared(&self) -> Self {
        self.map(|x| x * x)
    }

    /// Elementwise absolute value.
    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Elementwise reciprocal.
    pub fn invert(&self) -> Self {
        self.map(|x| 1.0 / x)
    }

    /// Elementwise power with a constant exponent.
    pub fn pow(&self, exponent: f64) -> Self {
        self.map(|x| x.powf(exponent))
    }

    /// Clamp from below: `max(x, floor)` per element.
    pub fn floor(&self, floor: f64) -> Self {
        self.map(|x| x.max(floor))
    }

    /// Clamp from above: `min(x, cap)` per element.
    pub fn cap(&self, cap: f64) -> Self {
        self.map(|x| x.min(cap))
    }

    // Binary operations.

    /// Elementwise sum.
    pub fn add(&self, other: &Self) -> Self {
        self.zip(other, |x, y| x + y)
    }

    /// Elementwise difference.
    pub fn sub(&self, other: &Self) -> Self {
        self.zip(other, |x, y| x - y)
    }

    /// Elementwise product.
    pub fn mult(&self, other: &Self) -> Self {
        self.zip(other, |x, y| x * y)
    }

    /// Elementwise quotient.
    pub fn div(&self, other: &Self) -> Self {
        self.zip(other, |x, y| x / y)
    }

    /// Elementwise minimum of two random variables.
    pub fn minimum(&self, other: &Self) -> Self {
        self.zip(other, f64::min)
    }

    /// Elementwise maximum of two random variables.
    pub fn maximum(&self, other: &Self) -> Self {
        self.zip(other, f64::max)
    }

    // Fused operations. These keep the calibration inner loop down to one
    // pass over the realizations per valuation step.

    /// Accrue over a period: `x * (1 + rate * period_length)` per element.
    pub fn accrue(&self, rate: &Self, period_length: f64) -> Self {
        self.zip(rate, |x, r| x * (1.0 + r * period_length))
    }

    /// Discount over a period: `x / (1 + rate * period_length)` per element.
    pub fn discount(&self, rate: &Self, period_length: f64) -> Self {
        self.zip(rate, |x, r| x / (1.0 + r * period_length))
    }

    /// Fused multiply-add: `x + factor1 * factor2` per element.
    pub fn add_product(&self, factor1: &Self, factor2: &Self) -> Self {
        self.zip3(factor1, factor2, |x, f1, f2| x + f1 * f2)
    }

    /// Fused multiply-add with a constant factor: `x + factor * scale`.
    pub fn add_scaled_product(&self, factor: &Self, scale: f64) -> Self {
        self.zip(factor, |x, f| x + f * scale)
    }

    /// Fused ratio-add: `x + numerator / denominator` per element.
    pub fn add_ratio(&self, numerator: &Self, denominator: &Self) -> Self {
        self.zip3(numerator, denominator, |x, n, d| x + n / d)
    }

    /// Fused ratio-subtract: `x - numerator / denominator` per element.
    pub fn sub_ratio(&self, numerator: &Self, denominator: &Self) -> Self {
        self.zip3(numerator, denominator, |x, n, d| x - n / d)
    }

    /// Pathwise selection with `self` as the trigger: where the trigger is
    /// non-negative the result takes `value_if_nonnegative`, elsewhere
    /// `value_if_negative`.
    pub fn barrier(&self, value_if_nonnegative: &Self, value_if_negative: &Self) -> Self {
        self.zip3(value_if_nonnegative, value_if_negative, |trigger, a, b| {
            if trigger >= 0.0 {
                a
            } else {
                b
            }
        })
    }
}

impl fmt::Display for RandomVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Scalar(v) => write!(f, "RandomVariable(t = {}, value = {})", self.time, v),
            Value::Paths(r) => write!(
                f,
                "RandomVariable(t = {}, {} realizations)",
                self.time,
                r.len()
            ),
        }
    }
}

// Operator sugar. The named methods remain the primary surface; operators
// delegate so products can be written in formula style.

impl Add for &RandomVariable {
    type Output = RandomVariable;

    fn add(self, rhs: Self) -> RandomVariable {
        RandomVariable::add(self, rhs)
    }
}

impl Sub for &RandomVariable {
    type Output = RandomVariable;

    fn sub(self, rhs: Self) -> RandomVariable {
        RandomVariable::sub(self, rhs)
    }
}

impl Mul for &RandomVariable {
    type Output = RandomVariable;

    fn mul(self, rhs: Self) -> RandomVariable {
        RandomVariable::mult(self, rhs)
    }
}

impl Div for &RandomVariable {
    type Output = RandomVariable;

    fn div(self, rhs: Self) -> RandomVariable {
        RandomVariable::div(self, rhs)
    }
}

impl Add<f64> for &RandomVariable {
    type Output = RandomVariable;

    fn add(self, rhs: f64) -> RandomVariable {
        self.map(|x| x + rhs)
    }
}

impl Sub<f64> for &RandomVariable {
    type Output = RandomVariable;

    fn sub(self, rhs: f64) -> RandomVariable {
        self.map(|x| x - rhs)
    }
}

impl Mul<f64> for &RandomVariable {
    type Output = RandomVariable;

    fn mul(self, rhs: f64) -> RandomVariable {
        self.map(|x| x * rhs)
    }
}

impl Div<f64> for &RandomVariable {
    type Output = RandomVariable;

    fn div(self, rhs: f64) -> RandomVariable {
        self.map(|x| x / rhs)
    }
}

impl Neg for &RandomVariable {
    type Output = RandomVariable;

    fn neg(self) -> RandomVariable {
        self.map(|x| -x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Construction and Accessors
    // ========================================

    #[test]
    fn test_constant() {
        let rv = RandomVariable::constant(3.0);
        assert!(rv.is_deterministic());
        assert_eq!(rv.filtration_time(), 0.0);
        assert_eq!(rv.size(), 1);
        assert_eq!(rv.get(0), 3.0);
    }

    #[test]
    fn test_stochastic() {
        let rv = RandomVariable::stochastic(2.0, vec![1.0, 2.0, 3.0]);
        assert!(!rv.is_deterministic());
        assert_eq!(rv.size(), 3);
        assert_eq!(rv.get(2), 3.0);
    }

    #[test]
    fn test_broadcast_constructor() {
        let rv = RandomVariable::broadcast(1.0, 4, 0.5);
        assert!(!rv.is_deterministic());
        assert_eq!(rv.realizations(), vec![0.5; 4]);
    }

    #[test]
    fn test_deterministic_get_ignores_index() {
        let rv = RandomVariable::constant(7.0);
        assert_eq!(rv.get(123), 7.0);
    }

    #[test]
    fn test_expand() {
        let rv = RandomVariable::constant(2.5).expand(8);
        assert!(!rv.is_deterministic());
        assert_eq!(rv.size(), 8);
        assert!((rv.average() - 2.5).abs() < 1e-15);
    }

    #[test]
    fn test_expand_stochastic_is_identity() {
        let rv = RandomVariable::stochastic(1.0, vec![1.0, 2.0]);
        let expanded = rv.expand(17);
        assert_eq!(expanded, rv);
    }

    // ========================================
    // Deterministic Fast Path
    // ========================================

    #[test]
    fn test_deterministic_closure() {
        let a = RandomVariable::constant(3.0);
        let b = RandomVariable::constant(4.0);
        let sum = a.add(&b);
        assert!(sum.is_deterministic());
        assert_eq!(sum.get(0), 7.0);
    }

    #[test]
    fn test_deterministic_identity_matches_scalar_arithmetic() {
        let c = 1.7;
        let d = -0.3;
        let lhs = RandomVariable::constant(c).mult(&RandomVariable::constant(d));
        assert_eq!(lhs, RandomVariable::constant(c * d));
    }

    #[test]
    fn test_mixed_operands_broadcast() {
        // Scenario: 3.0 + RV(0.5, [4, 4, 4, 4]) is stochastic of size 4
        // with mean 7.
        let result = RandomVariable::constant(3.0)
            .add(&RandomVariable::broadcast(0.5, 4, 4.0));
        assert!(!result.is_deterministic());
        assert_eq!(result.size(), 4);
        assert!((result.average() - 7.0).abs() < 1e-15);
    }

    // ========================================
    // Filtration Time Propagation
    // ========================================

    #[test]
    fn test_binary_time_is_maximum() {
        let early = RandomVariable::deterministic(1.0, 2.0);
        let late = RandomVariable::deterministic(3.0, 5.0);
        assert_eq!(early.add(&late).filtration_time(), 3.0);
        assert_eq!(late.sub(&early).filtration_time(), 3.0);
    }

    #[test]
    fn test_unary_preserves_time() {
        let rv = RandomVariable::deterministic(2.0, 4.0);
        assert_eq!(rv.sqrt().filtration_time(), 2.0);
    }

    #[test]
    fn test_ternary_time_is_maximum() {
        let trigger = RandomVariable::deterministic(1.0, 1.0);
        let a = RandomVariable::deterministic(4.0, 10.0);
        let b = RandomVariable::deterministic(2.0, 20.0);
        let chosen = trigger.barrier(&a, &b);
        assert_eq!(chosen.filtration_time(), 4.0);
        assert_eq!(chosen.get(0), 10.0);
    }

    // ========================================
    // Unary Operations
    // ========================================

    #[test]
    fn test_unary_elementwise() {
        let rv = RandomVariable::stochastic(0.0, vec![1.0, 4.0, 9.0]);
        assert_eq!(rv.sqrt().realizations(), vec![1.0, 2.0, 3.0]);
        assert_eq!(rv.squared().realizations(), vec![1.0, 16.0, 81.0]);
        assert_eq!(rv.invert().get(1), 0.25);
    }

    #[test]
    fn test_exp_log_round_trip() {
        let rv = RandomVariable::stochastic(0.0, vec![0.5, 1.0, 2.0]);
        let back = rv.log().exp();
        for i in 0..rv.size() {
            assert!((back.get(i) - rv.get(i)).abs() < 1e-14);
        }
    }

    #[test]
    fn test_floor_and_cap() {
        let rv = RandomVariable::stochastic(0.0, vec![-1.0, 0.5, 2.0]);
        assert_eq!(rv.floor(0.0).realizations(), vec![0.0, 0.5, 2.0]);
        assert_eq!(rv.cap(1.0).realizations(), vec![-1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_pow() {
        let rv = RandomVariable::constant(2.0).pow(10.0);
        assert_eq!(rv.get(0), 1024.0);
    }

    // ========================================
    // Binary and Fused Operations
    // ========================================

    #[test]
    fn test_arithmetic_closure_identities() {
        let a = RandomVariable::stochastic(1.0, vec![1.0, -2.0, 3.5]);
        let zero = a.sub(&a);
        let one = a.div(&a);
        for i in 0..a.size() {
            assert_eq!(zero.get(i), 0.0);
            assert_eq!(one.get(i), 1.0);
        }
    }

    #[test]
    fn test_minimum_maximum() {
        let a = RandomVariable::stochastic(0.0, vec![1.0, 5.0]);
        let b = RandomVariable::constant(3.0);
        assert_eq!(a.minimum(&b).realizations(), vec![1.0, 3.0]);
        assert_eq!(a.maximum(&b).realizations(), vec![3.0, 5.0]);
    }

    #[test]
    fn test_accrue_discount_inverse() {
        let value = RandomVariable::constant(100.0);
        let rate = RandomVariable::stochastic(1.0, vec![0.01, 0.02, 0.05]);
        let round_trip = value.accrue(&rate, 0.5).discount(&rate, 0.5);
        for i in 0..3 {
            assert!((round_trip.get(i) - 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_add_product() {
        let base = RandomVariable::constant(1.0);
        let f1 = RandomVariable::stochastic(0.0, vec![2.0, 3.0]);
        let f2 = RandomVariable::constant(10.0);
        assert_eq!(base.add_product(&f1, &f2).realizations(), vec![21.0, 31.0]);
    }

    #[test]
    fn test_add_scaled_product() {
        let base = RandomVariable::stochastic(0.0, vec![1.0, 2.0]);
        let factor = RandomVariable::constant(3.0);
        assert_eq!(
            base.add_scaled_product(&factor, 2.0).realizations(),
            vec![7.0, 8.0]
        );
    }

    #[test]
    fn test_add_sub_ratio() {
        let base = RandomVariable::constant(1.0);
        let num = RandomVariable::constant(6.0);
        let den = RandomVariable::constant(3.0);
        assert_eq!(base.add_ratio(&num, &den).get(0), 3.0);
        assert_eq!(base.sub_ratio(&num, &den).get(0), -1.0);
    }

    #[test]
    fn test_barrier_pathwise() {
        let trigger = RandomVariable::stochastic(1.0, vec![1.0, -1.0, 0.0]);
        let up = RandomVariable::constant(10.0);
        let down = RandomVariable::constant(-10.0);
        let chosen = trigger.barrier(&up, &down);
        assert_eq!(chosen.realizations(), vec![10.0, -10.0, 10.0]);
    }

    #[test]
    #[should_panic(expected = "path count")]
    fn test_mismatched_paths_panic() {
        let a = RandomVariable::stochastic(0.0, vec![1.0, 2.0]);
        let b = RandomVariable::stochastic(0.0, vec![1.0, 2.0, 3.0]);
        let _ = a.add(&b);
    }

    // ========================================
    // NaN Propagation
    // ========================================

    #[test]
    fn test_nan_propagates_silently() {
        let a = RandomVariable::stochastic(0.0, vec![f64::NAN, 1.0]);
        let sum = a.add(&RandomVariable::constant(1.0));
        assert!(sum.get(0).is_nan());
        assert_eq!(sum.get(1), 2.0);
    }

    // ========================================
    // Operators, Equality, Display
    // ========================================

    #[test]
    fn test_operator_sugar() {
        let a = RandomVariable::stochastic(0.0, vec![2.0, 4.0]);
        let b = RandomVariable::constant(2.0);
        assert_eq!((&a + &b).realizations(), vec![4.0, 6.0]);
        assert_eq!((&a / &b).realizations(), vec![1.0, 2.0]);
        assert_eq!((&a * 0.5).realizations(), vec![1.0, 2.0]);
        assert_eq!((-&a).realizations(), vec![-2.0, -4.0]);
        assert_eq!((&a - 1.0).realizations(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_equality_requires_same_representation() {
        let scalar = RandomVariable::constant(1.0);
        let paths = RandomVariable::broadcast(0.0, 1, 1.0);
        assert_ne!(scalar, paths);
        assert_eq!(scalar, RandomVariable::constant(1.0));
    }

    #[test]
    fn test_equality_requires_same_time() {
        let a = RandomVariable::deterministic(0.0, 1.0);
        let b = RandomVariable::deterministic(1.0, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let det = RandomVariable::deterministic(1.0, 2.0);
        assert!(format!("{}", det).contains("value = 2"));
        let stoch = RandomVariable::stochastic(0.0, vec![1.0; 5]);
        assert!(format!("{}", stoch).contains("5 realizations"));
    }
}
