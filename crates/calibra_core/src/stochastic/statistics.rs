//! Statistics over the realizations of a random variable.
//!
//! Deterministic random variables report their scalar for value statistics
//! and zero for dispersion statistics. A stochastic random variable with no
//! realizations reports `NaN` throughout; statistics never raise.

use super::random_variable::{RandomVariable, Value};

/// A histogram with breakpoints placed symmetrically around the sample mean.
///
/// Returned by [`RandomVariable::histogram_about_mean`]. `anchors` has one
/// entry per bin (the bin's representative point), `densities` the matching
/// normalized frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct CenteredHistogram {
    /// Representative point of each bin.
    pub anchors: Vec<f64>,
    /// Normalized frequency of each bin.
    pub densities: Vec<f64>,
}

impl RandomVariable {
    /// Smallest realization.
    pub fn min(&self) -> f64 {
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => r.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }

    /// Largest realization.
    pub fn max(&self) -> f64 {
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => r.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Sum over all realizations.
    pub fn sum(&self) -> f64 {
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => r.iter().sum(),
        }
    }

    /// Sample mean (equal path weights).
    pub fn average(&self) -> f64 {
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => r.iter().sum::<f64>() / r.len() as f64,
        }
    }

    /// Mean under the given path probabilities: `Σ xᵢ pᵢ`.
    pub fn average_weighted(&self, probabilities: &RandomVariable) -> f64 {
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => r
                .iter()
                .enumerate()
                .map(|(i, &x)| x * probabilities.get(i))
                .sum(),
        }
    }

    /// Population variance `E[X²] − E[X]²`.
    pub fn variance(&self) -> f64 {
        match &self.value {
            Value::Scalar(_) => 0.0,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => {
                let n = r.len() as f64;
                let (sum, sum_squared) = r
                    .iter()
                    .fold((0.0, 0.0), |(s, s2), &x| (s + x, s2 + x * x));
                sum_squared / n - (sum / n) * (sum / n)
            }
        }
    }

    /// Variance under the given path probabilities.
    pub fn variance_weighted(&self, probabilities: &RandomVariable) -> f64 {
        match &self.value {
            Value::Scalar(_) => 0.0,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => {
                let (mean, second_moment) =
                    r.iter().enumerate().fold((0.0, 0.0), |(m, m2), (i, &x)| {
                        let p = probabilities.get(i);
                        (m + x * p, m2 + x * x * p)
                    });
                second_moment - mean * mean
            }
        }
    }

    /// Standard deviation.
    pub fn standard_deviation(&self) -> f64 {
        match &self.value {
            Value::Scalar(_) => 0.0,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(_) => self.variance().sqrt(),
        }
    }

    /// Standard deviation under the given path probabilities.
    pub fn standard_deviation_weighted(&self, probabilities: &RandomVariable) -> f64 {
        match &self.value {
            Value::Scalar(_) => 0.0,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(_) => self.variance_weighted(probabilities).sqrt(),
        }
    }

    /// Monte-Carlo standard error: standard deviation over `√n`.
    pub fn standard_error(&self) -> f64 {
        match &self.value {
            Value::Scalar(_) => 0.0,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => self.standard_deviation() / (r.len() as f64).sqrt(),
        }
    }

    /// Monte-Carlo standard error under the given path probabilities.
    pub fn standard_error_weighted(&self, probabilities: &RandomVariable) -> f64 {
        match &self.value {
            Value::Scalar(_) => 0.0,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => {
                self.standard_deviation_weighted(probabilities) / (r.len() as f64).sqrt()
            }
        }
    }

    /// The `quantile`-quantile of the realizations.
    ///
    /// Over the ascending sort of `n` realizations, returns the element at
    /// index `clamp(round((n+1)·(1−q) − 1), 0, n−1)`, so `quantile(0.95)` is
    /// a high realization and the result is monotone non-increasing in `q`.
    pub fn quantile(&self, quantile: f64) -> f64 {
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => {
                let sorted = sorted(r);
                sorted[quantile_index(r.len(), 1.0 - quantile)]
            }
        }
    }

    /// Mean of the sorted realizations between the `quantile_start`- and
    /// `quantile_end`-quantile indices (inclusive). Arguments are normalized
    /// so that the lower quantile comes first.
    pub fn quantile_expectation(&self, quantile_start: f64, quantile_end: f64) -> f64 {
        if quantile_start > quantile_end {
            return self.quantile_expectation(quantile_end, quantile_start);
        }
        match &self.value {
            Value::Scalar(v) => *v,
            Value::Paths(r) if r.is_empty() => f64::NAN,
            Value::Paths(r) => {
                let sorted = sorted(r);
                let start = quantile_index(r.len(), quantile_start);
                let end = quantile_index(r.len(), quantile_end);
                let slice = &sorted[start..=end];
                slice.iter().sum::<f64>() / slice.len() as f64
            }
        }
    }

    /// Normalized histogram over the given ascending breakpoints.
    ///
    /// With `k` breakpoints `b₀ < … < b_{k−1}` the result has `k + 1` bins:
    /// bin `i < k` holds the fraction of realizations in `(b_{i−1}, b_i]`
    /// (with `b_{−1} = −∞`), the last bin the rest. A deterministic random
    /// variable counts as a single realization, so exactly one bin carries
    /// the full mass. A stochastic random variable without realizations
    /// yields all-zero densities.
    pub fn histogram(&self, breakpoints: &[f64]) -> Vec<f64> {
        let sorted_realizations = match &self.value {
            Value::Scalar(v) => vec![*v],
            Value::Paths(r) => sorted(r),
        };
        let n = sorted_realizations.len();

        let mut densities = vec![0.0; breakpoints.len() + 1];
        let mut sample_index = 0;
        for (bin, &breakpoint) in breakpoints.iter().enumerate() {
            let mut count = 0usize;
            while sample_index < n && sorted_realizations[sample_index] <= breakpoint {
                sample_index += 1;
                count += 1;
            }
            densities[bin] = count as f64;
        }
        densities[breakpoints.len()] = (n - sample_index) as f64;

        if n > 0 {
            for density in &mut densities {
                *density /= n as f64;
            }
        }
        densities
    }

    /// Histogram over `points` breakpoints placed symmetrically around the
    /// mean at radius `standard_deviations · σ`, together with the anchor
    /// point of each bin.
    pub fn histogram_about_mean(&self, points: usize, standard_deviations: f64) -> CenteredHistogram {
        let center = self.average();
        let radius = standard_deviations * self.standard_deviation();
        let step_size = (points as f64 - 1.0) / 2.0;

        let mut breakpoints = Vec::with_capacity(points);
        let mut anchors = Vec::with_capacity(points + 1);
        for i in 0..points {
            let alpha = (-(points as f64 - 1.0) / 2.0 + i as f64) / step_size;
            breakpoints.push(center + alpha * radius);
            anchors.push(center + alpha * radius - radius / (2.0 * step_size));
        }
        anchors.push(center + radius + radius / (2.0 * step_size));

        CenteredHistogram {
            densities: self.histogram(&breakpoints),
            anchors,
        }
    }
}

fn sorted(realizations: &[f64]) -> Vec<f64> {
    let mut sorted = realizations.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Index of the `q`-th order statistic under the `(n+1)`-spacing convention.
fn quantile_index(n: usize, q: f64) -> usize {
    let index = ((n as f64 + 1.0) * q - 1.0).round();
    index.clamp(0.0, n as f64 - 1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RandomVariable {
        RandomVariable::stochastic(1.0, vec![4.0, 1.0, 3.0, 2.0])
    }

    // ========================================
    // Value Statistics
    // ========================================

    #[test]
    fn test_min_max_sum_average() {
        let rv = sample();
        assert_eq!(rv.min(), 1.0);
        assert_eq!(rv.max(), 4.0);
        assert_eq!(rv.sum(), 10.0);
        assert_eq!(rv.average(), 2.5);
    }

    #[test]
    fn test_deterministic_statistics() {
        let rv = RandomVariable::constant(5.0);
        assert_eq!(rv.min(), 5.0);
        assert_eq!(rv.max(), 5.0);
        assert_eq!(rv.average(), 5.0);
        assert_eq!(rv.variance(), 0.0);
        assert_eq!(rv.standard_deviation(), 0.0);
        assert_eq!(rv.standard_error(), 0.0);
        assert_eq!(rv.quantile(0.9), 5.0);
    }

    #[test]
    fn test_empty_statistics_are_nan() {
        let rv = RandomVariable::stochastic(0.0, vec![]);
        assert!(rv.min().is_nan());
        assert!(rv.max().is_nan());
        assert!(rv.sum().is_nan());
        assert!(rv.average().is_nan());
        assert!(rv.variance().is_nan());
        assert!(rv.standard_deviation().is_nan());
        assert!(rv.standard_error().is_nan());
        assert!(rv.quantile(0.5).is_nan());
        assert!(rv.quantile_expectation(0.1, 0.9).is_nan());
    }

    #[test]
    fn test_variance_and_deviation() {
        let rv = RandomVariable::stochastic(0.0, vec![1.0, 3.0]);
        assert!((rv.variance() - 1.0).abs() < 1e-14);
        assert!((rv.standard_deviation() - 1.0).abs() < 1e-14);
        assert!((rv.standard_error() - 1.0 / 2f64.sqrt()).abs() < 1e-14);
    }

    // ========================================
    // Weighted Statistics
    // ========================================

    #[test]
    fn test_weighted_average() {
        let rv = RandomVariable::stochastic(0.0, vec![10.0, 20.0]);
        let probabilities = RandomVariable::stochastic(0.0, vec![0.75, 0.25]);
        assert!((rv.average_weighted(&probabilities) - 12.5).abs() < 1e-14);
    }

    #[test]
    fn test_weighted_average_uniform_matches_unweighted() {
        let rv = sample();
        let uniform = RandomVariable::broadcast(0.0, 4, 0.25);
        assert!((rv.average_weighted(&uniform) - rv.average()).abs() < 1e-14);
    }

    #[test]
    fn test_weighted_variance() {
        let rv = RandomVariable::stochastic(0.0, vec![1.0, 3.0]);
        let uniform = RandomVariable::constant(0.5);
        assert!((rv.variance_weighted(&uniform) - 1.0).abs() < 1e-14);
        assert!((rv.standard_deviation_weighted(&uniform) - 1.0).abs() < 1e-14);
        assert!(
            (rv.standard_error_weighted(&uniform) - 1.0 / 2f64.sqrt()).abs() < 1e-14
        );
    }

    // ========================================
    // Quantiles
    // ========================================

    #[test]
    fn test_quantile_values() {
        let rv = sample();
        // Sorted: [1, 2, 3, 4]; index = round(5(1-q) - 1) clamped to [0, 3].
        assert_eq!(rv.quantile(0.0), 4.0);
        assert_eq!(rv.quantile(0.5), 3.0);
        assert_eq!(rv.quantile(0.8), 1.0);
        assert_eq!(rv.quantile(1.0), 1.0);
    }

    #[test]
    fn test_quantile_monotone_non_increasing() {
        let rv = RandomVariable::stochastic(
            0.0,
            vec![0.3, 1.9, -0.7, 2.4, 0.0, 1.1, -1.5, 0.8],
        );
        let mut previous = f64::INFINITY;
        for step in 0..=10 {
            let q = step as f64 / 10.0;
            let value = rv.quantile(q);
            assert!(value <= previous, "quantile must not increase with q");
            previous = value;
        }
    }

    #[test]
    fn test_quantile_expectation() {
        let rv = sample();
        // Full range averages everything.
        assert!((rv.quantile_expectation(0.0, 1.0) - 2.5).abs() < 1e-14);
        // Arguments are normalized, order must not matter.
        assert_eq!(
            rv.quantile_expectation(0.9, 0.1),
            rv.quantile_expectation(0.1, 0.9)
        );
    }

    #[test]
    fn test_quantile_expectation_deterministic() {
        let rv = RandomVariable::constant(3.0);
        assert_eq!(rv.quantile_expectation(0.2, 0.8), 3.0);
    }

    // ========================================
    // Histograms
    // ========================================

    #[test]
    fn test_histogram_bins() {
        let rv = RandomVariable::stochastic(0.0, vec![0.5, 1.5, 2.5, 3.5]);
        let densities = rv.histogram(&[1.0, 2.0, 3.0]);
        assert_eq!(densities, vec![0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_histogram_sums_to_one() {
        let rv = RandomVariable::stochastic(0.0, vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
        let densities = rv.histogram(&[-1.5, 0.0, 1.5]);
        let total: f64 = densities.iter().sum();
        assert!((total - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_histogram_deterministic_single_mass_point() {
        let rv = RandomVariable::constant(1.5);
        let densities = rv.histogram(&[1.0, 2.0, 3.0]);
        assert_eq!(densities, vec![0.0, 1.0, 0.0, 0.0]);
        let total: f64 = densities.iter().sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_histogram_empty_all_zero() {
        let rv = RandomVariable::stochastic(0.0, vec![]);
        let densities = rv.histogram(&[0.0, 1.0]);
        assert_eq!(densities, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_histogram_about_mean() {
        let rv = RandomVariable::stochastic(0.0, vec![-1.0, 0.0, 0.0, 1.0]);
        let histogram = rv.histogram_about_mean(5, 2.0);
        assert_eq!(histogram.anchors.len(), 6);
        assert_eq!(histogram.densities.len(), 6);
        let total: f64 = histogram.densities.iter().sum();
        assert!((total - 1.0).abs() < 1e-14);
        // Breakpoint grid is symmetric about the mean.
        let center = rv.average();
        let first = histogram.anchors.first().unwrap();
        let last = histogram.anchors.last().unwrap();
        assert!(((center - first) - (last - center)).abs() < 1e-12);
    }
}
