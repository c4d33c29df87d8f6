//! Descriptive statistics for one band of one region/window cell.
//!
//! All values are computed on demand from a [`SampleAccumulator`] snapshot:
//! population standard deviation (no Bessel correction), log-form geometric
//! mean and rank-interpolated percentiles.

use super::accumulator::SampleAccumulator;

/// Finalized statistics of a band.
///
/// Every floating field is `NaN` when `count` is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BandStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub arith_mean: f64,
    pub sigma: f64,
    pub geom_mean: f64,
    /// One value per requested percentile, in request order
    pub percentiles: Vec<f64>,
}

impl BandStatistics {
    /// Computes statistics over all accumulated values.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_stats::stats::{BandStatistics, SampleAccumulator};
    ///
    /// let mut accu = SampleAccumulator::new();
    /// accu.extend(&[1.0, 2.0, 3.0]);
    /// let stats = BandStatistics::compute(&accu, &[50]);
    /// assert_eq!(stats.count, 3);
    /// assert_eq!(stats.arith_mean, 2.0);
    /// assert_eq!(stats.percentiles, vec![2.0]);
    /// ```
    pub fn compute(accu: &SampleAccumulator, percentiles: &[u32]) -> Self {
        let values = accu.values();
        let count = values.len();

        if count == 0 {
            return Self::empty(percentiles.len());
        }

        let n = count as f64;
        let sum: f64 = values.iter().sum();
        let arith_mean = sum / n;

        let variance = values
            .iter()
            .map(|v| {
                let diff = v - arith_mean;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let sigma = variance.sqrt();

        let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
        let geom_mean = (log_sum / n).exp();

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let min = sorted[0];
        let max = sorted[count - 1];

        Self {
            count,
            min,
            max,
            arith_mean,
            sigma,
            geom_mean,
            percentiles: percentiles
                .iter()
                .map(|&p| percentile(&sorted, p as f64))
                .collect(),
        }
    }

    /// Statistics of a band that received no samples.
    pub fn empty(num_percentiles: usize) -> Self {
        Self {
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            arith_mean: f64::NAN,
            sigma: f64::NAN,
            geom_mean: f64::NAN,
            percentiles: vec![f64::NAN; num_percentiles],
        }
    }
}

/// Linear rank-interpolated percentile of ascending `sorted` values.
///
/// With `pos = (n + 1) * p / 100` (1-indexed rank), positions below the first
/// rank clamp to the minimum and positions beyond the last clamp to the maximum.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }

    let pos = (n as f64 + 1.0) * p / 100.0;
    if pos < 1.0 {
        return sorted[0];
    }
    if pos >= n as f64 {
        return sorted[n - 1];
    }

    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    sorted[lo - 1] + frac * (sorted[lo] - sorted[lo - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DEFAULT_PERCENTILES: [u32; 5] = [5, 25, 50, 75, 95];

    fn accu_of(values: &[f64]) -> SampleAccumulator {
        let mut accu = SampleAccumulator::new();
        accu.extend(values);
        accu
    }

    #[test]
    fn test_three_samples() {
        let stats = BandStatistics::compute(&accu_of(&[1.0, 2.0, 3.0]), &DEFAULT_PERCENTILES);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.arith_mean, 2.0);
        assert!((stats.sigma - 0.816_496_580_927_726).abs() < 1e-12);
        assert!((stats.geom_mean - 1.817_120_592_832_139_8).abs() < 1e-12);
        assert_eq!(stats.percentiles, vec![1.0, 1.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_interpolated_percentiles() {
        let stats = BandStatistics::compute(
            &accu_of(&[1.0, 2.0, 3.0, 11.0, 12.0, 13.0]),
            &[25, 50, 75],
        );
        assert!((stats.percentiles[0] - 1.75).abs() < 1e-12);
        assert!((stats.percentiles[1] - 7.0).abs() < 1e-12);
        assert!((stats.percentiles[2] - 12.25).abs() < 1e-12);
    }

    #[test]
    fn test_order_independent() {
        let a = BandStatistics::compute(&accu_of(&[9.0, 1.0, 5.0, 3.0]), &DEFAULT_PERCENTILES);
        let b = BandStatistics::compute(&accu_of(&[1.0, 3.0, 5.0, 9.0]), &DEFAULT_PERCENTILES);
        assert_eq!(a.min, b.min);
        assert_eq!(a.max, b.max);
        assert_eq!(a.percentiles, b.percentiles);
    }

    #[test]
    fn test_sigma_is_population() {
        // Sample std dev of [2, 4] would be sqrt(2); population is 1
        let stats = BandStatistics::compute(&accu_of(&[2.0, 4.0]), &[]);
        assert_eq!(stats.sigma, 1.0);
        assert!(stats.percentiles.is_empty());
    }

    #[test]
    fn test_empty_is_nan() {
        let stats = BandStatistics::compute(&SampleAccumulator::new(), &DEFAULT_PERCENTILES);
        assert_eq!(stats.count, 0);
        assert!(stats.min.is_nan());
        assert!(stats.max.is_nan());
        assert!(stats.arith_mean.is_nan());
        assert!(stats.sigma.is_nan());
        assert!(stats.geom_mean.is_nan());
        assert_eq!(stats.percentiles.len(), 5);
        assert!(stats.percentiles.iter().all(|p| p.is_nan()));
    }

    #[test]
    fn test_single_value() {
        let stats = BandStatistics::compute(&accu_of(&[4.0]), &[0, 50, 100]);
        assert_eq!(stats.sigma, 0.0);
        assert_eq!(stats.geom_mean, 4.0);
        assert_eq!(stats.percentiles, vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_percentile_extremes_clamp() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 100.0), 40.0);
        // pos = 5 * 0.8 = 4.0 == n
        assert_eq!(percentile(&sorted, 80.0), 40.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    proptest! {
        #[test]
        fn prop_percentile_law(
            mut values in prop::collection::vec(0.001f64..1000.0, 1..60),
            p in 0u32..=100,
        ) {
            values.sort_by(|a, b| a.total_cmp(b));
            let n = values.len();
            let pos = (n as f64 + 1.0) * p as f64 / 100.0;
            let expected = if pos < 1.0 {
                values[0]
            } else if pos >= n as f64 {
                values[n - 1]
            } else {
                let lo = pos.floor() as usize;
                values[lo - 1] + (pos - lo as f64) * (values[lo] - values[lo - 1])
            };

            let actual = percentile(&values, p as f64);
            prop_assert_eq!(actual, expected);
            prop_assert!(actual >= values[0] && actual <= values[n - 1]);
        }

        #[test]
        fn prop_percentiles_are_monotonic(values in prop::collection::vec(0.001f64..1000.0, 1..60)) {
            let stats = BandStatistics::compute(&accu_of(&values), &[0, 10, 25, 50, 75, 90, 100]);
            for pair in stats.percentiles.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            prop_assert!(stats.geom_mean <= stats.arith_mean + 1e-9);
        }
    }
}
