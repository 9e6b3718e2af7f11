//! Aggregation and confidence statistics.
//!
//! [`Moments`] accumulates the biased mean and variance of the replicate
//! estimates in one pass. [`summarize`] turns them into a 99 %
//! [`ConfidenceReport`] around the known sphere volume 4π/3.

pub mod student;

use serde::Serialize;

use crate::error::{EstimationError, Result};

pub use student::{critical_value, table_index, STUDENT_T_99};

/// Volume of the unit sphere, the value every replicate estimates.
pub const SPHERE_VOLUME: f64 = 4.0 * std::f64::consts::PI / 3.0;

/// One-pass accumulator of sum and sum of squares.
///
/// Values must be pushed in replicate-index order for the floating-point
/// sums to be reproducible.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Biased (population) variance: mean of squares minus squared mean.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        self.sum_sq / self.count as f64 - mean * mean
    }
}

impl FromIterator<f64> for Moments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = Moments::new();
        for value in iter {
            moments.push(value);
        }
        moments
    }
}

/// 99 % confidence summary of a replicated experiment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConfidenceReport {
    /// Number of replicates.
    pub replicates: usize,
    /// Mean of the replicate estimates.
    pub mean: f64,
    /// Biased variance of the replicate estimates.
    pub variance: f64,
    /// Variance with Bessel's correction.
    pub unbiased_variance: f64,
    /// Square root of the biased variance.
    pub standard_deviation: f64,
    /// `sqrt(unbiased_variance / replicates)`.
    pub standard_error: f64,
    /// Student's t value used for the radius.
    pub critical_value: f64,
    /// Half-width of the interval.
    pub radius: f64,
    /// `4π/3 − mean`.
    pub absolute_error: f64,
    /// Absolute error as a percentage of 4π/3.
    pub relative_error_percent: f64,
    /// Where 4π/3 sits in the interval: 100 at the centre, 0 on a bound,
    /// negative outside. `None` when the interval is degenerate and the
    /// mean misses the reference.
    pub location_percent: Option<f64>,
}

impl ConfidenceReport {
    /// Lower bound of the interval.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.mean - self.radius
    }

    /// Upper bound of the interval.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.mean + self.radius
    }

    /// Whether 4π/3 lies within the interval (bounds included).
    pub fn contains_reference(&self) -> bool {
        self.lower() <= SPHERE_VOLUME && SPHERE_VOLUME <= self.upper()
    }
}

/// Builds the 99 % confidence report for `replicates` estimates with the
/// given biased `mean` and `variance`.
///
/// Negative `variance` from rounding (identical estimates) counts as zero.
///
/// # Errors
///
/// Returns `InsufficientReplicates` when `replicates ≤ 1`.
///
/// # Examples
///
/// ```rust
/// use sphere_engine::stats::{summarize, SPHERE_VOLUME};
///
/// let report = summarize(SPHERE_VOLUME, 0.01, 10).unwrap();
/// assert_eq!(report.critical_value, 3.25);
/// assert_eq!(report.location_percent, Some(100.0));
/// ```
pub fn summarize(mean: f64, variance: f64, replicates: usize) -> Result<ConfidenceReport> {
    if replicates <= 1 {
        return Err(EstimationError::InsufficientReplicates(replicates));
    }

    let variance = if variance < 0.0 { 0.0 } else { variance };
    let n = replicates as f64;
    let unbiased_variance = n * variance / (n - 1.0);
    let standard_error = (unbiased_variance / n).sqrt();
    let critical_value = critical_value(replicates);
    let radius = standard_error * critical_value;
    let absolute_error = SPHERE_VOLUME - mean;

    Ok(ConfidenceReport {
        replicates,
        mean,
        variance,
        unbiased_variance,
        standard_deviation: variance.sqrt(),
        standard_error,
        critical_value,
        radius,
        absolute_error,
        relative_error_percent: 100.0 * absolute_error / SPHERE_VOLUME,
        location_percent: location_percent(absolute_error, radius),
    })
}

/// Folds the reference position into a symmetric 0–100 scale.
///
/// A zero radius only has a defined location when the error is zero too.
/// The ratio is taken before scaling by 100 so a zero error lands on exactly
/// 100 for every positive radius.
pub fn location_percent(error: f64, radius: f64) -> Option<f64> {
    if radius > 0.0 {
        let location = (error + radius) / radius * 100.0;
        Some(if location > 100.0 {
            200.0 - location
        } else {
            location
        })
    } else if error == 0.0 {
        Some(100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_moments_biased_variance() {
        let moments: Moments = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        assert_eq!(moments.count(), 8);
        assert_relative_eq!(moments.mean(), 5.0);
        assert_relative_eq!(moments.variance(), 4.0);
    }

    #[test]
    fn test_moments_empty() {
        let moments = Moments::new();
        assert_eq!(moments.mean(), 0.0);
        assert_eq!(moments.variance(), 0.0);
    }

    #[test]
    fn test_insufficient_replicates() {
        assert!(matches!(
            summarize(4.0, 0.1, 0),
            Err(EstimationError::InsufficientReplicates(0))
        ));
        assert!(matches!(
            summarize(4.0, 0.1, 1),
            Err(EstimationError::InsufficientReplicates(1))
        ));
    }

    #[test]
    fn test_report_fields() {
        let report = summarize(4.2, 0.0009, 10).unwrap();

        assert_relative_eq!(report.unbiased_variance, 0.001, epsilon = 1e-12);
        assert_relative_eq!(report.standard_error, 0.01, epsilon = 1e-12);
        assert_eq!(report.critical_value, 3.25);
        assert_relative_eq!(report.radius, 0.0325, epsilon = 1e-12);
        assert_relative_eq!(report.standard_deviation, 0.03, epsilon = 1e-12);
        assert_relative_eq!(report.absolute_error, SPHERE_VOLUME - 4.2, epsilon = 1e-12);
        assert_relative_eq!(report.lower(), 4.2 - 0.0325, epsilon = 1e-12);
        assert_relative_eq!(report.upper(), 4.2 + 0.0325, epsilon = 1e-12);
        assert!(report.contains_reference());
    }

    #[test]
    fn test_band_lookup_through_summarize() {
        assert_eq!(summarize(4.0, 0.1, 31).unwrap().critical_value, STUDENT_T_99[30]);
        assert_eq!(summarize(4.0, 0.1, 200).unwrap().critical_value, 2.576);
    }

    #[test]
    fn test_location_centre_is_exactly_100() {
        for radius in [1e-9, 0.003, 0.1, 1.0, 7.3, 1e6] {
            assert_eq!(location_percent(0.0, radius), Some(100.0));
        }
        let report = summarize(SPHERE_VOLUME, 0.02, 10).unwrap();
        assert_eq!(report.location_percent, Some(100.0));
    }

    #[test]
    fn test_location_is_symmetric() {
        let above = location_percent(0.5, 1.0).unwrap();
        let below = location_percent(-0.5, 1.0).unwrap();
        assert_relative_eq!(above, 50.0);
        assert_relative_eq!(below, 50.0);
    }

    #[test]
    fn test_location_outside_is_negative() {
        assert_relative_eq!(location_percent(2.0, 1.0).unwrap(), -100.0);
        assert_relative_eq!(location_percent(-1.5, 1.0).unwrap(), -50.0);
        assert_relative_eq!(location_percent(1.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_degenerate_radius() {
        assert_eq!(location_percent(0.0, 0.0), Some(100.0));
        assert_eq!(location_percent(0.1, 0.0), None);

        let report = summarize(4.0, 0.0, 10).unwrap();
        assert_eq!(report.radius, 0.0);
        assert_eq!(report.location_percent, None);
    }

    #[test]
    fn test_rounding_noise_clamped() {
        let report = summarize(4.0, -1e-18, 10).unwrap();
        assert_eq!(report.unbiased_variance, 0.0);
        assert_eq!(report.standard_deviation, 0.0);
    }

    proptest! {
        #[test]
        fn prop_unbiased_variance_finite_non_negative(
            mean in -1e6f64..1e6,
            variance in 0.0f64..1e6,
            replicates in 2usize..100_000,
        ) {
            let report = summarize(mean, variance, replicates).unwrap();
            prop_assert!(report.unbiased_variance.is_finite());
            prop_assert!(report.unbiased_variance >= 0.0);
            prop_assert!(report.radius >= 0.0);
        }

        #[test]
        fn prop_location_never_exceeds_100(
            error in -10.0f64..10.0,
            radius in 1e-6f64..10.0,
        ) {
            let location = location_percent(error, radius).unwrap();
            prop_assert!(location <= 100.0);
        }

        #[test]
        fn prop_zero_error_is_exactly_100(radius in 1e-300f64..1e300) {
            prop_assert_eq!(location_percent(0.0, radius), Some(100.0));
        }
    }
}
