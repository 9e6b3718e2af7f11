//! Student's t critical values at 99 % two-sided confidence.
//!
//! Tabulated per degree of freedom up to 30, then only at 40, 50, 60, 80,
//! 100, 120 and the normal asymptote. Counts between tabulated points fall
//! into fixed bands; there is no interpolation.

/// Critical values for degrees of freedom 0..=30, then 40, 50, 60, 80, 100,
/// 120 and ∞.
pub const STUDENT_T_99: [f64; 38] = [
    f64::INFINITY,
    63.66,
    9.925,
    5.841,
    4.604,
    4.032,
    3.707,
    3.499,
    3.355,
    3.25,
    3.169,
    3.106,
    3.055,
    3.012,
    2.977,
    2.947,
    2.921,
    2.898,
    2.878,
    2.861,
    2.845,
    2.831,
    2.819,
    2.807,
    2.797,
    2.787,
    2.779,
    2.771,
    2.763,
    2.756,
    2.75,
    2.704,
    2.678,
    2.66,
    2.639,
    2.626,
    2.617,
    2.576,
];

/// Index into [`STUDENT_T_99`] for `replicates` samples.
///
/// | replicates | index |
/// |------------|-------|
/// | ≤ 30 | `replicates − 1` (degrees of freedom) |
/// | 31..=60 | `27 + replicates / 10` |
/// | 61..=139 | `30 + replicates / 20` |
/// | ≥ 140 | 37 |
pub fn table_index(replicates: usize) -> usize {
    match replicates {
        0..=30 => replicates.saturating_sub(1),
        31..=60 => 27 + replicates / 10,
        61..=139 => 30 + replicates / 20,
        _ => STUDENT_T_99.len() - 1,
    }
}

/// 99 % critical value for `replicates` samples.
#[inline]
pub fn critical_value(replicates: usize) -> f64 {
    STUDENT_T_99[table_index(replicates)]
}
