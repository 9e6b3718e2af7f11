//! Sphere-volume sampler.
//!
//! Draws points uniformly in the positive octant of the unit cube and counts
//! those falling strictly inside the unit sphere. Scaling the hit ratio by the
//! eight octants gives an estimate of the sphere volume, 4π/3.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::rng::UniformSource;

/// Number of octants covered by the full sphere.
const OCTANTS: f64 = 8.0;

/// Outcome of one sampling call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    /// Volume estimate; 0 when no point was drawn.
    pub estimate: f64,
    /// Wall time of the sampling loop alone.
    pub elapsed: Duration,
}

/// Estimates the unit sphere volume from `point_count` random points.
///
/// Each point consumes exactly three draws from `source`, in x, y, z order,
/// so the source ends up `3 × point_count` draws further along.
///
/// # Examples
///
/// ```rust
/// use sphere_engine::rng::ReplicateRng;
/// use sphere_engine::sampler::estimate_sphere_volume;
///
/// let mut rng = ReplicateRng::from_seed(42);
/// let sample = estimate_sphere_volume(&mut rng, 100_000);
/// assert!((sample.estimate - 4.18879).abs() < 0.1);
/// ```
pub fn estimate_sphere_volume<S>(source: &mut S, point_count: u64) -> Sample
where
    S: UniformSource + ?Sized,
{
    let start = Instant::now();
    let mut inside: u64 = 0;

    for _ in 0..point_count {
        let x = source.next_uniform();
        let y = source.next_uniform();
        let z = source.next_uniform();

        // squared distance is enough, both sides are non-negative
        if x * x + y * y + z * z < 1.0 {
            inside += 1;
        }
    }

    let estimate = if point_count == 0 {
        0.0
    } else {
        OCTANTS * inside as f64 / point_count as f64
    };

    Sample {
        estimate,
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ReplicateRng;

    /// Replays a fixed cycle of values and counts how many were drawn.
    struct Scripted {
        values: Vec<f64>,
        drawn: usize,
    }

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                drawn: 0,
            }
        }
    }

    impl UniformSource for Scripted {
        fn next_uniform(&mut self) -> f64 {
            let value = self.values[self.drawn % self.values.len()];
            self.drawn += 1;
            value
        }
    }

    #[test]
    fn test_all_points_inside() {
        let mut source = Scripted::new(&[0.4]);
        let sample = estimate_sphere_volume(&mut source, 5);
        assert_eq!(sample.estimate, 8.0);
    }

    #[test]
    fn test_consumes_three_draws_per_point() {
        let mut source = Scripted::new(&[0.1, 0.2, 0.3]);
        estimate_sphere_volume(&mut source, 17);
        assert_eq!(source.drawn, 51);
    }

    #[test]
    fn test_boundary_point_is_outside() {
        let mut source = Scripted::new(&[0.0, 0.0, 1.0]);
        let sample = estimate_sphere_volume(&mut source, 1);
        assert_eq!(sample.estimate, 0.0);

        let mut source = Scripted::new(&[0.0, 0.0, 1.0 - f64::EPSILON]);
        let sample = estimate_sphere_volume(&mut source, 1);
        assert_eq!(sample.estimate, 8.0);

        let mut source = Scripted::new(&[0.75, 0.75, 0.0]);
        let sample = estimate_sphere_volume(&mut source, 1);
        assert_eq!(sample.estimate, 0.0);
    }

    #[test]
    fn test_half_inside() {
        let mut source = Scripted::new(&[0.1, 0.1, 0.1, 0.9, 0.9, 0.9]);
        let sample = estimate_sphere_volume(&mut source, 4);
        assert_eq!(sample.estimate, 4.0);
    }

    #[test]
    fn test_zero_points_yield_zero() {
        let mut source = Scripted::new(&[0.5]);
        let sample = estimate_sphere_volume(&mut source, 0);
        assert_eq!(sample.estimate, 0.0);
        assert!(!sample.estimate.is_nan());
        assert_eq!(source.drawn, 0);
    }

    #[test]
    fn test_same_seed_same_bits() {
        let mut a = ReplicateRng::from_seed(99);
        let mut b = ReplicateRng::from_seed(99);
        let first = estimate_sphere_volume(&mut a, 10_000);
        let second = estimate_sphere_volume(&mut b, 10_000);
        assert_eq!(first.estimate.to_bits(), second.estimate.to_bits());
    }
}
