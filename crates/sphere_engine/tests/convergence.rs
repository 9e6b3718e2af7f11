//! Convergence and boundary behaviour of the sampler.

use sphere_engine::rng::UniformSource;
use sphere_engine::stats::Moments;
use sphere_engine::{estimate_sphere_volume, ReplicateRng, SPHERE_VOLUME};

/// Source that always yields the same coordinate.
struct Constant(f64);

impl UniformSource for Constant {
    fn next_uniform(&mut self) -> f64 {
        self.0
    }
}

fn spread(point_count: u64, seeds: std::ops::Range<u64>) -> Moments {
    seeds
        .map(|seed| {
            let mut rng = ReplicateRng::from_seed(seed);
            estimate_sphere_volume(&mut rng, point_count).estimate
        })
        .collect()
}

#[test]
fn test_stub_source_all_inside() {
    let mut source = Constant(0.4);
    let sample = estimate_sphere_volume(&mut source, 5);
    assert_eq!(sample.estimate, 8.0);
}

#[test]
fn test_stub_source_all_outside() {
    let mut source = Constant(0.6);
    let sample = estimate_sphere_volume(&mut source, 5);
    assert_eq!(sample.estimate, 0.0);
}

#[test]
fn test_zero_points() {
    let mut rng = ReplicateRng::from_seed(1);
    let before = rng.word_pos();
    let sample = estimate_sphere_volume(&mut rng, 0);

    assert_eq!(sample.estimate, 0.0);
    assert_eq!(rng.word_pos(), before);
}

#[test]
fn test_variance_shrinks_with_point_count() {
    let coarse = spread(1_000, 0..8);
    let fine = spread(1_000_000, 100..108);

    assert!(
        coarse.variance() > 20.0 * fine.variance(),
        "coarse variance {} vs fine variance {}",
        coarse.variance(),
        fine.variance()
    );
    assert!((fine.mean() - SPHERE_VOLUME).abs() < (SPHERE_VOLUME * 0.01));
}
