//! Rejection sampling from arbitrary one-dimensional densities.
//!
//! Candidates are drawn uniformly from `[low, high)` and each one is kept when
//! an independent uniform draw on `[0, 1)` falls below the density at that
//! candidate. The density must be scaled so that it never exceeds 1 on the
//! sampling domain. Nothing checks or clamps this: where the density is above
//! 1 every candidate is accepted and the output is no longer distributed
//! proportionally to it.

use num_traits::Float;
use rand::{
    distributions::{uniform::SampleUniform, Distribution, Uniform},
    rngs::SmallRng,
    Rng, SeedableRng,
};
use tracing::debug;

/// A density with values in `[0, 1]`
pub trait Density<T> {
    fn density(&self, x: T) -> T;
}

impl<T, F> Density<T> for F
where
    F: Fn(T) -> T,
{
    fn density(&self, x: T) -> T {
        self(x)
    }
}

/// `cos(x)`, a valid density on `[0, π/2]`
#[derive(Clone, Copy, Debug, Default)]
pub struct Cosine;

impl<T: Float> Density<T> for Cosine {
    fn density(&self, x: T) -> T {
        x.cos()
    }
}

/// Draw `size` candidates from `density` over `[low, high)` with `rng`,
/// returning the accepted ones in draw order.
///
/// `size` counts candidates, not accepted samples, so the output may be
/// shorter than `size` or empty.
///
/// # Panics
///
/// If `low` and `high` aren't finite, if `low >= high` or if the width
/// `high - low` overflows.
pub fn generate_with<T, D, R>(density: &D, low: T, high: T, size: usize, rng: &mut R) -> Vec<T>
where
    T: Float + SampleUniform,
    D: Density<T> + ?Sized,
    R: Rng + ?Sized,
{
    assert!(
        low.is_finite() && high.is_finite(),
        "Sampling domain must be finite"
    );
    assert!(low < high, "Sampling domain must satisfy low < high");
    assert!(
        (high - low).is_finite(),
        "Sampling domain width must be finite"
    );
    let candidates: Vec<T> = Uniform::new(low, high)
        .sample_iter(&mut *rng)
        .take(size)
        .collect();
    let checkers: Vec<T> = Uniform::new(T::zero(), T::one())
        .sample_iter(&mut *rng)
        .take(size)
        .collect();
    candidates
        .into_iter()
        .zip(checkers)
        .filter(|&(x, checker)| checker < density.density(x))
        .map(|(x, _)| x)
        .collect()
}

/// [`generate_with`] using the thread-local RNG
pub fn generate<T, D>(density: D, low: T, high: T, size: usize) -> Vec<T>
where
    T: Float + SampleUniform,
    D: Density<T>,
{
    generate_with(&density, low, high, size, &mut rand::thread_rng())
}

/// A rejection sampler owning its density and a seedable RNG
#[derive(Clone, Debug)]
pub struct RejectionSampler<D> {
    density: D,
    rng: SmallRng,
}

impl<D> RejectionSampler<D> {
    pub fn new(density: D) -> Self {
        Self {
            density,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Reseed the RNG so that the sample stream is reproducible
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn density(&self) -> &D {
        &self.density
    }

    /// See [`generate_with`]
    pub fn sample<T>(&mut self, low: T, high: T, size: usize) -> Vec<T>
    where
        T: Float + SampleUniform,
        D: Density<T>,
    {
        let accepted = generate_with(&self.density, low, high, size, &mut self.rng);
        debug!(
            candidates = size,
            accepted = accepted.len(),
            "Rejection sampling batch"
        );
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_zero_density() {
        let samples = generate(|_: f64| 0.0, -1.0, 1.0, 10_000);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_unit_density() {
        let samples = generate(|_: f64| 1.0, -1.0, 1.0, 10_000);
        assert_eq!(samples.len(), 10_000);
    }

    #[test]
    fn test_zero_size() {
        assert!(generate(Cosine, 0.0f32, 1.0, 0).is_empty());
    }

    #[test]
    fn test_seeded_reproducible() {
        let a = RejectionSampler::new(Cosine).set_seed(42).sample(0.0, 1.5, 1000);
        let b = RejectionSampler::new(Cosine).set_seed(42).sample(0.0, 1.5, 1000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_order() {
        // Half the domain accepts everything, so every candidate drawn there survives
        let mut rng = SmallRng::seed_from_u64(7);
        let step = |x: f64| if x < 0.5 { 1.0 } else { 0.0 };
        let samples = generate_with(&step, 0.0, 1.0, 1000, &mut rng);
        let mut rng = SmallRng::seed_from_u64(7);
        let candidates: Vec<f64> = Uniform::new(0.0, 1.0)
            .sample_iter(&mut rng)
            .take(1000)
            .filter(|&x| x < 0.5)
            .collect();
        assert_eq!(samples, candidates);
    }

    #[test]
    fn test_cosine_acceptance_rate() {
        // The mean of cos over [0, π/2] is 2/π
        let mut sampler = RejectionSampler::new(Cosine).set_seed(1234);
        let size = 200_000;
        let samples = sampler.sample(0.0, std::f64::consts::FRAC_PI_2, size);
        let rate = samples.len() as f64 / size as f64;
        assert_abs_diff_eq!(rate, 2.0 / std::f64::consts::PI, epsilon = 0.01);
        // E[x] under cos on [0, π/2] is π/2 - 1
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert_abs_diff_eq!(mean, std::f64::consts::FRAC_PI_2 - 1.0, epsilon = 0.01);
    }

    #[test]
    #[should_panic(expected = "low < high")]
    fn test_empty_domain() {
        generate(Cosine, 1.0, 1.0, 10);
    }

    #[test]
    #[should_panic(expected = "width must be finite")]
    fn test_overflowing_domain() {
        generate(|_: f64| 1.0, -1e308, 1e308, 10);
    }

    proptest! {
        #[test]
        fn test_within_domain(
            low in -1e3f64..1e3,
            width in 1e-3f64..1e3,
            size in 0usize..500,
            seed in any::<u64>(),
        ) {
            let high = low + width;
            let samples = RejectionSampler::new(|x: f64| (x * 0.1).sin().abs())
                .set_seed(seed)
                .sample(low, high, size);
            prop_assert!(samples.len() <= size);
            prop_assert!(samples.iter().all(|&x| low <= x && x <= high));
        }
    }
}
