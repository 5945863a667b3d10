use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma, Normal};

/// Session-scoped random sampling.
///
/// One instance per typing session, passed by `&mut` into the components
/// that need it. Nothing here is process-global, so two sessions never
/// share generator state and a seeded session replays exactly.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform float in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Uniform integer in [min, max] inclusive. Operands are swapped if
    /// passed out of order.
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min > max { (max, min) } else { (min, max) };
        self.rng.gen_range(lo..=hi)
    }

    /// `range` for millisecond spans.
    pub fn range_ms(&mut self, min: u64, max: u64) -> u64 {
        let (lo, hi) = if min > max { (max, min) } else { (min, max) };
        self.rng.gen_range(lo..=hi)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }

    pub fn normal(&mut self, mean: f64, stddev: f64) -> f64 {
        if stddev <= 0.0 {
            return mean;
        }
        Normal::new(mean, stddev)
            .expect("stddev checked positive")
            .sample(&mut self.rng)
    }

    /// Gamma draw with the given shape/scale. The underlying sampler is
    /// Marsaglia-Tsang rejection sampling (with the boost-and-correct step
    /// for shape < 1); it loops until acceptance, so callers must not
    /// assume O(1).
    pub fn gamma(&mut self, shape: f64, scale: f64) -> f64 {
        if shape <= 0.0 || scale <= 0.0 {
            return 0.0;
        }
        Gamma::new(shape, scale)
            .expect("shape and scale checked positive")
            .sample(&mut self.rng)
    }
}
