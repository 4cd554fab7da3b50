//! Deterministic randomness for type generation.
//!
//! All generation decisions flow through [`Random`], a thin wrapper around a seeded [`StdRng`].
//! The same seed yields the same decision sequence, so a generated type graph is reproducible
//! from its seed, feature set and size alone.
use crate::features::FeatureSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct Random {
    rng: StdRng,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A uniform value in `[0, n)`. Returns 0 when `n` is 0.
    pub fn up_to(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// A value in `[0, n)` biased towards small numbers.
    pub fn up_to_squared(&mut self, n: usize) -> usize {
        self.up_to(n + 1) * self.up_to(n + 1) / (n + 1)
    }

    /// True with probability `1/n`. Always true when `n` is 0.
    pub fn one_in(&mut self, n: usize) -> bool {
        self.up_to(n) == 0
    }

    /// A uniform element of a non-empty slice.
    pub fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        assert!(!options.is_empty(), "pick from empty options");
        options[self.up_to(options.len())]
    }

    /// A uniform element of the options whose required features are all enabled.
    pub fn feature_pick<T: Copy>(&mut self, features: FeatureSet, options: &FeatureOptions<T>) -> T {
        let eligible: Vec<T> = options
            .entries
            .iter()
            .filter(|(required, _)| features.contains(*required))
            .flat_map(|(_, choices)| choices.iter().copied())
            .collect();
        self.pick(&eligible)
    }
}

/// Choices gated on feature availability, for use with [`Random::feature_pick`].
pub struct FeatureOptions<T> {
    entries: Vec<(FeatureSet, Vec<T>)>,
}

impl<T: Copy> FeatureOptions<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(mut self, required: FeatureSet, choices: &[T]) -> Self {
        self.entries.push((required, choices.to_vec()));
        self
    }
}

impl<T: Copy> Default for FeatureOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_to_stays_in_range() {
        let mut rand = Random::new(7);
        assert_eq!(rand.up_to(0), 0);
        for n in 1..20 {
            for _ in 0..100 {
                assert!(rand.up_to(n) < n);
            }
        }
    }

    #[test]
    fn up_to_squared_stays_below_bound() {
        let mut rand = Random::new(11);
        for _ in 0..1000 {
            // upTo(n+1) yields at most n, and n*n/(n+1) < n.
            assert!(rand.up_to_squared(10) < 10);
        }
    }

    #[test]
    fn one_in_zero_is_always_true() {
        let mut rand = Random::new(3);
        for _ in 0..100 {
            assert!(rand.one_in(0));
        }
    }

    #[test]
    fn one_in_one_is_always_true() {
        let mut rand = Random::new(3);
        for _ in 0..100 {
            assert!(rand.one_in(1));
        }
    }

    #[test]
    fn pick_covers_all_options() {
        let mut rand = Random::new(5);
        let options: [usize; 4] = [1, 2, 3, 4];
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[rand.pick(&options) - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Random::new(42);
        let mut b = Random::new(42);
        for _ in 0..100 {
            assert_eq!(a.up_to(1000), b.up_to(1000));
        }
    }

    #[test]
    fn feature_pick_filters_disabled_options() {
        let options = FeatureOptions::new()
            .add(FeatureSet::MVP, &[1, 2])
            .add(FeatureSet::SIMD, &[3]);
        let mut rand = Random::new(9);
        for _ in 0..100 {
            assert!(rand.feature_pick(FeatureSet::MVP, &options) < 3);
        }
        let mut seen_simd = false;
        for _ in 0..200 {
            seen_simd |= rand.feature_pick(FeatureSet::SIMD, &options) == 3;
        }
        assert!(seen_simd);
    }
}
