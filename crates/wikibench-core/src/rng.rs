//! Seeded random number generation.
//!
//! The partition shuffle, negative sampling, and bootstrap resampling are the
//! only nondeterministic steps in the pipeline, and all of them draw from
//! this generator. A fixed multiplicative LCG keeps the stream identical
//! across platforms and releases, which a benchmark builder needs for
//! reproducibility; external RNG crates do not guarantee stream stability
//! between versions.

/// Simple Linear Congruential Generator for reproducible randomness.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns the next raw value.
    pub fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    /// Returns a value in `[0, max)`. `max` must be nonzero.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(i + 1);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut rng1 = LcgRng::new(42);
        let mut rng2 = LcgRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = LcgRng::new(7);
        let mut items: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_shuffle_same_seed_same_order() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b: Vec<u32> = (0..20).collect();
        LcgRng::new(99).shuffle(&mut a);
        LcgRng::new(99).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_usize_in_range() {
        let mut rng = LcgRng::new(1);
        for _ in 0..1000 {
            assert!(rng.next_usize(13) < 13);
        }
    }
}
