use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 3819201;

/// An explicit source of randomness for expansion and rollouts.
///
/// Every random decision made by the search goes through this trait, so a fixed
/// seed and a fixed sequence of calls reproduce the same tree.
pub trait RandomGenerator {
    /// Returns a uniformly distributed index in `0..len`. `len` must be positive.
    fn next_index(&mut self, len: usize) -> usize;

    fn get_random_from_slice<'a, K>(&mut self, items: &'a [K]) -> Option<&'a K>
    where
        Self: Sized,
    {
        if items.is_empty() {
            None
        } else {
            items.get(self.next_index(items.len()))
        }
    }
}

impl<K: RandomGenerator + ?Sized> RandomGenerator for &mut K {
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

/// Non-reproducible generator backed by the thread-local RNG.
#[derive(Default)]
pub struct StandardRandomGenerator {
    rng: ThreadRng,
}

impl RandomGenerator for StandardRandomGenerator {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Reproducible generator backed by ChaCha8.
#[derive(Debug, Clone)]
pub struct SeededRandomGenerator {
    rng: ChaCha8Rng,
}

impl Default for SeededRandomGenerator {
    fn default() -> Self {
        SeededRandomGenerator::new(DEFAULT_SEED)
    }
}

impl RandomGenerator for SeededRandomGenerator {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

impl SeededRandomGenerator {
    /// Creates a generator whose sequence is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}
