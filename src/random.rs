use nanorand::{Rng, WyRand};

/// Source of uniform random integers used for every random decision of the
/// generator, so that tests can substitute a scripted sequence.
pub trait RandomSource {
    /// Uniform integer in `0..n`, `n` is never 0.
    fn below(&mut self, n: usize) -> usize;

    /// Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        let mut n = items.len();
        while n > 1 {
            n -= 1;
            let k = self.below(n + 1);
            items.swap(k, n);
        }
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.below(items.len())])
        }
    }

    fn coin(&mut self) -> bool {
        self.below(2) == 1
    }
}

impl RandomSource for WyRand {
    #[inline(always)]
    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        self.generate_range(0..n)
    }
}

/// A seeded generator, or one seeded from entropy when `seed` is `None`.
pub fn wyrand(seed: Option<u64>) -> WyRand {
    match seed {
        Some(seed) => WyRand::new_seed(seed),
        None => WyRand::new(),
    }
}
