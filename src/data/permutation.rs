/// Endless without-replacement index stream
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Seed for a freshly built generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Seed {
    /// Seed from system entropy
    #[default]
    Entropy,
    /// Reproducible stream
    Fixed(u64),
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Seed::Fixed(seed)
    }
}

impl From<Option<u64>> for Seed {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(Seed::Entropy, Seed::Fixed)
    }
}

impl Seed {
    /// Build the generator this seed describes
    pub fn into_rng(self) -> StdRng {
        match self {
            Seed::Entropy => StdRng::from_entropy(),
            Seed::Fixed(seed) => StdRng::seed_from_u64(seed),
        }
    }
}

/// Endless sequence of permutations of `[0, n)`
///
/// The first `n` items are one uniform random permutation, the next `n`
/// another independent one, and so on. Within a cycle every index appears
/// exactly once. A new instance is the only way to restart the stream.
pub struct EndlessPermutations<R: Rng = StdRng> {
    rng: R,
    indices: Vec<usize>,
    cursor: usize,
    cycles: usize,
}

impl EndlessPermutations<StdRng> {
    /// Create a stream over `[0, n)` with an owned `StdRng`
    pub fn new(n: usize, seed: impl Into<Seed>) -> Self {
        Self::with_rng(n, seed.into().into_rng())
    }
}

impl<R: Rng> EndlessPermutations<R> {
    /// Create a stream over `[0, n)` driven by a caller-supplied generator
    pub fn with_rng(n: usize, rng: R) -> Self {
        Self {
            rng,
            indices: (0..n).collect(),
            // Start exhausted so the first pull shuffles
            cursor: n,
            cycles: 0,
        }
    }

    /// Cycle length
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of permutations drawn so far
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Pull the next `k` indices, crossing cycle boundaries as needed
    ///
    /// Returns fewer than `k` only when the stream is empty (`n == 0`).
    pub fn take_indices(&mut self, k: usize) -> Vec<usize> {
        self.by_ref().take(k).collect()
    }

    /// Give back the generator, discarding the cursor
    pub fn into_rng(self) -> R {
        self.rng
    }

    fn reshuffle(&mut self) {
        self.indices.shuffle(&mut self.rng);
        self.cursor = 0;
        self.cycles += 1;
        log::debug!("Drew permutation {} over {} indices", self.cycles, self.indices.len());
    }
}

impl<R: Rng> Iterator for EndlessPermutations<R> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.indices.is_empty() {
            return None;
        }

        if self.cursor >= self.indices.len() {
            self.reshuffle();
        }

        let idx = self.indices[self.cursor];
        self.cursor += 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.indices.is_empty() {
            (0, Some(0))
        } else {
            (usize::MAX, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_single_cycle_is_permutation() {
        let n = 50;
        let mut perms = EndlessPermutations::new(n, 0u64);

        let cycle = perms.take_indices(n);

        assert_eq!(sorted(cycle), (0..n).collect::<Vec<_>>());
        assert_eq!(perms.cycles(), 1);
    }

    #[test]
    fn test_consecutive_cycles_are_independent_permutations() {
        let n = 20;
        let mut perms = EndlessPermutations::new(n, 1u64);

        let first = perms.take_indices(n);
        let second = perms.take_indices(n);

        assert_eq!(sorted(first.clone()), (0..n).collect::<Vec<_>>());
        assert_eq!(sorted(second.clone()), (0..n).collect::<Vec<_>>());
        // 20! orderings: a repeat here would mean the shuffle is not re-run
        assert_ne!(first, second);
        assert_eq!(perms.cycles(), 2);
    }

    #[test]
    fn test_many_cycles() {
        let n = 7;
        let mut perms = EndlessPermutations::new(n, 99u64);

        for _ in 0..25 {
            let cycle = perms.take_indices(n);
            assert_eq!(sorted(cycle), (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let a: Vec<usize> = EndlessPermutations::new(30, 42u64).take(90).collect();
        let b: Vec<usize> = EndlessPermutations::new(30, 42u64).take(90).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_with_rng_continues_generator() {
        let rng = StdRng::seed_from_u64(5);
        let mut perms = EndlessPermutations::with_rng(10, rng);
        let first = perms.take_indices(10);

        // Handing the generator on continues its stream rather than replaying it
        let mut next = EndlessPermutations::with_rng(10, perms.into_rng());
        let replay = EndlessPermutations::new(10, 5u64).take_indices(10);

        let next_cycle = next.take_indices(10);

        assert_eq!(first, replay);
        assert_ne!(next_cycle, first);
        assert_eq!(sorted(next_cycle), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_borrowed_rng() {
        let mut rng = StdRng::seed_from_u64(11);
        let indices = EndlessPermutations::with_rng(4, &mut rng).take_indices(12);

        assert_eq!(indices.len(), 12);
        for chunk in indices.chunks(4) {
            assert_eq!(sorted(chunk.to_vec()), vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_single_element() {
        let indices: Vec<usize> = EndlessPermutations::new(1, Seed::Entropy).take(5).collect();
        assert_eq!(indices, vec![0; 5]);
    }

    #[test]
    fn test_empty_set_yields_nothing() {
        let mut perms = EndlessPermutations::new(0, Seed::Entropy);

        assert!(perms.is_empty());
        assert_eq!(perms.next(), None);
        assert!(perms.take_indices(3).is_empty());
        assert_eq!(perms.cycles(), 0);
    }

    #[test]
    fn test_seed_conversions() {
        assert_eq!(Seed::from(3u64), Seed::Fixed(3));
        assert_eq!(Seed::from(None::<u64>), Seed::Entropy);
        assert_eq!(Seed::from(Some(9u64)), Seed::Fixed(9));
    }
}
