//! Injectable randomness for reply selection.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of uniform indices.
///
/// Any `rand` generator works; tests either seed a [`StdRng`] or supply a
/// fixed sequence.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`, `None` when `len == 0`.
    fn choose_index(&mut self, len: usize) -> Option<usize>;
}

impl<R: RngCore + Send> RandomSource for R {
    fn choose_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.gen_range(0..len))
    }
}

/// Picks one element uniformly, `None` for an empty slice.
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    rng.choose_index(items.len()).and_then(|idx| items.get(idx))
}

pub fn entropy_source() -> Box<dyn RandomSource> {
    Box::new(StdRng::from_entropy())
}

pub fn seeded_source(seed: u64) -> Box<dyn RandomSource> {
    Box::new(StdRng::seed_from_u64(seed))
}
