//! Random selection primitives. Every caller passes its own RNG so sessions can
//! be seeded deterministically.

use rand::Rng;
use rand::seq::{SliceRandom, index};

/// Returns a uniformly shuffled copy of `items`, leaving the input untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Picks up to `n` items without replacement, in random order.
///
/// Returns every item (shuffled) when fewer than `n` are available.
pub fn sample_distinct<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    let amount = n.min(items.len());
    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}
