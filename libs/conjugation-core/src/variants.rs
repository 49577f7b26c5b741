//! Decoy generation for insertion choices.

use crate::types::Operation;
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of choices offered per insertion, correct answer included.
pub const DEFAULT_VARIANT_COUNT: usize = 4;

/// Build the choice set for one insertion: `correct` plus `count - 1`
/// decoys, shuffled.
///
/// Decoys come from other insertions in `pool` with the same char length
/// and a different text, in encounter order; synthetic lowercase strings
/// pad out the rest. Decoys are pairwise distinct and never equal the
/// correct text. Output order is random, so tests should assert on set
/// membership, not position.
pub fn generate_variants<R: Rng>(
    correct: &str,
    pool: &[Operation],
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let correct_len = correct.chars().count();
    if correct_len == 0 || count <= 1 {
        return vec![correct.to_string()];
    }

    let mut decoys: Vec<String> = Vec::new();
    for op in pool {
        if let Operation::Insert { text, .. } = op {
            if text != correct
                && text.chars().count() == correct_len
                && !decoys.iter().any(|d| d == text)
            {
                decoys.push(text.clone());
            }
        }
    }
    decoys.truncate(count - 1);

    while decoys.len() < count - 1 {
        let candidate = random_lowercase(correct_len, rng);
        if candidate != correct && !decoys.contains(&candidate) {
            decoys.push(candidate);
        }
    }

    let mut variants = Vec::with_capacity(count);
    variants.push(correct.to_string());
    variants.append(&mut decoys);
    variants.shuffle(rng);
    variants
}

fn random_lowercase<R: Rng>(len: usize, rng: &mut R) -> String {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}
