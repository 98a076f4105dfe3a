//! Random token generation

use crate::constants::RANDOM_STRING_ALPHABET;
use rand::Rng;

/// Generate a string of exactly `n` characters drawn from [`RANDOM_STRING_ALPHABET`].
///
/// Uses the thread-local generator; fine for identifiers and file names, not for secrets.
pub fn random_string(n: usize) -> String {
    let alphabet = RANDOM_STRING_ALPHABET.as_bytes();
    let mut rng = rand::rng();

    (0..n)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}
