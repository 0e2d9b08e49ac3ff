//! CPU-bound workload: iterated SHA-256.

use sha2::{Digest, Sha256};

pub const ROUNDS: usize = 1000;

/// Hash `name`, then hash the lowercase hex digest, `ROUNDS` times in total.
pub fn process_name(name: &str) -> String {
    (0..ROUNDS).fold(name.to_string(), |current, _| {
        hex::encode(Sha256::digest(current.as_bytes()))
    })
}
