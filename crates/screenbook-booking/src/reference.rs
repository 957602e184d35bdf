//! Human-readable booking references.

use rand::Rng;

const REFERENCE_PREFIX: &str = "ROSE";

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

/// `ROSE-` followed by six characters from `A-Z0-9`.
pub fn generate_reference() -> String {
    let mut rng = rand::rng();
    let code: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{REFERENCE_PREFIX}-{code}")
}
