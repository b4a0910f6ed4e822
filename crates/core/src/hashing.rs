//! SHA-256 helpers used for credential comparison and fingerprints.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Number of hex characters kept in a credential fingerprint.
pub const FINGERPRINT_LEN: usize = 8;

/// Short, non-reversible label for a bearer token, safe to put in audit rows.
pub fn token_fingerprint(token: &str) -> String {
    let mut digest = sha256_hex(token.as_bytes());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// Compare two secrets by digest so the comparison cost does not depend on
/// where the inputs first differ or on their lengths.
pub fn digest_eq(candidate: &str, expected: &str) -> bool {
    let a = Sha256::digest(candidate.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
