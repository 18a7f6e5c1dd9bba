//! Content fingerprints for cache-busting filenames.

use sha2::{Digest, Sha256};

/// Number of hex characters embedded in filenames.
pub const FINGERPRINT_LEN: usize = 20;

/// Compute SHA256 hash of bytes and return as hex string
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Fingerprint of some content, as embedded in a filename.
pub fn fingerprint(data: &[u8]) -> String {
    let mut full = hash_bytes(data);
    full.truncate(FINGERPRINT_LEN);
    full
}

/// Whether `token` looks like a fingerprint produced by [`fingerprint`].
pub fn is_fingerprint(token: &str) -> bool {
    token.len() == FINGERPRINT_LEN && token.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
