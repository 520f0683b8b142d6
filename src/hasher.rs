//! Canonical byte encoding and SHA-256 digesting.
//!
//! The same canonical form is used to compute a block's hash, to verify it,
//! and to recompute it after a field mutation — there is exactly one
//! function that produces that form, so producer and verifier can never
//! drift apart.

use chrono::{DateTime, Utc};

use crate::transaction::Transaction;

/// `index | timestamp | transactions | previousHash | nonce`, concatenated
/// with no separators, then SHA-256'd to lowercase hex.
pub fn block_hash(
    index: u64,
    timestamp: DateTime<Utc>,
    transactions: &[Transaction],
    previous_hash: &str,
    nonce: u64,
) -> String {
    let mut preimage = String::new();
    preimage.push_str(&index.to_string());
    preimage.push_str(&timestamp.format("%Y-%m-%dT%H:%M:%S%.9f").to_string());
    for tx in transactions {
        preimage.push_str(&tx.canonical_string());
    }
    preimage.push_str(previous_hash);
    preimage.push_str(&nonce.to_string());
    sha256_hex(preimage.as_bytes())
}

/// SHA-256 of arbitrary bytes, rendered as 64 lowercase hex characters.
pub fn sha256_hex(bytes: &[u8]) -> String {
    sha256::digest(bytes)
}

/// SHA-256 of a UTF-8 string's bytes. Used both internally and as the
/// password-hashing primitive for the session layer (fixtures checked in
/// tests).
pub fn hash_utf8_hex(s: &str) -> String {
    sha256_hex(s.as_bytes())
}

/// `true` iff `hash` begins with `difficulty` `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    hash.chars().take(difficulty as usize).all(|c| c == '0')
}
