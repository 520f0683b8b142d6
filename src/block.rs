//! A single ledger block: an ordered transaction batch linked by
//! previous-hash, with a proof-of-work nonce.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hasher::{self, meets_difficulty};
use crate::transaction::Transaction;

/// How many nonce attempts between cancellation checks. Keeps the mining
/// loop from paying an atomic load every single iteration.
const CANCEL_POLL_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Copies `transactions`, stamps the current timestamp, sets `nonce`
    /// to 0, and computes `hash` from the canonical form. Unmined: call
    /// `mine` to satisfy a difficulty target.
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: impl Into<String>) -> Self {
        let timestamp = Utc::now();
        let previous_hash = previous_hash.into();
        let nonce = 0;
        let hash = hasher::block_hash(index, timestamp, &transactions, &previous_hash, nonce);
        Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            hash,
            nonce,
        }
    }

    fn recompute_hash(&self) -> String {
        hasher::block_hash(
            self.index,
            self.timestamp,
            &self.transactions,
            &self.previous_hash,
            self.nonce,
        )
    }

    /// Increments `nonce` and recomputes `hash` until it has a
    /// `difficulty`-character `'0'` prefix. Unbounded; no cancellation.
    pub fn mine(&mut self, difficulty: u32) {
        let never_cancel = AtomicBool::new(false);
        self.mine_cancellable(difficulty, &never_cancel);
    }

    /// Same mining loop as `mine`, but polls `cancel` every
    /// [`CANCEL_POLL_INTERVAL`] attempts. Returns `true` on success and
    /// `false` if cancelled first, leaving `nonce`/`hash` exactly as they
    /// were before the call in the cancelled case.
    pub fn mine_cancellable(&mut self, difficulty: u32, cancel: &AtomicBool) -> bool {
        let original_nonce = self.nonce;
        let original_hash = self.hash.clone();

        tracing::debug!(index = self.index, difficulty, "mining started");
        loop {
            self.hash = self.recompute_hash();
            if meets_difficulty(&self.hash, difficulty) {
                tracing::debug!(index = self.index, nonce = self.nonce, "mining succeeded");
                return true;
            }
            if self.nonce % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                self.nonce = original_nonce;
                self.hash = original_hash;
                tracing::debug!(index = self.index, "mining cancelled");
                return false;
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Recomputes the hash from current fields and compares it with the
    /// stored `hash`. Any setter on `index`, `timestamp`, `previous_hash`,
    /// `transactions`, or `nonce` that isn't followed by a hash
    /// recomputation will make this return `false`.
    pub fn is_hash_valid(&self) -> bool {
        self.hash == self.recompute_hash()
    }

    /// The external persisted-row shape: `transactions` serialized as a
    /// JSON array blob rather than nested structurally, to match the `text`
    /// column the out-of-scope persistence layer expects.
    pub fn to_persisted_record(&self) -> BlockRecord {
        BlockRecord {
            block_index: self.index,
            timestamp: self.timestamp,
            transactions: serde_json::to_string(&self.transactions)
                .expect("Vec<Transaction> always serializes"),
            previous_hash: self.previous_hash.clone(),
            hash: self.hash.clone(),
            nonce: self.nonce,
        }
    }
}

/// External persisted-row layout for a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub block_index: u64,
    pub timestamp: DateTime<Utc>,
    pub transactions: String,
    pub previous_hash: String,
    pub hash: String,
    pub nonce: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_block_has_valid_hash() {
        let block = Block::new(0, vec![], "0");
        assert!(block.is_hash_valid());
    }

    #[test]
    fn mining_satisfies_difficulty() {
        let mut block = Block::new(1, vec![], "prevhash");
        block.mine(2);
        assert!(block.hash.starts_with("00"));
        assert!(block.is_hash_valid());
    }

    #[test]
    fn mutating_index_invalidates_hash() {
        let mut block = Block::new(0, vec![], "0");
        block.index = 99;
        assert!(!block.is_hash_valid());
    }

    #[test]
    fn mutating_previous_hash_invalidates_hash() {
        let mut block = Block::new(1, vec![], "a".repeat(64));
        block.previous_hash = "CORRUPTED".into();
        assert!(!block.is_hash_valid());
    }

    #[test]
    fn recomputing_and_reassigning_restores_validity() {
        let mut block = Block::new(0, vec![], "0");
        block.nonce = 42;
        assert!(!block.is_hash_valid());
        block.hash = block.recompute_hash();
        assert!(block.is_hash_valid());
    }

    #[test]
    fn persisted_record_embeds_transactions_as_json_text() {
        let block = Block::new(0, vec![], "0");
        let record = block.to_persisted_record();
        assert_eq!(record.block_index, 0);
        assert_eq!(record.transactions, "[]");
    }

    #[test]
    fn cancelled_mine_leaves_state_unchanged() {
        let mut block = Block::new(1, vec![], "prevhash");
        let original_nonce = block.nonce;
        let original_hash = block.hash.clone();

        let cancel = AtomicBool::new(true);
        // difficulty high enough that a single check triggers cancellation
        // before any solution is found, given CANCEL_POLL_INTERVAL divides
        // evenly into the starting nonce of 0.
        let completed = block.mine_cancellable(64, &cancel);

        assert!(!completed);
        assert_eq!(block.nonce, original_nonce);
        assert_eq!(block.hash, original_hash);
    }
}
