//! The authoritative in-memory chain, its mempool, and the mining/validation
//! operations built on top of them.
//!
//! Concurrency discipline: one `RwLock` guards both the block vector and
//! the mempool together, so a mining call's "snapshot mempool, append
//! block, clear mempool" section is a single atomic section under the
//! lock — no reader can observe the chain extended but the mempool still
//! full, or vice versa.

use std::sync::RwLock;

use crate::block::Block;
use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::Transaction;

/// Sentinel `previousHash` for the genesis block: the single-character
/// `"0"`, used consistently everywhere a previous-hash is compared.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

struct ChainState {
    blocks: Vec<Block>,
    mempool: Vec<Transaction>,
}

pub struct BlockchainManager {
    state: RwLock<ChainState>,
    difficulty: u32,
}

impl BlockchainManager {
    /// Constructs a new chain with the genesis block already appended.
    pub fn new(config: Config) -> Self {
        let genesis = Block::new(0, vec![], GENESIS_PREVIOUS_HASH);
        Self {
            state: RwLock::new(ChainState {
                blocks: vec![genesis],
                mempool: Vec::new(),
            }),
            difficulty: config.difficulty,
        }
    }

    pub fn with_difficulty(difficulty: u32) -> Self {
        Self::new(Config { difficulty })
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Appends `tx` to the mempool. No validation, no identifier
    /// uniqueness check — both are deferred (validation to mining,
    /// uniqueness to a higher layer).
    pub fn add_transaction(&self, tx: Transaction) {
        let mut state = self.state.write().expect("chain lock poisoned");
        state.mempool.push(tx);
    }

    /// Snapshots the mempool as the new block's transactions, mines it at
    /// the configured difficulty, appends it, and clears the mempool — all
    /// under one write-lock acquisition. Always produces exactly one block,
    /// even an empty one if the mempool was empty at the instant of the
    /// call.
    pub fn mine_pending_transactions(&self) -> Block {
        let mut state = self.state.write().expect("chain lock poisoned");

        let pending = std::mem::take(&mut state.mempool);
        let previous_hash = state
            .blocks
            .last()
            .expect("chain always has at least the genesis block")
            .hash
            .clone();
        let index = state.blocks.len() as u64;

        let mut block = Block::new(index, pending, previous_hash);
        block.mine(self.difficulty);

        tracing::debug!(index, transactions = block.transactions.len(), "block mined");
        state.blocks.push(block.clone());
        block
    }

    /// Defensive copy of the chain view.
    pub fn get_chain(&self) -> Vec<Block> {
        let state = self.state.read().expect("chain lock poisoned");
        state.blocks.clone()
    }

    /// The block with the highest index.
    pub fn get_latest_block(&self) -> Block {
        let state = self.state.read().expect("chain lock poisoned");
        state
            .blocks
            .last()
            .cloned()
            .expect("chain always has at least the genesis block")
    }

    /// Concatenation of transaction sequences of non-genesis blocks, in
    /// chain order. Timestamps of returned transactions are non-decreasing
    /// as long as blocks were mined in order.
    pub fn get_transaction_history(&self) -> Vec<Transaction> {
        let state = self.state.read().expect("chain lock poisoned");
        state
            .blocks
            .iter()
            .skip(1)
            .flat_map(|block| block.transactions.iter().cloned())
            .collect()
    }

    /// The traceability projection: the subsequence of transactions whose
    /// productId equals `product_id`, preserving chain order. Empty if the
    /// product has no recorded event.
    pub fn get_product_history(&self, product_id: &str) -> Vec<Transaction> {
        let state = self.state.read().expect("chain lock poisoned");
        state
            .blocks
            .iter()
            .skip(1)
            .flat_map(|block| block.transactions.iter())
            .filter(|tx| tx.product_id() == product_id)
            .cloned()
            .collect()
    }

    /// Walks blocks `C[1..n]`, checking the hash invariant, previous-hash
    /// linkage, and (for non-genesis blocks) the difficulty prefix. Genesis
    /// is exempt from the difficulty check but its hash invariant is still
    /// implicitly guaranteed by construction. Returns `false` on the first
    /// detected failure — this is detection, not repair; no mutation
    /// happens here.
    pub fn is_chain_valid(&self) -> bool {
        self.validate_chain().is_ok()
    }

    /// Same walk as `is_chain_valid`, but returns the specific failure
    /// reason instead of a bare boolean.
    pub fn validate_chain(&self) -> LedgerResult<()> {
        let state = self.state.read().expect("chain lock poisoned");

        for (i, block) in state.blocks.iter().enumerate() {
            if !block.is_hash_valid() {
                let reason = format!("block {i} hash does not match its recomputed content");
                tracing::warn!(index = i, "chain validation failed: {reason}");
                return Err(LedgerError::ChainValidation(reason));
            }
            if i == 0 {
                continue;
            }
            let previous = &state.blocks[i - 1];
            if block.previous_hash != previous.hash {
                let reason = format!("block {i} previous_hash does not match block {}'s hash", i - 1);
                tracing::warn!(index = i, "chain validation failed: {reason}");
                return Err(LedgerError::ChainValidation(reason));
            }
            if !crate::hasher::meets_difficulty(&block.hash, self.difficulty) {
                let reason = format!(
                    "block {i} hash does not satisfy the difficulty-{} prefix",
                    self.difficulty
                );
                tracing::warn!(index = i, "chain validation failed: {reason}");
                return Err(LedgerError::ChainValidation(reason));
            }
        }
        Ok(())
    }
}
