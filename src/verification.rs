//! Round-trip comparison of a caller-held transaction against the ledger's
//! copy, and a thin wrapper over chain integrity validation.

use crate::chain::BlockchainManager;
use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub positive: bool,
    pub message: String,
}

impl VerificationResult {
    fn positive(message: impl Into<String>) -> Self {
        Self {
            positive: true,
            message: message.into(),
        }
    }

    fn negative(message: impl Into<String>) -> Self {
        Self {
            positive: false,
            message: message.into(),
        }
    }
}

pub struct TransactionVerificationService<'a> {
    chain: &'a BlockchainManager,
}

impl<'a> TransactionVerificationService<'a> {
    pub fn new(chain: &'a BlockchainManager) -> Self {
        Self { chain }
    }

    /// Walks the ledger's transaction history looking for a match on
    /// `tx.identifier`. Missing → negative "not found". Found → structural
    /// comparison of identifier, type, timestamp, and data map; any
    /// difference → negative "data mismatch"; full equality → positive.
    pub fn verify_transaction(&self, tx: &Transaction) -> VerificationResult {
        let history = self.chain.get_transaction_history();
        let Some(ledger_tx) = history.iter().find(|t| t.identifier == tx.identifier) else {
            tracing::info!(identifier = %tx.identifier, "transaction verification: not found");
            return VerificationResult::negative("not found");
        };

        let matches = ledger_tx.identifier == tx.identifier
            && ledger_tx.type_tag() == tx.type_tag()
            && ledger_tx.timestamp == tx.timestamp
            && ledger_tx.data() == tx.data();

        if matches {
            VerificationResult::positive(format!("transaction {} verified", tx.identifier))
        } else {
            tracing::info!(identifier = %tx.identifier, "transaction verification: data mismatch");
            VerificationResult::negative("data mismatch")
        }
    }

    /// Thin wrapper over `BlockchainManager::is_chain_valid`.
    pub fn validate_blockchain_integrity(&self) -> VerificationResult {
        if self.chain.is_chain_valid() {
            VerificationResult::positive("blockchain integrity verified")
        } else {
            VerificationResult::negative("blockchain integrity compromised")
        }
    }
}
