//! Product authenticity verification from ledger facts.

use crate::chain::BlockchainManager;
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticityStatus {
    Confirmed,
    Rejected,
    /// Internal-only initial state; never returned to callers.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticityResult {
    pub product_id: String,
    pub authentic: bool,
    pub status: AuthenticityStatus,
    pub reasons: Vec<String>,
}

pub struct AuthenticityVerifier<'a> {
    chain: &'a BlockchainManager,
}

impl<'a> AuthenticityVerifier<'a> {
    pub fn new(chain: &'a BlockchainManager) -> Self {
        Self { chain }
    }

    /// Rejects an empty (after trim) `product_id` with `InvalidArgument`.
    /// Otherwise: empty history → "not found in ledger"; chain invalid →
    /// "integrity compromised"; any self-invalid transaction in the
    /// product's history → "invalid transaction <id>"; else confirmed,
    /// carrying the count of valid transactions.
    pub fn verify_product_authenticity(
        &self,
        product_id: &str,
    ) -> LedgerResult<AuthenticityResult> {
        if product_id.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(
                "product_id must not be empty".into(),
            ));
        }

        let history = self.chain.get_product_history(product_id);
        if history.is_empty() {
            tracing::info!(product_id, "authenticity rejected: not found in ledger");
            return Ok(AuthenticityResult {
                product_id: product_id.to_string(),
                authentic: false,
                status: AuthenticityStatus::Rejected,
                reasons: vec!["not found in ledger".into()],
            });
        }

        if !self.chain.is_chain_valid() {
            tracing::info!(product_id, "authenticity rejected: integrity compromised");
            return Ok(AuthenticityResult {
                product_id: product_id.to_string(),
                authentic: false,
                status: AuthenticityStatus::Rejected,
                reasons: vec!["integrity compromised".into()],
            });
        }

        for tx in &history {
            if !tx.is_valid() {
                let reason = format!("invalid transaction {}", tx.identifier);
                tracing::info!(product_id, reason = %reason, "authenticity rejected");
                return Ok(AuthenticityResult {
                    product_id: product_id.to_string(),
                    authentic: false,
                    status: AuthenticityStatus::Rejected,
                    reasons: vec![reason],
                });
            }
        }

        let reason = format!("{} valid transactions", history.len());
        tracing::info!(product_id, reason = %reason, "authenticity confirmed");
        Ok(AuthenticityResult {
            product_id: product_id.to_string(),
            authentic: true,
            status: AuthenticityStatus::Confirmed,
            reasons: vec![reason],
        })
    }
}
