//! Per-product chronological projection and completeness report.

use crate::chain::BlockchainManager;
use crate::transaction::{ProductStatus, Transaction, TransactionPayload};

#[derive(Debug, Clone, PartialEq)]
pub struct TraceabilityReport {
    pub product_id: String,
    pub origin: Option<String>,
    pub current_location: Option<String>,
    pub current_status: Option<ProductStatus>,
    pub history: Vec<Transaction>,
    pub complete: bool,
    pub incomplete_reasons: Vec<String>,
}

pub struct TraceabilityService<'a> {
    chain: &'a BlockchainManager,
}

impl<'a> TraceabilityService<'a> {
    pub fn new(chain: &'a BlockchainManager) -> Self {
        Self { chain }
    }

    pub fn get_product_history(&self, product_id: &str) -> Vec<Transaction> {
        self.chain.get_product_history(product_id)
    }

    /// Extracts `origin` from the first PRODUCT_CREATION, and
    /// `currentLocation`/`currentStatus` from the most recent
    /// PRODUCT_TRANSFER, falling back to the origin/CREATED pair when no
    /// transfers exist. Flags the report incomplete if any of the three
    /// cannot be derived, naming each missing field.
    pub fn generate_report(&self, product_id: &str) -> TraceabilityReport {
        let history = self.get_product_history(product_id);

        if history.is_empty() {
            return TraceabilityReport {
                product_id: product_id.to_string(),
                origin: None,
                current_location: None,
                current_status: None,
                history,
                complete: false,
                incomplete_reasons: vec!["no history".into()],
            };
        }

        let origin = history.iter().find_map(|tx| match &tx.payload {
            TransactionPayload::ProductCreation { origin, .. } => Some(origin.clone()),
            _ => None,
        });

        let latest_transfer = history.iter().rev().find_map(|tx| match &tx.payload {
            TransactionPayload::ProductTransfer {
                to_location,
                new_status,
                ..
            } => Some((to_location.clone(), *new_status)),
            _ => None,
        });

        let (current_location, current_status) = match latest_transfer {
            Some((location, status)) => (Some(location), Some(status)),
            None => (origin.clone(), origin.as_ref().map(|_| ProductStatus::Created)),
        };

        let mut incomplete_reasons = Vec::new();
        if origin.is_none() {
            incomplete_reasons.push("missing origin".into());
        }
        if current_location.is_none() {
            incomplete_reasons.push("missing currentLocation".into());
        }
        if current_status.is_none() {
            incomplete_reasons.push("missing currentStatus".into());
        }

        TraceabilityReport {
            product_id: product_id.to_string(),
            origin,
            current_location,
            current_status,
            history,
            complete: incomplete_reasons.is_empty(),
            incomplete_reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionPayload;
    use chrono::Utc;

    fn creation_tx(id: &str, product_id: &str, origin: &str) -> Transaction {
        Transaction::new(
            id,
            Utc::now(),
            TransactionPayload::ProductCreation {
                supplier_id: "S".into(),
                product_id: product_id.into(),
                product_name: "Coffee".into(),
                product_description: String::new(),
                origin: origin.into(),
            },
        )
    }

    fn transfer_tx(id: &str, product_id: &str, to_location: &str, status: ProductStatus) -> Transaction {
        Transaction::new(
            id,
            Utc::now(),
            TransactionPayload::ProductTransfer {
                from_party: "S".into(),
                to_party: "R".into(),
                product_id: product_id.into(),
                from_location: "Colombia".into(),
                to_location: to_location.into(),
                new_status: status,
            },
        )
    }

    #[test]
    fn no_history_is_incomplete() {
        let chain = BlockchainManager::with_difficulty(2);
        let service = TraceabilityService::new(&chain);
        let report = service.generate_report("unknown");
        assert!(!report.complete);
        assert_eq!(report.incomplete_reasons, vec!["no history".to_string()]);
    }

    #[test]
    fn creation_only_falls_back_to_origin_and_created() {
        let chain = BlockchainManager::with_difficulty(2);
        chain.add_transaction(creation_tx("TX1", "P", "Colombia"));
        chain.mine_pending_transactions();

        let service = TraceabilityService::new(&chain);
        let report = service.generate_report("P");
        assert!(report.complete);
        assert_eq!(report.origin, Some("Colombia".to_string()));
        assert_eq!(report.current_location, Some("Colombia".to_string()));
        assert_eq!(report.current_status, Some(ProductStatus::Created));
    }

    #[test]
    fn create_and_transfer_is_complete() {
        let chain = BlockchainManager::with_difficulty(2);
        chain.add_transaction(creation_tx("TX1", "P", "Colombia"));
        chain.mine_pending_transactions();
        chain.add_transaction(transfer_tx("TX2", "P", "Warehouse", ProductStatus::InTransit));
        chain.mine_pending_transactions();

        let service = TraceabilityService::new(&chain);
        let report = service.generate_report("P");
        assert!(report.complete);
        assert_eq!(report.origin, Some("Colombia".to_string()));
        assert_eq!(report.current_location, Some("Warehouse".to_string()));
        assert_eq!(report.current_status, Some(ProductStatus::InTransit));
    }
}
