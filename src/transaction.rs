//! The transaction capability set: polymorphism without inheritance.
//!
//! A `Transaction` is a tagged union over three concrete event kinds. Every
//! variant shares an envelope (`identifier`, `timestamp`) and projects its
//! own fields into a `BTreeMap<String, String>` attribute map — sorted by
//! construction, which is what makes the canonical encoding in `hasher`
//! deterministic without an explicit sort step at hash time.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Product lifecycle status, carried inside `PRODUCT_TRANSFER` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    Created,
    InTransit,
    Delivered,
    Verified,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProductStatus::Created => "CREATED",
            ProductStatus::InTransit => "IN_TRANSIT",
            ProductStatus::Delivered => "DELIVERED",
            ProductStatus::Verified => "VERIFIED",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(ProductStatus::Created),
            "IN_TRANSIT" => Ok(ProductStatus::InTransit),
            "DELIVERED" => Ok(ProductStatus::Delivered),
            "VERIFIED" => Ok(ProductStatus::Verified),
            other => Err(LedgerError::InvalidArgument(format!(
                "unknown product status: {other}"
            ))),
        }
    }
}

/// Per-variant payload. `data()` projects the fields verbatim into the
/// attribute map consumed by hashing and rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionPayload {
    ProductCreation {
        supplier_id: String,
        product_id: String,
        product_name: String,
        /// may be empty, never absent
        product_description: String,
        origin: String,
    },
    ProductTransfer {
        from_party: String,
        to_party: String,
        product_id: String,
        from_location: String,
        to_location: String,
        new_status: ProductStatus,
    },
    ProductVerification {
        verifier_id: String,
        product_id: String,
        verification_result: bool,
        /// may be empty, never absent
        verification_notes: String,
    },
}

impl TransactionPayload {
    pub fn type_tag(&self) -> &'static str {
        match self {
            TransactionPayload::ProductCreation { .. } => "PRODUCT_CREATION",
            TransactionPayload::ProductTransfer { .. } => "PRODUCT_TRANSFER",
            TransactionPayload::ProductVerification { .. } => "PRODUCT_VERIFICATION",
        }
    }

    /// The productId this payload refers to, used by the traceability
    /// projection in §3 ("for creation, the top-level productId").
    pub fn product_id(&self) -> &str {
        match self {
            TransactionPayload::ProductCreation { product_id, .. } => product_id,
            TransactionPayload::ProductTransfer { product_id, .. } => product_id,
            TransactionPayload::ProductVerification { product_id, .. } => product_id,
        }
    }

    /// `from_party`/`to_party` per the persisted layout in §6 — only
    /// PRODUCT_TRANSFER carries them, everything else serializes `None`.
    pub fn from_party(&self) -> Option<&str> {
        match self {
            TransactionPayload::ProductTransfer { from_party, .. } => Some(from_party),
            _ => None,
        }
    }

    pub fn to_party(&self) -> Option<&str> {
        match self {
            TransactionPayload::ProductTransfer { to_party, .. } => Some(to_party),
            _ => None,
        }
    }

    /// Attribute map projection, keys named after the variant's own fields.
    /// Sorted by construction (`BTreeMap`).
    pub fn data(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        match self {
            TransactionPayload::ProductCreation {
                supplier_id,
                product_id,
                product_name,
                product_description,
                origin,
            } => {
                map.insert("supplierId".into(), supplier_id.clone());
                map.insert("productId".into(), product_id.clone());
                map.insert("productName".into(), product_name.clone());
                map.insert("productDescription".into(), product_description.clone());
                map.insert("origin".into(), origin.clone());
            }
            TransactionPayload::ProductTransfer {
                from_party,
                to_party,
                product_id,
                from_location,
                to_location,
                new_status,
            } => {
                map.insert("fromParty".into(), from_party.clone());
                map.insert("toParty".into(), to_party.clone());
                map.insert("productId".into(), product_id.clone());
                map.insert("fromLocation".into(), from_location.clone());
                map.insert("toLocation".into(), to_location.clone());
                map.insert("newStatus".into(), new_status.to_string());
            }
            TransactionPayload::ProductVerification {
                verifier_id,
                product_id,
                verification_result,
                verification_notes,
            } => {
                map.insert("verifierId".into(), verifier_id.clone());
                map.insert("productId".into(), product_id.clone());
                map.insert("verificationResult".into(), verification_result.to_string());
                map.insert("verificationNotes".into(), verification_notes.clone());
            }
        }
        map
    }

    fn validate(&self) -> Result<(), LedgerError> {
        let invalid = |field: &str| {
            Err(LedgerError::InvalidTransaction {
                identifier: String::new(),
                reason: format!("required field '{field}' is empty"),
            })
        };
        match self {
            TransactionPayload::ProductCreation {
                supplier_id,
                product_id,
                product_name,
                origin,
                ..
            } => {
                if supplier_id.trim().is_empty() {
                    return invalid("supplierId");
                }
                if product_id.trim().is_empty() {
                    return invalid("productId");
                }
                if product_name.trim().is_empty() {
                    return invalid("productName");
                }
                if origin.trim().is_empty() {
                    return invalid("origin");
                }
                Ok(())
            }
            TransactionPayload::ProductTransfer {
                from_party,
                to_party,
                product_id,
                from_location,
                to_location,
                ..
            } => {
                if from_party.trim().is_empty() {
                    return invalid("fromParty");
                }
                if to_party.trim().is_empty() {
                    return invalid("toParty");
                }
                if product_id.trim().is_empty() {
                    return invalid("productId");
                }
                if from_location.trim().is_empty() {
                    return invalid("fromLocation");
                }
                if to_location.trim().is_empty() {
                    return invalid("toLocation");
                }
                Ok(())
            }
            TransactionPayload::ProductVerification {
                verifier_id,
                product_id,
                ..
            } => {
                if verifier_id.trim().is_empty() {
                    return invalid("verifierId");
                }
                if product_id.trim().is_empty() {
                    return invalid("productId");
                }
                Ok(())
            }
        }
    }
}

/// The common envelope plus a per-variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub identifier: String,
    pub timestamp: DateTime<Utc>,
    pub payload: TransactionPayload,
}

impl Transaction {
    pub fn new(
        identifier: impl Into<String>,
        timestamp: DateTime<Utc>,
        payload: TransactionPayload,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            timestamp,
            payload,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.payload.type_tag()
    }

    pub fn product_id(&self) -> &str {
        self.payload.product_id()
    }

    pub fn from_party(&self) -> Option<&str> {
        self.payload.from_party()
    }

    pub fn to_party(&self) -> Option<&str> {
        self.payload.to_party()
    }

    pub fn data(&self) -> BTreeMap<String, String> {
        self.payload.data()
    }

    /// Self-validation: non-empty identifier, every declared required field
    /// non-empty. Does not check type tag (enforced by the type system).
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.identifier.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction {
                identifier: self.identifier.clone(),
                reason: "identifier is empty".into(),
            });
        }
        self.payload.validate().map_err(|err| match err {
            LedgerError::InvalidTransaction { reason, .. } => LedgerError::InvalidTransaction {
                identifier: self.identifier.clone(),
                reason,
            },
            other => other,
        })
    }

    /// `true` iff `validate()` succeeds. Used by `AuthenticityVerifier` as
    /// its self-validation check.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The stable textual representation folded into the canonical block
    /// hash: identifier, type, timestamp, then the sorted attribute map
    /// rendered as JSON (`BTreeMap` serializes keys in order).
    pub fn canonical_string(&self) -> String {
        let data_json =
            serde_json::to_string(&self.data()).expect("BTreeMap<String, String> always serializes");
        format!(
            "{}{}{}{}",
            self.identifier,
            self.type_tag(),
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.9f"),
            data_json
        )
    }

    /// The external persisted-row shape: `transaction_id`, `transaction_type`,
    /// `timestamp`, `from_party`/`to_party` (only populated for
    /// PRODUCT_TRANSFER), `product_id`, and `data` as a JSON text blob. The
    /// persistence layer itself is an external collaborator; this is the
    /// contract that layer consumes.
    pub fn to_persisted_record(&self) -> TransactionRecord {
        TransactionRecord {
            transaction_id: self.identifier.clone(),
            transaction_type: self.type_tag().to_string(),
            timestamp: self.timestamp,
            from_party: self.from_party().map(str::to_string),
            to_party: self.to_party().map(str::to_string),
            product_id: self.product_id().to_string(),
            data: serde_json::to_string(&self.data()).expect("BTreeMap<String, String> always serializes"),
        }
    }
}

/// External persisted-row layout for a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub transaction_type: String,
    pub timestamp: DateTime<Utc>,
    pub from_party: Option<String>,
    pub to_party: Option<String>,
    pub product_id: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation(id: &str) -> Transaction {
        Transaction::new(
            id,
            Utc::now(),
            TransactionPayload::ProductCreation {
                supplier_id: "S1".into(),
                product_id: "P1".into(),
                product_name: "Coffee".into(),
                product_description: String::new(),
                origin: "Colombia".into(),
            },
        )
    }

    #[test]
    fn empty_description_is_valid_but_absent_field_is_not() {
        let tx = creation("TX1");
        assert!(tx.is_valid());
    }

    #[test]
    fn empty_identifier_is_invalid() {
        let tx = creation("   ");
        assert!(!tx.is_valid());
    }

    #[test]
    fn empty_origin_is_invalid() {
        let mut tx = creation("TX1");
        if let TransactionPayload::ProductCreation { origin, .. } = &mut tx.payload {
            *origin = String::new();
        }
        assert!(!tx.is_valid());
    }

    #[test]
    fn data_map_is_sorted_by_key() {
        let tx = creation("TX1");
        let keys: Vec<&String> = tx.data().keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn canonical_string_is_stable_across_calls() {
        let tx = creation("TX1");
        assert_eq!(tx.canonical_string(), tx.canonical_string());
    }

    #[test]
    fn transfer_requires_all_locations() {
        let tx = Transaction::new(
            "TX2",
            Utc::now(),
            TransactionPayload::ProductTransfer {
                from_party: "S".into(),
                to_party: "R".into(),
                product_id: "P1".into(),
                from_location: String::new(),
                to_location: "Warehouse".into(),
                new_status: ProductStatus::InTransit,
            },
        );
        assert!(!tx.is_valid());
    }

    #[test]
    fn persisted_record_omits_parties_for_creation() {
        let tx = creation("TX1");
        let record = tx.to_persisted_record();
        assert_eq!(record.transaction_id, "TX1");
        assert_eq!(record.transaction_type, "PRODUCT_CREATION");
        assert!(record.from_party.is_none());
        assert!(record.to_party.is_none());
        assert!(record.data.contains("\"origin\":\"Colombia\""));
    }

    #[test]
    fn persisted_record_carries_parties_for_transfer() {
        let tx = Transaction::new(
            "TX2",
            Utc::now(),
            TransactionPayload::ProductTransfer {
                from_party: "S".into(),
                to_party: "R".into(),
                product_id: "P1".into(),
                from_location: "Colombia".into(),
                to_location: "Warehouse".into(),
                new_status: ProductStatus::InTransit,
            },
        );
        let record = tx.to_persisted_record();
        assert_eq!(record.from_party.as_deref(), Some("S"));
        assert_eq!(record.to_party.as_deref(), Some("R"));
    }

    #[test]
    fn verification_notes_may_be_empty() {
        let tx = Transaction::new(
            "TX3",
            Utc::now(),
            TransactionPayload::ProductVerification {
                verifier_id: "V1".into(),
                product_id: "P1".into(),
                verification_result: true,
                verification_notes: String::new(),
            },
        );
        assert!(tx.is_valid());
    }
}
