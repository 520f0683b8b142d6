//! Rule registry and batch evaluation against a ledger slice.

use std::collections::BTreeMap;

use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRequirement {
    pub description: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementResult {
    pub passed: bool,
    pub failing_transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplianceReport {
    pub results: BTreeMap<String, RequirementResult>,
}

#[derive(Debug, Clone, Default)]
pub struct ComplianceValidator {
    requirements: BTreeMap<String, ComplianceRequirement>,
}

impl ComplianceValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, description: impl Into<String>, rule: impl Into<String>) {
        self.requirements.insert(
            id.into(),
            ComplianceRequirement {
                description: description.into(),
                rule: rule.into(),
            },
        );
    }

    /// Evaluates every registered requirement against `transactions`,
    /// returning a per-requirement pass/fail and, for each failed
    /// requirement, the identifiers of the offending transactions.
    pub fn evaluate(&self, transactions: &[Transaction]) -> ComplianceReport {
        let mut results = BTreeMap::new();

        for (id, requirement) in &self.requirements {
            let failing: Vec<String> = transactions
                .iter()
                .filter(|tx| !satisfies_rule(&requirement.rule, tx))
                .map(|tx| tx.identifier.clone())
                .collect();

            if !failing.is_empty() {
                tracing::debug!(requirement = %id, count = failing.len(), "compliance requirement failed");
            }

            results.insert(
                id.clone(),
                RequirementResult {
                    passed: failing.is_empty(),
                    failing_transaction_ids: failing,
                },
            );
        }

        ComplianceReport { results }
    }
}

/// Recognizes three keywords in the lowercased rule string; any rule that
/// matches none of them is treated as vacuously satisfied.
fn satisfies_rule(rule: &str, tx: &Transaction) -> bool {
    let lower = rule.to_lowercase();
    let data = tx.data();

    if lower.contains("origin_required") {
        data.get("origin").is_some_and(|v| !v.trim().is_empty())
    } else if lower.contains("verification_required") {
        data.get("verified").is_some_and(|v| v.eq_ignore_ascii_case("true"))
    } else if lower.contains("timestamp_required") {
        true // timestamp is a required, non-optional field in this model
    } else {
        true
    }
}
