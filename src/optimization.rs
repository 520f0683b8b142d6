//! Derived recommendations from ledger statistics.

use std::collections::BTreeMap;

use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationType {
    TransitTimeOptimization,
    VolumeBottleneck,
    SupplierUnderutilization,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub recommendation_type: RecommendationType,
    pub suggestion: String,
    pub expected_impact: String,
}

const TRANSIT_TIME_THRESHOLD_HOURS: f64 = 48.0;
const TRANSIT_TIME_EXPECTED_REDUCTION_PCT: u32 = 30;
const VOLUME_BOTTLENECK_SHARE_THRESHOLD: f64 = 0.60;
const UNDERUTILIZATION_RATIO_THRESHOLD: f64 = 0.50;

pub struct OptimizationAnalyzer;

impl OptimizationAnalyzer {
    /// Runs all three recommendation classes over `transactions`, which the
    /// caller has already sliced from the ledger however they see fit.
    pub fn analyze(transactions: &[Transaction]) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        recommendations.extend(Self::transit_time_recommendations(transactions));
        recommendations.extend(Self::volume_bottleneck_recommendations(transactions));
        recommendations.extend(Self::supplier_underutilization_recommendations(transactions));
        recommendations
    }

    fn transit_time_recommendations(transactions: &[Transaction]) -> Vec<Recommendation> {
        let mut by_product: BTreeMap<&str, Vec<_>> = BTreeMap::new();
        for tx in transactions {
            by_product.entry(tx.product_id()).or_default().push(tx);
        }

        let mut recommendations = Vec::new();
        for (product_id, mut events) in by_product {
            if events.len() < 2 {
                continue;
            }
            events.sort_by_key(|tx| tx.timestamp);

            let mut total_hours = 0.0;
            for pair in events.windows(2) {
                let delta = pair[1].timestamp - pair[0].timestamp;
                total_hours += delta.num_seconds() as f64 / 3600.0;
            }
            let mean_hours = total_hours / (events.len() - 1) as f64;

            if mean_hours > TRANSIT_TIME_THRESHOLD_HOURS {
                recommendations.push(Recommendation {
                    recommendation_type: RecommendationType::TransitTimeOptimization,
                    suggestion: format!(
                        "Streamline handoffs for product {product_id}; average gap between events is {mean_hours:.1}h"
                    ),
                    expected_impact: format!(
                        "Expected {TRANSIT_TIME_EXPECTED_REDUCTION_PCT}% reduction in transit time"
                    ),
                });
            }
        }
        recommendations
    }

    fn volume_bottleneck_recommendations(transactions: &[Transaction]) -> Vec<Recommendation> {
        if transactions.is_empty() {
            return Vec::new();
        }

        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        for tx in transactions {
            *by_type.entry(tx.type_tag()).or_insert(0) += 1;
        }

        let total = transactions.len() as f64;
        by_type
            .into_iter()
            .filter(|(_, count)| *count as f64 / total > VOLUME_BOTTLENECK_SHARE_THRESHOLD)
            .map(|(type_tag, count)| Recommendation {
                recommendation_type: RecommendationType::VolumeBottleneck,
                suggestion: format!(
                    "{type_tag} accounts for {count} of {} transactions; diversify workload or add capacity",
                    transactions.len()
                ),
                expected_impact: "Expected reduction in processing bottlenecks".to_string(),
            })
            .collect()
    }

    fn supplier_underutilization_recommendations(transactions: &[Transaction]) -> Vec<Recommendation> {
        let mut by_party: BTreeMap<&str, usize> = BTreeMap::new();
        for tx in transactions {
            if let Some(from_party) = tx.from_party() {
                *by_party.entry(from_party).or_insert(0) += 1;
            }
        }

        if by_party.len() < 2 {
            return Vec::new();
        }

        let total: usize = by_party.values().sum();
        let mean = total as f64 / by_party.len() as f64;

        by_party
            .into_iter()
            .filter(|(_, count)| (*count as f64) < UNDERUTILIZATION_RATIO_THRESHOLD * mean)
            .map(|(party, count)| Recommendation {
                recommendation_type: RecommendationType::SupplierUnderutilization,
                suggestion: format!(
                    "Supplier {party} handled only {count} transactions against a mean of {mean:.1}; consider reallocating volume"
                ),
                expected_impact: "Expected more balanced supplier utilization".to_string(),
            })
            .collect()
    }
}
