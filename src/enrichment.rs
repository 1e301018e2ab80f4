use log::info;
use rust_decimal::prelude::*;

use crate::catalog::ProductMapping;
use crate::models::{EnrichedTransaction, Transaction};

/// Numeric catalog key of a product id such as `P101`.
///
/// `None` covers every way the id can fail to resolve; callers do not need to
/// tell them apart.
pub fn product_key(product_id: &str) -> Option<i64> {
    product_id.strip_prefix('P')?.trim().parse().ok()
}

/// Annotates each transaction with its catalog entry. One output per input,
/// same order.
pub fn enrich_sales_data(
    transactions: Vec<Transaction>,
    mapping: &ProductMapping,
) -> Vec<EnrichedTransaction> {
    let enriched: Vec<EnrichedTransaction> = transactions
        .into_iter()
        .map(|tx| {
            match product_key(tx.product_id()).and_then(|key| mapping.get(&key)) {
                Some(entry) => EnrichedTransaction::matched(
                    tx,
                    entry.category.clone(),
                    entry.brand.clone(),
                    entry.rating,
                ),
                None => EnrichedTransaction::unmatched(tx),
            }
        })
        .collect();

    info!(
        "enriched {} records, {} matched the catalog",
        enriched.len(),
        enriched.iter().filter(|e| e.api_match()).count()
    );

    enriched
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentStats {
    pub total: usize,
    pub matched: usize,
    pub match_rate: Decimal,
    pub unmatched_products: Vec<String>,
}

impl EnrichmentStats {
    pub fn from_records(records: &[EnrichedTransaction]) -> Self {
        let matched = records.iter().filter(|e| e.api_match()).count();

        let match_rate = if records.is_empty() {
            Decimal::ZERO
        } else {
            (Decimal::from(matched) / Decimal::from(records.len()) * dec!(100)).round_dp(2)
        };

        let mut unmatched_products: Vec<String> = Vec::new();
        for record in records.iter().filter(|e| !e.api_match()) {
            let id = record.transaction().product_id();
            if !unmatched_products.contains(id) {
                unmatched_products.push(id.clone());
            }
        }

        EnrichmentStats {
            total: records.len(),
            matched,
            match_rate,
            unmatched_products,
        }
    }
}
