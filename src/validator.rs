use log::info;
use rust_decimal::prelude::*;

use crate::models::{FilterOptions, Transaction, ValidationSummary};

/// Why a record did not make it into the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Invalid,
    Region,
    Amount,
}

/// Applies the validity rules in order. The first failing rule decides.
pub fn is_valid(tx: &Transaction) -> bool {
    tx.quantity() > 0
        && tx.unit_price() > Decimal::ZERO
        && !tx.customer_id().is_empty()
        && !tx.region().is_empty()
        && tx.transaction_id().starts_with('T')
        && tx.product_id().starts_with('P')
        && tx.customer_id().starts_with('C')
}

/// Classifies one record. Validity is checked first, then region, then the
/// amount bounds, so a record is only ever counted once.
pub fn check(tx: &Transaction, filters: &FilterOptions) -> Result<(), Rejection> {
    if !is_valid(tx) {
        return Err(Rejection::Invalid);
    }

    if let Some(region) = &filters.region {
        if tx.region() != region {
            return Err(Rejection::Region);
        }
    }

    let amount = tx.amount();
    if filters.min_amount.is_some_and(|min| amount < min) {
        return Err(Rejection::Amount);
    }
    if filters.max_amount.is_some_and(|max| amount > max) {
        return Err(Rejection::Amount);
    }

    Ok(())
}

pub fn validate_and_filter(
    transactions: Vec<Transaction>,
    filters: &FilterOptions,
) -> (Vec<Transaction>, ValidationSummary) {
    let mut summary = ValidationSummary {
        total_input: transactions.len(),
        ..Default::default()
    };

    let kept: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| match check(tx, filters) {
            Ok(()) => true,
            Err(Rejection::Invalid) => {
                summary.invalid += 1;
                false
            }
            Err(Rejection::Region) => {
                summary.filtered_by_region += 1;
                false
            }
            Err(Rejection::Amount) => {
                summary.filtered_by_amount += 1;
                false
            }
        })
        .collect();

    summary.final_count = kept.len();

    info!(
        "validation: {} in, {} invalid, {} filtered by region, {} filtered by amount, {} kept",
        summary.total_input,
        summary.invalid,
        summary.filtered_by_region,
        summary.filtered_by_amount,
        summary.final_count
    );

    (kept, summary)
}

/// Distinct regions in first-seen order.
pub fn available_regions(transactions: &[Transaction]) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for tx in transactions {
        if !regions.iter().any(|r| r == tx.region()) {
            regions.push(tx.region().clone());
        }
    }
    regions
}

/// Smallest and largest transaction amount, `None` on empty input.
pub fn amount_range(transactions: &[Transaction]) -> Option<(Decimal, Decimal)> {
    transactions.iter().map(Transaction::amount).fold(None, |acc, amount| match acc {
        None => Some((amount, amount)),
        Some((lo, hi)) => Some((lo.min(amount), hi.max(amount))),
    })
}
