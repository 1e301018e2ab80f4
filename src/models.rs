use std::str::FromStr;

use getset::{CopyGetters, Getters};
use rust_decimal::prelude::*;
use serde::Serialize;

use crate::errors::ParseError;
use crate::parser::{FIELD_COUNT, FIELD_DELIMITER, clean_product_name, parse_quantity, parse_unit_price};

/// One sales event as read from the log.
///
/// Nothing here is validated beyond the numeric fields being numbers; the
/// semantic rules live in [`crate::validator`].
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Transaction {
    #[getset(get = "pub")]
    transaction_id: String,
    #[getset(get = "pub")]
    date: String,
    #[getset(get = "pub")]
    product_id: String,
    #[getset(get = "pub")]
    product_name: String,
    #[getset(get_copy = "pub")]
    quantity: i64,
    #[getset(get_copy = "pub")]
    unit_price: Decimal,
    #[getset(get = "pub")]
    customer_id: String,
    #[getset(get = "pub")]
    region: String,
}

impl Transaction {
    /// Quantity times unit price. Never stored, always recomputed.
    ///
    /// Parsing rejects rows whose amount does not fit a `Decimal`, so the
    /// saturation never kicks in for a parsed record.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

impl FromStr for Transaction {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        let [id, date, product_id, name, quantity, price, customer, region] = fields[..] else {
            return Err(ParseError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        };

        let quantity = parse_quantity(quantity)?;
        let unit_price = parse_unit_price(price)?;
        if Decimal::from(quantity).checked_mul(unit_price).is_none() {
            return Err(ParseError::AmountOverflow {
                quantity,
                unit_price: unit_price.to_string(),
            });
        }

        Ok(Transaction {
            transaction_id: id.to_string(),
            date: date.to_string(),
            product_id: product_id.to_string(),
            product_name: clean_product_name(name),
            quantity,
            unit_price,
            customer_id: customer.to_string(),
            region: region.to_string(),
        })
    }
}

/// Optional filters applied after the validity checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub region: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }
}

/// Where every input record ended up after validation and filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ValidationSummary {
    pub(crate) total_input: usize,
    pub(crate) invalid: usize,
    pub(crate) filtered_by_region: usize,
    pub(crate) filtered_by_amount: usize,
    pub(crate) final_count: usize,
}

impl ValidationSummary {
    /// Every input record lands in exactly one bucket.
    pub fn is_balanced(&self) -> bool {
        self.invalid + self.filtered_by_region + self.filtered_by_amount + self.final_count
            == self.total_input
    }
}

/// A transaction annotated with catalog metadata.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct EnrichedTransaction {
    #[getset(get = "pub")]
    transaction: Transaction,
    #[getset(get = "pub")]
    api_category: Option<String>,
    #[getset(get = "pub")]
    api_brand: Option<String>,
    #[getset(get_copy = "pub")]
    api_rating: Option<f64>,
    #[getset(get_copy = "pub")]
    api_match: bool,
}

impl EnrichedTransaction {
    pub fn matched(
        transaction: Transaction,
        category: Option<String>,
        brand: Option<String>,
        rating: Option<f64>,
    ) -> Self {
        EnrichedTransaction {
            transaction,
            api_category: category,
            api_brand: brand,
            api_rating: rating,
            api_match: true,
        }
    }

    pub fn unmatched(transaction: Transaction) -> Self {
        EnrichedTransaction {
            transaction,
            api_category: None,
            api_brand: None,
            api_rating: None,
            api_match: false,
        }
    }
}
