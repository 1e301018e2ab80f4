use log::debug;
use rust_decimal::prelude::*;

use crate::errors::ParseError;
use crate::models::Transaction;

pub const FIELD_DELIMITER: char = '|';
pub const FIELD_COUNT: usize = 8;

const THOUSANDS_SEPARATOR: char = ',';

/// Parses every raw line, dropping and counting the ones that do not form a
/// transaction. Output order follows input order.
///
/// # Returns
/// The parsed transactions and the number of malformed lines.
pub fn parse_transactions<S: AsRef<str>>(lines: &[S]) -> (Vec<Transaction>, usize) {
    let mut transactions = Vec::with_capacity(lines.len());
    let mut malformed = 0;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(tx) => transactions.push(tx),
            Err(e) => {
                debug!("skipping line {}: {e}", idx + 1);
                malformed += 1;
            }
        }
    }

    (transactions, malformed)
}

pub fn parse_line(line: &str) -> Result<Transaction, ParseError> {
    line.parse()
}

pub(crate) fn clean_product_name(raw: &str) -> String {
    raw.replace(THOUSANDS_SEPARATOR, "")
}

pub(crate) fn parse_quantity(raw: &str) -> Result<i64, ParseError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidQuantity(raw.to_string()))
}

pub(crate) fn parse_unit_price(raw: &str) -> Result<Decimal, ParseError> {
    let cleaned = raw.replace(THOUSANDS_SEPARATOR, "");
    let cleaned = cleaned.trim();

    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .map_err(|_| ParseError::InvalidUnitPrice(raw.to_string()))
}
