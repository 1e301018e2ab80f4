use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file encoding not supported: {}", .0.display())]
    UnsupportedEncoding(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("quantity {0:?} is not an integer")]
    InvalidQuantity(String),

    #[error("unit price {0:?} is not a decimal number")]
    InvalidUnitPrice(String),

    #[error("amount of {quantity} x {unit_price} is out of range")]
    AmountOverflow { quantity: i64, unit_price: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("value overflow")]
    ValueOverflow,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog responded with HTTP {0}")]
    Status(u16),

    #[error("catalog response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
