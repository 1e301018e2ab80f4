use std::collections::HashMap;
use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::errors::CatalogError;
use crate::traits::ProductSource;

pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products?limit=100";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<CatalogProduct>,
}

/// Catalog metadata attached to a matched transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub title: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
}

pub type ProductMapping = HashMap<i64, CatalogEntry>;

/// Product catalog served over HTTP as `{"products": [...]}`.
#[derive(Debug)]
pub struct HttpCatalog {
    client: Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpCatalog {
            client,
            url: url.into(),
        })
    }
}

impl ProductSource for HttpCatalog {
    fn fetch_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_products(&body)
    }
}

pub fn parse_products(body: &str) -> Result<Vec<CatalogProduct>, CatalogError> {
    let response: ProductsResponse = serde_json::from_str(body)?;
    Ok(response.products)
}

/// Catalog failures never leave this function: an unavailable catalog is an
/// empty one.
pub fn fetch_catalog_or_empty(source: &impl ProductSource) -> Vec<CatalogProduct> {
    match source.fetch_products() {
        Ok(products) => {
            info!("catalog returned {} products", products.len());
            products
        }
        Err(e) => {
            warn!("catalog unavailable, continuing without it: {e}");
            Vec::new()
        }
    }
}

/// Indexes products by numeric id. Products without an id are skipped and a
/// repeated id keeps the last entry.
pub fn create_product_mapping(products: Vec<CatalogProduct>) -> ProductMapping {
    products
        .into_iter()
        .filter_map(|p| {
            let id = p.id?;
            Some((
                id,
                CatalogEntry {
                    title: p.title,
                    category: p.category,
                    brand: p.brand,
                    rating: p.rating,
                },
            ))
        })
        .collect()
}
