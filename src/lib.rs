pub mod analytics;
pub mod catalog;
pub mod config;
pub mod csv_writer;
pub mod enrichment;
pub mod errors;
pub mod loader;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod traits;
pub mod validator;

pub use analytics::{
    CustomerStats, DailyStats, PeakDay, ProductSales, RegionStats, SalesAnalytics,
    calculate_total_revenue, customer_analysis, daily_sales_trend, find_peak_sales_day,
    low_performing_products, region_wise_sales, top_selling_products,
};
pub use catalog::{CatalogEntry, CatalogProduct, HttpCatalog, create_product_mapping};
pub use config::PipelineConfig;
pub use enrichment::{EnrichmentStats, enrich_sales_data};
pub use loader::{load_lines, read_sales_lines};
pub use models::{EnrichedTransaction, FilterOptions, Transaction, ValidationSummary};
pub use parser::parse_transactions;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use validator::validate_and_filter;
