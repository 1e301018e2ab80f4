use std::path::PathBuf;
use std::time::Duration;

use crate::analytics::{DEFAULT_LOW_THRESHOLD, DEFAULT_TOP_LIMIT};
use crate::catalog::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT};
use crate::models::FilterOptions;

pub const DEFAULT_INPUT: &str = "data/sales_data.txt";
pub const DEFAULT_ENRICHED_OUTPUT: &str = "data/enriched_sales_data.txt";
pub const DEFAULT_REPORT_OUTPUT: &str = "output/sales_report.txt";

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub enriched_output: PathBuf,
    pub report_output: PathBuf,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
    /// Skip the catalog entirely, as if it were unreachable.
    pub offline: bool,
    pub top_limit: usize,
    pub low_threshold: i64,
    pub filters: FilterOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: PathBuf::from(DEFAULT_INPUT),
            enriched_output: PathBuf::from(DEFAULT_ENRICHED_OUTPUT),
            report_output: PathBuf::from(DEFAULT_REPORT_OUTPUT),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_timeout: DEFAULT_TIMEOUT,
            offline: false,
            top_limit: DEFAULT_TOP_LIMIT,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            filters: FilterOptions::default(),
        }
    }
}
