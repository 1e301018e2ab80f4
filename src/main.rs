use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, warn};
use rust_decimal::Decimal;

use sales_analytics::{FilterOptions, HttpCatalog, Pipeline, PipelineConfig, PipelineOutcome};
use sales_analytics::analytics::{DEFAULT_LOW_THRESHOLD, DEFAULT_TOP_LIMIT};
use sales_analytics::catalog::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT};
use sales_analytics::config::{DEFAULT_ENRICHED_OUTPUT, DEFAULT_INPUT, DEFAULT_REPORT_OUTPUT};

/// Analyse a pipe-delimited sales log and enrich it with catalog data.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Sales log to read
    #[arg(long, env = "SALES_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Where to write the enriched records
    #[arg(long, env = "SALES_ENRICHED_OUTPUT", default_value = DEFAULT_ENRICHED_OUTPUT)]
    enriched_output: PathBuf,

    /// Where to write the text report
    #[arg(long, env = "SALES_REPORT_OUTPUT", default_value = DEFAULT_REPORT_OUTPUT)]
    report_output: PathBuf,

    /// Product catalog endpoint
    #[arg(long, env = "SALES_CATALOG_URL", default_value = DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// Catalog request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    catalog_timeout: u64,

    /// Do not contact the catalog
    #[arg(long)]
    offline: bool,

    /// Keep only this region
    #[arg(long)]
    region: Option<String>,

    /// Drop transactions below this amount
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// Drop transactions above this amount
    #[arg(long)]
    max_amount: Option<Decimal>,

    /// How many products to list as top sellers
    #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
    top: usize,

    /// Quantity under which a product counts as low performing
    #[arg(long, default_value_t = DEFAULT_LOW_THRESHOLD)]
    low_threshold: i64,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input: self.input,
            enriched_output: self.enriched_output,
            report_output: self.report_output,
            catalog_url: self.catalog_url,
            catalog_timeout: std::time::Duration::from_secs(self.catalog_timeout),
            offline: self.offline,
            top_limit: self.top,
            low_threshold: self.low_threshold,
            filters: FilterOptions {
                region: self.region.filter(|r| !r.trim().is_empty()),
                min_amount: self.min_amount,
                max_amount: self.max_amount,
            },
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();

    match run(config) {
        Ok(outcome) => {
            print_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("some error occurred, please check input files and folder names: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: PipelineConfig) -> Result<PipelineOutcome> {
    let catalog = if config.offline {
        None
    } else {
        match HttpCatalog::new(config.catalog_url.clone(), config.catalog_timeout) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!("cannot build catalog client: {e}");
                None
            }
        }
    };

    let pipeline = Pipeline::new(config, catalog);
    let outcome = pipeline.run()?;
    Ok(outcome)
}

fn print_outcome(outcome: &PipelineOutcome) {
    println!("Lines read:          {}", outcome.lines_read);
    println!("Malformed lines:     {}", outcome.malformed);
    println!("Available regions:   {}", outcome.regions.join(", "));
    if let Some((lo, hi)) = outcome.amount_range {
        println!("Amount range:        {lo} to {hi}");
    }

    let summary = &outcome.summary;
    println!("Invalid records:     {}", summary.invalid());
    println!("Filtered by region:  {}", summary.filtered_by_region());
    println!("Filtered by amount:  {}", summary.filtered_by_amount());
    println!("Final valid records: {}", summary.final_count());

    println!("Total revenue:       {:.2}", outcome.analytics.total_revenue());
    println!("Matched records:     {}", outcome.enrichment.matched);
    println!("Match percentage:    {}%", outcome.enrichment.match_rate);
}
