use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use rust_decimal::Decimal;

use crate::analytics::SalesAnalytics;
use crate::catalog::{create_product_mapping, fetch_catalog_or_empty};
use crate::config::PipelineConfig;
use crate::csv_writer::save_enriched_data;
use crate::enrichment::{EnrichmentStats, enrich_sales_data};
use crate::loader::load_lines;
use crate::models::{EnrichedTransaction, ValidationSummary};
use crate::parser::parse_transactions;
use crate::report::generate_sales_report;
use crate::traits::ProductSource;
use crate::validator::{amount_range, available_regions, validate_and_filter};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub lines_read: usize,
    pub malformed: usize,
    pub regions: Vec<String>,
    pub amount_range: Option<(Decimal, Decimal)>,
    pub summary: ValidationSummary,
    pub analytics: SalesAnalytics,
    pub enriched: Vec<EnrichedTransaction>,
    pub enrichment: EnrichmentStats,
}

/// Runs the whole batch: load, parse, validate, analyse, enrich, then write.
///
/// Files are only written once every in-memory stage has finished.
pub struct Pipeline<S> {
    config: PipelineConfig,
    catalog: Option<S>,
}

impl<S> Pipeline<S>
where
    S: ProductSource,
{
    /// With no catalog, or with `offline` set, every record ends up unmatched.
    pub fn new(config: PipelineConfig, catalog: Option<S>) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Everything up to and including enrichment, without touching disk
    /// beyond reading the input.
    ///
    /// Row-level problems are counted and skipped. Only totals that leave
    /// the numeric range fail the run.
    pub fn process(&self) -> Result<PipelineOutcome> {
        let lines = load_lines(&self.config.input);
        info!("read {} data lines from {}", lines.len(), self.config.input.display());

        let (transactions, malformed) = parse_transactions(&lines);
        info!("parsed {} records, {} malformed", transactions.len(), malformed);

        let regions = available_regions(&transactions);
        let range = amount_range(&transactions);

        let filters = &self.config.filters;
        if filters.is_empty() {
            info!("no filters applied");
        } else {
            info!("applying filters: {filters:?}");
        }
        let (valid, summary) = validate_and_filter(transactions, filters);

        let analytics =
            SalesAnalytics::compute(&valid, self.config.top_limit, self.config.low_threshold)
                .context("aggregating sales")?;

        let products = match self.catalog.as_ref().filter(|_| !self.config.offline) {
            Some(source) => fetch_catalog_or_empty(source),
            None => {
                info!("catalog disabled, skipping fetch");
                Vec::new()
            }
        };
        let mapping = create_product_mapping(products);

        let enriched = enrich_sales_data(valid, &mapping);
        let enrichment = EnrichmentStats::from_records(&enriched);

        Ok(PipelineOutcome {
            lines_read: lines.len(),
            malformed,
            regions,
            amount_range: range,
            summary,
            analytics,
            enriched,
            enrichment,
        })
    }

    pub fn run(&self) -> Result<PipelineOutcome> {
        let outcome = self.process()?;

        save_enriched_data(&outcome.enriched, &self.config.enriched_output)?;
        generate_sales_report(
            &outcome.analytics,
            &outcome.enrichment,
            Local::now().naive_local(),
            &self.config.report_output,
        )?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogProduct;
    use crate::errors::CatalogError;
    use rust_decimal::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    struct MockCatalog;

    impl ProductSource for MockCatalog {
        fn fetch_products(&self) -> std::result::Result<Vec<CatalogProduct>, CatalogError> {
            Ok(vec![CatalogProduct {
                id: Some(101),
                title: Some("Widget".to_string()),
                category: Some("tools".to_string()),
                brand: Some("Acme".to_string()),
                rating: Some(4.2),
            }])
        }
    }

    fn config_in(dir: &TempDir, content: &str) -> Result<PipelineConfig> {
        let input = dir.path().join("sales.txt");
        fs::write(&input, content)?;
        Ok(PipelineConfig {
            input,
            enriched_output: dir.path().join("out").join("enriched.txt"),
            report_output: dir.path().join("out").join("report.txt"),
            ..Default::default()
        })
    }

    const SALES: &str = "TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
T1|2024-01-01|P101|Widget|2|10.00|C1|North
T2|2024-01-01|P999|Gadget|1|5.00|C2|South
T3|2024-01-02|P101|Widget|0|10.00|C3|North
T4|2024-01-02|P101|Widget
";

    #[test]
    fn test_process_threads_every_stage() -> Result<()> {
        let dir = TempDir::new()?;
        let pipeline = Pipeline::new(config_in(&dir, SALES)?, Some(MockCatalog));
        let outcome = pipeline.process()?;

        assert_eq!(outcome.lines_read, 4);
        assert_eq!(outcome.malformed, 1);
        assert_eq!(outcome.summary.total_input(), 3);
        assert_eq!(outcome.summary.invalid(), 1);
        assert_eq!(outcome.summary.final_count(), 2);
        assert_eq!(outcome.regions, vec!["North".to_string(), "South".to_string()]);
        assert_eq!(outcome.amount_range, Some((dec!(0), dec!(20.00))));
        assert_eq!(outcome.analytics.total_revenue(), dec!(25.00));
        assert_eq!(outcome.enriched.len(), 2);
        assert_eq!(outcome.enrichment.matched, 1);
        assert_eq!(outcome.enrichment.match_rate, dec!(50));
        Ok(())
    }

    #[test]
    fn test_missing_catalog_matches_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let pipeline = Pipeline::<MockCatalog>::new(config_in(&dir, SALES)?, None);
        let outcome = pipeline.process()?;
        assert_eq!(outcome.enriched.len(), 2);
        assert!(outcome.enriched.iter().all(|e| !e.api_match()));
        Ok(())
    }

    #[test]
    fn test_run_writes_outputs() -> Result<()> {
        let dir = TempDir::new()?;
        let pipeline = Pipeline::new(config_in(&dir, SALES)?, Some(MockCatalog));
        pipeline.run()?;

        let enriched = fs::read_to_string(&pipeline.config().enriched_output)?;
        let lines: Vec<&str> = enriched.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "T1|2024-01-01|P101|Widget|2|10.00|C1|North|tools|Acme|4.2|True"
        );
        assert!(fs::read_to_string(&pipeline.config().report_output)?.contains("Total Revenue"));
        Ok(())
    }

    #[test]
    fn test_out_of_range_row_is_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        let sales = format!(
            "{SALES}T5|2024-01-03|P101|Widget|1000000000000|100000000000000000|C1|North\n"
        );
        let outcome = Pipeline::new(config_in(&dir, &sales)?, Some(MockCatalog)).process()?;
        assert_eq!(outcome.malformed, 2);
        assert_eq!(outcome.summary.final_count(), 2);
        assert_eq!(outcome.analytics.total_revenue(), dec!(25.00));
        Ok(())
    }

    #[test]
    fn test_overflowing_totals_fail_without_panic() -> Result<()> {
        let dir = TempDir::new()?;
        let sales = "header
T1|2024-01-01|P101|Widget|9223372036854775807|0.0000000001|C1|North
T2|2024-01-02|P101|Widget|9223372036854775807|0.0000000001|C2|North
";
        let pipeline = Pipeline::new(config_in(&dir, sales)?, Some(MockCatalog));
        let err = pipeline.run().unwrap_err();
        assert!(err.chain().any(|e| e.to_string() == "value overflow"));
        assert!(!pipeline.config().enriched_output.exists());
        Ok(())
    }

    #[test]
    fn test_missing_input_degrades_to_empty_run() -> Result<()> {
        let dir = TempDir::new()?;
        let config = PipelineConfig {
            input: dir.path().join("absent.txt"),
            ..Default::default()
        };
        let outcome = Pipeline::new(config, Some(MockCatalog)).process()?;
        assert_eq!(outcome.lines_read, 0);
        assert_eq!(outcome.summary, ValidationSummary::default());
        assert!(outcome.enriched.is_empty());
        Ok(())
    }
}
