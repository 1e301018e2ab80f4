use std::fs;

use anyhow::Result;
use rust_decimal::Decimal;
use sales_analytics::{
    FilterOptions, HttpCatalog, Pipeline, PipelineConfig, daily_sales_trend, find_peak_sales_day,
    low_performing_products, parse_transactions, read_sales_lines, region_wise_sales,
    top_selling_products, validate_and_filter,
};
use std::str::FromStr;
use tempfile::TempDir;

const SALES: &str = "TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
T001|2024-12-01|P101|Laptop|2|45,000|C001|North
T002|2024-12-01|P102|Mouse|5|500|C002|South
T003|2024-12-02|P103|Keyboard|3|1,500|C001|North
T004|2024-12-02|P104|Monitor|1|12000|C003|East
T005|2024-12-03|P102|Mouse|0|500|C004|West
T006|2024-12-03|P105|Webcam,HD|4|3000|C002|South
X007|2024-12-04|P101|Laptop|1|45000|C005|North
T008|2024-12-04|P106|Headphones|2|1500|C006|West
T009|2024-12-04|P107|USB Cable
T010|2024-12-05|P101|Laptop|1|45000|C001|North

";

fn dec(s: &str) -> Result<Decimal> {
    Ok(Decimal::from_str(s)?)
}

fn write_sales(dir: &TempDir) -> Result<PipelineConfig> {
    let input = dir.path().join("sales_data.txt");
    fs::write(&input, SALES)?;
    Ok(PipelineConfig {
        input,
        enriched_output: dir.path().join("data").join("enriched_sales_data.txt"),
        report_output: dir.path().join("output").join("sales_report.txt"),
        offline: true,
        ..Default::default()
    })
}

#[test]
fn test_full_batch_offline() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_sales(&dir)?;
    let pipeline = Pipeline::<HttpCatalog>::new(config, None);
    let outcome = pipeline.run()?;

    assert_eq!(outcome.lines_read, 10);
    assert_eq!(outcome.malformed, 1);

    let summary = outcome.summary;
    assert_eq!(summary.total_input(), 9);
    assert_eq!(summary.invalid(), 2);
    assert_eq!(summary.final_count(), 7);
    assert!(summary.is_balanced());

    assert_eq!(outcome.analytics.total_revenue(), dec("169000")?);
    assert_eq!(outcome.enrichment.matched, 0);
    assert_eq!(outcome.enrichment.match_rate, Decimal::ZERO);

    let enriched = fs::read_to_string(&pipeline.config().enriched_output)?;
    let lines: Vec<&str> = enriched.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(
        lines[5],
        "T006|2024-12-03|P105|WebcamHD|4|3000|C002|South|None|None|None|False"
    );

    let report = fs::read_to_string(&pipeline.config().report_output)?;
    assert!(report.contains("Total Revenue:          169000.00"));
    assert!(report.contains("Best Selling Day: 2024-12-01 (92500.00 across 2 transactions)"));
    Ok(())
}

#[test]
fn test_stage_by_stage_properties() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_sales(&dir)?;

    let lines = read_sales_lines(&config.input)?;
    let (txs, malformed) = parse_transactions(&lines);
    assert_eq!(malformed, 1);

    for filters in [
        FilterOptions::default(),
        FilterOptions {
            region: Some("North".to_string()),
            ..Default::default()
        },
        FilterOptions {
            min_amount: Some(dec("2000")?),
            max_amount: Some(dec("50000")?),
            ..Default::default()
        },
        FilterOptions {
            region: Some("South".to_string()),
            min_amount: Some(dec("5000")?),
            max_amount: None,
        },
    ] {
        let (kept, summary) = validate_and_filter(txs.clone(), &filters);
        assert!(summary.is_balanced(), "{filters:?} -> {summary:?}");
        assert_eq!(kept.len(), summary.final_count());
    }

    let (valid, _) = validate_and_filter(txs, &FilterOptions::default());

    let percent: Decimal = region_wise_sales(&valid)?.iter().map(|r| r.percent()).sum();
    assert!((percent - dec("100")?).abs() <= dec("0.05")?);

    let low = low_performing_products(&valid, 4)?;
    assert!(low.iter().all(|p| p.quantity() < 4));
    let top = top_selling_products(&valid, 2)?;
    assert_eq!(top[0].name(), "Mouse");
    assert_eq!(top[1].name(), "WebcamHD");

    let daily = daily_sales_trend(&valid)?;
    assert!(daily.windows(2).all(|w| w[0].date() < w[1].date()));
    let peak = find_peak_sales_day(&valid)?;
    assert_eq!(Some(peak.sales()), daily.iter().map(|d| d.sales()).max());
    Ok(())
}
