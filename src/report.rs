//! Plain-text sales report.
//!
//! Rendering is pure; [`generate_sales_report`] only writes the finished text.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::info;
use rust_decimal::prelude::*;

use crate::analytics::SalesAnalytics;
use crate::enrichment::EnrichmentStats;

const WIDTH: usize = 60;
const TOP_CUSTOMERS: usize = 5;

fn rule(out: &mut String, ch: char) {
    out.push_str(&ch.to_string().repeat(WIDTH));
    out.push('\n');
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    rule(out, '-');
    Ok(())
}

fn centered(out: &mut String, text: &str) -> std::fmt::Result {
    writeln!(out, "{text:^WIDTH$}")
}

pub fn render_sales_report(
    analytics: &SalesAnalytics,
    enrichment: &EnrichmentStats,
    generated_at: NaiveDateTime,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let records: usize = analytics.daily().iter().map(|d| d.count()).sum();

    rule(&mut out, '=');
    centered(&mut out, "SALES ANALYTICS REPORT")?;
    centered(
        &mut out,
        &format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
    )?;
    centered(&mut out, &format!("Records Processed: {records}"))?;
    rule(&mut out, '=');

    section(&mut out, "OVERALL SUMMARY")?;
    let average = if records == 0 {
        Decimal::ZERO
    } else {
        (analytics.total_revenue() / Decimal::from(records)).round_dp(2)
    };
    writeln!(out, "{:<24}{:.2}", "Total Revenue:", analytics.total_revenue())?;
    writeln!(out, "{:<24}{}", "Total Transactions:", records)?;
    writeln!(out, "{:<24}{:.2}", "Average Order Value:", average)?;
    match (analytics.daily().first(), analytics.daily().last()) {
        (Some(first), Some(last)) => {
            writeln!(out, "{:<24}{} to {}", "Date Range:", first.date(), last.date())?
        }
        _ => writeln!(out, "{:<24}n/a", "Date Range:")?,
    }

    section(&mut out, "REGION-WISE PERFORMANCE")?;
    writeln!(out, "{:<14}{:>16}{:>14}{:>14}", "Region", "Sales", "% of Total", "Transactions")?;
    for region in analytics.regions() {
        writeln!(
            out,
            "{:<14}{:>16.2}{:>13.2}%{:>14}",
            region.region(),
            region.sales(),
            region.percent(),
            region.count()
        )?;
    }

    section(&mut out, "TOP PRODUCTS")?;
    writeln!(out, "{:<6}{:<24}{:>12}{:>16}", "Rank", "Product", "Quantity", "Revenue")?;
    for (rank, product) in analytics.top_products().iter().enumerate() {
        writeln!(
            out,
            "{:<6}{:<24}{:>12}{:>16.2}",
            rank + 1,
            product.name(),
            product.quantity(),
            product.revenue()
        )?;
    }

    section(&mut out, "TOP CUSTOMERS")?;
    writeln!(out, "{:<6}{:<14}{:>16}{:>10}{:>14}", "Rank", "Customer", "Total Spent", "Orders", "Average")?;
    for (rank, customer) in analytics.customers().iter().take(TOP_CUSTOMERS).enumerate() {
        writeln!(
            out,
            "{:<6}{:<14}{:>16.2}{:>10}{:>14.2}",
            rank + 1,
            customer.customer_id(),
            customer.spent(),
            customer.orders(),
            customer.average()
        )?;
    }

    section(&mut out, "DAILY SALES TREND")?;
    writeln!(out, "{:<14}{:>16}{:>14}{:>16}", "Date", "Revenue", "Transactions", "Customers")?;
    for day in analytics.daily() {
        writeln!(
            out,
            "{:<14}{:>16.2}{:>14}{:>16}",
            day.date(),
            day.sales(),
            day.count(),
            day.unique_customers()
        )?;
    }

    section(&mut out, "PRODUCT PERFORMANCE")?;
    let peak = analytics.peak();
    if peak.date().is_empty() {
        writeln!(out, "Best Selling Day: n/a")?;
    } else {
        writeln!(
            out,
            "Best Selling Day: {} ({:.2} across {} transactions)",
            peak.date(),
            peak.sales(),
            peak.count()
        )?;
    }
    if analytics.low_products().is_empty() {
        writeln!(out, "Low Performing Products: none")?;
    } else {
        writeln!(out, "Low Performing Products:")?;
        for product in analytics.low_products() {
            writeln!(
                out,
                "  - {} ({} units, {:.2})",
                product.name(),
                product.quantity(),
                product.revenue()
            )?;
        }
    }

    section(&mut out, "API ENRICHMENT SUMMARY")?;
    writeln!(out, "{:<24}{}", "Records Enriched:", enrichment.total)?;
    writeln!(out, "{:<24}{}", "Matched:", enrichment.matched)?;
    writeln!(out, "{:<24}{:.2}%", "Success Rate:", enrichment.match_rate)?;
    if enrichment.unmatched_products.is_empty() {
        writeln!(out, "Unmatched Products: none")?;
    } else {
        writeln!(out, "Unmatched Products: {}", enrichment.unmatched_products.join(", "))?;
    }

    Ok(out)
}

pub fn generate_sales_report(
    analytics: &SalesAnalytics,
    enrichment: &EnrichmentStats,
    generated_at: NaiveDateTime,
    path: &Path,
) -> Result<()> {
    let text = render_sales_report(analytics, enrichment, generated_at)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;

    info!("sales report saved to {}", path.display());
    Ok(())
}
