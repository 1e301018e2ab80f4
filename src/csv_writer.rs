use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, Writer, WriterBuilder};
use log::info;
use serde::Serialize;

use crate::models::EnrichedTransaction;
use crate::traits::{RecordExport, RecordWrite};

pub const ENRICHED_HEADER: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

const NULL_TEXT: &str = "None";

/// Writes `|`-delimited records without any quoting.
pub struct PipeWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> PipeWriter<W> {
    pub fn from_writer(inner: W) -> Self {
        PipeWriter {
            writer: WriterBuilder::new()
                .delimiter(b'|')
                .quote_style(QuoteStyle::Never)
                .has_headers(false)
                .from_writer(inner),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| anyhow!(e.to_string()))
    }
}

impl PipeWriter<File> {
    /// Creates (or truncates) `path`, creating missing parent directories.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> RecordWrite for PipeWriter<W> {
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        Ok(self.writer.serialize(record)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}

fn none_as_text<S>(x: &Option<&str>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(x.unwrap_or(NULL_TEXT))
}

fn rating_as_text<S>(x: &Option<f64>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match x {
        Some(r) if r.is_finite() && r.fract() == 0.0 => s.serialize_str(&format!("{r:.1}")),
        Some(r) => s.serialize_str(&r.to_string()),
        None => s.serialize_str(NULL_TEXT),
    }
}

fn bool_as_title_case<S>(x: &bool, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(if *x { "True" } else { "False" })
}

#[derive(Serialize)]
struct EnrichedRow<'a> {
    transaction_id: &'a str,
    date: &'a str,
    product_id: &'a str,
    product_name: &'a str,
    quantity: i64,
    unit_price: String,
    customer_id: &'a str,
    region: &'a str,
    #[serde(serialize_with = "none_as_text")]
    api_category: Option<&'a str>,
    #[serde(serialize_with = "none_as_text")]
    api_brand: Option<&'a str>,
    #[serde(serialize_with = "rating_as_text")]
    api_rating: Option<f64>,
    #[serde(serialize_with = "bool_as_title_case")]
    api_match: bool,
}

impl<'a> From<&'a EnrichedTransaction> for EnrichedRow<'a> {
    fn from(record: &'a EnrichedTransaction) -> Self {
        let tx = record.transaction();
        EnrichedRow {
            transaction_id: tx.transaction_id(),
            date: tx.date(),
            product_id: tx.product_id(),
            product_name: tx.product_name(),
            quantity: tx.quantity(),
            unit_price: tx.unit_price().to_string(),
            customer_id: tx.customer_id(),
            region: tx.region(),
            api_category: record.api_category().as_deref(),
            api_brand: record.api_brand().as_deref(),
            api_rating: record.api_rating(),
            api_match: record.api_match(),
        }
    }
}

impl RecordExport for [EnrichedTransaction] {
    fn export(&self, writer: &mut impl RecordWrite) -> Result<()> {
        writer.write_record(&ENRICHED_HEADER)?;
        for record in self {
            writer.write_record(&EnrichedRow::from(record))?;
        }
        writer.flush()
    }
}

pub fn save_enriched_data(records: &[EnrichedTransaction], path: &Path) -> Result<()> {
    let mut writer = PipeWriter::create(path)?;
    records.export(&mut writer)?;
    info!("enriched data saved to {}", path.display());
    Ok(())
}
