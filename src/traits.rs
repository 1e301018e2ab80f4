use anyhow::Result;
use serde::Serialize;

use crate::catalog::CatalogProduct;
use crate::errors::CatalogError;

/// RecordWrite trait provides a method to write one delimited record.
pub trait RecordWrite {
    /// Writes a record to the underlying sink.
    ///
    /// # Arguments
    /// * `record` - The record to write, serialized field by field.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()>;

    /// Flushes buffered records.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// RecordExport trait provides a method to export records through a writer.
pub trait RecordExport {
    /// Exports every record.
    ///
    /// # Arguments
    /// * `writer` - The writer to send records to.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn export(&self, writer: &mut impl RecordWrite) -> Result<()>;
}

/// ProductSource trait provides read access to an external product catalog.
pub trait ProductSource {
    /// Fetches every product the catalog exposes.
    fn fetch_products(&self) -> std::result::Result<Vec<CatalogProduct>, CatalogError>;
}
