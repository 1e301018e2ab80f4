use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use log::{error, info};

use crate::errors::LoadError;

/// Text encodings tried in order when decoding the sales log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

pub const ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }

    /// Strict decode. `None` when the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            // ISO-8859-1 maps every byte to the code point of the same value.
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

/// Reads the sales log and returns its data lines.
///
/// The first line is a header and is dropped. Remaining lines are trimmed and
/// blank ones are skipped.
pub fn read_sales_lines(path: &Path) -> Result<Vec<String>, LoadError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let (encoding, text) = ENCODINGS
        .iter()
        .find_map(|enc| enc.decode(&bytes).map(|text| (*enc, text)))
        .ok_or_else(|| LoadError::UnsupportedEncoding(path.to_path_buf()))?;

    info!("decoded {} as {}", path.display(), encoding.name());

    Ok(data_lines(&text))
}

/// Same as [`read_sales_lines`] but never fails: problems are logged and an
/// empty sequence is returned.
pub fn load_lines(path: &Path) -> Vec<String> {
    match read_sales_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            error!("{e}");
            Vec::new()
        }
    }
}

fn data_lines(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region";

    #[test]
    fn test_header_and_blank_lines_dropped() -> Result<()> {
        let file = NamedTempFile::new()?;
        let content = format!(
            "{HEADER}\n  T1|2024-01-01|P101|Widget|2|10.00|C1|North  \n\n   \r\nT2|2024-01-02|P102|Gadget|1|5.00|C2|South\r\n"
        );
        fs::write(file.path(), content)?;

        let lines = read_sales_lines(file.path())?;
        assert_eq!(
            lines,
            vec![
                "T1|2024-01-01|P101|Widget|2|10.00|C1|North".to_string(),
                "T2|2024-01-02|P102|Gadget|1|5.00|C2|South".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_latin1_fallback() -> Result<()> {
        let file = NamedTempFile::new()?;
        let mut content = format!("{HEADER}\nT1|2024-01-01|P101|Caf").into_bytes();
        content.push(0xE9); // 'é' in latin-1, invalid as a lone utf-8 byte
        content.extend_from_slice(b"|2|10.00|C1|North\n");
        fs::write(file.path(), content)?;

        let lines = read_sales_lines(file.path())?;
        assert_eq!(lines, vec!["T1|2024-01-01|P101|Café|2|10.00|C1|North".to_string()]);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let res = read_sales_lines(Path::new("definitely/not/here.txt"));
        assert!(matches!(res, Err(LoadError::NotFound(_))));
        assert!(load_lines(Path::new("definitely/not/here.txt")).is_empty());
    }

    #[test]
    fn test_header_only_file() -> Result<()> {
        let file = NamedTempFile::new()?;
        fs::write(file.path(), HEADER)?;
        assert!(read_sales_lines(file.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_decoders() {
        assert_eq!(TextEncoding::Utf8.decode(&[0xFF]), None);
        assert_eq!(TextEncoding::Latin1.decode(&[0x41, 0xFF]), Some("Aÿ".to_string()));
        assert_eq!(
            TextEncoding::Windows1252.decode(&[0x80]),
            Some("€".to_string())
        );
    }
}
