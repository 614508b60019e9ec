use std::io::{BufRead, Read};
use std::path::Path;

pub mod cache;
pub mod meta;
pub mod respondent;
pub mod spreadsheet;
pub mod table;

use cache::open_maybe_gz;
use spreadsheet::read_spreadsheet;
use table::{ReferenceTable, parse_delimited};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Unknown,
}

impl DatasetFormat {
    pub fn delimiter(self) -> Option<char> {
        match self {
            DatasetFormat::Csv | DatasetFormat::Unknown => Some(','),
            DatasetFormat::Tsv => Some('\t'),
            DatasetFormat::Xlsx | DatasetFormat::Xls => None,
        }
    }
}

const SNIFF_BYTES: u64 = 4096;
const XLSX_MAGIC: &[u8] = b"PK\x03\x04";
const XLS_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Sniffs the first bytes of a (possibly gzipped) dataset. Spreadsheet magic bytes win over
/// the file name; otherwise explicit `.csv`/`.tsv` extensions win over the text sniff.
pub fn detect_format(path: &Path) -> Result<DatasetFormat, InputError> {
    let mut head = Vec::with_capacity(SNIFF_BYTES as usize);
    open_maybe_gz(path)?.take(SNIFF_BYTES).read_to_end(&mut head)?;
    let sniffed = sniff_format(&head);
    if matches!(sniffed, DatasetFormat::Xlsx | DatasetFormat::Xls) {
        return Ok(sniffed);
    }

    let stem = if path.extension().is_some_and(|ext| ext == "gz") {
        path.file_stem().map(Path::new).unwrap_or(path)
    } else {
        path
    };
    match stem.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "csv" => Ok(DatasetFormat::Csv),
        Some(ext) if ext == "tsv" || ext == "tab" => Ok(DatasetFormat::Tsv),
        _ => Ok(sniffed),
    }
}

pub fn sniff_format(head: &[u8]) -> DatasetFormat {
    if head.starts_with(XLSX_MAGIC) {
        return DatasetFormat::Xlsx;
    }
    if head.starts_with(XLS_MAGIC) {
        return DatasetFormat::Xls;
    }
    let text = String::from_utf8_lossy(head);
    let first = text.lines().next().unwrap_or("");
    let tabs = first.matches('\t').count();
    let commas = first.matches(',').count();
    if tabs > 0 && tabs >= commas {
        DatasetFormat::Tsv
    } else if commas > 0 {
        DatasetFormat::Csv
    } else {
        DatasetFormat::Unknown
    }
}

pub fn load_reference_table(path: &Path) -> Result<ReferenceTable, InputError> {
    if !path.exists() {
        return Err(InputError::MissingInput(format!(
            "reference dataset not found: {}",
            path.display()
        )));
    }
    let format = detect_format(path)?;
    tracing::debug!(path = %path.display(), ?format, "detected reference dataset format");

    let table = match format.delimiter() {
        None => read_spreadsheet(path, format)?,
        Some(delimiter) => {
            if format == DatasetFormat::Unknown {
                tracing::warn!(
                    path = %path.display(),
                    "could not detect dataset format; parsing as CSV"
                );
            }
            let reader: Box<dyn BufRead> = open_maybe_gz(path)?;
            parse_delimited(reader, delimiter)?
        }
    };
    tracing::info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_columns(),
        "loaded reference dataset"
    );
    Ok(table)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
