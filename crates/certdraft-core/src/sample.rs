//! CSV sample row ingestion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CSV ingestion errors.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("CSV has no header row")]
    NoHeader,
    #[error("CSV has no data rows")]
    NoRows,
}

/// Column name to value for the first data row of a CSV.
///
/// Column order is kept. Empty cells are absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRow {
    fields: Vec<(String, Option<String>)>,
}

impl SampleRow {
    pub fn new(fields: Vec<(String, Option<String>)>) -> Self {
        Self { fields }
    }

    /// Row used when no CSV has been uploaded.
    pub fn demo() -> Self {
        Self::new(vec![
            ("email".to_string(), Some("johndoe2@mail.com".to_string())),
            ("name".to_string(), Some("John Doe".to_string())),
        ])
    }

    /// Value of a column; `None` if the column is missing or the cell is absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// All columns in order, with their values.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Columns that can be bound to a layer: those with a non-empty value.
    pub fn available_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields().filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((key, v)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse the header and first data row of a CSV document.
///
/// Later rows are ignored. Cells are trimmed. Columns missing from a short
/// first row are absent values; cells past the last header are dropped.
pub fn parse_sample(csv_text: &str) -> Result<SampleRow, SampleError> {
    parse_sample_bytes(csv_text.as_bytes())
}

/// Like [`parse_sample`], for raw file contents. Invalid UTF-8 is a parse error.
pub fn parse_sample_bytes(data: &[u8]) -> Result<SampleRow, SampleError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(SampleError::NoHeader);
    }

    let record = match reader.records().next() {
        Some(record) => record?,
        None => return Err(SampleError::NoRows),
    };

    let fields = headers
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let value = record
                .get(i)
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            (key.to_string(), value)
        })
        .collect();

    log::debug!("Parsed sample row with {} column(s)", headers.len());
    Ok(SampleRow::new(fields))
}
