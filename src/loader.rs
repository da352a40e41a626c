//! Tabular loading: raw export text or files into an in-memory [`Dataset`].
//!
//! There are two CSV paths. [`Dataset::from_delimited_text`] is the
//! legacy splitter the dashboard exports were originally tallied with: no
//! quote handling, so a delimiter inside a value misaligns that row. The
//! default file path reads through the `csv` crate with full RFC 4180
//! quoting; `--naive-split` selects the legacy splitter when parity with
//! previously published numbers matters.

use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::debug;
use thiserror::Error;

use crate::{data::Cell, io_utils, xlsx};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input contains no data rows")]
    EmptyInput,
    #[error("duplicate column header '{0}'")]
    DuplicateHeader(String),
}

/// Ordered headers plus positional rows, the unit every downstream stage
/// consumes. Rows keep the file's original order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Validates headers (non-empty, no duplicates) and requires at least
    /// one data row. Short rows are padded with empty cells and excess
    /// trailing fields are dropped, so every row has exactly one cell per
    /// header.
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Result<Self, LoadError> {
        if headers.is_empty() || rows.is_empty() {
            return Err(LoadError::EmptyInput);
        }
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(LoadError::DuplicateHeader(header.clone()));
            }
        }
        for row in &mut rows {
            row.resize(headers.len(), Cell::Empty);
        }
        Ok(Dataset { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Legacy line splitter: blank lines dropped, first line is the header
    /// row, fields split positionally on `delimiter` and trimmed. Quotes
    /// are not interpreted.
    pub fn from_delimited_text(text: &str, delimiter: u8) -> Result<Self, LoadError> {
        let delimiter = delimiter as char;
        let mut lines = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty());

        let header_line = lines.next().ok_or(LoadError::EmptyInput)?;
        let headers: Vec<String> = header_line
            .split(delimiter)
            .map(|field| field.trim().to_string())
            .collect();

        let rows: Vec<Vec<Cell>> = lines
            .map(|line| line.split(delimiter).map(Cell::from_field).collect())
            .collect();

        Dataset::new(headers, rows)
    }
}

/// Options shared by every dataset-reading subcommand.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub input_encoding: Option<String>,
    pub naive_split: bool,
    pub limit: Option<usize>,
}

/// Reads a dataset from a CSV/TSV file, stdin (`-`), or an XLSX workbook
/// (selected by extension).
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    if is_spreadsheet(path) {
        return xlsx::read_dataset(path, options.limit);
    }

    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let encoding = io_utils::resolve_encoding(options.input_encoding.as_deref())?;
    debug!(
        "Reading '{}' with delimiter '{}'",
        path.display(),
        io_utils::printable_delimiter(delimiter)
    );

    if options.naive_split {
        let text = io_utils::read_text_from_path(path, encoding)?;
        let mut dataset = Dataset::from_delimited_text(&text, delimiter)
            .with_context(|| format!("Parsing {path:?}"))?;
        if let Some(limit) = options.limit {
            dataset.rows.truncate(limit);
        }
        return Ok(dataset);
    }

    read_csv_dataset(path, delimiter, encoding, options.limit)
}

fn read_csv_dataset(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
    limit: Option<usize>,
) -> Result<Dataset> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers: Vec<String> = io_utils::reader_headers(&mut reader, encoding)?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        if let Some(limit) = limit
            && row_idx >= limit
        {
            break;
        }
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        rows.push(decoded.iter().map(|field| Cell::from_field(field)).collect());
    }

    let dataset = Dataset::new(headers, rows).with_context(|| format!("Parsing {path:?}"))?;
    Ok(dataset)
}

fn is_spreadsheet(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("xlsx")
            || ext.eq_ignore_ascii_case("xls")
            || ext.eq_ignore_ascii_case("ods")
    )
}
