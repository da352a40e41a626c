//! Spreadsheet ingestion via `calamine`.
//!
//! The first worksheet's first row is taken as the header row. Numeric
//! cells are preserved as numbers rather than stringified so date serials
//! survive untouched to the date normalizer.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use log::debug;

use crate::{
    data::Cell,
    loader::{Dataset, LoadError},
};

pub fn read_dataset(path: &Path, limit: Option<usize>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Opening workbook {path:?}"))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::EmptyInput)?;
    debug!("Reading worksheet '{sheet}' from {path:?}");
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Reading worksheet '{sheet}'"))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or(LoadError::EmptyInput)?
        .iter()
        .map(|cell| header_text(cell).trim().to_string())
        .collect();

    let rows: Vec<Vec<Cell>> = rows_iter
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| row.iter().map(to_cell).collect())
        .collect();

    let dataset =
        Dataset::new(headers, rows).with_context(|| format!("Parsing workbook {path:?}"))?;
    Ok(dataset)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.clone(),
        other => to_cell(other).display(),
    }
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(text) => Cell::from_field(text),
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(value) => Cell::Text(value.to_string()),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::from_field(text),
        Data::Error(_) => Cell::Empty,
    }
}
