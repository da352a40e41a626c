//! Cell values and the amount/date normalizers.
//!
//! Export tools emit monetary amounts in a mix of locales (`1.234,56` vs
//! `1,234.56`) and dates as `DD/MM/YYYY` strings, ISO strings, or raw
//! spreadsheet serials. The normalizers here never fail: a malformed amount
//! degrades to zero and an unrecognized date degrades to the supplied
//! `today`, with `try_` variants exposing the degradation so callers can
//! keep defect counts.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Offset between the spreadsheet date serial epoch (1900-01-00 with the
/// fictitious leap day) and the Unix epoch, in days.
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25_569.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// One raw cell of an uploaded dataset. CSV sources only ever produce
/// `Empty` or `Text`; spreadsheet sources also produce typed `Number`
/// cells, which is how date serials reach [`day_month_label`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Blank cells do not count toward contract totals and are replaced by
    /// the placeholder name in rankings.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => {
                if value.fract() == 0.0 {
                    format!("{value:.0}")
                } else {
                    value.to_string()
                }
            }
        }
    }
}

/// Parses a monetary cell, degrading to zero on malformed input.
pub fn parse_amount(cell: &Cell) -> Decimal {
    try_parse_amount(cell).unwrap_or(Decimal::ZERO)
}

/// Like [`parse_amount`] but reports `None` when a non-blank cell could not
/// be read as a number. Blank cells are a clean zero, not a defect.
pub fn try_parse_amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Empty => Some(Decimal::ZERO),
        Cell::Number(value) => Decimal::from_f64(*value),
        Cell::Text(text) => {
            if text.trim().is_empty() {
                return Some(Decimal::ZERO);
            }
            parse_amount_text(text)
        }
    }
}

fn parse_amount_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let has_dot = cleaned.contains('.');
    let has_comma = cleaned.contains(',');
    let normalized = if has_dot && has_comma {
        let last_dot = cleaned.rfind('.').unwrap_or(0);
        let last_comma = cleaned.rfind(',').unwrap_or(0);
        if last_comma > last_dot {
            // 1.234,56 - dots group thousands, comma is the decimal point
            cleaned.replace('.', "").replacen(',', ".", 1)
        } else {
            // 1,234.56 - commas group thousands
            cleaned.replace(',', "")
        }
    } else if has_comma {
        // Bare comma acts as the decimal point
        cleaned.replacen(',', ".", 1)
    } else {
        cleaned
    };

    let token = leading_number(&normalized)?;
    Decimal::from_str_exact(token).ok()
}

/// Longest leading `-?digits[.digits]` token, so trailing garbage (a second
/// separator, a stray sign) truncates instead of invalidating the cell.
fn leading_number(input: &str) -> Option<&str> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, c) in input.char_indices() {
        match c {
            '-' if idx == 0 => end = idx + 1,
            '0'..='9' => {
                seen_digit = true;
                end = idx + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = idx + 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    let token = input[..end].trim_end_matches('.');
    if token.is_empty() || token == "-" {
        None
    } else {
        Some(token)
    }
}

/// Formats a date cell as a zero-padded `DD/MM` label, falling back to
/// `today` when the cell is unrecognized. The year is dropped; the day
/// series tracks within-period performance only.
pub fn day_month_label(cell: &Cell, today: NaiveDate) -> String {
    format_day_month(try_parse_date(cell).unwrap_or(today))
}

/// Like [`day_month_label`] but reports `None` on fallback so the
/// aggregator can count degraded dates.
pub fn try_day_month_label(cell: &Cell) -> Option<String> {
    try_parse_date(cell).map(format_day_month)
}

fn format_day_month(date: NaiveDate) -> String {
    format!("{:02}/{:02}", date.day(), date.month())
}

fn try_parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Empty => None,
        Cell::Number(serial) => serial_to_date(*serial),
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.contains('/') {
                parse_day_first(trimmed)
            } else if trimmed.contains('-') {
                parse_iso(trimmed)
            } else {
                None
            }
        }
    }
}

/// `DD/MM/YYYY` with the day leading, the layout used by the export tools
/// this crate targets.
fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let mut parts = text.splitn(3, '/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year_part = parts.next()?.trim();
    // Tolerate a trailing time component after the year
    let year: i32 = year_part
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%Y-%m-%d", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, fmt) {
            return Some(parsed);
        }
        if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(text, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

/// Days-since-1900 spreadsheet serial to a calendar date, via the Unix
/// epoch. Serials before the epoch offset are out of range for sales data.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = (serial - SERIAL_EPOCH_OFFSET_DAYS) * SECONDS_PER_DAY;
    if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}
