use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze sales exports from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full analysis: KPIs, day series, and rankings
    Analyze(AnalyzeArgs),
    /// Show which columns were resolved for each semantic role
    Columns(ColumnsArgs),
    /// Preview the first few rows of an export in a formatted table
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input export: CSV/TSV file, XLSX workbook, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Write the report as JSON to this file instead of printing tables
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Print the report as JSON to stdout
    #[arg(long)]
    pub json: bool,
    /// Sales target used to display attainment (display only)
    #[arg(long)]
    pub target: Option<Decimal>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Split lines on the bare delimiter instead of parsing quoted CSV
    /// (legacy-compatible, misaligns on quoted delimiters)
    #[arg(long = "naive-split")]
    pub naive_split: bool,
    /// Maximum rows to read (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input export: CSV/TSV file, XLSX workbook, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input export: CSV/TSV file, XLSX workbook, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
