pub mod aggregate;
pub mod analyze;
pub mod cli;
pub mod columns;
pub mod data;
pub mod io_utils;
pub mod loader;
pub mod preview;
pub mod report;
pub mod table;
pub mod xlsx;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("salesboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Columns(args) => handle_columns(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let options = loader::LoadOptions {
        delimiter: args.delimiter,
        input_encoding: args.input_encoding.clone(),
        ..loader::LoadOptions::default()
    };
    let dataset = loader::load_dataset(&args.input, &options)?;
    let roles = columns::ColumnRoles::resolve(&dataset.headers);

    let single = |value: &Option<String>| value.clone().unwrap_or_else(|| "(none)".to_string());
    let set = |values: &[String]| {
        if values.is_empty() {
            "(none)".to_string()
        } else {
            values.join(", ")
        }
    };

    let rows = vec![
        vec!["total".to_string(), single(&roles.total)],
        vec!["date".to_string(), single(&roles.date)],
        vec!["consultant".to_string(), single(&roles.consultant)],
        vec!["product".to_string(), single(&roles.product)],
        vec!["category".to_string(), set(&roles.category)],
        vec!["subscription".to_string(), set(&roles.subscription)],
        vec!["plan".to_string(), set(&roles.plan)],
        vec!["modality".to_string(), set(&roles.modality)],
    ];
    let headers = vec!["role".to_string(), "column(s)".to_string()];
    table::print_table(&headers, &rows);
    info!(
        "Resolved column roles for {} header(s) in {:?}",
        dataset.headers.len(),
        args.input
    );
    Ok(())
}
