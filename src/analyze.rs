use std::fs;

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};

use crate::{
    aggregate,
    cli::AnalyzeArgs,
    columns::ColumnRoles,
    loader::{self, LoadOptions},
    report,
};

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let options = LoadOptions {
        delimiter: args.delimiter,
        input_encoding: args.input_encoding.clone(),
        naive_split: args.naive_split,
        limit: (args.limit > 0).then_some(args.limit),
    };
    let dataset = loader::load_dataset(&args.input, &options)?;
    info!(
        "Loaded {} row(s) across {} column(s) from {:?}",
        dataset.rows.len(),
        dataset.headers.len(),
        args.input
    );

    let roles = ColumnRoles::resolve(&dataset.headers);
    let today = Local::now().date_naive();
    let result = aggregate::analyze(&dataset, &roles, today);

    for warning in &result.warnings {
        warn!("{warning}");
    }

    if let Some(path) = &args.output {
        let json = report::to_json(&result)?;
        fs::write(path, json).with_context(|| format!("Writing report to {path:?}"))?;
        info!("Report written to {path:?}");
        return Ok(());
    }

    if args.json {
        println!("{}", report::to_json(&result)?);
        return Ok(());
    }

    report::print_report(&result, args.target);
    Ok(())
}
