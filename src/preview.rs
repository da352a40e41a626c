use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    loader::{self, LoadOptions},
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let options = LoadOptions {
        delimiter: args.delimiter,
        input_encoding: args.input_encoding.clone(),
        limit: Some(args.rows),
        ..LoadOptions::default()
    };
    let dataset = loader::load_dataset(&args.input, &options)?;

    let rows = dataset
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.display()).collect())
        .collect::<Vec<Vec<String>>>();
    table::print_table(&dataset.headers, &rows);
    info!("Displayed {} row(s) from {:?}", rows.len(), args.input);
    Ok(())
}
