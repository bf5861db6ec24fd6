use anyhow::{Context, Result};
use log::info;

use crate::{cli::PreviewArgs, ingest, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let options = crate::load_options(&args.input_args, None)?;
    let dataset = ingest::load_dataset(&args.input, &options)
        .with_context(|| format!("Loading {:?}", args.input))?;
    print!("{}", table::render_dataset(&dataset, args.rows));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        dataset.row_count().min(args.rows),
        dataset.row_count(),
        args.input
    );
    Ok(())
}
