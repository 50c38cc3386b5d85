//! `cuigroup import`: load JSON Lines feature batches into the database.

use std::path::PathBuf;

use clap::Args;
use cuigroup_core::config::CliOverrides;
use cuigroup_storage::{import_batch_dir, import_batch_file};

use super::GlobalArgs;
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Directory of *.jsonl batch files (default: import.batch_dir)
    #[arg(long, conflicts_with = "file")]
    pub dir: Option<PathBuf>,

    /// A single batch file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub fn handle_import(global: &GlobalArgs, args: ImportArgs) -> Result<(), CliError> {
    let config = global.load_config(CliOverrides {
        batch_dir: args.dir.clone(),
        ..Default::default()
    })?;
    let db = global.open_database(&config)?;
    let dataset = config.grouping.effective_dataset();

    let report = match args.file {
        Some(file) => import_batch_file(&db, dataset, &global.resolve(&file))?,
        None => import_batch_dir(&db, dataset, &global.resolve(&config.import.effective_batch_dir()))?,
    };

    println!(
        "imported {} records into '{}' from {} file(s): {} featureless, {} repeated",
        report.records, dataset, report.files, report.featureless, report.duplicates
    );
    Ok(())
}
