//! `cuigroup group`: run a grouping over stored features and save it.

use clap::Args;
use cuigroup_core::config::CliOverrides;
use cuigroup_grouping::GroupingPipeline;
use cuigroup_storage::{GroupingStore, SqliteFeatureProvider};

use super::{GlobalArgs, SelectionArgs};
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Grouping policy: combined or conjunctive
    #[arg(long)]
    pub policy: Option<String>,

    /// Score candidates on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Do not persist the result
    #[arg(long)]
    pub dry_run: bool,

    /// Print run diagnostics as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_group(global: &GlobalArgs, args: GroupArgs) -> Result<(), CliError> {
    let config = global.load_config(CliOverrides {
        policy: args.policy.clone(),
        ..args.selection.overrides()
    })?;
    let mut params = config.grouping_params()?;
    if args.serial {
        params = params.with_parallel(false);
    }

    let db = global.open_database(&config)?;
    let provider = SqliteFeatureProvider::new(&db, params.dataset.clone());
    let run = GroupingPipeline::new(params).run(&provider)?;

    if !args.dry_run {
        GroupingStore::new(&db).save(&run.result)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.diagnostics)?);
    } else {
        println!("{}", run.result.tag());
        println!("{}", run.diagnostics);
        if args.dry_run {
            println!("dry run: result not saved");
        }
    }
    Ok(())
}
