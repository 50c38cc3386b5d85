//! `cuigroup show`: inspect a saved grouping.

use clap::Args;
use cuigroup_core::types::RecordKey;
use cuigroup_grouping::{GroupingResult, GroupingTag};
use cuigroup_storage::GroupingStore;

use super::{GlobalArgs, SelectionArgs};
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the members of these supergroups
    #[arg(long = "group", value_name = "INDEX")]
    pub groups: Vec<usize>,

    /// Print the supergroup of a record, as source:record_id
    #[arg(long)]
    pub record: Option<String>,

    /// Number of largest supergroups to summarize
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub fn handle_show(global: &GlobalArgs, args: ShowArgs) -> Result<(), CliError> {
    let config = global.load_config(args.selection.overrides())?;
    let params = config.grouping_params()?;
    let db = global.open_database(&config)?;
    let result = GroupingStore::new(&db).load(&GroupingTag::from_params(&params))?;

    println!(
        "{}  policy={} records={} supergroups={} grouped={}",
        result.tag(),
        result.policy(),
        result.record_count(),
        result.supergroup_count(),
        result.grouped_records().len()
    );

    if let Some(raw) = &args.record {
        let key: RecordKey = raw.parse()?;
        match result.supergroup_of(&key) {
            Some(index) => print_group(&result, index)?,
            None => println!("{key} is not part of this grouping"),
        }
        return Ok(());
    }

    if !args.groups.is_empty() {
        for &index in &args.groups {
            print_group(&result, index)?;
        }
        let union = result.records_in_groups(&args.groups)?;
        println!("{} records across {} supergroups", union.len(), args.groups.len());
        return Ok(());
    }

    for (index, size) in result.group_sizes().into_iter().take(args.top) {
        println!("  #{index:<6} {size}");
    }
    Ok(())
}

fn print_group(result: &GroupingResult, index: usize) -> Result<(), CliError> {
    let members = result.records_in_group(index)?;
    println!("supergroup {index} ({} records)", members.len());
    for key in members {
        println!("  {key}");
    }
    Ok(())
}
