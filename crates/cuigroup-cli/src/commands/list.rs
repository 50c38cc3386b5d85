//! `cuigroup list`: stored datasets and saved groupings.

use clap::Args;
use cuigroup_core::config::CliOverrides;
use cuigroup_storage::queries::features;
use cuigroup_storage::GroupingStore;

use super::GlobalArgs;
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show groupings of every dataset, not only the configured one
    #[arg(long)]
    pub all: bool,
}

pub fn handle_list(global: &GlobalArgs, args: ListArgs) -> Result<(), CliError> {
    let config = global.load_config(CliOverrides::default())?;
    let db = global.open_database(&config)?;

    let datasets = db.with_conn(features::list_datasets)?;
    println!("datasets:");
    for (name, count) in &datasets {
        println!("  {name}  {count} records");
    }

    let filter = (!args.all).then(|| config.grouping.effective_dataset());
    let saved = GroupingStore::new(&db).list(filter)?;
    println!("groupings:");
    if saved.is_empty() {
        println!("  (none)");
    }
    for s in saved {
        println!(
            "  {}  policy={} records={} supergroups={}",
            s.tag, s.policy, s.record_count, s.supergroup_count
        );
    }
    Ok(())
}
