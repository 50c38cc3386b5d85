//! cuigroup CLI
//!
//! Groups biomedical records (trials, publications, registry entries) that
//! describe the same disease/drug combination.
//!
//! # Commands
//!
//! - `import`: load JSON Lines feature batches into the database
//! - `group`: group a dataset and save the result
//! - `list`: stored datasets and saved groupings
//! - `show`: inspect a saved grouping
//!
//! Exit code 1 on error, 2 on corrupt stored data.

use clap::{Parser, Subcommand};
use cuigroup_core::errors::ErrorCode;
use cuigroup_core::tracing::{init_tracing, DEFAULT_DIRECTIVES};

mod commands;
mod error;

use commands::GlobalArgs;
use error::CliExitCode;

/// cuigroup - group biomedical records by shared disease and drug concepts
#[derive(Parser)]
#[command(name = "cuigroup")]
#[command(version)]
#[command(about = "Group biomedical records by shared disease and drug concepts")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import JSON Lines feature batches
    Import(commands::import::ImportArgs),
    /// Group a dataset and save the result
    Group(commands::group::GroupArgs),
    /// List stored datasets and saved groupings
    List(commands::list::ListArgs),
    /// Inspect a saved grouping
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();

    let directives = match cli.verbose {
        0 => DEFAULT_DIRECTIVES,
        1 => "cuigroup_core=debug,cuigroup_grouping=debug,cuigroup_storage=debug,cuigroup=debug",
        _ => "trace",
    };
    init_tracing(directives);

    let outcome = match cli.command {
        Commands::Import(args) => commands::import::handle_import(&cli.global, args),
        Commands::Group(args) => commands::group::handle_group(&cli.global, args),
        Commands::List(args) => commands::list::handle_list(&cli.global, args),
        Commands::Show(args) => commands::show::handle_show(&cli.global, args),
    };

    let code = match outcome {
        Ok(()) => CliExitCode::Success,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            eprintln!("{}", e.coded_message());
            e.exit_code()
        }
    };
    std::process::exit(code.into());
}
