use clap::Parser;
use libsort::cli::{RenameCommand, run_cli_with_config};
use libsort::output::OutputFormatter;
use std::path::PathBuf;

/// Normalize versioned artifact names and move dynamic libraries into their own directory.
#[derive(Debug, Parser)]
#[command(name = "libsort", version, about)]
struct Args {
    /// Directory to process
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Show what would be renamed without touching anything
    #[arg(long, conflicts_with = "undo")]
    dry_run: bool,

    /// Revert the previous rename pass in DIRECTORY
    #[arg(long)]
    undo: bool,

    /// Configuration file (defaults to DIRECTORY/.libsortrc.toml, then ~/.config/libsort/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the outcome of every entry
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let command = if args.undo {
        RenameCommand::Undo
    } else {
        RenameCommand::Rename {
            dry_run: args.dry_run,
            verbose: args.verbose,
        }
    };

    if let Err(e) = run_cli_with_config(command, &args.directory, args.config.as_deref()) {
        OutputFormatter::error(&e);
    }
}
