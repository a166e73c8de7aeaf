//! Command-line orchestration for libsort.
//!
//! This module wires configuration, the batch renamer, history and undo
//! together and renders everything through [`OutputFormatter`]. Per-entry
//! failures never surface as errors here; only setup problems do.

use crate::config::RenameConfig;
use crate::output::OutputFormatter;
use crate::renamer::{BatchRenamer, OperationLog, RenameError};
use crate::undo::UndoManager;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameCommand {
    /// Rename the entries of a directory.
    Rename {
        /// If true, only show what would happen.
        dry_run: bool,
        /// If true, print every entry's outcome.
        verbose: bool,
    },
    /// Undo the previous rename pass.
    Undo,
}

/// Runs a command against `dir_path` using the discovered configuration.
///
/// # Examples
///
/// ```no_run
/// use libsort::cli::{run_cli, RenameCommand};
/// use std::path::Path;
///
/// let command = RenameCommand::Rename { dry_run: false, verbose: false };
/// if let Err(e) = run_cli(command, Path::new(".")) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: RenameCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_config(command, dir_path, None)
}

/// Runs a command with an optional explicit configuration file.
pub fn run_cli_with_config(
    command: RenameCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), String> {
    match command {
        RenameCommand::Rename { dry_run, verbose } => {
            let renamer = build_renamer(dir_path, config_path)?;
            if dry_run {
                rename_dry_run(&renamer);
            } else {
                rename_directory(&renamer, verbose);
            }
            Ok(())
        }
        RenameCommand::Undo => undo_rename(dir_path),
    }
}

fn build_renamer(dir_path: &Path, config_path: Option<&Path>) -> Result<BatchRenamer, String> {
    let config = RenameConfig::load(config_path, dir_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let compiled = config
        .compile()
        .map_err(|e| format!("Error compiling configuration: {}", e))?;

    let renamer = BatchRenamer::new(resolve_base_path(dir_path)?, compiled);
    renamer.validate_base_path().map_err(|e| e.to_string())?;
    Ok(renamer)
}

/// Makes the target directory absolute so nothing depends on the working directory later.
fn resolve_base_path(dir_path: &Path) -> Result<PathBuf, String> {
    fs::canonicalize(dir_path).map_err(|e| {
        RenameError::InvalidBasePath {
            path: dir_path.to_path_buf(),
            source: e,
        }
        .to_string()
    })
}

/// Renames every entry, then saves history when anything changed on disk.
fn rename_directory(renamer: &BatchRenamer, verbose: bool) {
    let base_path = renamer.base_path();
    let entries = renamer.list_entries();
    OutputFormatter::listing(&entries);

    let pb = OutputFormatter::create_progress_bar(entries.len() as u64);
    let report = renamer.run_entries(&entries, |outcome| {
        pb.set_message(outcome.entry.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    if verbose {
        for outcome in &report.outcomes {
            OutputFormatter::outcome(outcome);
        }
    }

    OutputFormatter::summary_table(&report);

    let log = OperationLog::from_report(base_path, &report);
    if log.operations.is_empty() {
        return;
    }

    match log.save(base_path) {
        Ok(()) => OutputFormatter::info(&format!(
            "History saved. Use 'libsort {} --undo' to revert changes.",
            base_path.display()
        )),
        Err(e) => OutputFormatter::warning(&format!("Could not save history: {}", e)),
    }
}

fn rename_dry_run(renamer: &BatchRenamer) {
    let entries = renamer.list_entries();
    OutputFormatter::listing(&entries);

    if entries.is_empty() {
        OutputFormatter::dry_run_notice("No entries found.");
        return;
    }

    OutputFormatter::header("DRY RUN: Entries would be renamed as follows:");
    let plan = renamer.plan(&entries);
    for outcome in &plan {
        OutputFormatter::outcome(outcome);
    }

    let planned = plan.iter().filter(|o| o.result.is_ok()).count();
    OutputFormatter::dry_run_notice(&format!(
        "{} of {} entries would be renamed. No files were modified.",
        planned,
        plan.len()
    ));
}

fn undo_rename(base_path: &Path) -> Result<(), String> {
    OutputFormatter::info("Undoing previous rename pass...");

    let base_path = resolve_base_path(base_path)?;
    let report = UndoManager::undo(&base_path).map_err(|e| format!("Error: {}", e))?;

    OutputFormatter::success("Undo complete!");
    OutputFormatter::plain(&format!("  Restored: {}", report.restored_files));

    if !report.skipped_files.is_empty() {
        OutputFormatter::plain(&format!("  Skipped: {}", report.skipped_files.len()));
        for (path, reason) in &report.skipped_files {
            OutputFormatter::plain(&format!("    - {}: {}", path.display(), reason));
        }
    }

    for dir in &report.removed_directories {
        OutputFormatter::plain(&format!("  Removed empty directory {}", dir.display()));
    }

    if !report.failed_restores.is_empty() {
        OutputFormatter::plain(&format!("  Failed: {}", report.failed_restores.len()));
        for (path, reason) in &report.failed_restores {
            OutputFormatter::error(&format!("{}: {}", path.display(), reason));
        }
        OutputFormatter::warning("History file was NOT deleted due to failures.");
    }

    Ok(())
}
