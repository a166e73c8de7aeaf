//! Output formatting and styling module.
//!
//! Centralizes all CLI output: colored status lines, the initial directory
//! listing, the progress bar and the summary table.

use crate::renamer::{Entry, EntryOutcome, RunReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use libsort::output::OutputFormatter;
    /// OutputFormatter::success("Rename pass complete");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints the raw directory listing taken before any rename.
    pub fn listing(entries: &[Entry]) {
        let names: Vec<String> = entries.iter().map(|e| format!("'{}'", e.name)).collect();
        println!("[{}]", names.join(", "));
    }

    /// Prints one line per outcome: the rename or the reason it was skipped.
    pub fn outcome(outcome: &EntryOutcome) {
        match &outcome.result {
            Ok(operation) => {
                let target = operation
                    .new_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match &operation.relocated_to {
                    Some(dir) => println!(
                        " {} {} → {}/{}",
                        "✓".green(),
                        outcome.entry,
                        dir,
                        target
                    ),
                    None => println!(" {} {} → ./{}", "✓".green(), outcome.entry, target),
                }
            }
            Err(failure) => {
                println!(" {} {}: {}", "-".dimmed(), outcome.entry, failure);
            }
        }
    }

    /// Creates a progress bar for a rename pass over `total` entries.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the renamed/relocated/skipped counts of a finished pass.
    pub fn summary_table(report: &RunReport) {
        Self::header("SUMMARY");

        let rows = [
            ("Renamed", report.renamed_count()),
            ("Relocated", report.relocated_count()),
            ("Renamed, not moved", report.partial_count()),
            ("Skipped", report.skipped_count()),
        ];
        let width = 18;

        println!("{:<width$} | {}", "Outcome".bold(), "Entries".bold());
        println!("{}", "-".repeat(width + 12));
        for (label, count) in rows {
            let count = if label != "Renamed" && label != "Relocated" && count > 0 {
                count.to_string().yellow()
            } else {
                count.to_string().green()
            };
            println!("{:<width$} | {}", label, count);
        }
        println!("{}", "-".repeat(width + 12));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            report.outcomes.len().to_string().green().bold()
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
