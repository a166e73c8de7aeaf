/// Undo functionality for reverting a rename pass.
///
/// This module moves entries back to their original names based on the
/// recorded operation history, then removes relocation directories the pass
/// created if they are left empty.
use crate::renamer::{Operation, OperationLog, RenameError, RenameResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the result of an undo operation.
#[derive(Debug)]
pub struct UndoReport {
    /// Number of entries successfully restored.
    pub restored_files: usize,
    /// Entries that failed to restore.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Entries that were skipped (e.g., file not found).
    pub skipped_files: Vec<(PathBuf, String)>,
    /// Relocation directories removed because they were empty.
    pub removed_directories: Vec<PathBuf>,
}

impl UndoReport {
    fn new() -> Self {
        Self {
            restored_files: 0,
            failed_restores: Vec::new(),
            skipped_files: Vec::new(),
            removed_directories: Vec::new(),
        }
    }

    /// Returns the total number of operations processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if the undo was completely successful.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

enum RestoreError {
    NotFound(PathBuf, String),
    Failed(PathBuf, String),
}

/// Manages undo operations for rename passes.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the most recent rename pass in `base_path`.
    ///
    /// Relative paths in the history are resolved against `base_path`.
    /// Operations are reversed last-first. The history file is only deleted
    /// when every entry was restored.
    ///
    /// # Edge Cases Handled
    ///
    /// * **Entry not found**: skipped
    /// * **Name conflict**: the entry occupying the original name is backed up
    ///   with a timestamp suffix
    /// * **Permission denied**: recorded as a failure with the error reason
    /// * **Missing history**: returns an error indicating no undo is available
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libsort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/path/to/artifacts")) {
    ///     Ok(report) => println!("Restored {} entries", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(base_path: &Path) -> RenameResult<UndoReport> {
        if !base_path.exists() {
            return Err(RenameError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path does not exist",
                ),
            });
        }

        let log = OperationLog::load(base_path)?.ok_or_else(|| {
            RenameError::InvalidHistoryFormat {
                reason: "No previous rename pass found to undo".to_string(),
            }
        })?;

        let mut report = UndoReport::new();
        for operation in log.operations.iter().rev() {
            match Self::restore_entry(&operation.resolve(base_path)) {
                Ok(()) => report.restored_files += 1,
                Err(RestoreError::NotFound(path, reason)) => {
                    report.skipped_files.push((path, reason))
                }
                Err(RestoreError::Failed(path, reason)) => {
                    report.failed_restores.push((path, reason))
                }
            }
        }

        for dir in &log.created_directories {
            let dir = base_path.join(dir);
            // remove_dir refuses non-empty directories
            if fs::remove_dir(&dir).is_ok() {
                report.removed_directories.push(dir);
            }
        }

        if report.is_complete_success()
            && let Err(e) = OperationLog::delete(base_path)
        {
            eprintln!("Warning: Could not delete history file: {}", e);
        }

        Ok(report)
    }

    fn restore_entry(operation: &Operation) -> Result<(), RestoreError> {
        if fs::symlink_metadata(&operation.new_path).is_err() {
            return Err(RestoreError::NotFound(
                operation.new_path.clone(),
                "Entry not found at expected location".to_string(),
            ));
        }

        if fs::symlink_metadata(&operation.original_path).is_ok() {
            let backup_path = Self::generate_backup_path(&operation.original_path);
            fs::rename(&operation.original_path, &backup_path).map_err(|e| {
                RestoreError::Failed(
                    operation.original_path.clone(),
                    format!("Could not backup conflicting entry: {}", e),
                )
            })?;
        }

        fs::rename(&operation.new_path, &operation.original_path).map_err(|e| {
            RestoreError::Failed(
                operation.new_path.clone(),
                format!("Failed to restore entry: {}", e),
            )
        })
    }

    /// Example: `lib-x-y.dll` becomes `lib-x-y.dll.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entry".to_string());

        let backup_name = format!("{}.bak.{}", filename, timestamp);

        match original_path.parent() {
            Some(parent) => parent.join(backup_name),
            None => PathBuf::from(backup_name),
        }
    }
}
