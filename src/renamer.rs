/// Batch renaming of versioned artifacts.
///
/// This module walks the entries of a single directory, normalizes each entry
/// name and renames it in place. Entries whose extension carries the
/// dynamic-library marker are then moved into the relocation subdirectory.
/// Every entry gets its own outcome; a failing entry never stops the pass.
/// It also persists the operation history used by undo.
use crate::config::CompiledConfig;
use crate::name_transform::{NameError, TransformedName, transform_name};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the history file written into the target directory.
pub const HISTORY_FILE: &str = ".libsort_history.json";

/// A directory entry as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The enumerated form, `./<file name>`.
    pub name: String,
    /// The path of the entry under the target directory.
    pub path: PathBuf,
    /// Whether the entry was a directory when listed.
    pub is_dir: bool,
}

/// A rename performed (or planned) for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Where the entry was before the pass.
    pub original_path: PathBuf,
    /// Where the entry was renamed to, inside the target directory.
    pub renamed_path: PathBuf,
    /// Where the entry ended up.
    pub new_path: PathBuf,
    /// The relocation subdirectory, if the entry was moved into one.
    pub relocated_to: Option<String>,
}

impl Operation {
    /// Rewrites every path relative to `base_path`, for storing in history.
    pub fn relative_to(&self, base_path: &Path) -> Self {
        Self {
            original_path: relative_path(base_path, &self.original_path),
            renamed_path: relative_path(base_path, &self.renamed_path),
            new_path: relative_path(base_path, &self.new_path),
            relocated_to: self.relocated_to.clone(),
        }
    }

    /// Resolves the paths of a history entry against `base_path`.
    ///
    /// Absolute paths are left as they are.
    pub fn resolve(&self, base_path: &Path) -> Self {
        Self {
            original_path: base_path.join(&self.original_path),
            renamed_path: base_path.join(&self.renamed_path),
            new_path: base_path.join(&self.new_path),
            relocated_to: self.relocated_to.clone(),
        }
    }
}

/// Strips `base_path` from `path`, keeping `path` unchanged if it lies elsewhere.
pub fn relative_path(base_path: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base_path)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Why an entry was not (fully) processed.
#[derive(Debug)]
pub enum EntryFailure {
    /// The entry name is not valid UTF-8.
    NonUtf8Name(PathBuf),
    /// The entry name does not fit the `<field>-<field>[-...].<ext>` shape.
    Malformed(NameError),
    /// The rename itself failed. The entry is untouched.
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    /// The entry was renamed but the relocation directory could not be created.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
        renamed: Operation,
    },
    /// The entry was renamed but could not be moved into the relocation directory.
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
        renamed: Operation,
    },
}

impl EntryFailure {
    /// Returns the rename that already happened before the failure, if any.
    pub fn partial_operation(&self) -> Option<&Operation> {
        match self {
            Self::DirectoryCreationFailed { renamed, .. } | Self::MoveFailed { renamed, .. } => {
                Some(renamed)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonUtf8Name(path) => {
                write!(f, "Name is not valid UTF-8: {}", path.display())
            }
            Self::Malformed(err) => write!(f, "Unexpected name shape: {}", err),
            Self::RenameFailed { from, to, source } => {
                write!(
                    f,
                    "Failed to rename {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            Self::DirectoryCreationFailed {
                path,
                source,
                renamed,
            } => {
                write!(
                    f,
                    "Failed to create directory {}: {} (left at {})",
                    path.display(),
                    source,
                    renamed.renamed_path.display()
                )
            }
            Self::MoveFailed {
                from, to, source, ..
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for EntryFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NonUtf8Name(_) => None,
            Self::Malformed(err) => Some(err),
            Self::RenameFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::MoveFailed { source, .. } => Some(source),
        }
    }
}

/// The outcome for a single entry.
#[derive(Debug)]
pub struct EntryOutcome {
    /// The enumerated entry name.
    pub entry: String,
    pub result: Result<Operation, EntryFailure>,
}

impl EntryOutcome {
    /// Returns the operation to record in history: a full success or a partial rename.
    pub fn recorded_operation(&self) -> Option<&Operation> {
        match &self.result {
            Ok(operation) => Some(operation),
            Err(failure) => failure.partial_operation(),
        }
    }
}

/// Per-entry results of a rename pass.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One outcome per enumerated entry, in enumeration order.
    pub outcomes: Vec<EntryOutcome>,
    /// Relocation directories created during the pass.
    pub created_directories: Vec<PathBuf>,
}

impl RunReport {
    /// Number of entries renamed on disk, including those whose move failed.
    pub fn renamed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.recorded_operation().is_some())
            .count()
    }

    /// Number of entries renamed but left outside the relocation directory.
    pub fn partial_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err() && o.recorded_operation().is_some())
            .count()
    }

    /// Number of entries moved into a relocation directory.
    pub fn relocated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.result, Ok(op) if op.relocated_to.is_some()))
            .count()
    }

    /// Number of entries left untouched.
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.recorded_operation().is_none())
            .count()
    }

    /// Entries that failed, with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &EntryFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.entry.as_str(), e)))
    }

    /// All renames that touched the filesystem, including partial ones.
    pub fn operations(&self) -> Vec<Operation> {
        self.outcomes
            .iter()
            .filter_map(EntryOutcome::recorded_operation)
            .cloned()
            .collect()
    }
}

/// Errors outside the per-entry pass: base path validation and history I/O.
#[derive(Debug)]
pub enum RenameError {
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write history file.
    HistoryWriteFailed { source: std::io::Error },
    /// Failed to read history file.
    HistoryReadFailed { source: std::io::Error },
    /// History file has invalid format.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for RenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write history file: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read history file: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid history file format: {}", reason)
            }
        }
    }
}

impl std::error::Error for RenameError {}

/// Result type for base path and history operations.
pub type RenameResult<T> = Result<T, RenameError>;

/// The persisted record of one rename pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    /// RFC 3339 timestamp of when the pass ran.
    pub timestamp: String,
    /// The directory the pass ran in.
    pub base_path: PathBuf,
    /// Renames in the order they were performed.
    pub operations: Vec<Operation>,
    /// Relocation directories the pass created.
    #[serde(default)]
    pub created_directories: Vec<PathBuf>,
}

impl OperationLog {
    /// Creates an empty log for a given base path.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_path,
            operations: Vec::new(),
            created_directories: Vec::new(),
        }
    }

    /// Builds the log of a finished pass.
    ///
    /// Paths are stored relative to `base_path`, so undo resolves them against
    /// the directory it is given rather than the working directory.
    pub fn from_report(base_path: &Path, report: &RunReport) -> Self {
        let mut log = Self::new(base_path.to_path_buf());
        log.operations = report
            .operations()
            .iter()
            .map(|op| op.relative_to(base_path))
            .collect();
        log.created_directories = report
            .created_directories
            .iter()
            .map(|dir| relative_path(base_path, dir))
            .collect();
        log
    }

    /// Adds an operation to this log.
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    fn history_file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE)
    }

    /// Saves this log to disk as pretty-printed JSON.
    pub fn save(&self, base_path: &Path) -> RenameResult<()> {
        let json_string =
            serde_json::to_string_pretty(self).map_err(|e| RenameError::HistoryWriteFailed {
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            })?;

        fs::write(Self::history_file_path(base_path), json_string)
            .map_err(|e| RenameError::HistoryWriteFailed { source: e })
    }

    /// Loads the most recent log, or `None` if there is no history.
    pub fn load(base_path: &Path) -> RenameResult<Option<Self>> {
        let history_path = Self::history_file_path(base_path);

        if !history_path.exists() {
            return Ok(None);
        }

        let json_string = fs::read_to_string(&history_path)
            .map_err(|e| RenameError::HistoryReadFailed { source: e })?;

        serde_json::from_str(&json_string)
            .map(Some)
            .map_err(|e| RenameError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            })
    }

    /// Deletes the history file for a given base path.
    pub fn delete(base_path: &Path) -> RenameResult<()> {
        let history_path = Self::history_file_path(base_path);
        if history_path.exists() {
            fs::remove_file(&history_path)
                .map_err(|e| RenameError::HistoryWriteFailed { source: e })?;
        }
        Ok(())
    }
}

/// Renames the entries of one directory.
///
/// The target directory is explicit; every path is resolved against it, so the
/// process working directory only matters when `base_path` is relative.
///
/// # Examples
///
/// ```no_run
/// use libsort::renamer::BatchRenamer;
///
/// let renamer = BatchRenamer::with_defaults(".");
/// let report = renamer.run();
/// println!("{} renamed, {} skipped", report.renamed_count(), report.skipped_count());
/// ```
#[derive(Debug, Clone)]
pub struct BatchRenamer {
    base_path: PathBuf,
    config: CompiledConfig,
}

impl BatchRenamer {
    /// Creates a renamer for `base_path` with a compiled configuration.
    pub fn new(base_path: impl Into<PathBuf>, config: CompiledConfig) -> Self {
        Self {
            base_path: base_path.into(),
            config,
        }
    }

    /// Creates a renamer with the built-in defaults (`dll` into `dynamic/`).
    pub fn with_defaults(base_path: impl Into<PathBuf>) -> Self {
        Self::new(base_path, CompiledConfig::defaults())
    }

    /// The directory this renamer works in.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Checks that the base path is an existing directory.
    pub fn validate_base_path(&self) -> RenameResult<()> {
        let metadata =
            fs::metadata(&self.base_path).map_err(|e| RenameError::InvalidBasePath {
                path: self.base_path.clone(),
                source: e,
            })?;

        if !metadata.is_dir() {
            return Err(RenameError::InvalidBasePath {
                path: self.base_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "base path is not a directory",
                ),
            });
        }

        Ok(())
    }

    /// Takes the snapshot of entries a pass works on, sorted by name.
    ///
    /// An unreadable directory lists as empty.
    pub fn list_entries(&self) -> Vec<Entry> {
        let Ok(read_dir) = fs::read_dir(&self.base_path) else {
            return Vec::new();
        };

        let filters = &self.config.filters;
        let mut entries: Vec<Entry> = read_dir
            .flatten()
            .filter_map(|dir_entry| {
                let file_name = dir_entry.file_name().to_string_lossy().into_owned();
                let is_dir = dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

                if is_dir && !filters.include_directories() {
                    return None;
                }
                if !filters.should_include(&file_name) {
                    return None;
                }

                Some(Entry {
                    name: format!("./{}", file_name),
                    path: dir_entry.path(),
                    is_dir,
                })
            })
            .collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Lists and renames every entry. Never fails as a whole.
    pub fn run(&self) -> RunReport {
        let entries = self.list_entries();
        self.run_entries(&entries, |_| {})
    }

    /// Renames a snapshot of entries, calling `on_entry` after each one.
    pub fn run_entries<F>(&self, entries: &[Entry], mut on_entry: F) -> RunReport
    where
        F: FnMut(&EntryOutcome),
    {
        let mut report = RunReport::default();

        for entry in entries {
            let outcome = EntryOutcome {
                entry: entry.name.clone(),
                result: self.process_entry(entry, &mut report.created_directories),
            };
            on_entry(&outcome);
            report.outcomes.push(outcome);
        }

        report
    }

    /// Computes what `run` would do without touching the filesystem.
    ///
    /// Only name errors are reported; filesystem failures cannot be predicted.
    pub fn plan(&self, entries: &[Entry]) -> Vec<EntryOutcome> {
        entries
            .iter()
            .map(|entry| EntryOutcome {
                entry: entry.name.clone(),
                result: self.plan_entry(entry),
            })
            .collect()
    }

    fn transform(&self, entry: &Entry) -> Result<TransformedName, EntryFailure> {
        if entry.path.file_name().and_then(|n| n.to_str()).is_none() {
            return Err(EntryFailure::NonUtf8Name(entry.path.clone()));
        }
        transform_name(&entry.name).map_err(EntryFailure::Malformed)
    }

    fn plan_entry(&self, entry: &Entry) -> Result<Operation, EntryFailure> {
        let transformed = self.transform(entry)?;
        let renamed_path = self.base_path.join(transformed.file_name());
        let relocation = &self.config.relocation;

        let (new_path, relocated_to) = if transformed.has_marker(relocation.marker()) {
            (
                self.base_path
                    .join(relocation.directory())
                    .join(transformed.file_name()),
                Some(relocation.directory().to_string()),
            )
        } else {
            (renamed_path.clone(), None)
        };

        Ok(Operation {
            original_path: entry.path.clone(),
            renamed_path,
            new_path,
            relocated_to,
        })
    }

    fn process_entry(
        &self,
        entry: &Entry,
        created_directories: &mut Vec<PathBuf>,
    ) -> Result<Operation, EntryFailure> {
        let transformed = self.transform(entry)?;
        let renamed_path = self.base_path.join(transformed.file_name());

        fs::rename(&entry.path, &renamed_path).map_err(|e| EntryFailure::RenameFailed {
            from: entry.path.clone(),
            to: renamed_path.clone(),
            source: e,
        })?;

        let mut operation = Operation {
            original_path: entry.path.clone(),
            renamed_path: renamed_path.clone(),
            new_path: renamed_path.clone(),
            relocated_to: None,
        };

        let relocation = &self.config.relocation;
        if !transformed.has_marker(relocation.marker()) {
            return Ok(operation);
        }

        // Checked before every move; the directory may vanish between entries.
        let relocation_dir = self.base_path.join(relocation.directory());
        if !relocation_dir.exists() {
            fs::create_dir(&relocation_dir).map_err(|e| {
                EntryFailure::DirectoryCreationFailed {
                    path: relocation_dir.clone(),
                    source: e,
                    renamed: operation.clone(),
                }
            })?;
            created_directories.push(relocation_dir.clone());
        }

        let destination = relocation_dir.join(transformed.file_name());
        fs::rename(&renamed_path, &destination).map_err(|e| EntryFailure::MoveFailed {
            from: renamed_path.clone(),
            to: destination.clone(),
            source: e,
            renamed: operation.clone(),
        })?;

        operation.new_path = destination;
        operation.relocated_to = Some(relocation.directory().to_string());
        Ok(operation)
    }
}
