//! libsort - normalize versioned artifact names in a directory
//!
//! This library renames every entry of a directory by dropping the second and
//! the last hyphen-delimited field of its name, moves entries whose extension
//! contains a dynamic-library marker into a subdirectory, and can undo a pass
//! from its recorded history.

pub mod cli;
pub mod config;
pub mod name_transform;
pub mod output;
pub mod renamer;
pub mod undo;

pub use config::{CompiledConfig, ConfigError, RenameConfig};
pub use name_transform::{NameError, TransformedName, transform_name};
pub use renamer::{BatchRenamer, EntryFailure, EntryOutcome, Operation, OperationLog, RunReport};
pub use undo::{UndoManager, UndoReport};

pub use cli::{RenameCommand, run_cli};
