//! Entry filtering and relocation configuration.
//!
//! This module loads the optional TOML configuration that controls which
//! directory entries are visited and where dynamic-library artifacts go.
//! Without a configuration file the defaults reproduce the fixed behavior:
//! hidden entries are skipped, directories are visited like files, and
//! anything whose extension contains `dll` moves into `dynamic/`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = false
//! include_directories = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.pdb"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [relocate]
//! marker = "dll"
//! directory = "dynamic"
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".libsortrc.toml";

/// Default substring that marks a dynamic-library extension.
pub const DEFAULT_MARKER: &str = "dll";

/// Default subdirectory for relocated dynamic libraries.
pub const DEFAULT_RELOCATION_DIR: &str = "dynamic";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure, or an unusable value.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameConfig {
    #[serde(default)]
    pub filters: FilterRules,

    #[serde(default)]
    pub relocate: RelocateRules,
}

/// Rules deciding which directory entries are visited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to visit hidden entries (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Whether subdirectories are renamed like files. Defaults to true.
    #[serde(default = "default_include_directories")]
    pub include_directories: bool,

    /// Rules for excluding entries.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_include_directories() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            include_directories: default_include_directories(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for excluding entries from the rename pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact entry names to exclude.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.pdb").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions to exclude, compared case-insensitively against the last extension.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns to exclude.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries, overriding exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Where dynamic-library artifacts are moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocateRules {
    /// Substring searched for in the extension (case-sensitive).
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Subdirectory of the target directory that receives matching entries.
    #[serde(default = "default_relocation_dir")]
    pub directory: String,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_relocation_dir() -> String {
    DEFAULT_RELOCATION_DIR.to_string()
}

impl Default for RelocateRules {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            directory: default_relocation_dir(),
        }
    }
}

impl RenameConfig {
    /// Load configuration, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.libsortrc.toml` in the target directory
    /// 3. Look for `~/.config/libsort/config.toml`
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot
    /// be read, or if any discovered file fails to parse.
    pub fn load(config_path: Option<&Path>, base_path: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = base_path.join(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("libsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validate and compile the configuration for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob pattern is invalid, if the marker
    /// is empty, or if the relocation directory is not a single path component.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let relocation = Relocation::new(self.relocate)?;
        let filters = CompiledFilters::new(self.filters)?;
        Ok(CompiledConfig {
            filters,
            relocation,
        })
    }
}

/// A validated configuration ready to drive a rename pass.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub filters: CompiledFilters,
    pub relocation: Relocation,
}

impl CompiledConfig {
    /// Compiles the built-in defaults.
    pub fn defaults() -> Self {
        Self {
            filters: CompiledFilters::default(),
            relocation: Relocation::default(),
        }
    }
}

/// Validated relocation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    marker: String,
    directory: String,
}

impl Relocation {
    fn new(rules: RelocateRules) -> Result<Self, ConfigError> {
        if rules.marker.is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "relocate.marker must not be empty".to_string(),
            ));
        }

        let directory = rules.directory.trim();
        if directory.is_empty()
            || directory == "."
            || directory == ".."
            || directory.contains(['/', '\\'])
        {
            return Err(ConfigError::ConfigInvalid(format!(
                "relocate.directory must be a single directory name, got '{}'",
                rules.directory
            )));
        }

        Ok(Self {
            marker: rules.marker,
            directory: directory.to_string(),
        })
    }

    /// The substring searched for in extensions.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The name of the relocation subdirectory.
    pub fn directory(&self) -> &str {
        &self.directory
    }
}

impl Default for Relocation {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            directory: DEFAULT_RELOCATION_DIR.to_string(),
        }
    }
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    include_directories: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            include_directories: rules.include_directories,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Whether subdirectories take part in the rename pass.
    pub fn include_directories(&self) -> bool {
        self.include_directories
    }

    /// Check if an entry should be visited.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden entry filter - if hidden and disabled, exclude
    /// 3. Exact name match - if matched, exclude
    /// 4. Extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, file_name: &str) -> bool {
        let path = Path::new(file_name);

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name) {
            return false;
        }

        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
        {
            return false;
        }

        if self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(file_name))
        {
            return false;
        }

        true
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            include_directories: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}
