use libsort::cli::{RenameCommand, run_cli_with_config};
use libsort::config::{LOCAL_CONFIG_FILE, RenameConfig};
use libsort::renamer::{BatchRenamer, EntryFailure, HISTORY_FILE};
/// Integration tests for libsort
///
/// These tests run complete passes over temporary directories.
///
/// Test categories:
/// 1. Basic rename and relocation
/// 2. Entries that do not fit the naming scheme
/// 3. Repeated passes
/// 4. Dry-run mode
/// 5. Undo
/// 6. Configuration
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    /// The empty local config shadows any user-level config file.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join(LOCAL_CONFIG_FILE), "")
            .expect("Failed to write local config");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file whose content is its own original name.
    fn create_file(&self, name: &str) {
        let mut file = File::create(self.path().join(name)).expect("Failed to create file");
        file.write_all(name.as_bytes())
            .expect("Failed to write file content");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name);
        }
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.path().join(name)).expect("Failed to create subdirectory");
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Should not exist: {}", path.display());
    }

    /// Read back a file created by `create_file` to learn where it came from.
    fn origin_of(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    /// Sorted names in the directory, excluding the history and config files.
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to read directory")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name != HISTORY_FILE && name != LOCAL_CONFIG_FILE)
            .collect();
        names.sort();
        names
    }

    fn rename(&self) -> Result<(), String> {
        run_cli_with_config(
            RenameCommand::Rename {
                dry_run: false,
                verbose: true,
            },
            self.path(),
            None,
        )
    }
}

// ============================================================================
// Test Suite 1: Basic Rename and Relocation
// ============================================================================

#[test]
fn test_rename_empty_directory() {
    let fixture = TestFixture::new();

    assert!(fixture.rename().is_ok());
    assert!(fixture.names().is_empty());
    fixture.assert_not_exists(HISTORY_FILE);
}

#[test]
fn test_rename_drops_second_and_last_field() {
    let fixture = TestFixture::new();
    fixture.create_file("pkg-linux-amd64.tar.gz");

    assert!(fixture.rename().is_ok());

    fixture.assert_file_exists("pkg.tar.gz");
    fixture.assert_not_exists("pkg-linux-amd64.tar.gz");
    assert_eq!(fixture.origin_of("pkg.tar.gz"), "pkg-linux-amd64.tar.gz");
}

#[test]
fn test_dll_moves_into_dynamic() {
    let fixture = TestFixture::new();
    fixture.create_file("mod-win-dll.dll");

    assert!(fixture.rename().is_ok());

    fixture.assert_dir_exists("dynamic");
    fixture.assert_file_exists("dynamic/mod.dll");
    fixture.assert_not_exists("mod.dll");
}

#[test]
fn test_mixed_artifacts() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "zlib-1_3_1-win64-release.dll",
        "zlib-1_3_1-win64-release.lib",
        "zlib-1_3_1-win64-release.dll.a",
        "zlib-1_3_1-win64-release.pdb",
    ]);

    assert!(fixture.rename().is_ok());

    fixture.assert_file_exists("dynamic/zlib-win64.dll");
    fixture.assert_file_exists("dynamic/zlib-win64.dll.a");
    fixture.assert_file_exists("zlib-win64.lib");
    fixture.assert_file_exists("zlib-win64.pdb");
    assert_eq!(
        fixture.names(),
        vec!["dynamic", "zlib-win64.lib", "zlib-win64.pdb"]
    );
}

#[test]
fn test_history_written_after_changes() {
    let fixture = TestFixture::new();
    fixture.create_file("pkg-linux-amd64.tar.gz");

    assert!(fixture.rename().is_ok());
    fixture.assert_file_exists(HISTORY_FILE);
}

// ============================================================================
// Test Suite 2: Entries Outside the Naming Scheme
// ============================================================================

#[test]
fn test_single_field_untouched() {
    let fixture = TestFixture::new();
    fixture.create_file("readme.txt");

    assert!(fixture.rename().is_ok());
    assert_eq!(fixture.names(), vec!["readme.txt"]);
    fixture.assert_not_exists(HISTORY_FILE);
}

#[test]
fn test_extensionless_file_untouched() {
    let fixture = TestFixture::new();
    fixture.create_file("build-linux-x64");

    assert!(fixture.rename().is_ok());
    assert_eq!(fixture.names(), vec!["build-linux-x64"]);
}

#[test]
fn test_only_subdirectories() {
    let fixture = TestFixture::new();
    fixture.create_subdir("src");
    fixture.create_subdir("docs");

    assert!(fixture.rename().is_ok());
    assert_eq!(fixture.names(), vec!["docs", "src"]);
}

#[test]
fn test_two_fields_become_hidden_extension_only_name() {
    let fixture = TestFixture::new();
    fixture.create_file("a-b.txt");

    assert!(fixture.rename().is_ok());
    assert_eq!(fixture.names(), vec![".txt"]);
}

#[test]
fn test_version_dots_split_at_first_dot() {
    let fixture = TestFixture::new();
    fixture.create_file("name-1.2.3-tag.dll");

    assert!(fixture.rename().is_ok());

    // base "name-1" has two fields, so only the extension survives
    fixture.assert_file_exists("dynamic/.2.3-tag.dll");
}

#[test]
fn test_per_entry_outcomes_exposed() {
    let fixture = TestFixture::new();
    fixture.create_files(&["readme.txt", "pkg-linux-amd64.tar.gz", "LICENSE"]);

    let report = BatchRenamer::with_defaults(fixture.path()).run();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.renamed_count(), 1);
    assert_eq!(report.skipped_count(), 2);
    assert!(
        report
            .failures()
            .all(|(_, failure)| matches!(failure, EntryFailure::Malformed(_)))
    );
}

// ============================================================================
// Test Suite 3: Repeated Passes
// ============================================================================

#[test]
fn test_second_pass_does_not_crash() {
    let fixture = TestFixture::new();
    fixture.create_files(&[
        "pkg-linux-amd64.tar.gz",
        "lib-x-y-z.so",
        "mod-win-x64.dll",
        "readme.txt",
    ]);

    assert!(fixture.rename().is_ok());
    assert_eq!(
        fixture.names(),
        vec!["dynamic", "lib-y.so", "pkg.tar.gz", "readme.txt"]
    );

    assert!(fixture.rename().is_ok());
    // "lib-y.so" still has two fields and collapses to ".so"
    assert_eq!(
        fixture.names(),
        vec![".so", "dynamic", "pkg.tar.gz", "readme.txt"]
    );
    fixture.assert_file_exists("dynamic/mod.dll");

    assert!(fixture.rename().is_ok());
    assert_eq!(
        fixture.names(),
        vec![".so", "dynamic", "pkg.tar.gz", "readme.txt"]
    );
}

// ============================================================================
// Test Suite 4: Dry-Run Mode
// ============================================================================

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["pkg-linux-amd64.tar.gz", "mod-win-x64.dll"]);

    let result = run_cli_with_config(
        RenameCommand::Rename {
            dry_run: true,
            verbose: false,
        },
        fixture.path(),
        None,
    );

    assert!(result.is_ok());
    assert_eq!(
        fixture.names(),
        vec!["mod-win-x64.dll", "pkg-linux-amd64.tar.gz"]
    );
    fixture.assert_not_exists(HISTORY_FILE);
    fixture.assert_not_exists("dynamic");
}

// ============================================================================
// Test Suite 5: Undo
// ============================================================================

#[test]
fn test_undo_restores_original_names() {
    let fixture = TestFixture::new();
    fixture.create_files(&["pkg-linux-amd64.tar.gz", "mod-win-x64.dll", "readme.txt"]);

    assert!(fixture.rename().is_ok());
    fixture.assert_file_exists("dynamic/mod.dll");

    let result = run_cli_with_config(RenameCommand::Undo, fixture.path(), None);
    assert!(result.is_ok());

    assert_eq!(
        fixture.names(),
        vec!["mod-win-x64.dll", "pkg-linux-amd64.tar.gz", "readme.txt"]
    );
    fixture.assert_not_exists(HISTORY_FILE);
}

#[test]
fn test_undo_without_history_fails() {
    let fixture = TestFixture::new();
    fixture.create_file("readme.txt");

    let result = run_cli_with_config(RenameCommand::Undo, fixture.path(), None);
    assert!(result.is_err());
}

// ============================================================================
// Test Suite 6: Configuration
// ============================================================================

#[test]
fn test_local_config_changes_relocation() {
    let fixture = TestFixture::new();
    fs::write(
        fixture.path().join(LOCAL_CONFIG_FILE),
        "[relocate]\nmarker = \"so\"\ndirectory = \"shared\"\n",
    )
    .expect("Failed to write config");
    fixture.create_files(&["libz-1_3-linux.so", "zlib-1_3-win.dll"]);

    assert!(fixture.rename().is_ok());

    fixture.assert_file_exists("shared/libz.so");
    fixture.assert_file_exists("zlib.dll");
    fixture.assert_not_exists("dynamic");
}

#[test]
fn test_exclude_pattern_skips_entry() {
    let fixture = TestFixture::new();
    let config_path = fixture.path().join(LOCAL_CONFIG_FILE);
    fs::write(&config_path, "[filters.exclude]\npatterns = [\"*.pdb\"]\n")
        .expect("Failed to write config");
    fixture.create_files(&["core-2_0-x64.pdb", "core-2_0-x64.dll"]);

    let result = run_cli_with_config(
        RenameCommand::Rename {
            dry_run: false,
            verbose: false,
        },
        fixture.path(),
        Some(&config_path),
    );

    assert!(result.is_ok());
    fixture.assert_file_exists("core-2_0-x64.pdb");
    fixture.assert_file_exists("dynamic/core.dll");
}

#[test]
fn test_config_compiles_from_library_api() {
    let fixture = TestFixture::new();
    fixture.create_file("tool-v1-linux.AppImage");

    let config = RenameConfig::from_toml("[relocate]\nmarker = \"AppImage\"\ndirectory = \"apps\"\n")
        .expect("Failed to parse config")
        .compile()
        .expect("Failed to compile config");
    let report = BatchRenamer::new(fixture.path(), config).run();

    assert_eq!(report.relocated_count(), 1);
    fixture.assert_file_exists("apps/tool.AppImage");
}
