//! Filename normalization for versioned artifact names.
//!
//! This module turns an enumerated entry name such as `./pkg-linux-amd64.tar.gz`
//! into its normalized form `./pkg.tar.gz`. It is pure string manipulation and
//! never touches the filesystem.
//!
//! # Examples
//!
//! ```
//! use libsort::name_transform::transform_name;
//!
//! let name = transform_name("./mod-win-dll.dll").unwrap();
//! assert_eq!(name.relative(), "./mod.dll");
//! assert!(name.has_marker("dll"));
//! ```

/// Characters stripped from the start of an entry name.
pub const LEADING_SEPARATORS: [char; 3] = ['.', '\\', '/'];

/// Delimiter between the fields of a base name.
pub const FIELD_DELIMITER: &str = "-";

/// Reasons an entry name cannot be transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Nothing is left after stripping leading separators.
    Empty,
    /// The name has no `.` to split base and extension on.
    MissingExtension(String),
    /// The base name has fewer than two hyphen-delimited fields.
    TooFewFields {
        /// The base name that was split.
        base: String,
        /// How many fields it had.
        count: usize,
    },
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameError::Empty => write!(f, "name is empty after stripping leading separators"),
            NameError::MissingExtension(name) => {
                write!(f, "'{}' has no extension", name)
            }
            NameError::TooFewFields { base, count } => {
                write!(
                    f,
                    "'{}' has {} hyphen-delimited field{}, need at least 2",
                    base,
                    count,
                    if *count == 1 { "" } else { "s" }
                )
            }
        }
    }
}

impl std::error::Error for NameError {}

/// The normalized form of an entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedName {
    /// Remaining fields rejoined with `-`. May be empty.
    pub base: String,
    /// Everything after the first `.` of the stripped name.
    pub extension: String,
}

impl TransformedName {
    /// Returns `<base>.<extension>`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base, self.extension)
    }

    /// Returns the name relative to the working directory, `./<base>.<extension>`.
    pub fn relative(&self) -> String {
        format!("./{}", self.file_name())
    }

    /// Returns true if `marker` occurs anywhere in the extension (case-sensitive).
    pub fn has_marker(&self, marker: &str) -> bool {
        self.extension.contains(marker)
    }
}

/// Strips the leading run of `.`, `\` and `/` characters.
///
/// ```
/// use libsort::name_transform::strip_leading_separators;
///
/// assert_eq!(strip_leading_separators("./lib-x-y.so"), "lib-x-y.so");
/// assert_eq!(strip_leading_separators(".\\/.hidden"), "hidden");
/// ```
pub fn strip_leading_separators(name: &str) -> &str {
    name.trim_start_matches(LEADING_SEPARATORS)
}

/// Splits a stripped name at its first `.` into `(base, extension)`.
///
/// Later dots stay in the extension, so `name-1.2.3-tag.dll` splits into
/// `name-1` and `2.3-tag.dll`.
pub fn split_extension(name: &str) -> Result<(&str, &str), NameError> {
    name.split_once('.')
        .ok_or_else(|| NameError::MissingExtension(name.to_string()))
}

/// Drops the second and the last hyphen-delimited field of `base`.
///
/// The second field goes first, then the last of what remains. With exactly
/// two fields this leaves nothing.
pub fn drop_fields(base: &str) -> Result<Vec<&str>, NameError> {
    let mut fields: Vec<&str> = base.split(FIELD_DELIMITER).collect();
    if fields.len() < 2 {
        return Err(NameError::TooFewFields {
            base: base.to_string(),
            count: fields.len(),
        });
    }

    fields.remove(1);
    fields.pop();
    Ok(fields)
}

/// Runs the full transformation on one enumerated entry name.
pub fn transform_name(entry: &str) -> Result<TransformedName, NameError> {
    let stripped = strip_leading_separators(entry);
    if stripped.is_empty() {
        return Err(NameError::Empty);
    }

    let (base, extension) = split_extension(stripped)?;
    let fields = drop_fields(base)?;

    Ok(TransformedName {
        base: fields.join(FIELD_DELIMITER),
        extension: extension.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_whole_leading_run() {
        assert_eq!(strip_leading_separators("./a-b-c.txt"), "a-b-c.txt");
        assert_eq!(strip_leading_separators("..\\//x.y"), "x.y");
        assert_eq!(strip_leading_separators("plain.txt"), "plain.txt");
        assert_eq!(strip_leading_separators("./..."), "");
    }

    #[test]
    fn test_strip_is_idempotent() {
        for name in ["./.a-b-c.txt", "\\\\x-y-z.dll", "/.//.lib-1-2.so", "abc"] {
            let once = strip_leading_separators(name);
            assert_eq!(strip_leading_separators(once), once);
        }
    }

    #[test]
    fn test_strip_keeps_inner_separators() {
        assert_eq!(strip_leading_separators("./a/b.c"), "a/b.c");
    }

    #[test]
    fn test_split_extension_at_first_dot() {
        assert_eq!(
            split_extension("pkg-linux-amd64.tar.gz"),
            Ok(("pkg-linux-amd64", "tar.gz"))
        );
        assert_eq!(
            split_extension("name-1.2.3-tag.dll"),
            Ok(("name-1", "2.3-tag.dll"))
        );
        assert!(matches!(
            split_extension("Makefile"),
            Err(NameError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_three_fields_keeps_first_only() {
        let name = transform_name("./pkg-linux-amd64.tar.gz").unwrap();
        assert_eq!(name.base, "pkg");
        assert_eq!(name.extension, "tar.gz");
        assert_eq!(name.relative(), "./pkg.tar.gz");
    }

    #[test]
    fn test_four_fields_drop_second_and_last() {
        let name = transform_name("./libfoo-1_2_0-win64-release.dll").unwrap();
        assert_eq!(name.relative(), "./libfoo-win64.dll");
    }

    #[test]
    fn test_two_fields_leave_extension_only() {
        let name = transform_name("./a-b.txt").unwrap();
        assert_eq!(name.base, "");
        assert_eq!(name.relative(), "./.txt");
    }

    #[test]
    fn test_single_field_is_rejected() {
        assert_eq!(
            transform_name("./readme.txt"),
            Err(NameError::TooFewFields {
                base: "readme".to_string(),
                count: 1,
            })
        );
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        assert!(matches!(
            transform_name("./build-linux-x64"),
            Err(NameError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_only_separators_is_empty() {
        assert_eq!(transform_name("./."), Err(NameError::Empty));
        assert_eq!(transform_name(""), Err(NameError::Empty));
    }

    #[test]
    fn test_version_dots_land_in_extension() {
        // base is "lib-1", so only two fields survive the split
        let name = transform_name("./lib-1.2.3-x86.dll").unwrap();
        assert_eq!(name.base, "");
        assert_eq!(name.extension, "2.3-x86.dll");
        assert!(name.has_marker("dll"));
    }

    #[test]
    fn test_marker_is_case_sensitive_substring() {
        let name = transform_name("./mod-win-x.DLL").unwrap();
        assert!(!name.has_marker("dll"));

        let name = transform_name("./mod-win-x.dll.a").unwrap();
        assert!(name.has_marker("dll"));
    }

    #[test]
    fn test_error_display() {
        let err = NameError::TooFewFields {
            base: "readme".to_string(),
            count: 1,
        };
        assert_eq!(
            err.to_string(),
            "'readme' has 1 hyphen-delimited field, need at least 2"
        );
    }
}
