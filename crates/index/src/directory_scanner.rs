// Chunk: docs/chunks/directory_indexer - Markdown file discovery
//!
//! One-shot recursive discovery of markdown files under a directory.
//!
//! A scan walks the tree once and returns an immutable snapshot of
//! [`Candidate`]s. There is no cache and no live subscription: callers re-scan
//! whenever they want fresh results (opening a file, showing quick open).
//!
//! ## Exclusion Rules
//!
//! - Hidden entries (name starts with `.`) are skipped, files and directories
//!   alike. This covers `.git` and other dot-directories.
//! - Directories in the denylist are skipped along with all descendants.
//! - Only files with a markdown extension (case-insensitive) are kept.
//!
//! ## Ordering
//!
//! Results are sorted by the natural order of the **file name only**, so two
//! `README.md` files in different subdirectories sit next to each other.
//! Equal names fall back to the relative path.

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::Serialize;
use tracing::debug;

use crate::error::ScanError;
use crate::natural_order::natural_cmp;

/// File extensions treated as markdown, lowercase.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Directory names never descended into: dependency trees, build output,
/// and version-control internals.
pub const SKIPPED_DIRECTORIES: &[&str] = &[
    "node_modules",
    ".build",
    "Pods",
    "DerivedData",
    ".svn",
    ".hg",
    "vendor",
    "dist",
    "build",
];

/// A discovered markdown file eligible for quick open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Path relative to the scanned directory, used for display and scoring.
    pub relative_path: String,
}

impl Candidate {
    /// Builds a candidate for `path`, computing its display path against `base`.
    pub fn new(path: PathBuf, base: &Path) -> Self {
        let relative_path = relative_path(&path, Some(base));
        Self {
            path,
            relative_path,
        }
    }

    /// The last path component, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Filters applied during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Directory names to skip along with their descendants.
    pub skip_dirs: Vec<String>,
    /// Accepted extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            skip_dirs: SKIPPED_DIRECTORIES.iter().map(|s| s.to_string()).collect(),
            extensions: MARKDOWN_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScanOptions {
    /// Default options plus additional denylisted directory names.
    pub fn with_extra_skip_dirs<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        for name in extra {
            let name = name.into();
            if !options.skip_dirs.contains(&name) {
                options.skip_dirs.push(name);
            }
        }
        options
    }

    fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|skip| skip == name)
    }

    fn has_markdown_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

// =============================================================================
// Public entry points
// =============================================================================

/// Scans `directory` with the default filters.
///
/// Never fails: an unreadable or missing root yields an empty list. Use
/// [`try_scan`] to tell "empty" apart from "unreadable".
pub fn scan(directory: &Path) -> Vec<Candidate> {
    scan_with(directory, &ScanOptions::default())
}

/// Scans `directory` with custom filters, collapsing root errors to an empty list.
pub fn scan_with(directory: &Path, options: &ScanOptions) -> Vec<Candidate> {
    match try_scan_with(directory, options) {
        Ok(candidates) => candidates,
        Err(err) => {
            debug!("scan of {} yielded nothing: {err}", directory.display());
            Vec::new()
        }
    }
}

/// Scans `directory` with the default filters, reporting an unreadable root.
pub fn try_scan(directory: &Path) -> Result<Vec<Candidate>, ScanError> {
    try_scan_with(directory, &ScanOptions::default())
}

/// Scans `directory` with custom filters, reporting an unreadable root.
pub fn try_scan_with(directory: &Path, options: &ScanOptions) -> Result<Vec<Candidate>, ScanError> {
    let root = std::path::absolute(directory).unwrap_or_else(|_| directory.to_path_buf());

    let entries = fs::read_dir(&root).map_err(|source| {
        if root.is_file() {
            ScanError::NotADirectory(root.clone())
        } else {
            ScanError::UnreadableRoot {
                path: root.clone(),
                source,
            }
        }
    })?;

    let mut files = Vec::new();
    walk_entries(entries, options, &mut files);

    let mut candidates: Vec<Candidate> = files
        .into_iter()
        .map(|path| Candidate::new(path, &root))
        .collect();

    candidates.sort_by(|a, b| {
        natural_cmp(&a.file_name(), &b.file_name())
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });

    debug!("scanned {}: {} markdown file(s)", root.display(), candidates.len());
    Ok(candidates)
}

/// Returns `file` with the `base` prefix stripped.
///
/// The match is a plain string prefix test against `base` normalized to end
/// with a separator. Files outside `base`, or with no base at all, fall back
/// to the bare file name.
pub fn relative_path(file: &Path, base: Option<&Path>) -> String {
    let file_name = || {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let Some(base) = base else {
        return file_name();
    };

    let file_str = file.to_string_lossy();
    let mut base_str = base.to_string_lossy().into_owned();
    if !base_str.ends_with(MAIN_SEPARATOR) {
        base_str.push(MAIN_SEPARATOR);
    }

    match file_str.strip_prefix(base_str.as_str()) {
        Some(rest) => rest.to_string(),
        None => file_name(),
    }
}

// =============================================================================
// Directory Walking
// =============================================================================

/// Recursively collects markdown files from an open directory listing.
fn walk_entries(entries: fs::ReadDir, options: &ScanOptions, out: &mut Vec<PathBuf>) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry: {err}");
                continue;
            }
        };

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        // file_type() does not follow symlinks, so symlinked directories are
        // never descended into.
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                // Entry vanished between listing and stat
                debug!("skipping {}: {err}", path.display());
                continue;
            }
        };

        if file_type.is_dir() {
            if options.is_skipped_dir(&name) {
                continue;
            }
            match fs::read_dir(&path) {
                Ok(children) => walk_entries(children, options, out),
                Err(err) => debug!("skipping directory {}: {err}", path.display()),
            }
        } else if options.has_markdown_extension(&path) {
            out.push(path);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.relative_path.as_str()).collect()
    }

    // -------------------------------------------------------------------------
    // relative_path
    // -------------------------------------------------------------------------

    #[test]
    fn test_relative_path_strips_base() {
        let file = Path::new("/home/user/notes/sub/a.md");
        assert_eq!(relative_path(file, Some(Path::new("/home/user/notes"))), "sub/a.md");
    }

    #[test]
    fn test_relative_path_base_with_trailing_separator() {
        let file = Path::new("/home/user/notes/a.md");
        assert_eq!(relative_path(file, Some(Path::new("/home/user/notes/"))), "a.md");
    }

    #[test]
    fn test_relative_path_outside_base() {
        let file = Path::new("/elsewhere/deep/a.md");
        assert_eq!(relative_path(file, Some(Path::new("/home/user/notes"))), "a.md");
    }

    #[test]
    fn test_relative_path_sibling_prefix_is_not_a_match() {
        // "/notes-old" starts with "/notes" but not with "/notes/"
        let file = Path::new("/notes-old/a.md");
        assert_eq!(relative_path(file, Some(Path::new("/notes"))), "a.md");
    }

    #[test]
    fn test_relative_path_without_base() {
        assert_eq!(relative_path(Path::new("/x/y/z.md"), None), "z.md");
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    #[test]
    fn test_extension_case_insensitive() {
        let options = ScanOptions::default();
        assert!(options.has_markdown_extension(Path::new("README.MD")));
        assert!(options.has_markdown_extension(Path::new("notes.Markdown")));
        assert!(options.has_markdown_extension(Path::new("x.mkdn")));
        assert!(!options.has_markdown_extension(Path::new("x.txt")));
        assert!(!options.has_markdown_extension(Path::new("md")));
    }

    #[test]
    fn test_extra_skip_dirs_deduplicated() {
        let options = ScanOptions::with_extra_skip_dirs(["archive", "vendor"]);
        assert!(options.is_skipped_dir("archive"));
        assert_eq!(
            options.skip_dirs.iter().filter(|d| *d == "vendor").count(),
            1
        );
    }

    // -------------------------------------------------------------------------
    // Scanning
    // -------------------------------------------------------------------------

    #[test]
    fn test_scan_skips_hidden_denylisted_and_non_markdown() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        File::create(root.join("a.md")).unwrap();
        File::create(root.join("b.txt")).unwrap();
        File::create(root.join(".hidden.md")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        File::create(root.join("vendor/c.md")).unwrap();

        let results = scan(root);
        assert_eq!(names(&results), vec!["a.md"]);
    }

    #[test]
    fn test_scan_returns_absolute_paths() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("a.md")).unwrap();

        let results = scan(temp.path());
        assert_eq!(results.len(), 1);
        assert!(results[0].path.is_absolute());
        assert!(results[0].path.ends_with("a.md"));
    }

    #[test]
    fn test_scan_hidden_directories_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join(".git/refs")).unwrap();
        File::create(root.join(".git/refs/notes.md")).unwrap();
        File::create(root.join("visible.md")).unwrap();

        assert_eq!(names(&scan(root)), vec!["visible.md"]);
    }

    #[test]
    fn test_scan_nested_denylisted_directory_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("docs/node_modules/pkg")).unwrap();
        File::create(root.join("docs/node_modules/pkg/README.md")).unwrap();
        File::create(root.join("docs/guide.md")).unwrap();

        assert_eq!(names(&scan(root)), vec!["docs/guide.md"]);
    }

    #[test]
    fn test_scan_sorts_by_file_name_only() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("z")).unwrap();
        File::create(root.join("z/alpha.md")).unwrap();
        File::create(root.join("a/beta.md")).unwrap();
        File::create(root.join("gamma.md")).unwrap();

        assert_eq!(
            names(&scan(root)),
            vec!["z/alpha.md", "a/beta.md", "gamma.md"]
        );
    }

    #[test]
    fn test_scan_same_name_sorts_adjacent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        File::create(root.join("b/README.md")).unwrap();
        File::create(root.join("a/README.md")).unwrap();
        File::create(root.join("notes.md")).unwrap();

        assert_eq!(
            names(&scan(root)),
            vec!["notes.md", "a/README.md", "b/README.md"]
        );
    }

    #[test]
    fn test_scan_natural_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        File::create(root.join("note10.md")).unwrap();
        File::create(root.join("note2.md")).unwrap();
        File::create(root.join("Note1.md")).unwrap();

        assert_eq!(
            names(&scan(root)),
            vec!["Note1.md", "note2.md", "note10.md"]
        );
    }

    #[test]
    fn test_scan_with_extra_skip_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("archive")).unwrap();
        File::create(root.join("archive/old.md")).unwrap();
        File::create(root.join("new.md")).unwrap();

        let options = ScanOptions::with_extra_skip_dirs(["archive"]);
        assert_eq!(names(&scan_with(root, &options)), vec!["new.md"]);
        assert_eq!(scan(root).len(), 2);
    }

    #[test]
    fn test_scan_nonexistent_root_is_empty() {
        let results = scan(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(results.is_empty());
    }

    #[test]
    fn test_try_scan_nonexistent_root_is_error() {
        let err = try_scan(Path::new("/nonexistent/path/that/does/not/exist")).unwrap_err();
        assert!(matches!(err, ScanError::UnreadableRoot { .. }));
    }

    #[test]
    fn test_try_scan_file_root_is_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.md");
        File::create(&file).unwrap();

        let err = try_scan(&file).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_try_scan_empty_directory_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(try_scan(temp.path()).unwrap().is_empty());
    }
}
