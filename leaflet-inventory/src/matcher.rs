//! Path matcher - enumerates the files of a project that survive the ignore list

use crate::model::{relative_path, ScanWarning, WarningKind};
use glob::{MatchOptions, Pattern};
use leaflet_core::{ErrorContext, LeafletError, LeafletResult, DEFAULT_IGNORE_PATTERNS};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct IgnorePattern {
    source: String,
    compiled: Pattern,
    /// `foo/**` also prunes the `foo` directory itself during the walk
    directory: Option<Pattern>,
    /// Patterns without a separator also apply to the bare file name
    match_file_name: bool,
}

impl IgnorePattern {
    fn compile(source: &str) -> LeafletResult<Self> {
        let compiled = Pattern::new(source).map_err(|e| LeafletError::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
            context: ErrorContext::new("path_matcher").with_operation("compile_patterns"),
        })?;

        let directory = match source.strip_suffix("/**") {
            Some(prefix) if !prefix.is_empty() => Pattern::new(prefix).ok(),
            _ => None,
        };

        Ok(Self {
            source: source.to_string(),
            compiled,
            directory,
            match_file_name: !source.contains('/'),
        })
    }

    fn matches_file(&self, relative: &str, file_name: &str) -> bool {
        self.compiled.matches_with(relative, MATCH_OPTIONS)
            || (self.match_file_name && self.compiled.matches_with(file_name, MATCH_OPTIONS))
    }

    fn matches_directory(&self, relative: &str) -> bool {
        self.directory
            .as_ref()
            .is_some_and(|dir| dir.matches_with(relative, MATCH_OPTIONS))
    }
}

/// Files found under a root plus the entries that had to be skipped
#[derive(Debug, Clone, Default)]
pub struct MatchedFiles {
    /// Absolute paths, sorted by file name within each directory
    pub files: Vec<PathBuf>,
    pub warnings: Vec<ScanWarning>,
}

/// Glob-based ignore list applied to paths relative to the project root
#[derive(Debug, Clone)]
pub struct PathMatcher {
    patterns: Vec<IgnorePattern>,
}

impl PathMatcher {
    /// Matcher with the built-in ignore list only
    pub fn new() -> Self {
        let patterns = DEFAULT_IGNORE_PATTERNS
            .iter()
            .filter_map(|p| IgnorePattern::compile(p).ok())
            .collect();
        Self { patterns }
    }

    /// Built-in ignore list plus `extra` patterns
    pub fn with_patterns(extra: &[String]) -> LeafletResult<Self> {
        let mut matcher = Self::new();
        for pattern in extra {
            matcher.add_pattern(pattern)?;
        }
        Ok(matcher)
    }

    /// Matcher that uses exactly `patterns`, without the built-in list
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> LeafletResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| IgnorePattern::compile(p.as_ref()))
            .collect::<LeafletResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn add_pattern(&mut self, pattern: &str) -> LeafletResult<()> {
        self.patterns.push(IgnorePattern::compile(pattern)?);
        Ok(())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// Whether a file with this `/`-separated relative path is excluded
    pub fn is_ignored(&self, relative: &str) -> bool {
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        self.patterns
            .iter()
            .any(|p| p.matches_file(relative, file_name))
    }

    fn is_ignored_directory(&self, relative: &str) -> bool {
        self.patterns.iter().any(|p| p.matches_directory(relative))
    }

    /// Walk `root` and return every regular file not excluded by the ignore list.
    ///
    /// Symbolic links are never followed. Entries that cannot be read are
    /// recorded as warnings and skipped. Only a missing or non-directory root
    /// is an error.
    pub fn enumerate(&self, root: &Path) -> LeafletResult<MatchedFiles> {
        let metadata = std::fs::metadata(root)
            .map_err(|e| LeafletError::invalid_root(root, &e.to_string()))?;
        if !metadata.is_dir() {
            return Err(LeafletError::invalid_root(root, "not a directory"));
        }

        let mut matched = MatchedFiles::default();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match relative_path(root, entry.path()) {
                    Some(rel) => !self.is_ignored_directory(&rel),
                    None => true,
                }
            });

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    let kind = match e.io_error().map(|io| io.kind()) {
                        Some(std::io::ErrorKind::PermissionDenied) => WarningKind::PermissionDenied,
                        _ => WarningKind::Io,
                    };
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    matched
                        .warnings
                        .push(ScanWarning::new(path, kind, e.to_string()));
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "Skipping symbolic link");
                matched.warnings.push(ScanWarning::new(
                    entry.path(),
                    WarningKind::Symlink,
                    "symbolic links are not followed",
                ));
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let Some(rel) = relative_path(root, entry.path()) else {
                continue;
            };
            if self.is_ignored(&rel) {
                continue;
            }

            matched.files.push(entry.into_path());
        }

        debug!(
            root = %root.display(),
            files = matched.files.len(),
            warnings = matched.warnings.len(),
            "Enumerated project files"
        );

        Ok(matched)
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn relative_files(root: &Path, matched: &MatchedFiles) -> Vec<String> {
        matched
            .files
            .iter()
            .map(|p| relative_path(root, p).unwrap())
            .collect()
    }

    #[test]
    fn default_patterns_exclude_build_output_and_logs() {
        let matcher = PathMatcher::new();

        assert!(matcher.is_ignored("node_modules/lodash/index.js"));
        assert!(matcher.is_ignored("dist/bundle.js"));
        assert!(matcher.is_ignored(".git/HEAD"));
        assert!(matcher.is_ignored("debug.log"));
        assert!(matcher.is_ignored("logs/server.log"));
        assert!(matcher.is_ignored("Cargo.lock"));
        assert!(!matcher.is_ignored("src/index.ts"));
        assert!(!matcher.is_ignored("packages/dist.rs"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = PathMatcher::with_patterns(&["[unclosed".to_string()]);
        assert!(matches!(result, Err(LeafletError::InvalidPattern { .. })));
    }

    #[test]
    fn enumerate_skips_ignored_directories_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/b.rs");
        touch(root, "src/a.rs");
        touch(root, "README.md");
        touch(root, "node_modules/pkg/index.js");
        touch(root, "app.log");

        let matched = PathMatcher::new().enumerate(root).unwrap();

        assert_eq!(
            relative_files(root, &matched),
            vec!["README.md", "src/a.rs", "src/b.rs"]
        );
        assert!(matched.warnings.is_empty());
    }

    #[test]
    fn enumerate_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let result = PathMatcher::new().enumerate(&missing);
        assert!(matches!(result, Err(LeafletError::InvalidRoot { .. })));
    }

    #[test]
    fn enumerate_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.txt");

        let result = PathMatcher::new().enumerate(&dir.path().join("file.txt"));
        assert!(matches!(result, Err(LeafletError::InvalidRoot { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn enumerate_reports_symlinks_without_following() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "real/file.rs");
        std::os::unix::fs::symlink(root.join("real"), root.join("loop")).unwrap();

        let matched = PathMatcher::new().enumerate(root).unwrap();

        assert_eq!(relative_files(root, &matched), vec!["real/file.rs"]);
        assert_eq!(matched.warnings.len(), 1);
        assert_eq!(matched.warnings[0].kind, WarningKind::Symlink);
    }

    #[cfg(unix)]
    #[test]
    fn enumerate_skips_unreadable_directories() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "open/a.rs");
        touch(root, "locked/secret.rs");
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores directory permissions, so there is nothing to observe
        let readable_anyway = fs::read_dir(&locked).is_ok();
        let result = PathMatcher::new().enumerate(root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let matched = result.unwrap();
        if readable_anyway {
            return;
        }

        assert_eq!(relative_files(root, &matched), vec!["open/a.rs"]);
        assert_eq!(matched.warnings.len(), 1);
        assert_eq!(matched.warnings[0].kind, WarningKind::PermissionDenied);
        assert_eq!(matched.warnings[0].path, locked);
    }
}
